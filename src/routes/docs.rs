use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        media::{ImageUrlResponse, MediaList, MediaResponse},
        orders::{OrderItemRequest, OrderItemResponse, OrderList, OrderRequest, OrderResponse},
        products::{ProductList, ProductRequest, ProductResponse},
        registry::{InstanceList, RegisterInstanceRequest, ServiceInstance},
        users::{LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest, UserList, UserResponse},
    },
    models::Role,
    response::{ApiResponse, Meta},
    routes::{health, media, orders, products, registry, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::register,
        users::login,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            Role,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateUserRequest,
            UserResponse,
            UserList,
            Meta,
            ApiResponse<UserResponse>,
            ApiResponse<LoginResponse>,
            ApiResponse<UserList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Account and login endpoints"),
    )
)]
pub struct UserApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::create_product,
        products::list_products,
        products::get_product,
        products::list_products_by_user,
        products::update_product,
        products::delete_product,
    ),
    components(
        schemas(
            ProductRequest,
            ProductResponse,
            ProductList,
            MediaResponse,
            Meta,
            ApiResponse<ProductResponse>,
            ApiResponse<ProductList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product endpoints"),
    )
)]
pub struct ProductApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
    ),
    components(
        schemas(
            OrderRequest,
            OrderItemRequest,
            OrderResponse,
            OrderItemResponse,
            OrderList,
            Meta,
            ApiResponse<OrderResponse>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct OrderApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        media::upload_and_save,
        media::upload_image,
        media::get_by_product_id,
        media::delete_by_id,
        media::delete_by_product_id,
    ),
    components(
        schemas(
            MediaResponse,
            MediaList,
            ImageUrlResponse,
            Meta,
            ApiResponse<MediaResponse>,
            ApiResponse<MediaList>,
            ApiResponse<ImageUrlResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Media", description = "Image upload endpoints"),
    )
)]
pub struct MediaApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        registry::register,
        registry::list_services,
        registry::lookup,
        registry::deregister,
    ),
    components(
        schemas(
            RegisterInstanceRequest,
            ServiceInstance,
            InstanceList,
            Meta,
            ApiResponse<ServiceInstance>,
            ApiResponse<InstanceList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Registry", description = "Service registry endpoints"),
    )
)]
pub struct RegistryApiDoc;

pub fn user_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", UserApiDoc::openapi())
}

pub fn product_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ProductApiDoc::openapi())
}

pub fn order_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", OrderApiDoc::openapi())
}

pub fn media_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", MediaApiDoc::openapi())
}

pub fn registry_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", RegistryApiDoc::openapi())
}
