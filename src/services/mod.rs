pub mod jwt_service;
pub mod media_service;
pub mod order_service;
pub mod product_service;
pub mod registry_service;
pub mod storage_service;
pub mod user_service;
