use mongodb::bson::doc;

use marketplace_services::{
    db,
    dto::users::{LoginRequest, RegisterRequest, UpdateUserRequest},
    error::AppError,
    middleware::auth::AuthUser,
    models::{Role, User},
    services::user_service,
};

// Integration flow: register -> duplicate rejected -> bad login rejected ->
// non-owner mutation forbidden and entity unchanged -> owner mutation applied.
#[tokio::test]
async fn register_login_and_ownership_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let database = db::connect(&database_url, "marketplace_test").await?;
    database
        .collection::<User>("user")
        .delete_many(doc! {}, None)
        .await?;

    let created = user_service::register(
        &database,
        RegisterRequest {
            name: "Aissatou".to_string(),
            email: "aissatou@example.com".to_string(),
            password: "s3cret-pass".to_string(),
            role: Role::Seller,
            avatar: None,
        },
    )
    .await?;
    let created = created.data.expect("created user");
    assert!(!created.id.is_empty());
    assert_eq!(created.email, "aissatou@example.com");

    // The stored credential is a hash, never the plaintext.
    let stored = database
        .collection::<User>("user")
        .find_one(doc! { "email": "aissatou@example.com" }, None)
        .await?
        .expect("stored user");
    assert_ne!(stored.password, "s3cret-pass");

    let duplicate = user_service::register(
        &database,
        RegisterRequest {
            name: "Impostor".to_string(),
            email: "aissatou@example.com".to_string(),
            password: "another-pass".to_string(),
            role: Role::Client,
            avatar: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Wrong password is rejected before any token work happens.
    let login = user_service::login(
        &database,
        LoginRequest {
            email: "aissatou@example.com".to_string(),
            password: "wrong".to_string(),
        },
    )
    .await;
    assert!(matches!(login, Err(AppError::Unauthorized(_))));

    let intruder = AuthUser {
        user_id: "64f000000000000000000099".to_string(),
        email: "other@example.com".to_string(),
        authorities: vec!["CLIENT".to_string()],
    };
    let forbidden = user_service::update_user(
        &database,
        &intruder,
        &created.id,
        UpdateUserRequest {
            name: Some("Hacked".to_string()),
            email: None,
            password: None,
            avatar: None,
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let unchanged = user_service::get_user(&database, &created.id).await?;
    assert_eq!(unchanged.data.expect("user").name, "Aissatou");

    let owner = AuthUser {
        user_id: created.id.clone(),
        email: created.email.clone(),
        authorities: vec!["SELLER".to_string()],
    };
    let updated = user_service::update_user(
        &database,
        &owner,
        &created.id,
        UpdateUserRequest {
            name: Some("Aissatou D.".to_string()),
            email: None,
            password: None,
            avatar: Some("https://cdn.example.com/a.png".to_string()),
        },
    )
    .await?;
    let updated = updated.data.expect("updated user");
    assert_eq!(updated.name, "Aissatou D.");
    assert_eq!(updated.avatar.as_deref(), Some("https://cdn.example.com/a.png"));

    let forbidden_delete = user_service::delete_user(&database, &intruder, &created.id).await;
    assert!(matches!(forbidden_delete, Err(AppError::Forbidden)));

    user_service::delete_user(&database, &owner, &created.id).await?;
    assert!(matches!(
        user_service::get_user(&database, &created.id).await,
        Err(AppError::NotFound)
    ));

    Ok(())
}
