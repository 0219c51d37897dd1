use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc, bson::oid::ObjectId};
use once_cell::sync::Lazy;
use password_hash::rand_core::OsRng;
use regex::Regex;

use crate::{
    dto::users::{
        LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest, UserList, UserResponse,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    services::jwt_service,
};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@(.+)$").unwrap());

fn users(db: &Database) -> Collection<User> {
    db.collection::<User>("user")
}

fn parse_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest("Invalid user id".to_string()))
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::BadRequest("Email cannot be blank".to_string()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.trim().is_empty() {
        return Err(AppError::BadRequest("Password cannot be blank".to_string()));
    }
    if password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_register(payload: &RegisterRequest) -> AppResult<()> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name cannot be blank".to_string()));
    }
    validate_email(&payload.email)?;
    validate_password(&payload.password)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn register(
    db: &Database,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    validate_register(&payload)?;

    let existing = users(db)
        .find_one(doc! { "email": &payload.email }, None)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!("User {}", payload.email)));
    }

    let user = User {
        id: None,
        name: payload.name,
        email: payload.email,
        password: hash_password(&payload.password)?,
        role: payload.role,
        avatar: payload.avatar,
    };

    let result = users(db).insert_one(&user, None).await?;
    let id = result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("insert returned no ObjectId")))?;
    let saved = User {
        id: Some(id),
        ..user
    };

    Ok(ApiResponse::success(
        "User created",
        UserResponse::from(&saved),
        None,
    ))
}

pub async fn login(db: &Database, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let user = users(db)
        .find_one(doc! { "email": &payload.email }, None)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = jwt_service::issue_token(&user)?;
    let resp = LoginResponse {
        email: user.email.clone(),
        token,
        role: vec![user.role.as_str().to_string()],
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn list_users(db: &Database) -> AppResult<ApiResponse<UserList>> {
    let items: Vec<User> = users(db).find(doc! {}, None).await?.try_collect().await?;
    let items = items.iter().map(UserResponse::from).collect();
    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_user(db: &Database, id: &str) -> AppResult<ApiResponse<UserResponse>> {
    let user = users(db)
        .find_one(doc! { "_id": parse_id(id)? }, None)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("User", UserResponse::from(&user), None))
}

pub async fn update_user(
    db: &Database,
    auth: &AuthUser,
    id: &str,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    let oid = parse_id(id)?;
    let mut user = users(db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(AppError::NotFound)?;

    if auth.user_id != oid.to_hex() {
        return Err(AppError::Forbidden);
    }

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Name cannot be blank".to_string()));
        }
        user.name = name;
    }
    if let Some(email) = payload.email {
        validate_email(&email)?;
        user.email = email;
    }
    if let Some(password) = payload.password {
        validate_password(&password)?;
        user.password = hash_password(&password)?;
    }
    if let Some(avatar) = payload.avatar {
        user.avatar = Some(avatar);
    }

    users(db)
        .replace_one(doc! { "_id": oid }, &user, None)
        .await?;

    Ok(ApiResponse::success(
        "Updated",
        UserResponse::from(&user),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(db: &Database, auth: &AuthUser, id: &str) -> AppResult<ApiResponse<serde_json::Value>> {
    let oid = parse_id(id)?;
    users(db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(AppError::NotFound)?;

    if auth.user_id != oid.to_hex() {
        return Err(AppError::Forbidden);
    }

    users(db).delete_one(doc! { "_id": oid }, None).await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format_is_enforced() {
        assert!(validate_email("buyer@example.com").is_ok());
        assert!(validate_email("seller+tag@shop.sn").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("").is_err());
        assert!(validate_email("trailing@").is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("s3cret!!").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
