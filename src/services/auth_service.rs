use crate::{database::MongoDB, models::User, utils::error::AppError};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const COLLECTION: &str = "users";

// Work factor the stored hashes were created with
const BCRYPT_COST: u32 = 10;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub iat: usize,  // issued at
    pub exp: usize,  // expiration
    pub jti: String, // JWT ID
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Whitelisted user fields for responses. The stored record (and its
/// password hash) never reaches a client.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserInfo {
    pub email: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

fn get_jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::ConfigError("JWT_SECRET is not set".to_string()))
}

// Generate JWT token (1-day expiry)
pub fn generate_jwt(user_id: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::days(1)).timestamp() as usize;
    let jti = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user_id.to_string(),
        iat,
        exp,
        jti,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret()?.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret()?.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Presence check for the four registration fields. Empty strings count as
/// missing, matching the falsy check the API always had.
fn validate_register(
    request: &RegisterRequest,
) -> Result<(String, String, String, String), AppError> {
    let field = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidRequest("Missing fields".to_string()))
    };

    Ok((
        field(&request.email)?,
        field(&request.password)?,
        field(&request.first_name)?,
        field(&request.last_name)?,
    ))
}

// User registration
pub async fn register(db: &MongoDB, request: &RegisterRequest) -> Result<RegisterResponse, AppError> {
    let (email, password, first_name, last_name) = validate_register(request)?;

    let collection = db.collection::<User>(COLLECTION);

    let existing = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let hashed = hash(&password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let new_user = User {
        id: None,
        user_id: ObjectId::new().to_hex(),
        email,
        password: hashed,
        first_name,
        last_name,
        created_at: Some(BsonDateTime::now()),
    };

    collection
        .insert_one(&new_user)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(RegisterResponse {
        message: "User created".to_string(),
        user: UserInfo::from(&new_user),
    })
}

// User login
pub async fn login(db: &MongoDB, request: &LoginRequest) -> Result<LoginResponse, AppError> {
    let collection = db.collection::<User>(COLLECTION);

    let user = collection
        .find_one(doc! { "email": &request.email })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = verify(&request.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;

    if !valid {
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }

    let token = generate_jwt(&user.user_id)?;

    Ok(LoginResponse {
        token,
        user: UserInfo::from(&user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_test_secret() {
        std::env::set_var("JWT_SECRET", "test-secret");
    }

    #[test]
    fn jwt_round_trip_carries_user_id_and_one_day_expiry() {
        set_test_secret();

        let token = generate_jwt("abc123").unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.sub, "abc123");
        assert_eq!(claims.exp - claims.iat, 86400);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn verify_token_rejects_tampered_token() {
        set_test_secret();

        let token = generate_jwt("abc123").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');

        assert!(matches!(
            verify_token(&tampered),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn password_hash_verifies_and_rejects_mismatch() {
        let hashed = hash("hunter2", BCRYPT_COST).unwrap();

        assert!(verify("hunter2", &hashed).unwrap());
        assert!(!verify("wrong", &hashed).unwrap());
    }

    #[test]
    fn validate_register_requires_all_four_fields() {
        let request = RegisterRequest {
            email: Some("ann@example.com".into()),
            password: None,
            first_name: Some("Ann".into()),
            last_name: Some("Lee".into()),
        };

        assert!(matches!(
            validate_register(&request),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn validate_register_treats_empty_string_as_missing() {
        let request = RegisterRequest {
            email: Some("ann@example.com".into()),
            password: Some("".into()),
            first_name: Some("Ann".into()),
            last_name: Some("Lee".into()),
        };

        assert!(validate_register(&request).is_err());
    }

    #[test]
    fn user_info_never_serializes_password() {
        let user = User {
            id: None,
            user_id: "u1".into(),
            email: "ann@example.com".into(),
            password: "$2b$10$hash".into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            created_at: None,
        };

        let json = serde_json::to_value(UserInfo::from(&user)).unwrap();
        assert_eq!(json["email"], "ann@example.com");
        assert_eq!(json["firstName"], "Ann");
        assert_eq!(json["lastName"], "Lee");
        assert!(json.get("password").is_none());
    }
}
