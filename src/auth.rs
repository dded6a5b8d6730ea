use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

/// JWT claims as issued by the auth service. Issuance and revocation are not
/// this backend's concern; it only resolves the token into an identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
}

/// The authenticated caller, resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".into()))
        }
    }

    pub fn require_customer(&self) -> Result<(), AppError> {
        if self.role == Role::Customer {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "This operation is customer-only".into(),
            ))
        }
    }
}

fn resolve(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let config = req
        .app_data::<web::Data<JwtConfig>>()
        .ok_or_else(|| AppError::Unauthorized("Auth is not configured".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("No token provided".into()))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    Ok(AuthUser {
        id: decoded.claims.sub,
        role: decoded.claims.role,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}
