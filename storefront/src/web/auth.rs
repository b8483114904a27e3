// storefront/src/web/auth.rs

//! Bearer-token extractors. Tokens are HS256 JWTs issued elsewhere; this
//! service only verifies them.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::state::AppState;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// User id.
  pub sub: String,
  /// Expiry, seconds since the epoch.
  pub exp: usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role: Option<String>,
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
  decode::<Claims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::new(Algorithm::HS256),
  )
  .map(|data| data.claims)
  .map_err(|e| {
    debug!("JWT validation failed: {e}");
    AppError::Auth("Invalid or expired token".to_string())
  })
}

/// The `token` header, or `Authorization: Bearer <token>`.
fn token_from_request(req: &HttpRequest) -> Option<&str> {
  let headers = req.headers();
  if let Some(token) = headers.get("token").and_then(|v| v.to_str().ok()) {
    return Some(token.trim());
  }
  headers
    .get(actix_web::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;
  let token = token_from_request(req)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| AppError::Auth("Not authorized, login again".to_string()))?;
  let claims = decode_token(token, &state.config.jwt_secret)?;
  Ok(AuthenticatedUser {
    is_admin: claims.role.as_deref() == Some(ADMIN_ROLE),
    user_id: claims.sub,
  })
}

/// Any caller holding a valid token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: String,
  pub is_admin: bool,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate(req))
  }
}

/// A caller whose token carries the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser {
  pub user_id: String,
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate(req).and_then(|user| {
      if user.is_admin {
        Ok(AdminUser { user_id: user.user_id })
      } else {
        warn!(user_id = %user.user_id, path = %req.path(), "Non-admin token on an admin route.");
        Err(AppError::Forbidden("Admin access required".to_string()))
      }
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use jsonwebtoken::{encode, EncodingKey, Header};

  fn token(secret: &str, exp_offset: i64, role: Option<&str>) -> String {
    let claims = Claims {
      sub: "user-1".into(),
      exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
      role: role.map(String::from),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
  }

  #[test]
  fn decodes_valid_token() {
    let claims = decode_token(&token("s3cret", 600, Some("admin")), "s3cret").unwrap();
    assert_eq!(claims.sub, "user-1");
    assert_eq!(claims.role.as_deref(), Some(ADMIN_ROLE));
  }

  #[test]
  fn rejects_wrong_secret_and_expired_tokens() {
    assert!(matches!(
      decode_token(&token("other", 600, None), "s3cret"),
      Err(AppError::Auth(_))
    ));
    assert!(matches!(
      decode_token(&token("s3cret", -3600, None), "s3cret"),
      Err(AppError::Auth(_))
    ));
    assert!(matches!(decode_token("garbage", "s3cret"), Err(AppError::Auth(_))));
  }
}
