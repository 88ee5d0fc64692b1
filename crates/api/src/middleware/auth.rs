//! Bearer-token guard for the admin routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::typed_header::TypedHeaderRejection;
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub role: Option<String>,
}

/// Verify an HS256 token and require the admin role.
pub fn verify_admin_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected admin token");
        ApiError::Unauthorized
    })?;

    if data.claims.role.as_deref() != Some(ADMIN_ROLE) {
        return Err(ApiError::Forbidden("admin role required".into()));
    }
    Ok(data.claims)
}

pub async fn require_admin(
    State(state): State<AppState>,
    header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = header.map_err(|_| ApiError::Unauthorized)?;
    let claims = verify_admin_token(bearer.token(), &state.config().jwt_secret)?;
    tracing::debug!(operator = %claims.sub, "admin request");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
pub(crate) fn issue_token(secret: &str, role: Option<&str>) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: "operator@example.com".into(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: role.map(str::to_string),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_admin_tokens() {
        let token = issue_token("s3cret", Some(ADMIN_ROLE));
        let claims = verify_admin_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, "operator@example.com");
    }

    #[test]
    fn rejects_wrong_secret_and_missing_role() {
        let token = issue_token("s3cret", Some(ADMIN_ROLE));
        assert!(matches!(
            verify_admin_token(&token, "other"),
            Err(ApiError::Unauthorized)
        ));

        let token = issue_token("s3cret", None);
        assert!(matches!(
            verify_admin_token(&token, "s3cret"),
            Err(ApiError::Forbidden(_))
        ));
    }
}
