use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use constant_time_eq::constant_time_eq;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Profile data the identity provider embeds in its tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Access token claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl Claims {
    /// Display name for a freshly provisioned account
    pub fn display_name(&self) -> String {
        self.user_metadata
            .name
            .clone()
            .or_else(|| self.user_metadata.full_name.clone())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string())
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify an HS256 token and return its claims
pub fn verify_token(token: &str, secret: &str, audience: Option<&str>) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    match audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!("Token rejected: {}", e);
        AppError::Unauthorized("Unauthorized".to_string())
    })
}

/// Check `Authorization: Bearer <CRON_SECRET>`.
///
/// Without a configured secret every call is rejected.
pub fn verify_cron_secret(headers: &HeaderMap, configured: Option<&str>) -> AppResult<()> {
    let expected = configured
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;
    let presented = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Unauthorized".to_string()))
    }
}

/// Authenticated caller with their account row
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    pub user: User,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }

    /// Teachers and admins
    pub fn require_teacher(&self) -> AppResult<()> {
        if self.user.is_teacher() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only teachers can access this resource".to_string(),
            ))
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

        let auth = &state.config.auth;
        let claims = verify_token(token, &auth.jwt_secret, auth.jwt_audience.as_deref())?;

        // First request of a new account creates its row
        let user = state
            .user_repo
            .find_or_provision(
                &claims.sub,
                claims.email.as_deref().unwrap_or_default(),
                &claims.display_name(),
                claims.user_metadata.avatar_url.as_deref().unwrap_or_default(),
            )
            .await?;

        Ok(AuthUser { claims, user })
    }
}

/// Authenticated caller with the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_verify_valid_token() {
        let t = token(
            json!({
                "sub": "user-1",
                "exp": future_exp(),
                "email": "ayse@example.com",
                "user_metadata": { "name": "Ayşe" }
            }),
            SECRET,
        );
        let claims = verify_token(&t, SECRET, None).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.display_name(), "Ayşe");
    }

    #[test]
    fn test_wrong_secret_and_expired_are_rejected() {
        let t = token(json!({ "sub": "u", "exp": future_exp() }), "other");
        assert!(matches!(
            verify_token(&t, SECRET, None),
            Err(AppError::Unauthorized(_))
        ));

        let t = token(json!({ "sub": "u", "exp": 1_000 }), SECRET);
        assert!(verify_token(&t, SECRET, None).is_err());
    }

    #[test]
    fn test_audience_is_enforced_when_configured() {
        let t = token(
            json!({ "sub": "u", "exp": future_exp(), "aud": "authenticated" }),
            SECRET,
        );
        assert!(verify_token(&t, SECRET, Some("authenticated")).is_ok());
        assert!(verify_token(&t, SECRET, Some("service_role")).is_err());
        assert!(verify_token(&t, SECRET, None).is_ok());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let claims = Claims {
            sub: "u".into(),
            exp: 0,
            email: Some("mehmet@example.com".into()),
            user_metadata: UserMetadata::default(),
        };
        assert_eq!(claims.display_name(), "mehmet");
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cron_secret() {
        let headers = headers_with("Bearer s3cret");
        assert!(verify_cron_secret(&headers, Some("s3cret")).is_ok());
        assert!(verify_cron_secret(&headers, Some("other")).is_err());
        // Not configured means disabled
        assert!(verify_cron_secret(&headers, None).is_err());
        assert!(verify_cron_secret(&headers, Some("")).is_err());
    }
}
