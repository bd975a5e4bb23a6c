use super::jwt::JwtClaims;
use super::roles::Role;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::str::FromStr;
use uuid::Uuid;

/// The raw bearer token of the current request, kept so it can be forwarded
/// on calls to sibling services.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// The authenticated caller, built from the claims placed in the request by
/// the JWT middleware.
///
/// Extraction fails with 401 when the request is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: Vec<Role>,
    pub token: String,
}

impl CurrentUser {
    pub fn from_claims(claims: &JwtClaims, token: impl Into<String>) -> Result<Self, AppError> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

        let roles = claims
            .roles
            .iter()
            .filter_map(|r| Role::from_str(r).ok())
            .collect();

        Ok(Self {
            id,
            email: claims.email.clone(),
            name: claims.name.clone(),
            roles,
            token: token.into(),
        })
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_staff(&self) -> bool {
        self.roles.iter().any(Role::is_staff)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// 403 unless the caller holds at least one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.iter().any(|r| self.has_role(*r)) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Insufficient role for this operation".to_string(),
            ))
        }
    }

    /// 403 unless the caller is Admin or Manager.
    pub fn require_staff(&self) -> Result<(), AppError> {
        self.require_any(&[Role::Admin, Role::Manager])
    }

    /// 403 unless the caller is `owner_id` or staff.
    pub fn require_owner_or_staff(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.id == owner_id || self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have access to this resource".to_string(),
            ))
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        let token = parts
            .extensions
            .get::<BearerToken>()
            .map(|t| t.0.clone())
            .unwrap_or_default();

        CurrentUser::from_claims(claims, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtAuth, JwtConfig, optional_jwt_auth_middleware};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    fn claims(roles: &[&str]) -> JwtClaims {
        JwtClaims {
            sub: Uuid::now_v7().to_string(),
            email: "u@bistro.test".into(),
            name: "U".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 0,
            iat: 0,
            jti: "j".into(),
        }
    }

    #[test]
    fn test_unknown_roles_are_dropped() {
        let user = CurrentUser::from_claims(&claims(&["manager", "chef"]), "t").unwrap();
        assert_eq!(user.roles, vec![Role::Manager]);
        assert!(user.is_staff());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_require_any() {
        let user = CurrentUser::from_claims(&claims(&["user"]), "t").unwrap();
        assert!(user.require_any(&[Role::User]).is_ok());
        assert!(matches!(user.require_staff(), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_require_owner_or_staff() {
        let user = CurrentUser::from_claims(&claims(&["user"]), "t").unwrap();
        assert!(user.require_owner_or_staff(user.id).is_ok());
        assert!(user.require_owner_or_staff(Uuid::now_v7()).is_err());
    }

    #[tokio::test]
    async fn test_extractor_through_middleware() {
        let auth = JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-for-hs256").unwrap());
        let token = auth
            .issue(Uuid::now_v7(), "ann@bistro.test", "Ann", &[Role::User])
            .unwrap()
            .access_token;

        let app = Router::new()
            .route("/me", get(|user: CurrentUser| async move { user.email }))
            .layer(middleware::from_fn_with_state(auth, optional_jwt_auth_middleware));

        let anonymous = app
            .clone()
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let authed = app
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(authed.status(), StatusCode::OK);
    }
}
