use super::config::JwtConfig;
use super::roles::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // user id
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
    pub claims: JwtClaims,
}

/// HS256 token issuer and verifier shared by every service.
///
/// Tokens are self-contained; services holding the same secret can verify
/// them without calling the users service.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_secs: config.ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        roles: &[Role],
    ) -> Result<IssuedToken, AuthError> {
        self.issue_with_ttl(user_id, email, name, roles, self.ttl_secs)
    }

    pub fn issue_with_ttl(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        roles: &[Role],
        ttl_secs: i64,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            roles: roles.iter().map(Role::to_string).collect(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let access_token =
            encode(&header, &claims, &self.encoding).map_err(AuthError::Signing)?;

        Ok(IssuedToken {
            access_token,
            expires_in: ttl_secs,
            claims,
        })
    }

    /// Checks signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        decode::<JwtClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-for-hs256").unwrap())
    }

    #[test]
    fn test_issue_and_verify() {
        let auth = auth();
        let user_id = Uuid::now_v7();

        let issued = auth
            .issue(user_id, "ann@bistro.test", "Ann", &[Role::Manager])
            .unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = auth.verify(&issued.access_token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.roles, vec!["manager".to_string()]);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = auth();
        let issued = auth
            .issue_with_ttl(Uuid::now_v7(), "a@b.test", "A", &[Role::User], -3600)
            .unwrap();

        assert!(matches!(
            auth.verify(&issued.access_token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtAuth::new(
            &JwtConfig::new("another-secret-that-is-also-long-enough").unwrap(),
        );
        let issued = other
            .issue(Uuid::now_v7(), "a@b.test", "A", &[Role::Admin])
            .unwrap();

        assert!(auth().verify(&issued.access_token).is_err());
    }
}
