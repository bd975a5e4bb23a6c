use axum_helpers::{JwtAuth, Role};
use chrono::{Duration, Utc};
use contracts::{
    BistroEvent, EventPublisher, PasswordResetRequested, UserPublicProfile, UserRegistered,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{
    AuthResponse, ChangePassword, LoginRequest, RegisterRequest, ResetPasswordRequest, UpdateProfile,
    User, UserFilter, UserList, UserResponse, normalize_email,
};
use crate::password::{
    generate_reset_token, hash_password, hash_token, validate_password, verify_password,
};
use crate::repository::UserRepository;

/// Reset tokens expire one hour after they are issued.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    publisher: Arc<dyn EventPublisher>,
    jwt: JwtAuth,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, publisher: Arc<dyn EventPublisher>, jwt: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher,
            jwt,
        }
    }

    /// Create a `User` account and sign the caller in.
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        validate_password(&input.password)?;

        let email = normalize_email(&input.email);
        if self.repository.get_by_email(&email).await?.is_some() {
            return Err(UserError::DuplicateEmail(email));
        }

        let user = User::new(
            &email,
            input.name.trim().to_string(),
            hash_password(&input.password)?,
            Role::User,
        );
        let user = self.repository.create(user).await?;
        tracing::info!(user_id = %user.id, "User registered");

        self.publish(BistroEvent::UserRegistered(UserRegistered {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            registered_at: user.created_at,
        }))
        .await?;

        self.auth_response(user)
    }

    /// Check credentials, record the login and issue a token.
    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthResponse> {
        let email = normalize_email(&input.email);
        let mut user = self
            .repository
            .get_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(UserError::Inactive);
        }

        user.last_login_at = Some(Utc::now());
        user.touch();
        let user = self.repository.update(user).await?;

        self.auth_response(user)
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        Ok(self.load(id).await?.into())
    }

    pub async fn public_profile(&self, id: Uuid) -> UserResult<UserPublicProfile> {
        Ok(self.load(id).await?.public_profile())
    }

    pub async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> UserResult<UserResponse> {
        let mut user = self.load(id).await?;

        if let Some(name) = input.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = input.email {
            let email = normalize_email(&email);
            if email != user.email {
                if self.repository.get_by_email(&email).await?.is_some() {
                    return Err(UserError::DuplicateEmail(email));
                }
                user.email = email;
            }
        }
        user.touch();

        Ok(self.repository.update(user).await?.into())
    }

    pub async fn change_password(&self, id: Uuid, input: ChangePassword) -> UserResult<()> {
        let mut user = self.load(id).await?;

        if !verify_password(&input.current_password, &user.password_hash)? {
            return Err(UserError::WrongPassword);
        }
        validate_password(&input.new_password)?;

        user.password_hash = hash_password(&input.new_password)?;
        user.touch();
        self.repository.update(user).await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    pub async fn list_users(&self, filter: UserFilter) -> UserResult<UserList> {
        let total = self.repository.count(filter.clone()).await?;
        let items = self
            .repository
            .list(filter)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(UserList { items, total })
    }

    /// Admins may not change their own role, so the last admin cannot lock
    /// everybody out by accident.
    pub async fn change_role(&self, actor_id: Uuid, id: Uuid, role: Role) -> UserResult<UserResponse> {
        if actor_id == id {
            return Err(UserError::Validation(
                "You cannot change your own role".to_string(),
            ));
        }

        let mut user = self.load(id).await?;
        let previous = user.role;
        user.role = role;
        user.touch();
        let user = self.repository.update(user).await?;

        tracing::info!(user_id = %id, from = %previous, to = %role, "Role changed");
        Ok(user.into())
    }

    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Issue a reset token for `email` if such an account exists.
    ///
    /// Unknown addresses succeed silently so the endpoint cannot be used to
    /// enumerate accounts.
    pub async fn forgot_password(&self, email: &str) -> UserResult<()> {
        let email = normalize_email(email);
        let Some(mut user) = self.repository.get_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        user.reset_token_hash = Some(hash_token(&token));
        user.reset_token_expires_at = Some(expires_at);
        user.touch();
        let user = self.repository.update(user).await?;

        let user_id = user.id;
        // A publish failure must look like the unknown-email path to the caller.
        if let Err(e) = self
            .publish(BistroEvent::PasswordResetRequested(PasswordResetRequested {
                user_id,
                email: user.email,
                name: user.name,
                reset_token: token,
                expires_at,
            }))
            .await
        {
            tracing::error!(%user_id, error = %e, "Failed to publish PasswordResetRequested");
        }
        Ok(())
    }

    pub async fn reset_password(&self, input: ResetPasswordRequest) -> UserResult<()> {
        let token_hash = hash_token(input.token.trim());
        let mut user = self
            .repository
            .get_by_reset_token_hash(&token_hash)
            .await?
            .ok_or(UserError::InvalidResetToken)?;

        let expired = user
            .reset_token_expires_at
            .is_none_or(|expires_at| expires_at <= Utc::now());
        if expired {
            return Err(UserError::InvalidResetToken);
        }
        validate_password(&input.new_password)?;

        user.password_hash = hash_password(&input.new_password)?;
        user.reset_token_hash = None;
        user.reset_token_expires_at = None;
        user.touch();
        self.repository.update(user).await?;

        Ok(())
    }

    /// Create the bootstrap admin unless an account with `email` exists.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str, name: &str) -> UserResult<bool> {
        let email = normalize_email(email);
        if self.repository.get_by_email(&email).await?.is_some() {
            return Ok(false);
        }
        validate_password(password)?;

        let admin = User::new(&email, name.to_string(), hash_password(password)?, Role::Admin);
        let admin = self.repository.create(admin).await?;
        tracing::info!(user_id = %admin.id, "Bootstrap admin created");
        Ok(true)
    }

    async fn load(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    fn auth_response(&self, user: User) -> UserResult<AuthResponse> {
        let issued = self
            .jwt
            .issue(user.id, &user.email, &user.name, &[user.role])
            .map_err(|e| UserError::Token(e.to_string()))?;

        Ok(AuthResponse {
            access_token: issued.access_token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user: user.into(),
        })
    }

    async fn publish(&self, event: BistroEvent) -> UserResult<()> {
        self.publisher
            .publish(event)
            .await
            .map_err(|e| UserError::Events(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use axum_helpers::JwtConfig;
    use contracts::InMemoryEventPublisher;

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("unit-test-secret-with-at-least-32-chars").unwrap())
    }

    fn service(repo: MockUserRepository) -> (UserService<MockUserRepository>, InMemoryEventPublisher) {
        let publisher = InMemoryEventPublisher::new();
        (
            UserService::new(repo, Arc::new(publisher.clone()), jwt()),
            publisher,
        )
    }

    fn stored_user(password: &str) -> User {
        User::new(
            "ann@bistro.test",
            "Ann".into(),
            hash_password(password).unwrap(),
            Role::User,
        )
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_before_touching_storage() {
        let (service, publisher) = service(MockUserRepository::new());

        let result = service
            .register(RegisterRequest {
                email: "ann@bistro.test".into(),
                password: "weak".into(),
                name: "Ann".into(),
            })
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .withf(|email| email == "ann@bistro.test")
            .returning(|_| Ok(Some(stored_user("Sup3r$ecret"))));

        let (service, _) = service(repo);
        let result = service
            .register(RegisterRequest {
                email: "Ann@Bistro.test".into(),
                password: "Sup3r$ecret".into(),
                name: "Ann".into(),
            })
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(e)) if e == "ann@bistro.test"));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Ok(Some(stored_user("Sup3r$ecret"))));
        repo.expect_update().never();

        let (service, _) = service(repo);
        let result = service
            .login(LoginRequest {
                email: "ann@bistro.test".into(),
                password: "Wrong$ecret1".into(),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().returning(|_| {
            let mut user = stored_user("Sup3r$ecret");
            user.is_active = false;
            Ok(Some(user))
        });

        let (service, _) = service(repo);
        let result = service
            .login(LoginRequest {
                email: "ann@bistro.test".into(),
                password: "Sup3r$ecret".into(),
            })
            .await;

        assert!(matches!(result, Err(UserError::Inactive)));
    }

    #[tokio::test]
    async fn test_login_records_last_login_and_issues_token() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Ok(Some(stored_user("Sup3r$ecret"))));
        repo.expect_update()
            .withf(|user| user.last_login_at.is_some())
            .returning(Ok);

        let (service, _) = service(repo);
        let auth = service
            .login(LoginRequest {
                email: "ann@bistro.test".into(),
                password: "Sup3r$ecret".into(),
            })
            .await
            .unwrap();

        assert_eq!(auth.token_type, "Bearer");
        let claims = jwt().verify(&auth.access_token).unwrap();
        assert_eq!(claims.roles, vec!["user".to_string()]);
        assert_eq!(claims.sub, auth.user.id.to_string());
    }

    #[tokio::test]
    async fn test_change_own_role_is_rejected() {
        let (service, _) = service(MockUserRepository::new());
        let id = Uuid::now_v7();

        let result = service.change_role(id, id, Role::User).await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_is_silent() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().returning(|_| Ok(None));
        repo.expect_update().never();

        let (service, publisher) = service(repo);
        service.forgot_password("nobody@bistro.test").await.unwrap();
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_forgot_password_hides_publish_failure() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Ok(Some(stored_user("Sup3r$ecret"))));
        repo.expect_update()
            .withf(|u| u.reset_token_hash.is_some() && u.reset_token_expires_at.is_some())
            .returning(Ok);

        let publisher = InMemoryEventPublisher::failing();
        let service = UserService::new(repo, Arc::new(publisher.clone()), jwt());

        service.forgot_password("Ann@Bistro.test").await.unwrap();
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_password_expired_token() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_reset_token_hash().returning(|hash| {
            let mut user = stored_user("Sup3r$ecret");
            user.reset_token_hash = Some(hash.to_string());
            user.reset_token_expires_at = Some(Utc::now() - Duration::minutes(1));
            Ok(Some(user))
        });
        repo.expect_update().never();

        let (service, _) = service(repo);
        let result = service
            .reset_password(ResetPasswordRequest {
                token: "stale".into(),
                new_password: "N3w$ecret".into(),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_ensure_admin_skips_existing_account() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Ok(Some(stored_user("Sup3r$ecret"))));
        repo.expect_create().never();

        let (service, _) = service(repo);
        assert!(!service.ensure_admin("ann@bistro.test", "Sup3r$ecret", "Admin").await.unwrap());
    }
}
