//! Staff accounts: registration, login with lockout, and user management
//!
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, LoginFailure, RegisterUserDto, UpdateUserDto, User,
    UserRepository, UserRole,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password, DEFAULT_COST};
use crate::shared::validations::{require_text, validate_email};

/// Token and account returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// Token signing and lockout policy
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt: JwtConfig,
    /// Consecutive failures that lock the account
    pub max_failed_attempts: i32,
    pub lockout_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            max_failed_attempts: 5,
            lockout_minutes: 30,
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, settings: AuthSettings) -> Self {
        Self { repo, settings }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.settings.jwt
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by username or email and issue a JWT.
    ///
    /// A wrong password counts towards the lockout threshold; once the
    /// account is locked even the correct password is refused until the
    /// lock expires.
    pub async fn authenticate(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> DomainResult<AuthResult> {
        let identifier = username_or_email.trim();
        let user = match self.repo.find_by_username(identifier).await? {
            Some(user) => Some(user),
            None => self.repo.find_by_email(&normalize_email(identifier)).await?,
        };

        let Some(user) = user else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        if !user.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }

        let now = Utc::now();
        if let Some(until) = user.locked_until.filter(|until| *until > now) {
            return Err(DomainError::AccountLocked { until });
        }

        if !verify_password(password, &user.password_hash) {
            // An expired lock starts a fresh count
            let previous = if user.locked_until.is_some() {
                0
            } else {
                user.failed_login_attempts
            };
            let attempts = previous + 1;
            let locked_until = (attempts >= self.settings.max_failed_attempts)
                .then(|| now + Duration::minutes(self.settings.lockout_minutes));

            self.repo
                .record_login_failure(
                    user.id,
                    LoginFailure {
                        attempts,
                        locked_until,
                    },
                )
                .await?;

            if let Some(until) = locked_until {
                warn!(user_id = user.id, attempts, %until, "Account locked after failed logins");
            }
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        self.repo.record_login_success(user.id, now).await?;

        let token = create_token(user.id, &user.username, user.role.as_str(), &self.settings.jwt)
            .map_err(|e| {
                error!(user_id = user.id, error = %e, "Failed to sign token");
                DomainError::Internal(format!("Failed to create token: {}", e))
            })?;

        let user = self
            .repo
            .find_by_id(user.id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user.id))?;

        info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.settings.jwt.expiration_hours * 3600,
            user,
        })
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a new staff account (default role: receptionist).
    pub async fn register(&self, dto: RegisterUserDto) -> DomainResult<User> {
        let username = dto.username.trim().to_string();
        let username_len = username.chars().count();
        if !(3..=50).contains(&username_len) {
            return Err(DomainError::Validation(
                "Username must be 3-50 characters".into(),
            ));
        }

        let email = normalize_email(&dto.email);
        validate_email(&email)?;
        if email.len() > 100 {
            return Err(DomainError::Validation(
                "Email must be at most 100 characters".into(),
            ));
        }
        if dto.password.chars().count() < 8 {
            return Err(DomainError::Validation(
                "Password must be at least 8 characters".into(),
            ));
        }

        let first_name = require_text("First name", &dto.first_name, 50)?;
        let last_name = require_text("Last name", &dto.last_name, 50)?;

        if self.repo.find_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already exists".into()));
        }

        let password_hash = self.hash(&dto.password)?;

        let user = self
            .repo
            .create(CreateUserDto {
                username,
                email,
                password_hash,
                role: dto.role.unwrap_or_default(),
                first_name,
                last_name,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "New user registered");
        Ok(user)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get_user_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        self.repo.find_by_id(id).await
    }

    pub async fn list_users(&self, active_only: bool) -> DomainResult<Vec<User>> {
        self.repo.find_all(active_only).await
    }

    /// Active veterinarians, for assigning appointments
    pub async fn list_veterinarians(&self) -> DomainResult<Vec<User>> {
        self.repo.find_by_role(UserRole::Veterinarian, true).await
    }

    pub async fn user_count(&self) -> DomainResult<u64> {
        self.repo.count().await
    }

    // ── Mutations ───────────────────────────────────────────────

    pub async fn update_user(&self, id: i32, mut dto: UpdateUserDto) -> DomainResult<User> {
        if let Some(email) = dto.email.take() {
            let email = normalize_email(&email);
            validate_email(&email)?;
            if let Some(other) = self.repo.find_by_email(&email).await? {
                if other.id != id {
                    return Err(DomainError::Conflict("Email already exists".into()));
                }
            }
            dto.email = Some(email);
        }
        if let Some(first_name) = dto.first_name.take() {
            dto.first_name = Some(require_text("First name", &first_name, 50)?);
        }
        if let Some(last_name) = dto.last_name.take() {
            dto.last_name = Some(require_text("Last name", &last_name, 50)?);
        }

        self.repo
            .update(id, dto)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    /// Change a password after checking the current one
    pub async fn change_password(
        &self,
        id: i32,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;

        if !verify_password(current_password, &user.password_hash) {
            return Err(DomainError::Unauthorized(
                "Current password is incorrect".into(),
            ));
        }
        if new_password.chars().count() < 8 {
            return Err(DomainError::Validation(
                "Password must be at least 8 characters".into(),
            ));
        }

        let hash = self.hash(new_password)?;
        self.repo.update_password(id, &hash).await?;

        info!(user_id = id, "Password changed");
        Ok(())
    }

    pub async fn deactivate_user(&self, id: i32) -> DomainResult<()> {
        self.set_active(id, false).await
    }

    pub async fn activate_user(&self, id: i32) -> DomainResult<()> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: i32, active: bool) -> DomainResult<()> {
        if !self.repo.set_active(id, active).await? {
            return Err(DomainError::not_found("User", id));
        }
        info!(user_id = id, active, "User active flag changed");
        Ok(())
    }

    fn hash(&self, password: &str) -> DomainResult<String> {
        hash_password(password, self.settings.bcrypt_cost)
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                DomainError::Internal(format!("Failed to hash password: {}", e))
            })
    }
}

/// Emails are stored and looked up trimmed and lowercased
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::repositories::SeaOrmUserRepository;
    use crate::infrastructure::database::test_database;

    async fn service() -> AuthService {
        let repo = Arc::new(SeaOrmUserRepository::new(test_database().await));
        AuthService::new(
            repo,
            AuthSettings {
                bcrypt_cost: 4,
                max_failed_attempts: 3,
                ..AuthSettings::default()
            },
        )
    }

    fn registration(username: &str, email: &str) -> RegisterUserDto {
        RegisterUserDto {
            username: username.into(),
            email: email.into(),
            password: "s3cure-pass".into(),
            role: None,
            first_name: "Laura".into(),
            last_name: "Martinez".into(),
        }
    }

    #[tokio::test]
    async fn register_defaults_to_receptionist_and_hashes() {
        let svc = service().await;
        let user = svc
            .register(registration("lmartinez", "Laura@VetCare.com"))
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::Receptionist);
        assert_eq!(user.email, "laura@vetcare.com");
        assert_ne!(user.password_hash, "s3cure-pass");
    }

    #[tokio::test]
    async fn register_validates_and_rejects_duplicates() {
        let svc = service().await;

        let short = svc.register(registration("lm", "a@vetcare.com")).await;
        assert!(matches!(short, Err(DomainError::Validation(_))));

        let weak = svc
            .register(RegisterUserDto {
                password: "short".into(),
                ..registration("lmartinez", "a@vetcare.com")
            })
            .await;
        assert!(matches!(weak, Err(DomainError::Validation(_))));

        svc.register(registration("lmartinez", "a@vetcare.com"))
            .await
            .unwrap();
        let dup = svc.register(registration("lmartinez", "b@vetcare.com")).await;
        assert!(matches!(dup, Err(DomainError::Conflict(_))));
        let dup_email = svc.register(registration("other", "a@vetcare.com")).await;
        assert!(matches!(dup_email, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn authenticate_by_username_or_email() {
        let svc = service().await;
        svc.register(registration("lmartinez", "laura@vetcare.com"))
            .await
            .unwrap();

        let by_name = svc.authenticate("lmartinez", "s3cure-pass").await.unwrap();
        assert_eq!(by_name.token_type, "Bearer");
        assert!(by_name.user.last_login.is_some());

        let by_email = svc
            .authenticate("laura@vetcare.com", "s3cure-pass")
            .await
            .unwrap();
        assert_eq!(by_email.user.id, by_name.user.id);

        let unknown = svc.authenticate("ghost", "s3cure-pass").await;
        assert!(matches!(unknown, Err(DomainError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn email_login_ignores_case_and_whitespace() {
        let svc = service().await;
        let user = svc
            .register(registration("lmartinez", "Laura@VetCare.com"))
            .await
            .unwrap();

        let result = svc
            .authenticate(" Laura@VetCare.com ", "s3cure-pass")
            .await
            .unwrap();
        assert_eq!(result.user.id, user.id);

        let upper = svc
            .authenticate("LAURA@VETCARE.COM", "s3cure-pass")
            .await
            .unwrap();
        assert_eq!(upper.user.id, user.id);
    }

    #[tokio::test]
    async fn hashing_failure_is_internal() {
        let repo = Arc::new(SeaOrmUserRepository::new(test_database().await));
        let svc = AuthService::new(
            repo,
            AuthSettings {
                bcrypt_cost: 40,
                ..AuthSettings::default()
            },
        );

        let result = svc
            .register(registration("lmartinez", "laura@vetcare.com"))
            .await;
        assert!(matches!(result, Err(DomainError::Internal(_))));
        assert_eq!(svc.user_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn repeated_failures_lock_the_account() {
        let svc = service().await;
        let user = svc
            .register(registration("lmartinez", "laura@vetcare.com"))
            .await
            .unwrap();

        for _ in 0..3 {
            let err = svc.authenticate("lmartinez", "wrong-pass").await;
            assert!(matches!(err, Err(DomainError::Unauthorized(_))));
        }

        let locked = svc.authenticate("lmartinez", "s3cure-pass").await;
        assert!(matches!(locked, Err(DomainError::AccountLocked { .. })));

        let stored = svc.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_login_attempts, 3);
    }

    #[tokio::test]
    async fn success_resets_failure_counter() {
        let svc = service().await;
        let user = svc
            .register(registration("lmartinez", "laura@vetcare.com"))
            .await
            .unwrap();

        svc.authenticate("lmartinez", "wrong-pass").await.unwrap_err();
        svc.authenticate("lmartinez", "s3cure-pass").await.unwrap();

        let stored = svc.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_login_attempts, 0);
    }

    #[tokio::test]
    async fn inactive_users_cannot_log_in() {
        let svc = service().await;
        let user = svc
            .register(registration("lmartinez", "laura@vetcare.com"))
            .await
            .unwrap();
        svc.deactivate_user(user.id).await.unwrap();

        let err = svc.authenticate("lmartinez", "s3cure-pass").await;
        assert!(matches!(err, Err(DomainError::Unauthorized(_))));
        assert!(svc.list_users(true).await.unwrap().is_empty());

        svc.activate_user(user.id).await.unwrap();
        assert!(svc.authenticate("lmartinez", "s3cure-pass").await.is_ok());
    }

    #[tokio::test]
    async fn change_password_requires_current_one() {
        let svc = service().await;
        let user = svc
            .register(registration("lmartinez", "laura@vetcare.com"))
            .await
            .unwrap();

        let wrong = svc.change_password(user.id, "nope", "brand-new-pass").await;
        assert!(matches!(wrong, Err(DomainError::Unauthorized(_))));

        svc.change_password(user.id, "s3cure-pass", "brand-new-pass")
            .await
            .unwrap();
        assert!(svc.authenticate("lmartinez", "brand-new-pass").await.is_ok());
    }

    #[tokio::test]
    async fn list_veterinarians_filters_by_role() {
        let svc = service().await;
        svc.register(RegisterUserDto {
            role: Some(UserRole::Veterinarian),
            ..registration("drsmith", "smith@vetcare.com")
        })
        .await
        .unwrap();
        svc.register(registration("desk", "desk@vetcare.com"))
            .await
            .unwrap();

        let vets = svc.list_veterinarians().await.unwrap();
        assert_eq!(vets.len(), 1);
        assert_eq!(vets[0].username, "drsmith");
    }

    #[tokio::test]
    async fn update_user_rejects_taken_email() {
        let svc = service().await;
        let a = svc
            .register(registration("user_a", "a@vetcare.com"))
            .await
            .unwrap();
        svc.register(registration("user_b", "b@vetcare.com"))
            .await
            .unwrap();

        let err = svc
            .update_user(
                a.id,
                UpdateUserDto {
                    email: Some("b@vetcare.com".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(err, Err(DomainError::Conflict(_))));

        let missing = svc.update_user(404, UpdateUserDto::default()).await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }
}
