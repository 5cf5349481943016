use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::{db_err, write_err};
use crate::domain::{
    CreateUserDto, DomainError, DomainResult, LoginFailure, UpdateUserDto, User, UserRepository,
    UserRole,
};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> DomainResult<Option<user::Model>> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Veterinarian => UserRole::Veterinarian,
        user::UserRole::Receptionist => UserRole::Receptionist,
        user::UserRole::Assistant => UserRole::Assistant,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Veterinarian => user::UserRole::Veterinarian,
        UserRole::Receptionist => user::UserRole::Receptionist,
        UserRole::Assistant => user::UserRole::Assistant,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        role: entity_role_to_domain(model.role),
        first_name: model.first_name,
        last_name: model.last_name,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
        last_login: model.last_login,
        failed_login_attempts: model.failed_login_attempts,
        locked_until: model.locked_until,
    }
}

const DUPLICATE_USER: &str = "Username or email already exists";

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, dto: CreateUserDto) -> DomainResult<User> {
        debug!("Creating user: {}", dto.username);
        let now = Utc::now();

        let new_user = user::ActiveModel {
            id: NotSet,
            username: Set(dto.username),
            email: Set(dto.email),
            password_hash: Set(dto.password_hash),
            role: Set(domain_role_to_entity(dto.role)),
            first_name: Set(dto.first_name),
            last_name: Set(dto.last_name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            last_login: Set(None),
            failed_login_attempts: Set(0),
            locked_until: Set(None),
        };

        let model = new_user
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, DUPLICATE_USER))?;

        Ok(user_model_to_domain(model))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        Ok(self.find_model(id).await?.map(user_model_to_domain))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn find_all(&self, active_only: bool) -> DomainResult<Vec<User>> {
        let mut query = user::Entity::find();
        if active_only {
            query = query.filter(user::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_asc(user::Column::LastName)
            .order_by_asc(user::Column::FirstName)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn find_by_role(&self, role: UserRole, active_only: bool) -> DomainResult<Vec<User>> {
        let mut query = user::Entity::find().filter(user::Column::Role.eq(domain_role_to_entity(role)));
        if active_only {
            query = query.filter(user::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_asc(user::Column::LastName)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn count(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn update(&self, id: i32, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let Some(existing) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();

        if let Some(email) = dto.email {
            active.email = Set(email);
        }
        if let Some(role) = dto.role {
            active.role = Set(domain_role_to_entity(role));
        }
        if let Some(first_name) = dto.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = dto.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(is_active) = dto.is_active {
            active.is_active = Set(is_active);
        }

        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, DUPLICATE_USER))?;

        Ok(Some(user_model_to_domain(updated)))
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> DomainResult<()> {
        let Some(existing) = self.find_model(id).await? else {
            return Err(DomainError::not_found("User", id));
        };

        let mut active: user::ActiveModel = existing.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }

    async fn set_active(&self, id: i32, is_active: bool) -> DomainResult<bool> {
        let Some(existing) = self.find_model(id).await? else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = existing.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;

        Ok(true)
    }

    async fn record_login_success(&self, id: i32, at: DateTime<Utc>) -> DomainResult<()> {
        let Some(existing) = self.find_model(id).await? else {
            return Err(DomainError::not_found("User", id));
        };

        let mut active: user::ActiveModel = existing.into();
        active.last_login = Set(Some(at));
        active.failed_login_attempts = Set(0);
        active.locked_until = Set(None);
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }

    async fn record_login_failure(&self, id: i32, failure: LoginFailure) -> DomainResult<()> {
        let Some(existing) = self.find_model(id).await? else {
            return Err(DomainError::not_found("User", id));
        };

        debug!(
            "Login failure for user {}: attempts={}, locked_until={:?}",
            id, failure.attempts, failure.locked_until
        );

        let mut active: user::ActiveModel = existing.into();
        active.failed_login_attempts = Set(failure.attempts);
        active.locked_until = Set(failure.locked_until);
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_database;

    fn new_user(username: &str, email: &str, role: UserRole) -> CreateUserDto {
        CreateUserDto {
            username: username.into(),
            email: email.into(),
            password_hash: "$2b$04$hash".into(),
            role,
            first_name: "Test".into(),
            last_name: username.into(),
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        let created = repo
            .create(new_user("vet1", "vet1@vetcare.com", UserRole::Veterinarian))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert!(created.is_active);
        assert_eq!(created.failed_login_attempts, 0);

        let by_name = repo.find_by_username("vet1").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_name.role, UserRole::Veterinarian);
        assert!(repo.find_by_email("vet1@vetcare.com").await.unwrap().is_some());
        assert!(repo.find_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        repo.create(new_user("dup", "a@vetcare.com", UserRole::Assistant))
            .await
            .unwrap();

        let err = repo
            .create(new_user("dup", "b@vetcare.com", UserRole::Assistant))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn find_by_role_respects_active_flag() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        let a = repo
            .create(new_user("vet_a", "a@vetcare.com", UserRole::Veterinarian))
            .await
            .unwrap();
        repo.create(new_user("vet_b", "b@vetcare.com", UserRole::Veterinarian))
            .await
            .unwrap();
        repo.create(new_user("desk", "c@vetcare.com", UserRole::Receptionist))
            .await
            .unwrap();

        assert!(repo.set_active(a.id, false).await.unwrap());

        let active = repo.find_by_role(UserRole::Veterinarian, true).await.unwrap();
        assert_eq!(active.len(), 1);
        let all = repo.find_by_role(UserRole::Veterinarian, false).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(!repo.set_active(12345, false).await.unwrap());
    }

    #[tokio::test]
    async fn partial_update_only_touches_given_fields() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        let created = repo
            .create(new_user("rec", "rec@vetcare.com", UserRole::Receptionist))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let updated = repo
            .update(
                created.id,
                UpdateUserDto {
                    role: Some(UserRole::Assistant),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.role, UserRole::Assistant);
        assert_eq!(updated.email, "rec@vetcare.com");
        assert_eq!(updated.first_name, "Test");
        assert!(updated.updated_at > created.updated_at);

        assert!(repo
            .update(999, UpdateUserDto::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn login_bookkeeping() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        let user = repo
            .create(new_user("vet", "vet@vetcare.com", UserRole::Veterinarian))
            .await
            .unwrap();

        let until = Utc::now() + chrono::Duration::minutes(30);
        repo.record_login_failure(
            user.id,
            LoginFailure {
                attempts: 5,
                locked_until: Some(until),
            },
        )
        .await
        .unwrap();

        let locked = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(locked.failed_login_attempts, 5);
        assert!(locked.is_locked(Utc::now()));

        repo.record_login_success(user.id, Utc::now()).await.unwrap();
        let unlocked = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(unlocked.failed_login_attempts, 0);
        assert!(unlocked.locked_until.is_none());
        assert!(unlocked.last_login.is_some());
    }
}
