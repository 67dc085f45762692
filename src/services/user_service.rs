//! User service - profile self-service and admin account management.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::is_valid_role;
use crate::domain::{Password, ProfileChanges, User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait UserService: Send + Sync {
    /// Active user by id
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User>;

    async fn change_password(&self, id: Uuid, current: String, new: String) -> AppResult<()>;

    async fn list_users(&self, params: PaginationParams, include_deleted: bool) -> AppResult<Paginated<User>>;

    /// Any user by id, deleted or not
    async fn get_user_with_deleted(&self, id: Uuid) -> AppResult<User>;

    async fn update_user(&self, id: Uuid, name: Option<String>, role: Option<String>) -> AppResult<User>;

    /// Soft delete `id` on behalf of `actor`. Admins cannot delete themselves.
    async fn delete_user(&self, actor: Uuid, id: Uuid) -> AppResult<()>;

    async fn restore_user(&self, id: Uuid) -> AppResult<User>;
}

pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn clean_name(name: Option<String>) -> AppResult<Option<String>> {
    match name.map(|n| n.trim().to_string()) {
        Some(n) if n.is_empty() => Err(AppError::validation("Name cannot be empty")),
        other => Ok(other),
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or_not_found()
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User> {
        let changes = ProfileChanges {
            name: clean_name(changes.name)?,
            phone: changes.phone.map(|p| p.trim().to_string()),
        };
        self.uow.users().update_profile(id, changes).await
    }

    async fn change_password(&self, id: Uuid, current: String, new: String) -> AppResult<()> {
        let user = self.get_user(id).await?;

        if !Password::from_hash(user.password_hash).verify(&current) {
            return Err(AppError::validation("Current password is incorrect"));
        }

        let hash = Password::new(&new)?.into_string();
        self.uow.users().update_password(id, hash).await?;
        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn list_users(&self, params: PaginationParams, include_deleted: bool) -> AppResult<Paginated<User>> {
        let (users, total) = self.uow.users().list(&params, include_deleted).await?;
        Ok(Paginated::new(users, &params, total))
    }

    async fn get_user_with_deleted(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found()
    }

    async fn update_user(&self, id: Uuid, name: Option<String>, role: Option<String>) -> AppResult<User> {
        let role = match role {
            Some(r) if !is_valid_role(&r) => {
                return Err(AppError::validation("Role must be 'user' or 'admin'"))
            }
            Some(r) => Some(UserRole::from(r.as_str())),
            None => None,
        };
        self.uow.users().update(id, clean_name(name)?, role).await
    }

    async fn delete_user(&self, actor: Uuid, id: Uuid) -> AppResult<()> {
        if actor == id {
            return Err(AppError::validation("You cannot delete your own account"));
        }
        self.uow.users().delete(id).await?;
        tracing::info!(user_id = %id, actor = %actor, "User soft-deleted");
        Ok(())
    }

    async fn restore_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().restore(id).await
    }
}
