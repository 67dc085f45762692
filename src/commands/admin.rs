//! Admin command - Bootstrap administrator accounts.

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::Config;
use crate::domain::{Password, User, UserRole};
use crate::errors::AppResult;
use crate::infra::{Database, Persistence, UnitOfWork, UserRepository};

/// Execute the admin command
pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let uow = Persistence::new(db.get_connection());

    match args.action {
        AdminAction::Create {
            email,
            password,
            name,
        } => {
            let user = ensure_admin(uow.users().as_ref(), &email, &password, &name).await?;
            println!("{} <{}> is an administrator ({})", user.name, user.email, user.id);
        }
    }

    Ok(())
}

/// Create an admin account, or promote (and restore) the existing one.
///
/// The password is only set for new accounts.
pub async fn ensure_admin(
    users: &dyn UserRepository,
    email: &str,
    password: &str,
    name: &str,
) -> AppResult<User> {
    let email = email.trim().to_lowercase();

    let Some(existing) = users.find_by_email_with_deleted(&email).await? else {
        let hash = Password::new(password)?.into_string();
        let user = users
            .create(email, hash, name.trim().to_string(), None, UserRole::Admin)
            .await?;
        tracing::info!(user_id = %user.id, "Administrator created");
        return Ok(user);
    };

    if existing.is_deleted() {
        users.restore(existing.id).await?;
    }
    if existing.is_admin() && !existing.is_deleted() {
        return Ok(existing);
    }

    let user = users.update(existing.id, None, Some(UserRole::Admin)).await?;
    tracing::info!(user_id = %user.id, "Existing account promoted to administrator");
    Ok(user)
}
