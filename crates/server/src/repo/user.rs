use shared_types::{AppError, Role, User, UserUpdate};
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::Store;
use crate::error_convert::SqlxErrorExt;

/// Insert a new account. Duplicate username or email is a Conflict.
pub async fn create(store: &Store, user: &User) -> Result<(), AppError> {
    match store {
        Store::Memory(mem) => mem.insert_user(user.clone()).await,
        Store::Postgres(pool) => {
            sqlx::query(
                r#"
                INSERT INTO users (id, username, email, role, doc, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(user.role().as_str())
            .bind(Json(user))
            .bind(user.created_at)
            .execute(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;
            Ok(())
        }
    }
}

pub async fn find_by_id(store: &Store, id: Uuid) -> Result<Option<User>, AppError> {
    match store {
        Store::Memory(mem) => Ok(mem.find_user(id).await),
        Store::Postgres(pool) => {
            let row = sqlx::query_scalar::<_, Json<User>>("SELECT doc FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await
                .map_err(SqlxErrorExt::into_app_error)?;
            Ok(row.map(|Json(u)| u))
        }
    }
}

pub async fn find_by_email(store: &Store, email: &str) -> Result<Option<User>, AppError> {
    match store {
        Store::Memory(mem) => Ok(mem.find_user_by_email(email).await),
        Store::Postgres(pool) => {
            let row = sqlx::query_scalar::<_, Json<User>>(
                "SELECT doc FROM users WHERE LOWER(email) = LOWER($1)",
            )
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;
            Ok(row.map(|Json(u)| u))
        }
    }
}

/// Every account holding `role`, oldest signup first.
pub async fn list_by_role(store: &Store, role: Role) -> Result<Vec<User>, AppError> {
    match store {
        Store::Memory(mem) => Ok(mem.users_by_role(role).await),
        Store::Postgres(pool) => {
            let rows = sqlx::query_scalar::<_, Json<User>>(
                "SELECT doc FROM users WHERE role = $1 ORDER BY created_at, id",
            )
            .bind(role.as_str())
            .fetch_all(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;
            Ok(rows.into_iter().map(|Json(u)| u).collect())
        }
    }
}

/// Apply `update` to one user atomically. Returns the stored document after
/// the update, or `None` when no such user exists.
#[tracing::instrument(skip(store))]
pub async fn update(store: &Store, id: Uuid, update: &UserUpdate) -> Result<Option<User>, AppError> {
    match store {
        Store::Memory(mem) => Ok(mem.update_user(id, update).await),
        Store::Postgres(pool) => {
            let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;
            let row = sqlx::query_scalar::<_, Json<User>>(
                "SELECT doc FROM users WHERE id = $1 FOR UPDATE",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

            let Some(Json(mut user)) = row else {
                return Ok(None);
            };

            if user.apply(update) {
                sqlx::query("UPDATE users SET doc = $2 WHERE id = $1")
                    .bind(id)
                    .bind(Json(&user))
                    .execute(&mut *tx)
                    .await
                    .map_err(SqlxErrorExt::into_app_error)?;
            }
            tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
            Ok(Some(user))
        }
    }
}
