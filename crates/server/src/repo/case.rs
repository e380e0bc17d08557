use shared_types::{AppError, Case, CaseUpdate};
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::Store;
use crate::error_convert::SqlxErrorExt;

pub async fn create(store: &Store, case: &Case) -> Result<(), AppError> {
    match store {
        Store::Memory(mem) => mem.insert_case(case.clone()).await,
        Store::Postgres(pool) => {
            sqlx::query(
                r#"
                INSERT INTO cases (id, lawyer_id, doc, created_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(case.id)
            .bind(case.lawyer_id)
            .bind(Json(case))
            .bind(case.created_at)
            .execute(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;
            Ok(())
        }
    }
}

pub async fn find_by_id(store: &Store, id: Uuid) -> Result<Option<Case>, AppError> {
    match store {
        Store::Memory(mem) => Ok(mem.find_case(id).await),
        Store::Postgres(pool) => {
            let row = sqlx::query_scalar::<_, Json<Case>>("SELECT doc FROM cases WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await
                .map_err(SqlxErrorExt::into_app_error)?;
            Ok(row.map(|Json(c)| c))
        }
    }
}

/// Cases submitted by one lawyer, in submission order.
pub async fn list_by_lawyer(store: &Store, lawyer_id: Uuid) -> Result<Vec<Case>, AppError> {
    match store {
        Store::Memory(mem) => Ok(mem.cases_by_lawyer(lawyer_id).await),
        Store::Postgres(pool) => {
            let rows = sqlx::query_scalar::<_, Json<Case>>(
                "SELECT doc FROM cases WHERE lawyer_id = $1 ORDER BY created_at, id",
            )
            .bind(lawyer_id)
            .fetch_all(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;
            Ok(rows.into_iter().map(|Json(c)| c).collect())
        }
    }
}

/// Apply `update` to one case atomically. Returns the case after the
/// update, or `None` when no such case exists.
#[tracing::instrument(skip(store))]
pub async fn update(store: &Store, id: Uuid, update: &CaseUpdate) -> Result<Option<Case>, AppError> {
    match store {
        Store::Memory(mem) => Ok(mem.update_case(id, update).await),
        Store::Postgres(pool) => {
            let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;
            let row = sqlx::query_scalar::<_, Json<Case>>(
                "SELECT doc FROM cases WHERE id = $1 FOR UPDATE",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

            let Some(Json(mut case)) = row else {
                return Ok(None);
            };

            if case.apply(update) {
                sqlx::query("UPDATE cases SET doc = $2 WHERE id = $1")
                    .bind(id)
                    .bind(Json(&case))
                    .execute(&mut *tx)
                    .await
                    .map_err(SqlxErrorExt::into_app_error)?;
            }
            tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
            Ok(Some(case))
        }
    }
}
