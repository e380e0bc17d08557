use shared_types::{AppError, Notification};
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::Store;
use crate::error_convert::SqlxErrorExt;

/// Append a lawyer notification. Returns `false` if this exact notice was
/// already recorded.
pub async fn insert_for_lawyer(store: &Store, notification: &Notification) -> Result<bool, AppError> {
    match store {
        Store::Memory(mem) => Ok(mem.insert_lawyer_notification(notification.clone()).await),
        Store::Postgres(pool) => {
            let result = sqlx::query(
                r#"
                INSERT INTO lawyer_notifications (id, lawyer_id, case_id, doc, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(notification.id)
            .bind(notification.lawyer_id)
            .bind(notification.case_id)
            .bind(Json(notification))
            .bind(notification.timestamp)
            .execute(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;
            Ok(result.rows_affected() == 1)
        }
    }
}

/// Notifications addressed to one lawyer, oldest first.
pub async fn list_for_lawyer(store: &Store, lawyer_id: Uuid) -> Result<Vec<Notification>, AppError> {
    match store {
        Store::Memory(mem) => Ok(mem.lawyer_notifications(lawyer_id).await),
        Store::Postgres(pool) => {
            let rows = sqlx::query_scalar::<_, Json<Notification>>(
                "SELECT doc FROM lawyer_notifications WHERE lawyer_id = $1 ORDER BY created_at, id",
            )
            .bind(lawyer_id)
            .fetch_all(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;
            Ok(rows.into_iter().map(|Json(n)| n).collect())
        }
    }
}
