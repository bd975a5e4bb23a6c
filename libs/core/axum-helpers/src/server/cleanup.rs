use tracing::{error, info};

/// Closes a SeaORM connection pool, logging the outcome.
pub async fn close_postgres(db: sea_orm::DatabaseConnection, name: &str) {
    match db.close().await {
        Ok(()) => info!(connection = name, "PostgreSQL connection closed"),
        Err(e) => error!(connection = name, error = %e, "Error closing PostgreSQL connection"),
    }
}
