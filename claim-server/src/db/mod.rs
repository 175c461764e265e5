//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) plus the repository layer.

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "claims";
const DATABASE: &str = "claims";

/// Open the embedded database and define the schema
pub async fn open(path: &Path) -> Result<Surreal<Db>, AppError> {
    let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

    define_schema(&db).await?;

    tracing::info!("Database ready at {}", path.display());
    Ok(db)
}

/// Schema definition
///
/// Tables stay schemaless; the unique index on `claim.code` backs the
/// case-insensitive uniqueness rule (codes are stored uppercased).
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS claim SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS claim_code_unique ON TABLE claim COLUMNS code UNIQUE;
        DEFINE TABLE IF NOT EXISTS profile SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS profile_email_unique ON TABLE profile COLUMNS email UNIQUE;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?;
    Ok(())
}
