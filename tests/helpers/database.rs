use pulp_schedule_migrate::adapters::sqlite::{create_migrated_test_pool, initialize_database};
use pulp_schedule_migrate::{DatabaseConfig, SqliteDocumentStore};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create an in-memory SQLite document store for testing
///
/// Creates a fresh in-memory database with migrations applied.
/// Each call creates a completely isolated database instance.
pub async fn setup_test_store() -> SqliteDocumentStore {
    let pool = create_migrated_test_pool()
        .await
        .expect("failed to create test database");
    SqliteDocumentStore::new(pool)
}

/// Create a file-backed store in a temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the store is used.
#[allow(dead_code)]
pub async fn setup_file_store() -> (TempDir, DatabaseConfig, SqliteDocumentStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        path: dir.path().join("nested").join("pulp.db").display().to_string(),
        max_connections: 4,
    };
    let store = open_file_store(&config).await;
    (dir, config, store)
}

/// Open (or reopen) a file-backed store.
#[allow(dead_code)]
pub async fn open_file_store(config: &DatabaseConfig) -> SqliteDocumentStore {
    let pool = initialize_database(config)
        .await
        .expect("failed to open file database");
    SqliteDocumentStore::new(pool)
}

/// Teardown test database
///
/// Closes the connection pool and cleans up resources.
#[allow(dead_code)]
pub async fn teardown_test_db(pool: &SqlitePool) {
    pool.close().await;
}
