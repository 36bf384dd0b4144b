use async_trait::async_trait;
use viability_core::ClientDataStore;
use viability_core::store::{StoreConfig, StoreError, StoreFactory};

use crate::repository::SqliteStore;

/// Maps a bare path to a sqlx URL that creates the file when missing.
fn database_url(connection_string: &str) -> String {
    match connection_string {
        ":memory:" => "sqlite::memory:".to_string(),
        s if s.starts_with("sqlite:") => s.to_string(),
        path => format!("sqlite://{}?mode=rwc", path),
    }
}

/// [`StoreFactory`] for SQLite, registered as `"sqlite"`.
///
/// ```rust,no_run
/// use viability_core::store::StoreRegistry;
/// use viability_db_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::new();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Accepts a file path (`viability.db`), `:memory:`, or a full
    /// `sqlite:` URL. Runs migrations before returning.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn ClientDataStore>, StoreError> {
        let store = SqliteStore::new(&database_url(&config.connection_string))
            .await
            .map_err(|e| StoreError::Connection(format!("{e:#}")))?;
        store
            .run_migrations()
            .await
            .map_err(|e| StoreError::Database(format!("{e:#}")))?;
        Ok(Box::new(store))
    }
}
