//! Connection registry.
//!
//! Maps logical database names to pooled connection handles. Each name is
//! opened at most once: concurrent `init_config` calls for the same name share
//! a `OnceCell`, so only the first runs the connector and the rest wait for its
//! result.

use crate::db::driver::{Connector, Driver, PoolLimits};
use crate::db::pool::PoolConnector;
use crate::error::{DbError, DbResult};
use crate::models::{DbConfig, DbType};
use crate::operator::context::ExecContext;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

/// An opened database: its driver and the normalized config it was opened with.
#[derive(Debug)]
pub struct ConnectionHandle {
    driver: Arc<dyn Driver>,
    config: DbConfig,
}

impl ConnectionHandle {
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn db_type(&self) -> DbType {
        self.driver.db_type()
    }
}

type HandleCell = Arc<OnceCell<Arc<ConnectionHandle>>>;

/// Logical name to pooled connection.
pub struct ConnectionRegistry {
    connector: Arc<dyn Connector>,
    /// Per-name lazy handles. OnceCell ensures single-flight opening.
    handles: RwLock<HashMap<String, HandleCell>>,
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry").finish_non_exhaustive()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    /// Registry opening databases through the bundled [`PoolConnector`].
    pub fn new() -> Self {
        Self::with_connector(Arc::new(PoolConnector::new()))
    }

    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide default registry.
    pub fn global() -> Arc<ConnectionRegistry> {
        static GLOBAL: OnceLock<Arc<ConnectionRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(ConnectionRegistry::new()))
            .clone()
    }

    /// Open the database described by `config` unless its name is already open.
    ///
    /// Registration is first-writer-wins: a second call for a name that is
    /// already open returns `Ok` and leaves the existing handle in place, even
    /// if the configs differ.
    pub async fn init_config(&self, config: &DbConfig) -> DbResult<()> {
        config.validate()?;
        let db_type = config
            .db_type
            .ok_or_else(|| DbError::invalid_config("db_type is required"))?;
        let dsn = config
            .resolve_dsn()
            .ok_or_else(|| DbError::invalid_config("no DSN could be derived"))?;
        let name = config.db_name.clone();

        let cell = self.cell(&name).await;
        if cell.initialized() {
            debug!(db_name = %name, "Database already open");
            return Ok(());
        }

        let normalized = config.with_pool_defaults();
        let limits = PoolLimits::from_config(&normalized);
        let result = cell
            .get_or_try_init(|| async {
                debug!(db_name = %name, db_type = %db_type, dsn = %normalized.masked_dsn(), "Opening database");
                let driver = self.connector.open(db_type, &dsn, &limits).await?;
                Ok::<_, DbError>(Arc::new(ConnectionHandle {
                    driver,
                    config: normalized.clone(),
                }))
            })
            .await;

        match result {
            Ok(handle) => {
                if !self.is_current(&name, &cell).await {
                    // Closed while the open was in flight
                    let _ = handle.driver.close().await;
                    return Err(DbError::connection(
                        format!("Database '{}' was closed while opening", name),
                        "Open the database again",
                    ));
                }
                info!(db_name = %name, db_type = %db_type, "Database opened");
                Ok(())
            }
            Err(e) => {
                self.remove_if_current(&name, &cell).await;
                warn!(db_name = %name, error = %e, "Failed to open database");
                Err(e)
            }
        }
    }

    /// Get or create the cell for `name`.
    async fn cell(&self, name: &str) -> HandleCell {
        {
            let handles = self.handles.read().await;
            if let Some(cell) = handles.get(name) {
                return Arc::clone(cell);
            }
        }
        let mut handles = self.handles.write().await;
        // Double-check after acquiring write lock
        Arc::clone(
            handles
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    async fn is_current(&self, name: &str, cell: &HandleCell) -> bool {
        let handles = self.handles.read().await;
        handles.get(name).is_some_and(|c| Arc::ptr_eq(c, cell))
    }

    /// Drop a cell whose open failed, unless another caller still holds it.
    /// Such a caller is waiting on the cell and runs its own open next.
    async fn remove_if_current(&self, name: &str, cell: &HandleCell) {
        let mut handles = self.handles.write().await;
        // One reference in the map, one held by the failed caller
        let waiters = Arc::strong_count(cell) > 2;
        if !waiters
            && handles
                .get(name)
                .is_some_and(|c| Arc::ptr_eq(c, cell) && !c.initialized())
        {
            handles.remove(name);
        }
    }

    /// Get the open handle for `name`.
    pub async fn get_db(&self, name: &str) -> DbResult<Arc<ConnectionHandle>> {
        let handles = self.handles.read().await;
        handles
            .get(name)
            .and_then(|cell| cell.get())
            .cloned()
            .ok_or_else(|| DbError::not_found(name))
    }

    /// Get the normalized config `name` was opened with.
    pub async fn get_config(&self, name: &str) -> DbResult<DbConfig> {
        Ok(self.get_db(name).await?.config.clone())
    }

    /// Check `name` is open and its database answers.
    pub async fn ping(&self, ctx: &ExecContext, name: &str) -> DbResult<()> {
        let handle = self.get_db(name).await?;
        ctx.run("ping", handle.driver.ping()).await
    }

    /// Close `name` and remove it. Closing a name that is not open is a no-op.
    ///
    /// Close is not fenced against concurrent users: statements already
    /// holding the handle keep running and are not waited for. They fail only
    /// if the driver rejects them.
    pub async fn close(&self, name: &str) -> DbResult<()> {
        if name.is_empty() {
            return Err(DbError::invalid_argument("database name is empty"));
        }
        // Remove under lock, close outside lock
        let cell = {
            let mut handles = self.handles.write().await;
            handles.remove(name)
        };
        let Some(handle) = cell.and_then(|c| c.get().cloned()) else {
            return Ok(());
        };
        info!(db_name = %name, "Closing database");
        handle.driver.close().await
    }

    /// Close every open database. Errors are logged, not returned.
    pub async fn close_all(&self) {
        let drained: Vec<(String, HandleCell)> = {
            let mut handles = self.handles.write().await;
            handles.drain().collect()
        };
        let closes = drained.into_iter().filter_map(|(name, cell)| {
            let handle = cell.get().cloned()?;
            Some(async move {
                info!(db_name = %name, "Closing database");
                if let Err(e) = handle.driver.close().await {
                    warn!(db_name = %name, error = %e, "Error closing database");
                }
            })
        });
        futures_util::future::join_all(closes).await;
    }

    pub async fn contains(&self, name: &str) -> bool {
        let handles = self.handles.read().await;
        handles.get(name).is_some_and(|cell| cell.initialized())
    }

    /// Names of open databases, sorted.
    pub async fn names(&self) -> Vec<String> {
        let handles = self.handles.read().await;
        let mut names: Vec<String> = handles
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        let handles = self.handles.read().await;
        handles.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
