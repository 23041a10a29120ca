//! Operator registry: dialect to operator.

use super::Operator;
use crate::db::registry::ConnectionRegistry;
use crate::error::{DbError, DbResult};
use crate::models::DbType;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Operators keyed by dialect. Built once at start-up, read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct OperatorRegistry {
    operators: HashMap<DbType, Arc<Operator>>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the PostgreSQL, SQL Server and MySQL operators, all
    /// resolving names through `connections`.
    pub fn with_builtin_dialects(connections: Arc<ConnectionRegistry>) -> Self {
        let operators = [DbType::Postgres, DbType::SqlServer, DbType::MySql]
            .into_iter()
            .filter_map(|db_type| {
                Operator::for_dialect(db_type, connections.clone())
                    .ok()
                    .map(|op| (db_type, Arc::new(op)))
            })
            .collect();
        Self { operators }
    }

    /// Process-wide default registry, bound to [`ConnectionRegistry::global`].
    pub fn global() -> Arc<OperatorRegistry> {
        static GLOBAL: OnceLock<Arc<OperatorRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| {
                Arc::new(OperatorRegistry::with_builtin_dialects(
                    ConnectionRegistry::global(),
                ))
            })
            .clone()
    }

    /// Register `operator` for `db_type`. The first registration wins.
    pub fn register_ds(&mut self, db_type: DbType, operator: Operator) -> DbResult<()> {
        if self.operators.contains_key(&db_type) {
            return Err(DbError::duplicate_registration(db_type.as_str()));
        }
        debug!(db_type = %db_type, "Registered operator");
        self.operators.insert(db_type, Arc::new(operator));
        Ok(())
    }

    pub fn get_operator(&self, db_type: DbType) -> DbResult<Arc<Operator>> {
        self.operators
            .get(&db_type)
            .cloned()
            .ok_or_else(|| DbError::unsupported_dialect(db_type.as_str()))
    }

    /// Registered dialects, in [`DbType::ALL`] order.
    pub fn dialects(&self) -> Vec<DbType> {
        DbType::ALL
            .into_iter()
            .filter(|t| self.operators.contains_key(t))
            .collect()
    }
}
