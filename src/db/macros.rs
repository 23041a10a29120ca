//! Dispatch macros for reducing code duplication.
//!
//! These macros generate match arms over the closed enums of the crate
//! (`DbPool` and `Operator`) while keeping each arm readable.

/// Macro for generating database dispatch match arms.
///
/// This macro generates match arms for `DbPool` variants, reducing the need
/// to manually write repetitive match statements.
///
/// # Example
///
/// ```ignore
/// impl_db_dispatch!(pool, {
///     MySql(p) => do_mysql(p),
///     Postgres(p) => do_postgres(p),
///     SqlServer(p) => do_sqlserver(p),
/// });
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($pool:expr, { $($variant:ident($p:ident) => $body:expr),+ $(,)? }) => {
        match $pool {
            $(
                $crate::db::pool::DbPool::$variant($p) => $body,
            )+
        }
    };
}

/// Macro for running the same body against every `Operator` variant.
///
/// Each arm binds the concrete dialect operator, so the body is compiled
/// once per dialect with static dispatch.
///
/// # Example
///
/// ```ignore
/// impl_operator_dispatch!(self, op => engine::ping(op, ctx, name).await)
/// ```
#[macro_export]
macro_rules! impl_operator_dispatch {
    ($operator:expr, $op:ident => $body:expr) => {
        match $operator {
            $crate::operator::Operator::Postgres($op) => $body,
            $crate::operator::Operator::SqlServer($op) => $body,
            $crate::operator::Operator::MySql($op) => $body,
        }
    };
}

pub use impl_db_dispatch;
pub use impl_operator_dispatch;
