//! # Router Module
//!
//! Core routing engine for the logical database.
//!
//! This module exposes a single read/write database facade over a cluster of
//! physical database handles split into primaries (read-write) and replicas
//! (read-only).
//!
//! ## Core Types
//!
//! - [`RoutingDb`] - The logical database facade
//! - [`RoutingConfig`] - Construction-time configuration
//! - [`AggregateStmt`] - A prepared statement spanning every physical handle
//! - [`RouterTx`] - A transaction pinned to one primary
//! - [`RouterConn`] - A pooled connection pinned to one primary
//! - [`Database`] - The contract a driver adapter implements
//!
//! ## Routing Rules
//!
//! - `exec` and `begin` always pick a primary through the load balancer.
//! - `query` and `query_row` pick a replica when one exists, falling back to
//!   primaries otherwise. A `RETURNING` clause (per the configured
//!   [`QueryTypeChecker`]) diverts the query to a primary.
//! - `prepare` creates one driver statement per physical handle and routes
//!   each later invocation to the matching side of the cluster.
//! - `ping` and `close` fan out to every handle concurrently and aggregate
//!   failures into a [`MultiError`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqlrouter::{LoadBalancerPolicy, RoutingDb};
//!
//! // primary/replica are Arc<dyn Database> handles built by a driver adapter
//! let db = RoutingDb::builder()
//!     .with_primary(primary)
//!     .with_replica(replica)
//!     .with_load_balancer(LoadBalancerPolicy::RoundRobin)
//!     .build()?;
//!
//! db.exec("INSERT INTO t (x) VALUES ($1)", &[1.into()]).await?;   // primary
//! let rows = db.query("SELECT x FROM t", &[]).await?;             // replica
//! ```

mod balancer;
mod config;
mod conn;
mod db;
mod error;
mod fanout;
mod handle;
mod query;
mod stmt;
mod tx;
mod types;

#[cfg(test)]
pub(crate) mod mock;

// Re-exports
pub use balancer::{LoadBalancerPolicy, Selector};
pub use config::{RoutingConfig, RoutingConfigBuilder};
pub use conn::RouterConn;
pub use db::{open, open_multi, RoutingDb};
pub use error::{DriverError, DriverResult, MultiError};
pub use handle::{Connector, Database, DatabaseConn, DatabaseStmt, DatabaseTx, HandleId};
pub use query::{DefaultQueryTypeChecker, QueryType, QueryTypeChecker};
pub use stmt::AggregateStmt;
pub use tx::RouterTx;
pub use types::{
    DatabaseStats, ExecResult, IsolationLevel, Params, Row, Rows, TxOptions, Value,
};

/// 위치 파라미터 목록 생성 매크로
#[macro_export]
macro_rules! args {
    () => {
        Vec::<$crate::router::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::router::Value::from($value)),+]
    };
}
