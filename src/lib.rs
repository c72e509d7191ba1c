//! # SQL Router
//!
//! A client-side routing layer that multiplexes one logical SQL database
//! over a cluster of physical handles split into primaries (read-write) and
//! replicas (read-only).
//!
//! ## Features
//!
//! - **Read/Write Splitting** - Reads go to replicas, writes stay on primaries
//! - **Load Balancing** - Round-robin or uniform random selection, safe under
//!   concurrent callers
//! - **Prepared Statement Fan-Out** - One driver statement per physical handle,
//!   invocations routed back to the correct side of the cluster
//! - **Pinned Transactions** - A transaction speaks to exactly one primary for
//!   its whole life, including rebound prepared statements
//! - **Lifecycle Fan-Out** - `ping` and `close` reach every handle concurrently
//!   and aggregate partial failures
//! - **Pluggable Classification** - `SELECT ... RETURNING` style writes are
//!   detected and diverted to a primary
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlrouter = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ## Basic Usage
//!
//! Physical handles come from a driver adapter implementing the [`Database`]
//! trait; the router owns routing, never the wire:
//!
//! ```rust,ignore
//! use sqlrouter::{LoadBalancerPolicy, RoutingDb};
//!
//! let db = RoutingDb::builder()
//!     .with_primary(primary)          // Arc<dyn Database>
//!     .with_replicas(replicas)        // Vec<Arc<dyn Database>>
//!     .with_load_balancer(LoadBalancerPolicy::RoundRobin)
//!     .build()?;
//!
//! // Writes always hit a primary
//! db.exec("UPDATE users SET active = true WHERE id = $1", &[1.into()]).await?;
//!
//! // Reads hit a replica when one exists
//! let rows = db.query("SELECT id, name FROM users", &[]).await?;
//!
//! // Transactions pin one primary for their whole life
//! let tx = db.begin().await?;
//! tx.exec("INSERT INTO audit (msg) VALUES ($1)", &["hi".into()]).await?;
//! tx.commit().await?;
//! ```
//!
//! ## Prepared Statements
//!
//! `prepare` creates a statement on every physical handle at once and hands
//! back an aggregate that routes each call:
//!
//! ```rust,ignore
//! let stmt = db.prepare("SELECT name FROM users WHERE id = $1").await?;
//!
//! let rows = stmt.query(&[7.into()]).await?;     // replica-side statement
//! stmt.exec(&[7.into()]).await?;                 // primary-side statement
//!
//! // Inside a transaction the statement rebinds to the transaction's handle
//! let tx = db.begin().await?;
//! let pinned = tx.stmt(&stmt).await?;
//! let rows = pinned.query(&[7.into()]).await?;   // transaction's primary only
//! stmt.close().await?;
//! ```
//!
//! ## Opening from Connection Strings
//!
//! With a [`Connector`] adapter, a `;`-delimited descriptor list opens the
//! whole cluster concurrently. The first descriptor becomes the primary and
//! the rest become replicas; [`router::open_multi`] takes the two lists
//! separately instead:
//!
//! ```rust,ignore
//! let db = sqlrouter::open(connector, "host=p0;host=r0;host=r1").await?;
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`DriverResult`]. Single-handle dispatches return
//! the driver's error verbatim; fan-outs aggregate per-handle failures into
//! [`MultiError`]:
//!
//! ```rust,ignore
//! match db.ping().await {
//!     Ok(()) => {}
//!     Err(sqlrouter::DriverError::Multi(errs)) => {
//!         for err in errs.errors() {
//!             eprintln!("handle failed: {err}");
//!         }
//!     }
//!     Err(err) => eprintln!("ping failed: {err}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod router;

// Re-exports for convenience
pub use router::{
    open, open_multi,
    AggregateStmt, Connector, Database, DatabaseConn, DatabaseStats, DatabaseStmt, DatabaseTx,
    DefaultQueryTypeChecker, DriverError, DriverResult, ExecResult, HandleId, IsolationLevel,
    LoadBalancerPolicy, MultiError, Params, QueryType, QueryTypeChecker, RouterConn, RouterTx,
    RoutingConfig, RoutingConfigBuilder, RoutingDb, Row, Rows, Selector, TxOptions, Value,
};
