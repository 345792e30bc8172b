//! MySQL injection pipeline for the monitoring configuration injector.
//!
//! This crate writes synthetic configuration into a Centreon-style schema:
//!
//! - [`Executor`] - the four statements injectors need, implemented by
//!   [`MySqlExecutor`] and by [`testing::MemoryExecutor`]
//! - [`allocator::allocate`] - next free primary keys of a table
//! - [`Batch`] - chunked multi-row inserts
//! - [`injectors`] - one [`Injector`] per entity kind
//! - [`Orchestrator`] - priority-ordered inject and purge
//!
//! # Example
//!
//! ```rust
//! use injector_core::{EntityKind, InjectionConfig};
//! use injector_mysql::testing::MemoryExecutor;
//! use injector_mysql::{Capabilities, Orchestrator, Session};
//!
//! # tokio_test::block_on(async {
//! let orchestrator = Orchestrator::with_defaults().unwrap();
//! let config = InjectionConfig::with_counts(&[
//!     (EntityKind::Timeperiod, 1),
//!     (EntityKind::Command, 1),
//!     (EntityKind::Host, 3),
//! ]);
//!
//! let mut executor = MemoryExecutor::centreon();
//! let mut session = Session::new(&mut executor, 50_000, Some(42));
//! let injected = orchestrator
//!     .inject(&mut session, &config, &Capabilities::none())
//!     .await
//!     .unwrap();
//! assert_eq!(injected.len(EntityKind::Host), 3);
//! # });
//! ```

pub mod allocator;
pub mod args;
pub mod batch;
pub mod capability;
pub mod error;
pub mod executor;
pub mod injectors;
pub mod mysql;
pub mod orchestrator;
pub mod session;
pub mod testing;

pub use args::InjectArgs;
pub use batch::{Batch, DEFAULT_BATCH_SIZE};
pub use capability::Capabilities;
pub use error::{DbError, InjectError};
pub use executor::{Executor, Filter, InsertStatement};
pub use injectors::{default_injectors, Injector};
pub use mysql::MySqlExecutor;
pub use orchestrator::{Orchestrator, PlanStep};
pub use session::Session;
