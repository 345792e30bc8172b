//! Randomized generation for the monitoring configuration injector.
//!
//! Everything here is pure: functions take a caller-owned RNG and return
//! values or relation pairs, and never talk to the database. Seeding the
//! RNG (`StdRng::seed_from_u64`) makes a whole run reproducible.
//!
//! # Example
//!
//! ```rust
//! use injector_core::Cardinality;
//! use injector_generator::Pool;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let hosts = [10, 11, 12, 13, 14];
//! let pool = Pool::new("host", &hosts);
//!
//! let pairs = pool
//!     .fanout(&mut rng, 1, Cardinality::Range { min: 2, max: 2 })
//!     .unwrap();
//! assert_eq!(pairs.len(), 2);
//! assert!(pairs.iter().all(|(parent, host)| *parent == 1 && hosts.contains(host)));
//! ```
//!
//! # Modules
//!
//! - `pool` - fan-out, single picks and prefix selection over id pools
//! - `pattern` - `{prefix}_{index}` names and `{index}` patterns
//! - `command_line` - host-check and service-check command lines
//! - `numeric` - ranges and threshold values

pub mod command_line;
pub mod numeric;
pub mod pattern;
pub mod pool;

// Re-exports for convenience
pub use pool::{GeneratorError, Pool};
