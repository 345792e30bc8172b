//! Core types for the monitoring configuration injector.
//!
//! This crate provides the foundational types shared by the generator and
//! the database-facing injectors:
//!
//! - [`EntityKind`] - Every entity type the injector knows how to create
//! - [`PriorityRegistry`] - Dependency-validated injection order
//! - [`InjectionConfig`] - Per-entity configuration loaded from YAML
//! - [`InjectedIds`] - Append-only map of identifiers produced during a run
//! - [`SqlValue`] - Typed column value handed to the executor
//!
//! # Architecture
//!
//! ```text
//! injector-core (this crate)
//!    │
//!    ├─── injector-generator  (fan-out, names, command lines)
//!    │
//!    └─── injector-mysql      (executor, allocator, batches, injectors)
//! ```
//!
//! # Example
//!
//! ```rust
//! use injector_core::{EntityKind, PriorityRegistry};
//!
//! let registry = PriorityRegistry::default();
//! let order = registry.ordered_kinds();
//! assert_eq!(order.first(), Some(&EntityKind::Timeperiod));
//! assert_eq!(order.last(), Some(&EntityKind::User));
//! ```

pub mod config;
pub mod ids;
pub mod kind;
pub mod registry;
pub mod values;

// Re-exports for convenience
pub use config::{
    Bounds, Cardinality, ConfigError, EntitySection, InjectionConfig, PollerSection, RelationField,
    UserSection,
};
pub use ids::{HostServicePair, IdMapError, IdRange, InjectedIds, ProducedIds};
pub use kind::{Capability, EntityKind, UnknownKind};
pub use registry::{Declaration, PriorityRegistry, RegistryError};
pub use values::{Row, SqlValue};
