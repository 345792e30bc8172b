//! Monitoring configuration injector.
//!
//! Fills a Centreon-style MySQL configuration schema with synthetic hosts,
//! services, groups, ACLs and users, in dependency order. See
//! [`run::run_inject`] for the command flow.

pub mod logging;
pub mod run;

pub use logging::mask_connection_password;
pub use run::{execute, run_inject};
