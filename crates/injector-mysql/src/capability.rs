//! Detection of optional product modules.

use crate::error::InjectError;
use crate::executor::{Executor, Filter};
use injector_core::Capability;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

const MODULES_TABLE: &str = "modules_informations";

/// Installed optional modules, resolved once before a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    installed: BTreeSet<Capability>,
}

impl Capabilities {
    /// No optional module installed.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self::none()
            .with(Capability::Bam)
            .with(Capability::HostDiscovery)
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.installed.insert(capability);
        self
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.installed.contains(&capability)
    }

    /// Whether an injector gated by `capability` may run.
    pub fn allows(&self, capability: Option<Capability>) -> bool {
        match capability {
            Some(capability) => self.has(capability),
            None => true,
        }
    }

    /// Look every known module up in `modules_informations`.
    pub async fn detect(executor: &mut dyn Executor) -> Result<Self, InjectError> {
        let mut capabilities = Self::none();
        for capability in [Capability::Bam, Capability::HostDiscovery] {
            let rows = executor
                .select_ids(
                    MODULES_TABLE,
                    "id",
                    &[Filter::eq("name", capability.module_name())],
                )
                .await
                .map_err(InjectError::statement(MODULES_TABLE))?;
            debug!("Module {} installed: {}", capability, !rows.is_empty());
            if !rows.is_empty() {
                capabilities = capabilities.with(capability);
            }
        }
        Ok(capabilities)
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.installed.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.installed.iter().map(Capability::module_name).collect();
        f.write_str(&names.join(", "))
    }
}
