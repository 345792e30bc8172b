//! Priority-ordered injection and purge.

use crate::capability::Capabilities;
use crate::error::InjectError;
use crate::injectors::{default_injectors, Injector};
use crate::session::Session;
use injector_core::{
    Capability, EntityKind, InjectedIds, InjectionConfig, PriorityRegistry, ProducedIds,
    RegistryError,
};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One kind in the run plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    pub kind: EntityKind,
    pub priority: i32,
    pub capability: Option<Capability>,
    /// False when the required module is not installed.
    pub enabled: bool,
}

/// Walks the registry order and runs the matching injectors.
pub struct Orchestrator {
    registry: PriorityRegistry,
    injectors: BTreeMap<EntityKind, Box<dyn Injector>>,
}

impl Orchestrator {
    /// Pair every registered kind with its injector.
    pub fn new(
        registry: PriorityRegistry,
        injectors: Vec<Box<dyn Injector>>,
    ) -> Result<Self, InjectError> {
        let mut by_kind = BTreeMap::new();
        for injector in injectors {
            let kind = injector.kind();
            if by_kind.insert(kind, injector).is_some() {
                return Err(RegistryError::DuplicateKind(kind).into());
            }
        }
        if let Some(kind) = registry
            .ordered_kinds()
            .iter()
            .find(|kind| !by_kind.contains_key(*kind))
        {
            return Err(InjectError::MissingInjector(*kind));
        }

        Ok(Self {
            registry,
            injectors: by_kind,
        })
    }

    /// Default priorities and every built-in injector.
    pub fn with_defaults() -> Result<Self, InjectError> {
        Self::new(PriorityRegistry::default(), default_injectors())
    }

    pub fn registry(&self) -> &PriorityRegistry {
        &self.registry
    }

    /// Registry order with capability gating resolved.
    pub fn plan(&self, capabilities: &Capabilities) -> Vec<PlanStep> {
        self.registry
            .ordered_kinds()
            .iter()
            .filter_map(|kind| {
                let injector = self.injectors.get(kind)?;
                let capability = injector.capability();
                Some(PlanStep {
                    kind: *kind,
                    priority: self.registry.priority(*kind)?,
                    capability,
                    enabled: capabilities.allows(capability),
                })
            })
            .collect()
    }

    /// Inject every configured kind in priority order.
    ///
    /// Kinds without configuration, with a zero count, or whose module is
    /// missing are recorded empty without touching the database. The first
    /// error aborts the run; batches already written stay in place.
    pub async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        capabilities: &Capabilities,
    ) -> Result<InjectedIds, InjectError> {
        let mut injected = InjectedIds::new();

        for step in self.plan(capabilities) {
            let kind = step.kind;
            if !step.enabled {
                if config.count(kind) > 0 {
                    warn!(
                        "Skipping {}: module {} is not installed",
                        kind,
                        step.capability.map_or("", |c| c.module_name())
                    );
                }
                injected.record(kind, ProducedIds::empty())?;
                continue;
            }
            if config.count(kind) == 0 {
                debug!("Nothing to inject for {}", kind);
                injected.record(kind, ProducedIds::empty())?;
                continue;
            }

            let injector = self
                .injectors
                .get(&kind)
                .ok_or(InjectError::MissingInjector(kind))?;
            let started = Instant::now();
            let produced = injector.inject(session, config, &injected).await?;
            info!(
                "Injected {}: {} rows in {:?}",
                kind,
                produced.len(),
                started.elapsed()
            );
            injected.record(kind, produced)?;
        }

        Ok(injected)
    }

    /// Delete owned rows of every enabled kind in reverse priority order.
    pub async fn purge(
        &self,
        session: &mut Session<'_>,
        capabilities: &Capabilities,
    ) -> Result<(), InjectError> {
        for step in self.plan(capabilities).into_iter().rev() {
            if !step.enabled {
                debug!("Skipping purge of {}: module not installed", step.kind);
                continue;
            }
            let injector = self
                .injectors
                .get(&step.kind)
                .ok_or(InjectError::MissingInjector(step.kind))?;
            let started = Instant::now();
            injector.purge(session).await?;
            info!("Purged {} in {:?}", step.kind, started.elapsed());
        }
        Ok(())
    }
}
