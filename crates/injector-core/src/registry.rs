//! Priority registry: the single declaration of injection order.
//!
//! Each entity kind is declared once with its priority and the kinds whose
//! identifiers it reads. The registry validates the declarations at
//! construction with a topological sort (Kahn's algorithm) and rejects
//! unknown dependencies, cycles and priority inversions, so the order
//! returned by [`PriorityRegistry::ordered_kinds`] always places a kind
//! after everything it depends on.

use crate::kind::EntityKind;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Error type for registry validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The same kind was declared twice
    #[error("Entity kind '{0}' is declared more than once")]
    DuplicateKind(EntityKind),

    /// A dependency is not declared in the registry
    #[error("Entity kind '{kind}' depends on undeclared kind '{dependency}'")]
    UnknownDependency {
        kind: EntityKind,
        dependency: EntityKind,
    },

    /// The dependency graph contains a cycle
    #[error("Dependency cycle between entity kinds: {0:?}")]
    Cycle(Vec<EntityKind>),

    /// A dependency does not have a strictly higher priority than its dependent
    #[error(
        "Entity kind '{kind}' (priority {priority}) depends on '{dependency}' \
         (priority {dependency_priority}) which is not injected earlier"
    )]
    PriorityInversion {
        kind: EntityKind,
        priority: i32,
        dependency: EntityKind,
        dependency_priority: i32,
    },
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: EntityKind,
    /// Higher is injected earlier and purged later.
    pub priority: i32,
    /// Kinds whose produced identifiers this kind reads.
    pub depends_on: Vec<EntityKind>,
}

impl Declaration {
    pub fn new(kind: EntityKind, priority: i32, depends_on: &[EntityKind]) -> Self {
        Self {
            kind,
            priority,
            depends_on: depends_on.to_vec(),
        }
    }
}

/// Validated, immutable injection order.
#[derive(Debug, Clone)]
pub struct PriorityRegistry {
    declarations: Vec<Declaration>,
    ordered: Vec<EntityKind>,
}

impl PriorityRegistry {
    /// Build a registry from declarations, validating the dependency graph.
    pub fn new(declarations: Vec<Declaration>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for declaration in &declarations {
            if !seen.insert(declaration.kind) {
                return Err(RegistryError::DuplicateKind(declaration.kind));
            }
        }

        for declaration in &declarations {
            for dependency in &declaration.depends_on {
                if !seen.contains(dependency) {
                    return Err(RegistryError::UnknownDependency {
                        kind: declaration.kind,
                        dependency: *dependency,
                    });
                }
            }
        }

        check_acyclic(&declarations)?;

        let priorities: BTreeMap<EntityKind, i32> = declarations
            .iter()
            .map(|d| (d.kind, d.priority))
            .collect();
        for declaration in &declarations {
            for dependency in &declaration.depends_on {
                let dependency_priority = priorities[dependency];
                if dependency_priority <= declaration.priority {
                    return Err(RegistryError::PriorityInversion {
                        kind: declaration.kind,
                        priority: declaration.priority,
                        dependency: *dependency,
                        dependency_priority,
                    });
                }
            }
        }

        // Stable sort keeps declaration order among equal priorities.
        let mut ordered: Vec<&Declaration> = declarations.iter().collect();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
        let ordered = ordered.into_iter().map(|d| d.kind).collect();

        Ok(Self {
            declarations,
            ordered,
        })
    }

    /// Priority of a kind, if declared.
    pub fn priority(&self, kind: EntityKind) -> Option<i32> {
        self.declaration(kind).map(|d| d.priority)
    }

    /// Kinds in injection order (descending priority).
    pub fn ordered_kinds(&self) -> &[EntityKind] {
        &self.ordered
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    fn declaration(&self, kind: EntityKind) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.kind == kind)
    }
}

impl Default for PriorityRegistry {
    fn default() -> Self {
        Self::new(default_declarations()).expect("built-in priority declarations are valid")
    }
}

/// The built-in declarations for the monitoring configuration schema.
pub fn default_declarations() -> Vec<Declaration> {
    use EntityKind::*;

    vec![
        Declaration::new(Timeperiod, 1000, &[]),
        Declaration::new(Command, 950, &[]),
        Declaration::new(Contact, 900, &[Timeperiod]),
        Declaration::new(Host, 850, &[Command]),
        Declaration::new(Service, 800, &[Command, Host]),
        Declaration::new(Metaservice, 750, &[Service, Timeperiod]),
        Declaration::new(Hostgroup, 700, &[Host]),
        Declaration::new(Servicegroup, 650, &[Service]),
        Declaration::new(HostCategory, 600, &[Host]),
        Declaration::new(ServiceCategory, 550, &[Service]),
        Declaration::new(Ba, 500, &[Timeperiod]),
        Declaration::new(Kpi, 450, &[Ba, Service]),
        Declaration::new(HostDiscoJob, 400, &[]),
        Declaration::new(AclMenu, 350, &[]),
        Declaration::new(AclResource, 300, &[Host, Servicegroup]),
        Declaration::new(AclGroup, 250, &[AclResource, AclMenu]),
        Declaration::new(User, 200, &[AclGroup]),
    ]
}

/// Kahn's algorithm over the dependency edges; leftover nodes form a cycle.
fn check_acyclic(declarations: &[Declaration]) -> Result<(), RegistryError> {
    let mut in_degree: BTreeMap<EntityKind, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<EntityKind, Vec<EntityKind>> = BTreeMap::new();

    for declaration in declarations {
        in_degree.insert(declaration.kind, declaration.depends_on.len());
        for dependency in &declaration.depends_on {
            dependents
                .entry(*dependency)
                .or_default()
                .push(declaration.kind);
        }
    }

    let mut queue: VecDeque<EntityKind> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(kind, _)| *kind)
        .collect();

    let mut processed = HashSet::new();
    while let Some(kind) = queue.pop_front() {
        processed.insert(kind);
        if let Some(children) = dependents.get(&kind) {
            for child in children {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*child);
                    }
                }
            }
        }
    }

    if processed.len() != declarations.len() {
        let cycle = declarations
            .iter()
            .map(|d| d.kind)
            .filter(|kind| !processed.contains(kind))
            .collect();
        return Err(RegistryError::Cycle(cycle));
    }

    Ok(())
}
