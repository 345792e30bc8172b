//! Identifiers produced during an injection run.

use crate::kind::EntityKind;
use std::collections::BTreeMap;
use std::ops::Range;

/// Error type for the injected-id map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdMapError {
    /// Entries are written once per run
    #[error("Identifiers for '{0}' were already recorded in this run")]
    AlreadyRecorded(EntityKind),
}

/// A contiguous block of primary keys reserved for one injector call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    pub first: i64,
    pub count: u64,
}

impl IdRange {
    /// Range starting right after the current maximum (1 on an empty table).
    pub fn after(current_max: Option<i64>, count: u64) -> Self {
        Self {
            first: current_max.unwrap_or(0) + 1,
            count,
        }
    }

    /// One past the last reserved id.
    pub fn end(&self) -> i64 {
        self.first + self.count as i64
    }

    pub fn ids(&self) -> Range<i64> {
        self.first..self.end()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids().contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A service together with the host it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostServicePair {
    pub host_id: i64,
    pub service_id: i64,
}

/// What one injector produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducedIds {
    /// Plain primary keys.
    Keys(Vec<i64>),
    /// Services with their host.
    HostServices(Vec<HostServicePair>),
}

impl ProducedIds {
    pub fn empty() -> Self {
        ProducedIds::Keys(Vec::new())
    }

    pub fn len(&self) -> usize {
        match self {
            ProducedIds::Keys(keys) => keys.len(),
            ProducedIds::HostServices(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<i64>> for ProducedIds {
    fn from(keys: Vec<i64>) -> Self {
        ProducedIds::Keys(keys)
    }
}

impl From<IdRange> for ProducedIds {
    fn from(range: IdRange) -> Self {
        ProducedIds::Keys(range.ids().collect())
    }
}

/// Append-only map of what each kind produced during the current run.
///
/// Each kind is recorded exactly once; later injectors only read it.
#[derive(Debug, Clone, Default)]
pub struct InjectedIds {
    entries: BTreeMap<EntityKind, ProducedIds>,
}

impl InjectedIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a kind's produced ids. A second write for the same kind fails.
    pub fn record(&mut self, kind: EntityKind, ids: ProducedIds) -> Result<(), IdMapError> {
        if self.entries.contains_key(&kind) {
            return Err(IdMapError::AlreadyRecorded(kind));
        }
        self.entries.insert(kind, ids);
        Ok(())
    }

    pub fn get(&self, kind: EntityKind) -> Option<&ProducedIds> {
        self.entries.get(&kind)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Primary keys produced for a kind.
    ///
    /// Empty when the kind was not recorded or produced host/service pairs;
    /// use [`InjectedIds::host_services`] for the latter.
    pub fn keys(&self, kind: EntityKind) -> &[i64] {
        match self.entries.get(&kind) {
            Some(ProducedIds::Keys(keys)) => keys,
            _ => &[],
        }
    }

    /// Host/service pairs produced for a kind (services).
    pub fn host_services(&self, kind: EntityKind) -> &[HostServicePair] {
        match self.entries.get(&kind) {
            Some(ProducedIds::HostServices(pairs)) => pairs,
            _ => &[],
        }
    }

    /// Number of ids produced for a kind (zero if not recorded).
    pub fn len(&self, kind: EntityKind) -> usize {
        self.entries.get(&kind).map_or(0, ProducedIds::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &ProducedIds)> {
        self.entries.iter().map(|(kind, ids)| (*kind, ids))
    }
}
