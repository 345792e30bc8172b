//! Sampling from pools of previously injected identifiers.

use crate::numeric::draw_count;
use injector_core::{Cardinality, EntityKind, HostServicePair, InjectedIds};
use rand::Rng;

/// Error type for generator operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// Relation or reference requested from a pool with nothing in it
    #[error("Cannot draw from empty '{pool}' pool: nothing of that kind was injected")]
    EmptyPool { pool: String },
}

/// A named, read-only view over candidate identifiers.
#[derive(Debug, Clone, Copy)]
pub struct Pool<'a, T> {
    name: &'a str,
    items: &'a [T],
}

impl<'a, T: Copy> Pool<'a, T> {
    pub fn new(name: &'a str, items: &'a [T]) -> Self {
        Self { name, items }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn items(&self) -> &'a [T] {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One uniformly drawn candidate.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Result<T, GeneratorError> {
        if self.items.is_empty() {
            return Err(self.empty());
        }
        Ok(self.items[rng.random_range(0..self.items.len())])
    }

    /// The first candidate, for references that must be deterministic.
    pub fn first(&self) -> Result<T, GeneratorError> {
        self.items.first().copied().ok_or_else(|| self.empty())
    }

    /// Relation rows from `parent` to candidates drawn with replacement.
    ///
    /// The number of rows is `cardinality` itself when fixed, or drawn
    /// uniformly from its range. Duplicate candidates are possible. An empty
    /// pool is an error whenever the cardinality allows a non-zero count.
    pub fn fanout<R: Rng>(
        &self,
        rng: &mut R,
        parent: i64,
        cardinality: Cardinality,
    ) -> Result<Vec<(i64, T)>, GeneratorError> {
        if self.items.is_empty() && cardinality.max() > 0 {
            return Err(self.empty());
        }

        let count = draw_count(rng, cardinality);
        let mut pairs = Vec::new();
        for _ in 0..count {
            pairs.push((parent, self.pick(rng)?));
        }
        Ok(pairs)
    }

    /// The first `n` candidates (or all of them when fewer exist).
    pub fn first_n(&self, n: u64) -> &'a [T] {
        let n = usize::try_from(n).unwrap_or(usize::MAX).min(self.items.len());
        &self.items[..n]
    }

    fn empty(&self) -> GeneratorError {
        GeneratorError::EmptyPool {
            pool: self.name.to_string(),
        }
    }
}

impl<'a> Pool<'a, i64> {
    /// Primary keys injected for `kind` in the current run.
    pub fn of(injected: &'a InjectedIds, kind: EntityKind) -> Self {
        Pool::new(kind.as_str(), injected.keys(kind))
    }
}

impl<'a> Pool<'a, HostServicePair> {
    /// Host/service pairs injected for services in the current run.
    pub fn services(injected: &'a InjectedIds) -> Self {
        Pool::new(
            EntityKind::Service.as_str(),
            injected.host_services(EntityKind::Service),
        )
    }
}
