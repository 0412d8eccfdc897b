//! Explicit latest-investigation store.
//!
//! The orchestrator returns each [`Investigation`] to the caller and keeps
//! no state. Callers that want a "latest result per entity" notion use
//! this injectable store with a documented lifecycle: the caller records
//! once per orchestrator call, everything else only reads. The core never
//! writes it implicitly.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::investigate::Investigation;

/// Holds the most recent investigation per entity.
#[derive(Debug, Default)]
pub struct InvestigationStore {
    latest: RwLock<BTreeMap<String, Investigation>>,
}

impl InvestigationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an investigation as the latest for its entity, replacing any
    /// previous one.
    pub fn record(&self, investigation: Investigation) {
        self.latest
            .write()
            .expect("investigation store poisoned")
            .insert(investigation.entity.clone(), investigation);
    }

    /// Latest investigation for one entity, if any.
    pub fn latest(&self, entity: &str) -> Option<Investigation> {
        self.latest
            .read()
            .expect("investigation store poisoned")
            .get(entity)
            .cloned()
    }

    /// Latest investigation for every entity, ordered by entity id.
    pub fn all_latest(&self) -> Vec<Investigation> {
        self.latest
            .read()
            .expect("investigation store poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.latest.write().expect("investigation store poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.latest.read().expect("investigation store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
