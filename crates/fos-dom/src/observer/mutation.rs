//! Mutation Observer API
//!
//! Observe DOM changes.

use std::collections::HashMap;

use crate::{DomTree, MutationRecord, MutationType, NodeId};

/// Mutation observer options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    fn accepts(&self, mutation: &MutationRecord) -> bool {
        match mutation.mutation_type {
            MutationType::ChildList => self.child_list,
            MutationType::Attributes => {
                self.attributes
                    && match (&self.attribute_filter, &mutation.attribute_name) {
                        (Some(filter), Some(attr)) => filter.contains(attr),
                        _ => true,
                    }
            }
        }
    }
}

/// Mutation observer
#[derive(Debug)]
pub struct MutationObserver {
    id: u64,
    observations: HashMap<NodeId, MutationObserverInit>,
    pending_records: Vec<MutationRecord>,
}

impl MutationObserver {
    pub fn new() -> Self {
        Self {
            id: super::next_observer_id(),
            observations: HashMap::new(),
            pending_records: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Observe a target; re-observing replaces its options
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        tracing::trace!(observer = self.id, ?target, "mutation observe");
        self.observations.insert(target, options);
    }

    /// Stop observing a single target
    pub fn unobserve(&mut self, target: NodeId) {
        self.observations.remove(&target);
    }

    /// Stop observing everything and drop queued records
    pub fn disconnect(&mut self) {
        self.observations.clear();
        self.pending_records.clear();
    }

    /// Take pending records
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending_records)
    }

    /// Check if observing node
    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observations.contains_key(&node)
    }

    pub fn observed_count(&self) -> usize {
        self.observations.len()
    }

    /// Queue a mutation if the target (or, with `subtree`, an ancestor) is observed.
    /// Old values are stripped unless some matching observation asked for them.
    pub fn record(&mut self, mutation: MutationRecord, tree: &DomTree) {
        let mut matched = false;
        let mut keep_old_value = false;

        for (&observed, options) in &self.observations {
            let covers_target = observed == mutation.target
                || (options.subtree && tree.is_descendant_of(mutation.target, observed));
            if covers_target && options.accepts(&mutation) {
                matched = true;
                keep_old_value |= options.attribute_old_value;
            }
        }

        if matched {
            let mut mutation = mutation;
            if mutation.mutation_type == MutationType::Attributes && !keep_old_value {
                mutation.old_value = None;
            }
            self.pending_records.push(mutation);
        }
    }

    /// Has pending records
    pub fn has_pending(&self) -> bool {
        !self.pending_records.is_empty()
    }
}

impl Default for MutationObserver {
    fn default() -> Self {
        Self::new()
    }
}
