//! Lookup and lazy creation of state model instances.

use crate::core::{PartitionId, State, DEFAULT_HISTORY_CAPACITY};
use crate::model::definition::StateModelDefinition;
use crate::model::instance::{InstanceSnapshot, StateModelInstance};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Owns every state model instance hosted on this node for one state model.
///
/// Instances are created on first use in the definition's initial state.
/// Creation for a given partition is atomic, so concurrent callers always
/// observe the same instance.
pub struct StateModelFactory<S: State> {
    definition: Arc<StateModelDefinition<S>>,
    instances: DashMap<PartitionId, Arc<StateModelInstance<S>>>,
    history_capacity: usize,
}

impl<S: State> StateModelFactory<S> {
    pub fn new(definition: Arc<StateModelDefinition<S>>) -> Self {
        Self {
            definition,
            instances: DashMap::new(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Number of history records each new instance retains.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn definition(&self) -> &Arc<StateModelDefinition<S>> {
        &self.definition
    }

    /// Return the instance for `partition`, creating it if needed.
    pub fn get_or_create(&self, partition: &PartitionId) -> Arc<StateModelInstance<S>> {
        if let Some(existing) = self.instances.get(partition) {
            return Arc::clone(existing.value());
        }

        let entry = self.instances.entry(partition.clone()).or_insert_with(|| {
            debug!(
                partition = %partition,
                initial = self.definition.initial_state().name(),
                "Creating state model instance"
            );
            Arc::new(StateModelInstance::new(
                partition.clone(),
                self.definition.initial_state().clone(),
                self.history_capacity,
            ))
        });
        Arc::clone(entry.value())
    }

    pub fn get(&self, partition: &PartitionId) -> Option<Arc<StateModelInstance<S>>> {
        self.instances
            .get(partition)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Forget the instance for `partition`.
    pub fn remove(&self, partition: &PartitionId) -> Option<Arc<StateModelInstance<S>>> {
        self.instances.remove(partition).map(|(_, instance)| instance)
    }

    pub fn partitions(&self) -> Vec<PartitionId> {
        let mut partitions: Vec<_> = self.instances.iter().map(|e| e.key().clone()).collect();
        partitions.sort();
        partitions
    }

    /// Snapshots of every hosted instance, ordered by partition.
    pub fn snapshots(&self) -> Vec<InstanceSnapshot<S>> {
        let mut snapshots: Vec<_> = self.instances.iter().map(|e| e.value().snapshot()).collect();
        snapshots.sort_by(|a, b| a.partition.cmp(&b.partition));
        snapshots
    }

    /// Whether `instance` is still the one tracked for its partition.
    pub fn is_current(&self, instance: &Arc<StateModelInstance<S>>) -> bool {
        self.instances
            .get(instance.partition())
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), instance))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
