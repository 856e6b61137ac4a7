use crate::ops::apply_path_update;
use crate::path::PathError;
use plan_core::BusinessPlan;
use serde_json::Value;
use tracing::debug;

/// Holds the current snapshot. Every change replaces it wholesale.
#[derive(Clone, Debug)]
pub struct StateStore {
    current: BusinessPlan,
    revision: u64,
}

impl StateStore {
    pub fn new(initial: BusinessPlan) -> Self {
        Self {
            current: initial,
            revision: 0,
        }
    }

    pub fn snapshot(&self) -> &BusinessPlan {
        &self.current
    }

    /// Number of successful replacements since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies a path update. On error the current snapshot is kept.
    pub fn apply(&mut self, path: &str, value: Value) -> Result<&BusinessPlan, PathError> {
        let next = apply_path_update(&self.current, path, value)?;
        Ok(self.replace(next))
    }

    /// Replaces the snapshot with `f(current)`.
    pub fn update<F>(&mut self, f: F) -> &BusinessPlan
    where
        F: FnOnce(&BusinessPlan) -> BusinessPlan,
    {
        let next = f(&self.current);
        self.replace(next)
    }

    pub fn try_update<F, E>(&mut self, f: F) -> Result<&BusinessPlan, E>
    where
        F: FnOnce(&BusinessPlan) -> Result<BusinessPlan, E>,
    {
        let next = f(&self.current)?;
        Ok(self.replace(next))
    }

    /// Goes back to the startup plan.
    pub fn reset(&mut self) -> &BusinessPlan {
        self.replace(BusinessPlan::default())
    }

    fn replace(&mut self, next: BusinessPlan) -> &BusinessPlan {
        self.current = next;
        self.revision += 1;
        debug!(revision = self.revision, "snapshot replaced");
        &self.current
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(BusinessPlan::default())
    }
}
