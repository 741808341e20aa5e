//! Reference process models.
//!
//! A process model is an ordered activity sequence describing the ideal
//! behavior of a case. Several models can be combined in a [`ModelSet`] to
//! describe alternative ideal paths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::{MiningError, Result};

/// One step of a process model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStep {
    /// Activity label.
    pub activity: String,
    /// Position key; steps are ordered by it.
    pub sort_key: i64,
}

impl ModelStep {
    /// Create a new step.
    pub fn new(activity: impl Into<String>, sort_key: i64) -> Self {
        Self {
            activity: activity.into(),
            sort_key,
        }
    }
}

/// A reference activity sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessModel {
    id: Uuid,
    steps: Vec<ModelStep>,
}

impl Default for ProcessModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessModel {
    /// Create an empty model with a fresh id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            steps: Vec::new(),
        }
    }

    /// Create a model from activities in order.
    pub fn from_activities<I, S>(activities: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps = activities
            .into_iter()
            .enumerate()
            .map(|(i, a)| ModelStep::new(a, i as i64 + 1))
            .collect();
        let mut model = Self::new();
        model.set_sequence(steps)?;
        Ok(model)
    }

    /// Populate the model. Steps are stably sorted by sort key.
    ///
    /// A populated model must be cleared before it can be set again.
    pub fn set_sequence(&mut self, mut steps: Vec<ModelStep>) -> Result<()> {
        if !self.steps.is_empty() {
            return Err(MiningError::state(
                "process model is already populated; clear it first",
            ));
        }
        if steps.is_empty() {
            return Err(MiningError::schema(
                "process model requires at least one activity",
            ));
        }
        if let Some(step) = steps.iter().find(|s| s.activity.trim().is_empty()) {
            return Err(MiningError::schema(format!(
                "process model step with sort key {} has an empty activity",
                step.sort_key
            )));
        }
        steps.sort_by_key(|s| s.sort_key);
        self.steps = steps;
        Ok(())
    }

    /// Remove all steps.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Model identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Ordered steps.
    pub fn steps(&self) -> &[ModelStep] {
        &self.steps
    }

    /// Ordered activities.
    pub fn activities(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.activity.as_str()).collect()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// First activity.
    pub fn start_activity(&self) -> Option<&str> {
        self.steps.first().map(|s| s.activity.as_str())
    }

    /// Last activity.
    pub fn end_activity(&self) -> Option<&str> {
        self.steps.last().map(|s| s.activity.as_str())
    }

    /// Consecutive activity pairs.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.steps
            .windows(2)
            .map(|w| (w[0].activity.as_str(), w[1].activity.as_str()))
    }

    /// Check if the model contains an activity.
    pub fn contains_activity(&self, activity: &str) -> bool {
        self.steps.iter().any(|s| s.activity == activity)
    }

    /// Check if `from` is directly followed by `to` somewhere in the model.
    pub fn has_transition(&self, from: &str, to: &str) -> bool {
        self.transitions().any(|(a, b)| a == from && b == to)
    }
}

/// A non-empty set of populated models, borrowed from the caller.
#[derive(Debug, Clone)]
pub struct ModelSet<'a> {
    models: Vec<&'a ProcessModel>,
}

impl<'a> ModelSet<'a> {
    /// Collect models, rejecting an empty set or an empty model.
    pub fn new(models: impl IntoIterator<Item = &'a ProcessModel>) -> Result<Self> {
        let models: Vec<&'a ProcessModel> = models.into_iter().collect();
        if models.is_empty() {
            return Err(MiningError::config("at least one process model is required"));
        }
        if let Some(model) = models.iter().find(|m| m.is_empty()) {
            return Err(MiningError::config(format!(
                "process model {} has no activities",
                model.id()
            )));
        }
        Ok(Self { models })
    }

    /// Models in caller order.
    pub fn models(&self) -> &[&'a ProcessModel] {
        &self.models
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Always false; a model set holds at least one model.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Union of the models' activities.
    pub fn activities(&self) -> BTreeSet<&'a str> {
        self.models
            .iter()
            .copied()
            .flat_map(|m| m.steps.iter().map(|s| s.activity.as_str()))
            .collect()
    }

    /// Check if any model contains an activity.
    pub fn contains_activity(&self, activity: &str) -> bool {
        self.models.iter().any(|m| m.contains_activity(activity))
    }

    /// First activity of each model.
    pub fn start_activities(&self) -> BTreeSet<&'a str> {
        self.models.iter().copied().filter_map(|m| m.start_activity()).collect()
    }

    /// Last activity of each model.
    pub fn end_activities(&self) -> BTreeSet<&'a str> {
        self.models.iter().copied().filter_map(|m| m.end_activity()).collect()
    }

    /// Check if any model allows `from` directly followed by `to`.
    pub fn allows_transition(&self, from: &str, to: &str) -> bool {
        self.models.iter().any(|m| m.has_transition(from, to))
    }
}
