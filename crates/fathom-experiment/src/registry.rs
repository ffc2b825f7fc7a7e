//! Caller-owned registry of named experiments.
//!
//! The [`ExperimentRegistry`] stores experiments keyed by name. Duplicate
//! registrations are rejected; removing an entry hands ownership back.

use std::collections::HashMap;

use crate::error::RegistryError;
use crate::experiment::Experiment;

/// Registry of experiments available to a runner.
#[derive(Debug, Default)]
pub struct ExperimentRegistry {
    experiments: HashMap<String, Experiment>,
}

impl ExperimentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an experiment under its name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is already taken.
    pub fn register(&mut self, experiment: Experiment) -> Result<(), RegistryError> {
        let name = experiment.name().to_owned();
        if self.experiments.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        self.experiments.insert(name, experiment);
        Ok(())
    }

    /// Looks up an experiment by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Experiment> {
        self.experiments.get(name)
    }

    /// Looks up an experiment, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown name.
    pub fn require(&self, name: &str) -> Result<&Experiment, RegistryError> {
        self.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_owned(),
        })
    }

    /// Removes and returns an experiment.
    pub fn remove(&mut self, name: &str) -> Option<Experiment> {
        self.experiments.remove(name)
    }

    /// Returns the registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.experiments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}
