//! The dependency graph over rendered units.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::render::UnitDescriptor;

/// Dependency edges between units, derived from `requires` and `after`.
///
/// Only edges between units present in the same render participate;
/// references to external units such as `network.target` do not
/// constrain ordering here.
#[derive(Debug, Clone)]
pub struct UnitGraph {
    nodes: BTreeMap<String, Vec<String>>,
}

impl UnitGraph {
    /// Build the graph for a set of units.
    #[must_use]
    pub fn build(units: &[UnitDescriptor]) -> Self {
        let names: BTreeSet<&str> = units.iter().map(|u| u.name.as_str()).collect();
        let mut nodes = BTreeMap::new();
        for unit in units {
            let mut deps: Vec<String> = Vec::new();
            for dep in unit.requires.iter().chain(unit.after.iter()) {
                if names.contains(dep.as_str()) && !deps.contains(dep) {
                    deps.push(dep.clone());
                }
            }
            nodes.insert(unit.name.clone(), deps);
        }
        Self { nodes }
    }

    /// The number of units in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the graph has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Units in dependency order: every unit appears after its dependencies.
    ///
    /// Units without ordering constraints between them come out in name
    /// order, so the result is fully deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CyclicDependency`] naming the units involved when
    /// the graph contains a cycle. No partial order is produced.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (name, deps) in &self.nodes {
            in_degree.entry(name.as_str()).or_insert(0);
            for dep in deps {
                *in_degree.entry(name.as_str()).or_insert(0) += 1;
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(name.as_str());
            }
        }

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut order = Vec::new();
        while let Some(next) = ready.pop_first() {
            order.push(next.to_string());
            if let Some(waiting) = dependents.get(next) {
                for dependent in waiting {
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.insert(dependent);
                        }
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let units: Vec<String> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(name, _)| (*name).to_string())
                .collect();
            return Err(Error::CyclicDependency { units });
        }
        Ok(order)
    }
}
