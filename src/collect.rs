//! Discovery of the dependencies units declare about themselves.

use std::collections::HashMap;

use crate::graph::{DependencyGraph, EdgeKind};
use crate::unit::{DataKey, UnitType};

/// Follows the prerequisite declared by every known unit, registering the
/// prerequisite and an edge to it, until no new unit shows up. Returns the
/// number of units discovered this way.
pub(crate) fn expand_declared(graph: &mut DependencyGraph) -> usize {
    let mut pending: Vec<UnitType> = graph.units().collect();
    let mut discovered = 0;

    while let Some(unit) = pending.pop() {
        let Some(prerequisite) = unit.effective_declarations().prerequisite() else {
            continue;
        };

        if graph.add_unit(prerequisite) {
            discovered += 1;
            pending.push(prerequisite.declaring());
        }

        graph.add_dependency(unit, prerequisite, EdgeKind::Declared);
    }

    discovered
}

/// Data items each unit requires, before they are matched with producers.
#[derive(Debug, Clone, Default)]
pub struct DataDependencyMap {
    map: HashMap<UnitType, Vec<DataKey>>,
}

impl DataDependencyMap {
    /// Reads the data requirements declared by every unit in `graph`.
    pub(crate) fn scan(graph: &DependencyGraph) -> Self {
        let map = graph
            .units()
            .filter_map(|unit| {
                let required = unit.effective_declarations().required_data().to_vec();
                (!required.is_empty()).then_some((unit, required))
            })
            .collect();

        Self { map }
    }

    /// Data items required by `unit`, empty if it requires none.
    pub fn requirements(&self, unit: UnitType) -> &[DataKey] {
        self.map
            .get(&unit.declaring())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn requires(&self, unit: UnitType, key: &DataKey) -> bool {
        self.requirements(unit).contains(key)
    }

    /// Number of units with at least one requirement.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitType, &[DataKey])> {
        self.map.iter().map(|(unit, keys)| (*unit, keys.as_slice()))
    }
}
