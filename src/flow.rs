use std::fmt;

use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::unit::UnitType;

/// A validated execution order of units of work.
///
/// Every unit appears exactly once and after all of its dependencies. The
/// flow only describes the order, running the units is left to an executor
/// which walks [`Flow::units`] front to back.
#[derive(Debug, Clone)]
pub struct Flow {
    units: Vec<UnitType>,
    stages: Vec<Vec<UnitType>>,
    graph: DependencyGraph,
}

impl Flow {
    pub(crate) fn new(stages: Vec<Vec<UnitType>>, graph: DependencyGraph) -> Self {
        Self {
            units: stages.iter().flatten().copied().collect(),
            stages,
            graph,
        }
    }

    /// Units in execution order.
    pub fn units(&self) -> &[UnitType] {
        &self.units
    }

    /// Units grouped by the solver round which released them. Units in the
    /// same stage do not depend on each other.
    pub fn stages(&self) -> &[Vec<UnitType>] {
        &self.stages
    }

    /// The fully assembled graph the order was derived from.
    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, unit: UnitType) -> bool {
        self.units.contains(&unit.declaring())
    }

    /// Position of `unit` in the execution order.
    pub fn position(&self, unit: UnitType) -> Option<usize> {
        let unit = unit.declaring();
        self.units.iter().position(|u| *u == unit)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnitType> {
        self.units.iter()
    }

    pub fn plan(&self) -> FlowPlan {
        FlowPlan {
            stages: self
                .stages
                .iter()
                .map(|stage| stage.iter().map(UnitType::name).collect())
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Flow {
    type Item = &'a UnitType;
    type IntoIter = std::slice::Iter<'a, UnitType>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Renders the flow as a mermaid diagram, nodes numbered in execution order
/// and edges pointing from a prerequisite to the unit waiting on it.
impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "graph LR")?;

        for (index, unit) in self.units.iter().enumerate() {
            let name = unit
                .name()
                .replace('"', "\\\"")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            writeln!(f, "    {index}[\"{name}\"]")?;
        }

        for (unit, prerequisite, kind) in self.graph.edges() {
            let (Some(source), Some(target)) = (self.position(prerequisite), self.position(unit))
            else {
                continue;
            };
            writeln!(f, "    {source} -- \"{}\" --> {target}", kind.as_str())?;
        }

        Ok(())
    }
}

/// Serializable summary of a [`Flow`], unit names grouped by stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowPlan {
    pub stages: Vec<Vec<&'static str>>,
}

impl FlowPlan {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKind;
    use std::marker::PhantomData;

    use crate::unit::Bizlogic;

    struct Fetch;
    struct Price;

    impl Bizlogic for Fetch {}
    impl Bizlogic for Price {}

    fn make_flow() -> Flow {
        let fetch = UnitType::of::<Fetch>();
        let price = UnitType::of::<Price>();

        let mut graph = DependencyGraph::new();
        graph.add_dependency(price, fetch, EdgeKind::Data);

        Flow::new(vec![vec![fetch], vec![price]], graph)
    }

    #[test]
    fn test_accessors() {
        let flow = make_flow();

        assert_eq!(flow.len(), 2);
        assert!(!flow.is_empty());
        assert_eq!(flow.position(UnitType::of::<Fetch>()), Some(0));
        assert_eq!(flow.position(UnitType::of::<Price>()), Some(1));
        assert!(flow.contains(UnitType::of::<Price>()));
        assert_eq!(flow.iter().count(), 2);
        assert_eq!((&flow).into_iter().next(), Some(&UnitType::of::<Fetch>()));
    }

    #[test]
    fn test_mermaid() {
        let text = make_flow().to_string();

        assert!(text.starts_with("graph LR\n"));
        assert!(text.contains("0[\""));
        assert!(text.contains("0 -- \"data\" --> 1"));
    }

    struct Retry<T>(PhantomData<T>);

    impl<T: 'static> Bizlogic for Retry<T> {}

    #[test]
    fn test_mermaid_escapes_generic_names() {
        let retry = UnitType::of::<Retry<Fetch>>();
        let flow = Flow::new(vec![vec![retry]], DependencyGraph::new());
        let text = flow.to_string();

        let label = text.lines().nth(1).unwrap();
        assert!(label.contains("Retry&lt;"));
        assert!(label.ends_with("&gt;\"]"));
        assert!(!label.contains('<'));
        assert!(!label.contains('>'));
    }

    #[test]
    fn test_plan_json() {
        let plan = make_flow().plan();
        assert_eq!(plan.stages.len(), 2);

        let json = plan.to_json().unwrap();
        assert!(json.starts_with(r#"{"stages":[[""#));
        assert!(json.contains("Fetch"));
    }
}
