//! Directly-follows process flow.
//!
//! Builds the nodes and edges a renderer needs to draw a process flow
//! diagram: one node per activity plus `Start`/`End` pseudo-nodes, and one
//! edge per observed directly-follows pair, each weighted by the number of
//! cases that take it. Rendering is left to the caller.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::Result;
use crate::kpi::KpiColumns;
use crate::models::Trace;
use crate::view::{DataView, WithKpis};

/// Node of a process flow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlowNode {
    /// Before the first event of a case.
    Start,
    /// An activity.
    Activity(String),
    /// After the last event of a case.
    End,
}

impl FlowNode {
    /// Activity node.
    pub fn activity(name: impl Into<String>) -> Self {
        FlowNode::Activity(name.into())
    }
}

impl fmt::Display for FlowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowNode::Start => f.write_str("Start"),
            FlowNode::Activity(name) => f.write_str(name),
            FlowNode::End => f.write_str("End"),
        }
    }
}

/// A directly-follows pair.
pub type Transition = (FlowNode, FlowNode);

/// All transitions of a trace, including `Start` and `End`.
pub fn trace_transitions(trace: &Trace) -> Vec<Transition> {
    let (Some(first), Some(last)) = (trace.first_activity(), trace.last_activity()) else {
        return Vec::new();
    };
    let mut transitions = Vec::with_capacity(trace.len() + 1);
    transitions.push((FlowNode::Start, FlowNode::activity(first)));
    transitions.extend(
        trace
            .edges()
            .map(|(from, to)| (FlowNode::activity(from), FlowNode::activity(to))),
    );
    transitions.push((FlowNode::activity(last), FlowNode::End));
    transitions
}

/// Node with the number of cases passing through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNodeStats {
    /// Node.
    pub node: FlowNode,
    /// Distinct cases visiting the node.
    pub cases: usize,
    /// Visits (repeats counted).
    pub frequency: usize,
}

/// Edge with the number of cases taking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Source node.
    pub from: FlowNode,
    /// Target node.
    pub to: FlowNode,
    /// Distinct cases taking the edge.
    pub cases: usize,
    /// Traversals (repeats counted).
    pub frequency: usize,
}

/// Directly-follows graph of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessFlow {
    nodes: Vec<FlowNodeStats>,
    edges: Vec<FlowEdge>,
}

impl ProcessFlow {
    /// Discover the flow of a view.
    pub fn discover(view: &dyn DataView) -> Self {
        let mut nodes: BTreeMap<FlowNode, (usize, usize)> = BTreeMap::new();
        let mut edges: BTreeMap<Transition, (usize, usize)> = BTreeMap::new();

        for trace in view.event_log().traces() {
            let transitions = trace_transitions(&trace);
            let mut seen_nodes = HashSet::new();
            let mut seen_edges = HashSet::new();

            for (from, to) in &transitions {
                let stats = nodes.entry(to.clone()).or_default();
                stats.1 += 1;
                if seen_nodes.insert(to.clone()) {
                    stats.0 += 1;
                }

                let stats = edges.entry((from.clone(), to.clone())).or_default();
                stats.1 += 1;
                if seen_edges.insert((from.clone(), to.clone())) {
                    stats.0 += 1;
                }
            }
            if !transitions.is_empty() {
                let start = nodes.entry(FlowNode::Start).or_default();
                start.0 += 1;
                start.1 += 1;
            }
        }

        Self {
            nodes: nodes
                .into_iter()
                .map(|(node, (cases, frequency))| FlowNodeStats {
                    node,
                    cases,
                    frequency,
                })
                .collect(),
            edges: edges
                .into_iter()
                .map(|((from, to), (cases, frequency))| FlowEdge {
                    from,
                    to,
                    cases,
                    frequency,
                })
                .collect(),
        }
    }

    /// Nodes, `Start` first and `End` last.
    pub fn nodes(&self) -> &[FlowNodeStats] {
        &self.nodes
    }

    /// Edges ordered by (from, to).
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Look up a node.
    pub fn node(&self, node: &FlowNode) -> Option<&FlowNodeStats> {
        self.nodes.iter().find(|n| &n.node == node)
    }

    /// Look up an edge.
    pub fn edge(&self, from: &FlowNode, to: &FlowNode) -> Option<&FlowEdge> {
        self.edges.iter().find(|e| &e.from == from && &e.to == to)
    }

    /// Edges joined with per-transition KPI columns.
    pub fn edges_with_kpis(
        &self,
        view: &dyn DataView,
        kpis: &[&str],
    ) -> Result<Vec<WithKpis<FlowEdge>>> {
        let frames = view
            .kpi_registry()
            .resolve_all(kpis)?
            .iter()
            .map(|p| p.per_transition(view))
            .collect::<Result<Vec<_>>>()?;

        Ok(self
            .edges
            .iter()
            .map(|edge| {
                let key = (edge.from.clone(), edge.to.clone());
                let mut columns = KpiColumns::new();
                for frame in &frames {
                    frame.join_into(&key, &mut columns);
                }
                WithKpis {
                    row: edge.clone(),
                    kpis: columns,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::models::{Event, EventLog};
    use chrono::NaiveDate;

    fn data() -> ProcessData {
        let t = |m: u32| {
            NaiveDate::from_ymd_opt(2022, 2, 1)
                .unwrap()
                .and_hms_opt(9, m, 0)
                .unwrap()
        };
        let mut data = ProcessData::new();
        data.set_event_log(
            EventLog::new(vec![
                Event::new("1", "a", t(0)),
                Event::new("1", "b", t(1)),
                Event::new("1", "b", t(2)),
                Event::new("2", "a", t(0)),
                Event::new("2", "c", t(1)),
            ])
            .unwrap(),
        )
        .unwrap();
        data
    }

    #[test]
    fn test_trace_transitions() {
        let mut trace = Trace::new("1");
        let t = NaiveDate::from_ymd_opt(2022, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        trace.add_activity("a", t);
        trace.add_activity("b", t);

        assert_eq!(
            trace_transitions(&trace),
            vec![
                (FlowNode::Start, FlowNode::activity("a")),
                (FlowNode::activity("a"), FlowNode::activity("b")),
                (FlowNode::activity("b"), FlowNode::End),
            ]
        );
        assert!(trace_transitions(&Trace::new("2")).is_empty());
    }

    #[test]
    fn test_discover_flow() {
        let flow = ProcessFlow::discover(&data());

        assert_eq!(flow.nodes().first().map(|n| &n.node), Some(&FlowNode::Start));
        assert_eq!(flow.nodes().last().map(|n| &n.node), Some(&FlowNode::End));

        let b = flow.node(&FlowNode::activity("b")).unwrap();
        assert_eq!(b.cases, 1);
        assert_eq!(b.frequency, 2);
        assert_eq!(flow.node(&FlowNode::End).unwrap().cases, 2);

        let b_b = flow
            .edge(&FlowNode::activity("b"), &FlowNode::activity("b"))
            .unwrap();
        assert_eq!(b_b.cases, 1);
        let start_a = flow.edge(&FlowNode::Start, &FlowNode::activity("a")).unwrap();
        assert_eq!(start_a.cases, 2);
        assert_eq!(flow.edges().len(), 6);
    }

    #[test]
    fn test_edges_with_kpis() {
        let data = data();
        let flow = ProcessFlow::discover(&data);
        let edges = flow
            .edges_with_kpis(&data, &["NumberOfCases", "ThroughputTime"])
            .unwrap();

        let a_c = edges
            .iter()
            .find(|e| e.row.from == FlowNode::activity("a") && e.row.to == FlowNode::activity("c"))
            .unwrap();
        assert_eq!(a_c.kpi("NumberOfCases"), Some(1.0));
        assert_eq!(a_c.kpi("ThroughputTimeMean"), Some(60.0));

        let start = edges.iter().find(|e| e.row.from == FlowNode::Start).unwrap();
        assert_eq!(start.kpi("ThroughputTimeMean"), None);
    }
}
