//! The Cycle Detector (§4.5): marks every node that participates in a directed cycle.
//!
//! Strongly connected components are found with Tarjan's algorithm, but driven by an explicit
//! work stack rather than function-call recursion. Some of the call graphs this analyzer is
//! pointed at are synthetic and deeply chained (hundreds of frames in a single recursive walk);
//! a machine-recursive implementation would overflow the thread stack on exactly the inputs
//! this tool exists to analyze.

use crate::diagnostics::Diagnostic;
use crate::graph::{CallGraph, NodeId};

#[derive(Clone, Copy)]
struct NodeState {
    index: u32,
    low_link: u32,
    on_stack: bool,
}

/// One step of the iterative Tarjan walk: either the first visit to a node (push its
/// successors) or the second visit (pop and compute its low-link after its successors are
/// done).
enum Frame {
    Enter(NodeId),
    Exit(NodeId),
}

/// Runs Tarjan's algorithm over `graph`, returning the set of SCCs of size greater than one or
/// containing a self-loop, each represented as its member `NodeId`s.
fn strongly_connected_components(graph: &CallGraph) -> Vec<Vec<NodeId>> {
    let mut state: Vec<Option<NodeState>> = vec![None; graph.len()];
    let mut index_counter = 0u32;
    let mut stack: Vec<NodeId> = Vec::new();
    let mut components = Vec::new();

    for start in graph.node_ids() {
        if state[node_index(start)].is_some() {
            continue;
        }
        let mut work = vec![Frame::Enter(start)];
        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(id) => {
                    if state[node_index(id)].is_some() {
                        continue;
                    }
                    state[node_index(id)] = Some(NodeState {
                        index: index_counter,
                        low_link: index_counter,
                        on_stack: true,
                    });
                    index_counter += 1;
                    stack.push(id);
                    work.push(Frame::Exit(id));
                    for &successor in &graph.node(id).callees {
                        match state[node_index(successor)] {
                            None => work.push(Frame::Enter(successor)),
                            Some(s) if s.on_stack => {
                                let current = state[node_index(id)].unwrap();
                                state[node_index(id)] = Some(NodeState {
                                    low_link: current.low_link.min(s.index),
                                    ..current
                                });
                            }
                            Some(_) => {}
                        }
                    }
                }
                Frame::Exit(id) => {
                    for &successor in &graph.node(id).callees {
                        if let Some(s) = state[node_index(successor)] {
                            if s.on_stack {
                                let current = state[node_index(id)].unwrap();
                                state[node_index(id)] = Some(NodeState {
                                    low_link: current.low_link.min(s.low_link),
                                    ..current
                                });
                            }
                        }
                    }

                    let current = state[node_index(id)].unwrap();
                    if current.low_link == current.index {
                        let mut component = Vec::new();
                        while let Some(member) = stack.pop() {
                            let member_state = state[node_index(member)].unwrap();
                            state[node_index(member)] = Some(NodeState {
                                on_stack: false,
                                ..member_state
                            });
                            component.push(member);
                            if member == id {
                                break;
                            }
                        }
                        components.push(component);
                    }
                }
            }
        }
    }

    components
}

fn node_index(id: NodeId) -> usize {
    id.index()
}

/// Marks every cyclic node in `graph` and returns one [`Diagnostic::CycleEntry`] per SCC of size
/// greater than one, naming the member with the lowest address as the deterministic
/// representative.
///
/// Every node is assigned an `scc_id`, including nodes that belong to a singleton,
/// non-cyclic component — the stack propagator relies on this to identify cycle-mates
/// regardless of the order it happens to visit them in.
pub fn detect_cycles(graph: &mut CallGraph) -> Vec<Diagnostic> {
    let components = strongly_connected_components(graph);
    let mut diagnostics = Vec::new();

    for (scc_id, component) in components.into_iter().enumerate() {
        let scc_id = scc_id as u32;
        for &id in &component {
            graph.node_mut(id).scc_id = scc_id;
        }

        let is_cycle = component.len() > 1
            || component
                .first()
                .map(|&id| graph.node(id).callees.contains(&id))
                .unwrap_or(false);
        if !is_cycle {
            continue;
        }

        let representative = component
            .iter()
            .min_by_key(|&&id| graph.node(id).address)
            .copied();

        for &id in &component {
            graph.node_mut(id).in_cycle = true;
        }

        if let Some(representative) = representative {
            diagnostics.push(Diagnostic::CycleEntry(
                graph.node(representative).name.clone(),
            ));
        }
    }

    diagnostics
}
