//! The Stack Propagator (§4.6): computes, for every node, `total_stack = own_stack +
//! max(callee.total_stack)`, and classifies each total as exact or a lower bound.
//!
//! Traversal is a post-order walk driven by an explicit stack rather than machine recursion, for
//! the same reason the [cycle detector](crate::cycle) avoids recursion: the graphs this tool is
//! built to analyze can be hundreds of frames deep.

use crate::graph::{CallGraph, NodeId};

#[derive(Clone, Copy)]
enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

/// Computes `total_stack` and `total_is_lower_bound` for every node in `graph`.
///
/// Must run after [`crate::cycle::detect_cycles`] has set `in_cycle` and `scc_id` on every
/// node. Nodes in a cycle are resolved to one pointer-width pass through the cycle: their total
/// is `own_stack + max(total_stack of callees outside the cycle)`, ignoring callees that share
/// the node's own `scc_id` — a true cycle-mate, not merely a callee this particular walk hasn't
/// reached yet — and flagged as a lower bound per §3's invariant for cyclic nodes.
pub fn propagate(graph: &mut CallGraph) {
    let mut settled = vec![false; graph.len()];

    for start in graph.node_ids() {
        if settled[start.index()] {
            continue;
        }
        let mut work = vec![Step::Enter(start)];
        let mut on_path = vec![false; graph.len()];

        while let Some(step) = work.pop() {
            match step {
                Step::Enter(id) => {
                    if settled[id.index()] {
                        continue;
                    }
                    if on_path[id.index()] {
                        // Revisited while already on the current path: part of the same cycle
                        // as an ancestor frame. Leave it for that ancestor's cyclic resolution.
                        continue;
                    }
                    on_path[id.index()] = true;
                    work.push(Step::Exit(id));
                    for &callee in &graph.node(id).callees {
                        if !settled[callee.index()] && !on_path[callee.index()] {
                            work.push(Step::Enter(callee));
                        }
                    }
                }
                Step::Exit(id) => {
                    if settled[id.index()] {
                        continue;
                    }
                    resolve(graph, id);
                    settled[id.index()] = true;
                    on_path[id.index()] = false;
                }
            }
        }
    }
}

fn resolve(graph: &mut CallGraph, id: NodeId) {
    let node = graph.node(id);
    let own_stack = node.own_stack;
    let scc_id = node.scc_id;
    let mut lower_bound = node.in_cycle || node.dynamic_stack || node.has_indirect_call;

    let mut max_child_total = 0u64;
    for &callee in &node.callees.clone() {
        let callee_node = graph.node(callee);
        if callee_node.scc_id == scc_id {
            // Cycle-mate of `id`: one pass through the cycle is already captured by
            // `own_stack`/`in_cycle` above, so its total_stack is not folded in here.
            continue;
        }
        max_child_total = max_child_total.max(callee_node.total_stack);
        if callee_node.total_is_lower_bound {
            lower_bound = true;
        }
    }

    let node = graph.node_mut(id);
    node.total_stack = own_stack + max_child_total;
    node.total_is_lower_bound = lower_bound;
}
