//! The Call-Graph Builder (§4.4): links [`Frame`] records into an arena of [`Node`]s by
//! resolving call-target addresses against a [`SymbolMap`].
//!
//! The graph is an arena (`Vec<Node>` indexed by [`NodeId`]) rather than `Rc<RefCell<Node>>` —
//! call graphs are cyclic by construction (recursion, mutual recursion), and an arena lets both
//! directions of an edge be plain indices instead of reference-counted back-pointers.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::diagnostics::Diagnostic;
use crate::frame::Frame;

/// The address → (name, section) table used to resolve call targets into graph nodes (§3).
///
/// Built by the object-reading layer from `nm -S --defined-only` output, or the object's own
/// ELF symbol table as a fallback, and handed to the builder unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SymbolMap {
    entries: HashMap<u64, (String, Option<String>)>,
}

impl SymbolMap {
    /// Creates an empty symbol map.
    pub fn new() -> Self {
        SymbolMap {
            entries: HashMap::new(),
        }
    }

    /// Records a symbol at `address`.
    pub fn insert(&mut self, address: u64, name: impl Into<String>, section: Option<String>) {
        self.entries.insert(address, (name.into(), section));
    }

    /// Looks up the symbol at `address`, if any.
    pub fn get(&self, address: u64) -> Option<(&str, Option<&str>)> {
        self.entries
            .get(&address)
            .map(|(name, section)| (name.as_str(), section.as_deref()))
    }

    /// Number of symbols in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(u64, String, Option<String>)> for SymbolMap {
    fn from_iter<I: IntoIterator<Item = (u64, String, Option<String>)>>(iter: I) -> Self {
        let mut map = SymbolMap::new();
        for (address, name, section) in iter {
            map.insert(address, name, section);
        }
        map
    }
}

/// A stable index into a [`CallGraph`]'s node arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// One function in the linked call graph (§3).
#[derive(Clone, Debug)]
pub struct Node {
    /// The function's entry point address.
    pub address: u64,
    /// The function's symbol name.
    pub name: String,
    /// The originating object/section identifier, carried opaquely for presentation.
    pub section: Option<String>,
    /// Bytes this function consumes on the stack by itself, independent of its callees.
    pub own_stack: u64,
    /// Set when the function contains a stack-pointer adjustment of unknown magnitude.
    pub dynamic_stack: bool,
    /// Set when the function contains a call through a register or memory operand.
    pub has_indirect_call: bool,
    /// Number of instruction lines in this function's body that could not be parsed at all.
    pub malformed_lines: u32,
    /// Functions this node calls directly, resolved to graph nodes.
    pub callees: Vec<NodeId>,
    /// Functions that call this node directly.
    pub callers: Vec<NodeId>,
    /// Set by the cycle detector when this node participates in an SCC of size >1 or a
    /// self-loop.
    pub in_cycle: bool,
    /// Assigned by the cycle detector: the index of this node's strongly connected component.
    /// Every node gets one, including singleton components; two nodes share an `scc_id` iff they
    /// are mutually reachable. The stack propagator uses this, not DFS visitation state, to tell
    /// a true cycle-mate from an ordinary callee that merely hasn't been visited yet.
    pub scc_id: u32,
    /// Filled by the stack propagator: the worst-case cumulative stack consumption reachable
    /// through this function.
    pub total_stack: u64,
    /// Set by the stack propagator when `total_stack` was derived through or from a cyclic,
    /// indirect-call, or dynamic-stack node, meaning the true total may be larger.
    pub total_is_lower_bound: bool,
}

/// The linked, directed (and possibly cyclic) call graph produced from a set of [`Frame`]s.
#[derive(Clone, Debug, Default)]
pub struct CallGraph {
    nodes: Vec<Node>,
}

impl CallGraph {
    /// Links `frames` against `symbols` into a [`CallGraph`], resolving call targets to
    /// [`NodeId`]s and recording an [`Diagnostic::UnresolvedCallee`] for every target address
    /// that resolves to no known function (§4.4).
    ///
    /// Frames are kept in their input order; a frame's [`NodeId`] equals its index in that
    /// order, which is also the iteration order `nodes()` and `node()` agree on.
    pub fn link(frames: Vec<Frame>, symbols: &SymbolMap) -> (Self, Vec<Diagnostic>) {
        let address_to_id: HashMap<u64, NodeId> = frames
            .iter()
            .enumerate()
            .map(|(index, frame)| (frame.address, NodeId(index)))
            .collect();

        let mut nodes: Vec<Node> = frames
            .iter()
            .map(|frame| Node {
                address: frame.address,
                name: frame.name.clone(),
                section: frame.section.clone().or_else(|| {
                    symbols
                        .get(frame.address)
                        .and_then(|(_, section)| section)
                        .map(str::to_string)
                }),
                own_stack: frame.own_stack,
                dynamic_stack: frame.dynamic_stack,
                has_indirect_call: frame.has_indirect_call,
                malformed_lines: frame.malformed_lines,
                callees: Vec::new(),
                callers: Vec::new(),
                in_cycle: false,
                scc_id: 0,
                total_stack: 0,
                total_is_lower_bound: false,
            })
            .collect();

        let mut diagnostics = Vec::new();
        for (index, frame) in frames.iter().enumerate() {
            let caller = NodeId(index);
            let mut callees: IndexSet<NodeId> = IndexSet::new();
            for &target in &frame.call_targets {
                match address_to_id.get(&target) {
                    Some(&callee) => {
                        if callees.insert(callee) {
                            nodes[callee.0].callers.push(caller);
                        }
                    }
                    None => {
                        diagnostics.push(Diagnostic::UnresolvedCallee(frame.name.clone(), target));
                    }
                }
            }
            nodes[caller.0].callees = callees.into_iter().collect();
        }

        (CallGraph { nodes }, diagnostics)
    }

    /// The number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutable access to a node by id, used by the stack propagator.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Iterates over every node id in the graph, in frame order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Iterates over every node in the graph, in frame order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(address: u64, name: &str, own_stack: u64, calls: Vec<u64>) -> Frame {
        Frame {
            address,
            name: name.to_string(),
            section: None,
            own_stack,
            call_targets: calls,
            dynamic_stack: false,
            has_indirect_call: false,
            malformed_lines: 0,
        }
    }

    #[test]
    fn resolved_calls_link_both_directions() {
        let frames = vec![
            frame(0x100, "a", 16, vec![0x200]),
            frame(0x200, "b", 8, vec![]),
        ];
        let (graph, diagnostics) = CallGraph::link(frames, &SymbolMap::new());
        assert!(diagnostics.is_empty());
        let a = NodeId(0);
        let b = NodeId(1);
        assert_eq!(graph.node(a).callees, vec![b]);
        assert_eq!(graph.node(b).callers, vec![a]);
    }

    #[test]
    fn unresolved_call_is_dropped_and_diagnosed() {
        let frames = vec![frame(0x100, "a", 16, vec![0xdead])];
        let (graph, diagnostics) = CallGraph::link(frames, &SymbolMap::new());
        assert!(graph.node(NodeId(0)).callees.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnresolvedCallee("a".to_string(), 0xdead)]
        );
    }

    #[test]
    fn self_recursion_links_node_to_itself() {
        let frames = vec![frame(0x100, "a", 16, vec![0x100])];
        let (graph, diagnostics) = CallGraph::link(frames, &SymbolMap::new());
        assert!(diagnostics.is_empty());
        let a = NodeId(0);
        assert_eq!(graph.node(a).callees, vec![a]);
        assert_eq!(graph.node(a).callers, vec![a]);
    }

    #[test]
    fn section_falls_back_to_the_symbol_map_when_the_frame_has_none() {
        let frames = vec![frame(0x100, "a", 16, vec![])];
        let mut symbols = SymbolMap::new();
        symbols.insert(0x100, "a", Some(".text".to_string()));
        let (graph, _) = CallGraph::link(frames, &symbols);
        assert_eq!(graph.node(NodeId(0)).section.as_deref(), Some(".text"));
    }
}
