// SPDX-License-Identifier: MIT OR Apache-2.0
//! The state machine: ordered nodes, variables, and an entry node.

use crate::event::GraphEvent;
use crate::node::{NodeId, NodeKind, StateNode};
use crate::transition::{Transition, TransitionId};
use crate::variable::VariableSet;
use indexmap::IndexMap;
use uuid::Uuid;

/// Unique identifier for a state machine instance.
///
/// Runtime identity only; players use it to detect rebinding. Never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineId(pub Uuid);

impl MachineId {
    /// Create a new random machine ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MachineId {
    fn default() -> Self {
        Self::new()
    }
}

/// An animation state machine.
///
/// Owns its nodes (which own their outgoing transitions, which own their
/// conditions) and its variables. All cross-references are [`NodeId`] or
/// variable-name lookups that resolve to `None` once the target is gone;
/// nothing holds a dangling handle because every removal strips referencing
/// transitions first.
///
/// Persistence goes through [`crate::schema`], which rewrites node handles
/// into declaration-order indices.
#[derive(Debug, Clone)]
pub struct StateMachine {
    id: MachineId,
    /// Machine name
    pub name: String,
    nodes: IndexMap<NodeId, StateNode>,
    variables: VariableSet,
    entry: Option<NodeId>,
    pending_events: Vec<GraphEvent>,
}

impl StateMachine {
    /// Create a new empty machine
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MachineId::new(),
            name: name.into(),
            nodes: IndexMap::new(),
            variables: VariableSet::new(),
            entry: None,
            pending_events: Vec::new(),
        }
    }

    /// Create a new machine with a default "Entry" clip node, the shape an
    /// editor starts from.
    pub fn new_with_entry(name: impl Into<String>) -> Self {
        let mut machine = Self::new(name);
        machine.add_node(
            "Entry",
            NodeKind::Clip {
                animation: crate::node::AnimationRef::new(""),
            },
        );
        machine
    }

    /// Runtime identity of this machine instance
    pub fn id(&self) -> MachineId {
        self.id
    }

    // --- nodes ---

    /// Append a new node. The first node added becomes the entry node.
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let node = StateNode::new(name, kind);
        let id = node.id;
        self.nodes.insert(id, node);
        if self.entry.is_none() {
            self.entry = Some(id);
        }
        self.pending_events.push(GraphEvent::NodeAdded {
            index: self.nodes.len() - 1,
            node: id,
        });
        id
    }

    /// Remove a node, cascading first through every transition that touches
    /// it.
    ///
    /// All transitions with `from` or `to` equal to the node are removed
    /// before the node itself, so no transition ever references a node absent
    /// from the machine. If the removed node was the entry, the entry falls
    /// back to the first remaining node, or none.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<StateNode> {
        if !self.nodes.contains_key(&node_id) {
            return None;
        }

        for node in self.nodes.values_mut() {
            let mut kept = Vec::with_capacity(node.transitions.len());
            for transition in node.transitions.drain(..) {
                if transition.involves_node(node_id) {
                    self.pending_events.push(GraphEvent::TransitionRemoved {
                        node: node.id,
                        transition: transition.id,
                    });
                } else {
                    kept.push(transition);
                }
            }
            node.transitions = kept;
        }

        // shift_remove keeps declaration order, which is the index key the
        // persisted schema relies on.
        let index = self.nodes.get_index_of(&node_id)?;
        let removed = self.nodes.shift_remove(&node_id)?;

        if self.entry == Some(node_id) {
            self.entry = self.nodes.keys().next().copied();
        }

        self.pending_events.push(GraphEvent::NodeRemoved {
            index,
            node: node_id,
        });
        Some(removed)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&StateNode> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut StateNode> {
        self.nodes.get_mut(&node_id)
    }

    /// Get a node by declaration-order index
    pub fn node_at(&self, index: usize) -> Option<&StateNode> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    /// Get the declaration-order index of a node
    pub fn node_index(&self, node_id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&node_id)
    }

    /// Get all nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &StateNode> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // --- entry node ---

    /// The entry node, if the machine has any nodes
    pub fn entry_node(&self) -> Option<NodeId> {
        self.entry
    }

    /// The entry node's declaration-order index
    pub fn entry_node_idx(&self) -> Option<usize> {
        self.entry.and_then(|id| self.nodes.get_index_of(&id))
    }

    /// Set the entry node. An unknown node clears the entry.
    pub fn set_entry_node(&mut self, node_id: NodeId) {
        self.entry = self.nodes.contains_key(&node_id).then_some(node_id);
    }

    /// Set the entry node by index. An out-of-range index clears the entry.
    pub fn set_entry_node_idx(&mut self, index: usize) {
        self.entry = self.nodes.get_index(index).map(|(id, _)| *id);
    }

    /// Clear the entry node without touching the node list
    pub fn clear_entry_node(&mut self) {
        self.entry = None;
    }

    // --- transitions ---

    /// Create a transition between two nodes, owned by `from`.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<TransitionId, GraphError> {
        if from == to {
            return Err(GraphError::SelfLoop);
        }
        if !self.nodes.contains_key(&to) {
            return Err(GraphError::NodeNotFound(to));
        }
        let node = self
            .nodes
            .get_mut(&from)
            .ok_or(GraphError::NodeNotFound(from))?;

        let transition = Transition::new(from, to);
        let id = transition.id;
        node.transitions.push(transition);
        self.pending_events.push(GraphEvent::TransitionAdded {
            node: from,
            transition: id,
        });
        Ok(id)
    }

    /// Remove a transition from its owning node
    pub fn remove_transition(
        &mut self,
        from: NodeId,
        transition_id: TransitionId,
    ) -> Option<Transition> {
        let node = self.nodes.get_mut(&from)?;
        let removed = node.remove_transition(transition_id)?;
        self.pending_events.push(GraphEvent::TransitionRemoved {
            node: from,
            transition: transition_id,
        });
        Some(removed)
    }

    // --- variables ---

    /// The machine's variables
    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    /// The machine's variables, mutable
    pub fn variables_mut(&mut self) -> &mut VariableSet {
        &mut self.variables
    }

    /// Create a new float variable with an automatically chosen unique name
    pub fn create_variable(&mut self) -> String {
        self.variables.create_unique()
    }

    /// Find-or-create a variable and set it to a float value
    pub fn set_float(&mut self, name: &str, value: f32) {
        self.variables.set_float(name, value);
    }

    /// Find-or-create a variable and set it to a bool value
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.variables.set_bool(name, value);
    }

    /// Find-or-create a variable and raise it as a trigger
    pub fn set_trigger(&mut self, name: &str) {
        self.variables.set_trigger(name);
    }

    /// Remove a variable.
    ///
    /// Conditions referencing it are left alone; they fail soft to
    /// "not fulfilled" until the name exists again.
    pub fn remove_variable(&mut self, name: &str) -> bool {
        self.variables.remove(name).is_some()
    }

    /// Rename a variable and rewrite every condition referencing the old
    /// name, across all nodes and transitions.
    ///
    /// Returns `false` (changing nothing) if `old` does not exist or `new`
    /// is already taken.
    pub fn rename_variable(&mut self, old: &str, new: &str) -> bool {
        if !self.variables.rename(old, new) {
            return false;
        }
        if old == new {
            return true;
        }
        for node in self.nodes.values_mut() {
            for transition in &mut node.transitions {
                for condition in &mut transition.conditions {
                    if condition.variable == old {
                        condition.variable = new.to_string();
                    }
                }
            }
        }
        self.pending_events.push(GraphEvent::VariableRenamed {
            old: old.to_string(),
            new: new.to_string(),
        });
        true
    }

    // --- bulk ---

    /// Remove all variables and all nodes
    pub fn clear(&mut self) {
        self.variables.clear();
        while let Some(&id) = self.nodes.keys().next() {
            self.remove_node(id);
        }
        self.entry = None;
    }

    /// Drain the queued change notifications
    pub fn take_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when mutating a state machine
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Self-loop not allowed
    #[error("Self-transition not allowed")]
    SelfLoop,
}
