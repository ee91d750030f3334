// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transition (edge) definitions for the state machine.

use crate::condition::Condition;
use crate::node::NodeId;
use crate::variable::VariableSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionId(pub Uuid);

impl TransitionId {
    /// Create a new random transition ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransitionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A directed, conditional edge between two state nodes.
///
/// Owned by its `from` node. Cross-references its endpoints by [`NodeId`];
/// the owning machine guarantees no transition outlives either endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// Unique transition ID
    pub id: TransitionId,
    /// Source node ID
    pub from: NodeId,
    /// Target node ID
    pub to: NodeId,
    /// Cross-fade length in seconds; zero means a hard cut
    pub duration_seconds: f32,
    /// Whether the transition may fire before the source clip finishes
    pub immediate: bool,
    /// Conditions that must all hold for the transition to fire
    pub conditions: Vec<Condition>,
}

impl Transition {
    /// Create a new transition with no conditions
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            id: TransitionId::new(),
            from,
            to,
            duration_seconds: 0.0,
            immediate: false,
            conditions: Vec::new(),
        }
    }

    /// Check if this transition involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from == node_id || self.to == node_id
    }

    /// Evaluate all conditions against a variable set.
    ///
    /// Logical AND, vacuously true with no conditions, short-circuiting on
    /// the first unfulfilled condition.
    pub fn conditions_fulfilled(&self, variables: &VariableSet) -> bool {
        self.conditions.iter().all(|c| c.is_fulfilled(variables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Predicate;

    #[test]
    fn test_no_conditions_is_vacuously_fulfilled() {
        let transition = Transition::new(NodeId::new(), NodeId::new());
        assert!(transition.conditions_fulfilled(&VariableSet::new()));
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let mut vars = VariableSet::new();
        vars.set_float("Speed", 1.0);
        vars.set_bool("Grounded", false);

        let mut transition = Transition::new(NodeId::new(), NodeId::new());
        transition
            .conditions
            .push(Condition::new("Speed", Predicate::Greater(0.5)));
        transition
            .conditions
            .push(Condition::new("Grounded", Predicate::IsTrue));
        assert!(!transition.conditions_fulfilled(&vars));

        vars.set_bool("Grounded", true);
        assert!(transition.conditions_fulfilled(&vars));
    }

    #[test]
    fn test_involves_node() {
        let a = NodeId::new();
        let b = NodeId::new();
        let transition = Transition::new(a, b);
        assert!(transition.involves_node(a));
        assert!(transition.involves_node(b));
        assert!(!transition.involves_node(NodeId::new()));
    }
}
