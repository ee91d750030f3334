// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notifications emitted by state machine mutations.

use crate::node::NodeId;
use crate::transition::TransitionId;

/// A structural change to a state machine.
///
/// Queued by the machine during mutation and drained by external consumers
/// (an editor panel, a debugger overlay) via
/// [`StateMachine::take_events`](crate::StateMachine::take_events). Runtime
/// players do not need these; stale [`NodeId`] lookups already observe
/// deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// A node was added
    NodeAdded {
        /// Index of the node in declaration order
        index: usize,
        /// Handle of the node
        node: NodeId,
    },
    /// A node was removed, after all transitions touching it were removed
    NodeRemoved {
        /// Index the node occupied before removal
        index: usize,
        /// Handle of the removed node
        node: NodeId,
    },
    /// A transition was added to a node
    TransitionAdded {
        /// Owning (source) node
        node: NodeId,
        /// Handle of the new transition
        transition: TransitionId,
    },
    /// A transition was removed from a node
    TransitionRemoved {
        /// Owning (source) node
        node: NodeId,
        /// Handle of the removed transition
        transition: TransitionId,
    },
    /// A variable was renamed; all conditions have already been rewritten
    VariableRenamed {
        /// Previous name
        old: String,
        /// New name
        new: String,
    },
}
