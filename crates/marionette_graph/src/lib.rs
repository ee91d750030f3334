// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation state machine data model for Marionette.
//!
//! This crate provides the control-layer graph that decides which animation
//! clip is active:
//! - State nodes (single clips or variable-blended pairs)
//! - Conditional transitions with typed comparator predicates
//! - Named runtime variables (float / bool / trigger)
//! - Layers restricting machines to bone subsets
//! - An index-based persisted schema
//!
//! ## Architecture
//!
//! Ownership is hierarchical: a [`StateMachine`] owns its nodes, a node owns
//! its outgoing transitions, a transition owns its conditions. Everything
//! else is a [`NodeId`] or variable-name lookup that observes deletion by
//! resolving to `None`; node removal cascades through referencing transitions
//! before freeing the node, so handles never dangle.
//!
//! The runtime driver that walks the machine lives in `marionette_runtime`.

pub mod condition;
pub mod event;
pub mod graph;
pub mod layer;
pub mod node;
pub mod schema;
pub mod transition;
pub mod variable;

pub use condition::{Condition, Predicate};
pub use event::GraphEvent;
pub use graph::{GraphError, MachineId, StateMachine};
pub use layer::{BoneMask, Layer};
pub use node::{AnimationRef, NodeId, NodeKind, StateNode};
pub use transition::{Transition, TransitionId};
pub use variable::{Variable, VariableSet, VariableType, VariableValue};
