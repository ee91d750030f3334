// SPDX-License-Identifier: MIT OR Apache-2.0
//! State node definitions.

use crate::transition::{Transition, TransitionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a state node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque reference to an animation clip asset.
///
/// Resolved by the external sampler; the state machine never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationRef(pub String);

impl AnimationRef {
    /// Create a new animation reference
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

/// What a state node plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A single animation clip
    Clip {
        /// The clip to play
        animation: AnimationRef,
    },
    /// Two clips blended by a variable-controlled weight
    Blend {
        /// Clip sampled at weight 0
        animation_a: AnimationRef,
        /// Clip sampled at weight 1
        animation_b: AnimationRef,
        /// Playback speed multiplier for the second clip
        speed_b: f32,
        /// Name of the float variable supplying the blend weight, clamped to [0, 1]
        blend_variable: String,
    },
}

impl NodeKind {
    /// The animation whose length defines when this node counts as finished.
    ///
    /// For blend nodes that is the first clip.
    pub fn primary_animation(&self) -> &AnimationRef {
        match self {
            Self::Clip { animation } => animation,
            Self::Blend { animation_a, .. } => animation_a,
        }
    }
}

/// A state in the machine: an animation (or blended pair) plus the outgoing
/// transitions it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateNode {
    /// Unique node ID
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// What this node plays
    pub kind: NodeKind,
    /// Outgoing transitions, evaluated in declaration order
    pub transitions: Vec<Transition>,
}

impl StateNode {
    /// Create a new node
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind,
            transitions: Vec::new(),
        }
    }

    /// Get a transition by ID
    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.id == id)
    }

    /// Get a mutable transition by ID
    pub fn transition_mut(&mut self, id: TransitionId) -> Option<&mut Transition> {
        self.transitions.iter_mut().find(|t| t.id == id)
    }

    /// Get all transitions targeting a specific node
    pub fn transitions_to(&self, to: NodeId) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(move |t| t.to == to)
    }

    /// Remove a transition by ID
    pub fn remove_transition(&mut self, id: TransitionId) -> Option<Transition> {
        let index = self.transitions.iter().position(|t| t.id == id)?;
        Some(self.transitions.remove(index))
    }
}
