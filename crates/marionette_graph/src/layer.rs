// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layers: independent machines restricted to bone subsets.

use crate::graph::StateMachine;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// The set of bones a layer drives.
///
/// An empty mask means the layer drives the whole skeleton. Masks hold bone
/// names; resolving names to skeleton indices is the external binding's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoneMask {
    bones: IndexSet<String>,
}

impl BoneMask {
    /// Create an empty mask (whole skeleton)
    pub fn new() -> Self {
        Self {
            bones: IndexSet::new(),
        }
    }

    /// Create a mask from bone names
    pub fn from_bones<I, S>(bones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bones: bones.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a bone to the mask
    pub fn insert(&mut self, bone: impl Into<String>) {
        self.bones.insert(bone.into());
    }

    /// Remove a bone from the mask
    pub fn remove(&mut self, bone: &str) -> bool {
        self.bones.shift_remove(bone)
    }

    /// Whether the mask includes a bone.
    ///
    /// An empty mask includes every bone.
    pub fn includes(&self, bone: &str) -> bool {
        self.bones.is_empty() || self.bones.contains(bone)
    }

    /// Bone names in the mask, in insertion order
    pub fn bones(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(String::as_str)
    }

    /// Whether the mask is empty (whole skeleton)
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// An independently-evaluated machine driving a subset of the skeleton.
///
/// Layers are composited externally, highest weight last; the state machine
/// inside is structurally identical to a standalone one and is stepped by
/// its own player.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Layer name
    pub name: String,
    /// Composite weight of this layer, clamped to [0, 1] by consumers
    pub weight: f32,
    /// Bones this layer drives
    pub mask: BoneMask,
    /// The machine evaluated for this layer
    pub machine: StateMachine,
}

impl Layer {
    /// Create a new full-skeleton layer with weight 1
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let machine = StateMachine::new(name.clone());
        Self {
            name,
            weight: 1.0,
            mask: BoneMask::new(),
            machine,
        }
    }

    /// Restrict the layer to a bone mask
    pub fn with_mask(mut self, mask: BoneMask) -> Self {
        self.mask = mask;
        self
    }

    /// Set the composite weight
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mask_includes_everything() {
        let mask = BoneMask::new();
        assert!(mask.includes("spine"));
        assert!(mask.includes("left_hand"));
    }

    #[test]
    fn test_mask_restricts_bones() {
        let mask = BoneMask::from_bones(["left_arm", "right_arm"]);
        assert!(mask.includes("left_arm"));
        assert!(!mask.includes("spine"));

        let mut mask = mask;
        mask.remove("left_arm");
        assert!(!mask.includes("left_arm"));
    }

    #[test]
    fn test_layer_wraps_a_machine() {
        let mut layer = Layer::new("UpperBody")
            .with_mask(BoneMask::from_bones(["spine", "head"]))
            .with_weight(0.5);

        let idle = layer.machine.add_node(
            "Idle",
            crate::node::NodeKind::Clip {
                animation: crate::node::AnimationRef::new("idle.anim"),
            },
        );
        assert_eq!(layer.machine.entry_node(), Some(idle));
        assert!(layer.mask.includes("head"));
        assert!(!layer.mask.includes("left_foot"));
    }
}
