// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted document schema for state machines.
//!
//! The runtime graph cross-references nodes by [`NodeId`] handles; the
//! persisted form rewrites those into declaration-order indices so machines
//! round-trip deterministically. Conditions keep referencing variables by
//! name in both forms; names are the user-edited identifier, indices are
//! not.

use crate::condition::{Condition, Predicate};
use crate::graph::StateMachine;
use crate::layer::{BoneMask, Layer};
use crate::node::{AnimationRef, NodeId, NodeKind, StateNode};
use crate::variable::{Variable, VariableSet, VariableType, VariableValue};
use serde::{Deserialize, Serialize};

/// Comparator as persisted, split from its operand type the way editors
/// present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// Float variable strictly greater than the compare value
    Greater,
    /// Float variable strictly less than the compare value
    Less,
    /// Bool or trigger variable is raised
    IsTrue,
    /// Bool or trigger variable is lowered
    IsFalse,
}

/// Persisted condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDoc {
    /// Name of the variable the condition reads
    pub variable_name: String,
    /// Cached type of that variable, for editor display; not authoritative
    pub variable_type: VariableType,
    /// Comparator
    pub comparator: Comparator,
    /// Compare value for float comparators; ignored for bool comparators
    pub compare_value_float: f32,
}

/// Persisted transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDoc {
    /// Index of the target node
    pub node_to_index: u32,
    /// Index of the source node; must match the owning node's position
    pub node_from_index: u32,
    /// Cross-fade length in seconds
    pub transition_duration: f32,
    /// Whether the transition may fire before the source clip finishes
    pub immediate_transition: bool,
    /// Conditions, in evaluation order
    pub transition_conditions: Vec<ConditionDoc>,
}

/// Persisted node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDoc {
    /// Display name
    pub node_name: String,
    /// Primary animation clip
    pub animation: String,
    /// Second clip, present only for blend nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_animation: Option<String>,
    /// Speed multiplier for the second clip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_animation_speed: Option<f32>,
    /// Float variable supplying the blend weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_variable_name: Option<String>,
    /// Outgoing transitions, in evaluation order
    pub transitions: Vec<TransitionDoc>,
}

/// Persisted variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDoc {
    /// Variable name
    pub variable_name: String,
    /// Tagged value; carries both the variable's type and its payload
    pub value: VariableValue,
}

/// Persisted state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDoc {
    /// Machine name
    pub name: String,
    /// Entry node index, or `None` when the machine is empty
    pub entry_node_idx: Option<u32>,
    /// Nodes in declaration order; position is the cross-reference key
    pub nodes: Vec<NodeDoc>,
    /// Variables in declaration order
    pub variables: Vec<VariableDoc>,
}

/// Persisted layer: a machine plus bone-mask metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDoc {
    /// Layer name
    pub name: String,
    /// Composite weight
    pub weight: f32,
    /// Bone names the layer drives; empty means the whole skeleton
    pub mask_bones: Vec<String>,
    /// The layer's machine
    pub machine: MachineDoc,
}

/// Error when decoding a document into a runtime machine
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A transition references a node index past the node list
    #[error("Transition references node index {index} but the machine has {count} nodes")]
    NodeIndexOutOfRange {
        /// The offending index
        index: u32,
        /// Number of nodes in the document
        count: usize,
    },

    /// A transition's stored source index disagrees with its owning node
    #[error("Transition stored under node {owner} claims source index {stored}")]
    InconsistentFromIndex {
        /// Index of the node the transition is stored under
        owner: u32,
        /// The `node_from_index` the document carries
        stored: u32,
    },

    /// The document text failed to parse
    #[error("Failed to parse machine document: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl ConditionDoc {
    fn from_condition(condition: &Condition, variables: &VariableSet) -> Self {
        let (comparator, compare_value_float) = match condition.predicate {
            Predicate::Greater(v) => (Comparator::Greater, v),
            Predicate::Less(v) => (Comparator::Less, v),
            Predicate::IsTrue => (Comparator::IsTrue, 0.0),
            Predicate::IsFalse => (Comparator::IsFalse, 0.0),
        };
        let variable_type = variables
            .get(&condition.variable)
            .map(Variable::variable_type)
            .unwrap_or(match condition.predicate {
                Predicate::Greater(_) | Predicate::Less(_) => VariableType::Float,
                Predicate::IsTrue | Predicate::IsFalse => VariableType::Bool,
            });
        Self {
            variable_name: condition.variable.clone(),
            variable_type,
            comparator,
            compare_value_float,
        }
    }

    fn into_condition(self) -> Condition {
        let predicate = match self.comparator {
            Comparator::Greater => Predicate::Greater(self.compare_value_float),
            Comparator::Less => Predicate::Less(self.compare_value_float),
            Comparator::IsTrue => Predicate::IsTrue,
            Comparator::IsFalse => Predicate::IsFalse,
        };
        Condition::new(self.variable_name, predicate)
    }
}

impl NodeDoc {
    fn from_node(node: &StateNode, machine: &StateMachine) -> Self {
        let (animation, second_animation, second_animation_speed, blend_variable_name) =
            match &node.kind {
                NodeKind::Clip { animation } => (animation.0.clone(), None, None, None),
                NodeKind::Blend {
                    animation_a,
                    animation_b,
                    speed_b,
                    blend_variable,
                } => (
                    animation_a.0.clone(),
                    Some(animation_b.0.clone()),
                    Some(*speed_b),
                    Some(blend_variable.clone()),
                ),
            };
        let transitions = node
            .transitions
            .iter()
            .map(|t| TransitionDoc {
                // Endpoints exist by the machine's cascade invariant
                node_to_index: machine.node_index(t.to).unwrap_or(u32::MAX as usize) as u32,
                node_from_index: machine.node_index(t.from).unwrap_or(u32::MAX as usize) as u32,
                transition_duration: t.duration_seconds,
                immediate_transition: t.immediate,
                transition_conditions: t
                    .conditions
                    .iter()
                    .map(|c| ConditionDoc::from_condition(c, machine.variables()))
                    .collect(),
            })
            .collect();
        Self {
            node_name: node.name.clone(),
            animation,
            second_animation,
            second_animation_speed,
            blend_variable_name,
            transitions,
        }
    }

    fn kind(&self) -> NodeKind {
        match &self.second_animation {
            Some(second) => NodeKind::Blend {
                animation_a: AnimationRef::new(self.animation.clone()),
                animation_b: AnimationRef::new(second.clone()),
                speed_b: self.second_animation_speed.unwrap_or(1.0),
                blend_variable: self.blend_variable_name.clone().unwrap_or_default(),
            },
            None => NodeKind::Clip {
                animation: AnimationRef::new(self.animation.clone()),
            },
        }
    }
}

impl MachineDoc {
    /// Encode a runtime machine into its persisted form
    pub fn from_machine(machine: &StateMachine) -> Self {
        Self {
            name: machine.name.clone(),
            entry_node_idx: machine.entry_node_idx().map(|i| i as u32),
            nodes: machine
                .nodes()
                .map(|n| NodeDoc::from_node(n, machine))
                .collect(),
            variables: machine
                .variables()
                .iter()
                .map(|v| VariableDoc {
                    variable_name: v.name.clone(),
                    value: v.value,
                })
                .collect(),
        }
    }

    /// Decode into a runtime machine, rewriting indices into fresh handles.
    ///
    /// An out-of-range entry index decodes as "no entry" (the machine's own
    /// sentinel rule); an out-of-range transition index is a hard error, the
    /// document is structurally broken.
    pub fn into_machine(self) -> Result<StateMachine, SchemaError> {
        let mut machine = StateMachine::new(self.name);
        let node_count = self.nodes.len();

        let ids: Vec<NodeId> = self
            .nodes
            .iter()
            .map(|doc| machine.add_node(doc.node_name.clone(), doc.kind()))
            .collect();

        for (owner_index, doc) in self.nodes.into_iter().enumerate() {
            for transition_doc in doc.transitions {
                if transition_doc.node_from_index as usize != owner_index {
                    return Err(SchemaError::InconsistentFromIndex {
                        owner: owner_index as u32,
                        stored: transition_doc.node_from_index,
                    });
                }
                let to = *ids.get(transition_doc.node_to_index as usize).ok_or(
                    SchemaError::NodeIndexOutOfRange {
                        index: transition_doc.node_to_index,
                        count: node_count,
                    },
                )?;
                let from = ids[owner_index];
                // Self-loops cannot be authored through the API, so a
                // document carrying one is treated as out of range too.
                let id = machine.connect(from, to).map_err(|_| {
                    SchemaError::NodeIndexOutOfRange {
                        index: transition_doc.node_to_index,
                        count: node_count,
                    }
                })?;
                if let Some(transition) = machine
                    .node_mut(from)
                    .and_then(|node| node.transition_mut(id))
                {
                    transition.duration_seconds = transition_doc.transition_duration;
                    transition.immediate = transition_doc.immediate_transition;
                    transition.conditions = transition_doc
                        .transition_conditions
                        .into_iter()
                        .map(ConditionDoc::into_condition)
                        .collect();
                }
            }
        }

        for variable_doc in self.variables {
            machine
                .variables_mut()
                .insert(Variable::new(variable_doc.variable_name, variable_doc.value));
        }

        // add_node auto-selected the first node as entry; the stored index is
        // authoritative either way, including the cleared state.
        match self.entry_node_idx {
            Some(index) => machine.set_entry_node_idx(index as usize),
            None => machine.clear_entry_node(),
        }

        // Construction-time mutations are not interesting to listeners
        machine.take_events();
        Ok(machine)
    }
}

impl LayerDoc {
    /// Encode a layer into its persisted form
    pub fn from_layer(layer: &Layer) -> Self {
        Self {
            name: layer.name.clone(),
            weight: layer.weight,
            mask_bones: layer.mask.bones().map(str::to_string).collect(),
            machine: MachineDoc::from_machine(&layer.machine),
        }
    }

    /// Decode into a runtime layer
    pub fn into_layer(self) -> Result<Layer, SchemaError> {
        Ok(Layer {
            name: self.name,
            weight: self.weight,
            mask: BoneMask::from_bones(self.mask_bones),
            machine: self.machine.into_machine()?,
        })
    }
}

/// Encode a machine as pretty-printed ron text
pub fn to_ron_string(machine: &StateMachine) -> Result<String, ron::Error> {
    ron::ser::to_string_pretty(
        &MachineDoc::from_machine(machine),
        ron::ser::PrettyConfig::default(),
    )
}

/// Decode a machine from ron text
pub fn from_ron_str(text: &str) -> Result<StateMachine, SchemaError> {
    let doc: MachineDoc = ron::from_str(text)?;
    doc.into_machine()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_machine() -> StateMachine {
        let mut machine = StateMachine::new("Locomotion");
        let idle = machine.add_node(
            "Idle",
            NodeKind::Clip {
                animation: AnimationRef::new("idle.anim"),
            },
        );
        let moving = machine.add_node(
            "Move",
            NodeKind::Blend {
                animation_a: AnimationRef::new("walk.anim"),
                animation_b: AnimationRef::new("run.anim"),
                speed_b: 1.5,
                blend_variable: "Speed".to_string(),
            },
        );
        machine.set_float("Speed", 0.0);
        machine.set_bool("Grounded", true);

        let t = machine.connect(idle, moving).unwrap();
        let transition = machine
            .node_mut(idle)
            .unwrap()
            .transition_mut(t)
            .unwrap();
        transition.duration_seconds = 0.25;
        transition.immediate = true;
        transition
            .conditions
            .push(Condition::new("Speed", Predicate::Greater(0.1)));

        let back = machine.connect(moving, idle).unwrap();
        machine
            .node_mut(moving)
            .unwrap()
            .transition_mut(back)
            .unwrap()
            .conditions
            .push(Condition::new("Speed", Predicate::Less(0.1)));

        machine.set_entry_node(idle);
        machine
    }

    #[test]
    fn test_ron_round_trip() {
        let machine = sample_machine();
        let text = to_ron_string(&machine).unwrap();
        let loaded = from_ron_str(&text).unwrap();

        assert_eq!(loaded.name, "Locomotion");
        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.entry_node_idx(), Some(0));
        assert_eq!(loaded.variables().len(), 2);

        let idle = loaded.node_at(0).unwrap();
        assert_eq!(idle.name, "Idle");
        assert_eq!(idle.transitions.len(), 1);
        let t = &idle.transitions[0];
        assert_eq!(t.duration_seconds, 0.25);
        assert!(t.immediate);
        assert_eq!(
            t.conditions,
            vec![Condition::new("Speed", Predicate::Greater(0.1))]
        );
        assert_eq!(loaded.node_index(t.to), Some(1));

        let moving = loaded.node_at(1).unwrap();
        assert!(matches!(
            &moving.kind,
            NodeKind::Blend { speed_b, blend_variable, .. }
                if *speed_b == 1.5 && blend_variable == "Speed"
        ));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let machine = sample_machine();
        let first = to_ron_string(&machine).unwrap();
        let second = to_ron_string(&from_ron_str(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_range_transition_index_is_an_error() {
        let doc = MachineDoc {
            name: "Broken".to_string(),
            entry_node_idx: Some(0),
            nodes: vec![NodeDoc {
                node_name: "Idle".to_string(),
                animation: "idle.anim".to_string(),
                second_animation: None,
                second_animation_speed: None,
                blend_variable_name: None,
                transitions: vec![TransitionDoc {
                    node_to_index: 7,
                    node_from_index: 0,
                    transition_duration: 0.0,
                    immediate_transition: false,
                    transition_conditions: vec![],
                }],
            }],
            variables: vec![],
        };
        assert!(matches!(
            doc.into_machine(),
            Err(SchemaError::NodeIndexOutOfRange { index: 7, count: 1 })
        ));
    }

    #[test]
    fn test_cleared_entry_round_trips_as_none() {
        let mut machine = StateMachine::new("Headless");
        machine.add_node(
            "Idle",
            NodeKind::Clip {
                animation: AnimationRef::new("idle.anim"),
            },
        );
        machine.set_entry_node_idx(7);
        assert_eq!(machine.entry_node(), None);

        let text = to_ron_string(&machine).unwrap();
        let loaded = from_ron_str(&text).unwrap();
        assert_eq!(loaded.node_count(), 1);
        assert_eq!(loaded.entry_node(), None);
        assert_eq!(loaded.entry_node_idx(), None);
        assert_eq!(text, to_ron_string(&loaded).unwrap());
    }

    #[test]
    fn test_out_of_range_entry_index_decodes_as_none() {
        let doc = MachineDoc {
            name: "Odd".to_string(),
            entry_node_idx: Some(9),
            nodes: vec![NodeDoc {
                node_name: "Idle".to_string(),
                animation: "idle.anim".to_string(),
                second_animation: None,
                second_animation_speed: None,
                blend_variable_name: None,
                transitions: vec![],
            }],
            variables: vec![],
        };
        let machine = doc.into_machine().unwrap();
        assert_eq!(machine.entry_node(), None);
    }

    #[test]
    fn test_inconsistent_from_index_is_an_error() {
        let doc = MachineDoc {
            name: "Broken".to_string(),
            entry_node_idx: None,
            nodes: vec![
                NodeDoc {
                    node_name: "A".to_string(),
                    animation: "a.anim".to_string(),
                    second_animation: None,
                    second_animation_speed: None,
                    blend_variable_name: None,
                    transitions: vec![TransitionDoc {
                        node_to_index: 1,
                        node_from_index: 1,
                        transition_duration: 0.0,
                        immediate_transition: false,
                        transition_conditions: vec![],
                    }],
                },
                NodeDoc {
                    node_name: "B".to_string(),
                    animation: "b.anim".to_string(),
                    second_animation: None,
                    second_animation_speed: None,
                    blend_variable_name: None,
                    transitions: vec![],
                },
            ],
            variables: vec![],
        };
        assert!(matches!(
            doc.into_machine(),
            Err(SchemaError::InconsistentFromIndex { owner: 0, stored: 1 })
        ));
    }

    #[test]
    fn test_layer_round_trip() {
        let mut layer = Layer::new("UpperBody")
            .with_mask(BoneMask::from_bones(["spine", "head"]))
            .with_weight(0.75);
        layer.machine.add_node(
            "Aim",
            NodeKind::Clip {
                animation: AnimationRef::new("aim.anim"),
            },
        );

        let doc = LayerDoc::from_layer(&layer);
        let loaded = doc.into_layer().unwrap();
        assert_eq!(loaded.name, "UpperBody");
        assert_eq!(loaded.weight, 0.75);
        assert!(loaded.mask.includes("spine"));
        assert!(!loaded.mask.includes("left_foot"));
        assert_eq!(loaded.machine.node_count(), 1);
    }
}
