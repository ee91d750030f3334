// SPDX-License-Identifier: MIT OR Apache-2.0
//! The runtime player: ticks a state machine and yields blended poses.

use crate::sampler::AnimationSampler;
use marionette_graph::{MachineId, NodeId, NodeKind, StateMachine, Transition, TransitionId};

/// An in-flight cross-fade toward a target node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTransition {
    /// The transition being taken
    pub transition: TransitionId,
    /// The node being faded in
    pub to: NodeId,
    /// Local playback time accumulated in the target node
    pub to_time: f32,
    /// Blend time accumulated so far
    pub blend_elapsed: f32,
    /// Total blend length in seconds, always positive
    pub blend_duration: f32,
}

impl PendingTransition {
    /// Blend weight toward the target, clamped to [0, 1]
    pub fn progress(&self) -> f32 {
        (self.blend_elapsed / self.blend_duration).clamp(0.0, 1.0)
    }
}

/// Runtime driver for one state machine.
///
/// The player stores no references into the machine; it borrows the machine
/// on every call and holds only [`NodeId`]s, which resolve to `None` once
/// the machine deletes their node. [`step`](Self::step) then re-selects the
/// entry node instead of dereferencing anything stale.
///
/// A fresh player is unbound; the first `step` binds it to the machine it is
/// given. Stepping a different machine rebinds and discards all node state,
/// so a player never carries handles across machines.
///
/// All operations are total: missing machine state degrades to "no visible
/// change", never to an error.
#[derive(Debug, Clone, Default)]
pub struct Player {
    bound: Option<MachineId>,
    current: Option<NodeId>,
    node_time: f32,
    pending: Option<PendingTransition>,
}

impl Player {
    /// Create a new unbound player
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a machine, clearing all node state if it differs from the
    /// currently bound one.
    pub fn bind(&mut self, machine: &StateMachine) {
        if self.bound != Some(machine.id()) {
            self.bound = Some(machine.id());
            self.current = None;
            self.node_time = 0.0;
            self.pending = None;
        }
    }

    /// The node the player is currently in, if any
    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    /// Elapsed time in the current node, in seconds
    pub fn node_time(&self) -> f32 {
        self.node_time
    }

    /// Whether a cross-fade is in flight
    pub fn in_transition(&self) -> bool {
        self.pending.is_some()
    }

    /// The in-flight cross-fade, if any
    pub fn pending_transition(&self) -> Option<&PendingTransition> {
        self.pending.as_ref()
    }

    /// Blend progress of the in-flight cross-fade, if any
    pub fn transition_progress(&self) -> Option<f32> {
        self.pending.as_ref().map(PendingTransition::progress)
    }

    /// Advance the player by `delta_seconds`.
    ///
    /// Selects the entry node when the player has none (or its node was
    /// deleted), accumulates node time, fires the first fulfilled outgoing
    /// transition, and advances or commits an in-flight cross-fade. Fired
    /// transitions consume the triggers their conditions read.
    ///
    /// `step(.., 0.0, ..)` is idempotent: repeated zero-length steps leave
    /// the current node, its elapsed time, and any pending transition
    /// unchanged.
    pub fn step<S: AnimationSampler>(
        &mut self,
        machine: &mut StateMachine,
        delta_seconds: f32,
        sampler: &S,
    ) {
        self.bind(machine);

        if !self.resolve_current(machine) {
            return;
        }

        if self.pending.is_some() {
            self.advance_blend(delta_seconds);
            return;
        }

        self.node_time += delta_seconds;

        let Some(current) = self.current else {
            return;
        };
        let Some(node) = machine.node(current) else {
            return;
        };
        let duration = sampler.duration_seconds(node.kind.primary_animation());
        let finished = self.node_time >= duration;

        let fired = node
            .transitions
            .iter()
            .find(|t| (t.immediate || finished) && t.conditions_fulfilled(machine.variables()))
            .cloned();

        if let Some(transition) = fired {
            self.fire(machine, &transition);
        }
    }

    /// Begin a transition by hand, bypassing condition evaluation.
    ///
    /// The transition must belong to the player's current node; anything
    /// else is a no-op. Returns whether the transition started (or, for a
    /// zero-duration transition, completed).
    pub fn start_transition(&mut self, machine: &mut StateMachine, transition: TransitionId) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let Some(current) = self.current else {
            return false;
        };
        let Some(found) = machine.node(current).and_then(|n| n.transition(transition)) else {
            return false;
        };
        let found = found.clone();
        self.fire(machine, &found);
        true
    }

    /// Commit the in-flight cross-fade immediately, snapping to the target
    /// node at its accumulated local time. No-op when none is in flight.
    pub fn finish_current_transition(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(progress = pending.progress(), "finishing transition early");
            self.current = Some(pending.to);
            self.node_time = pending.to_time;
        }
    }

    /// The blended pose for the current playback position.
    ///
    /// `None` when the player has no resolvable current node. Cross-fades
    /// lerp the outgoing node's pose against the incoming node's pose at its
    /// own local time.
    pub fn current_pose<S: AnimationSampler>(
        &self,
        machine: &StateMachine,
        sampler: &S,
    ) -> Option<S::Pose> {
        let node = machine.node(self.current?)?;
        let pose = Self::node_pose(node, self.node_time, machine, sampler);

        match &self.pending {
            Some(pending) => {
                let target = machine.node(pending.to)?;
                let target_pose = Self::node_pose(target, pending.to_time, machine, sampler);
                Some(sampler.blend_poses(&pose, &target_pose, pending.progress()))
            }
            None => Some(pose),
        }
    }

    /// Whether the current node's primary clip has played to its end
    pub fn is_finished<S: AnimationSampler>(&self, machine: &StateMachine, sampler: &S) -> bool {
        let Some(node) = self.current.and_then(|id| machine.node(id)) else {
            return false;
        };
        self.node_time >= sampler.duration_seconds(node.kind.primary_animation())
    }

    /// Make `current` point at a live node, falling back to the entry node
    /// (or the first node) when it is unset or its node was deleted. Clears
    /// a pending transition whose target was deleted. Returns whether a
    /// current node exists afterwards.
    fn resolve_current(&mut self, machine: &StateMachine) -> bool {
        if let Some(pending) = &self.pending {
            if machine.node(pending.to).is_none() {
                tracing::debug!("pending transition target was removed, dropping blend");
                self.pending = None;
            }
        }

        let live = self.current.is_some_and(|id| machine.node(id).is_some());
        if live {
            return true;
        }
        if self.current.is_some() {
            tracing::debug!("current node was removed, re-selecting entry");
        }

        let entry = machine
            .entry_node()
            .or_else(|| machine.nodes().next().map(|n| n.id));
        self.current = entry;
        self.node_time = 0.0;
        self.pending = None;
        entry.is_some()
    }

    fn advance_blend(&mut self, delta_seconds: f32) {
        self.node_time += delta_seconds;
        let Some(pending) = &mut self.pending else {
            return;
        };
        pending.to_time += delta_seconds;
        pending.blend_elapsed += delta_seconds;
        if pending.blend_elapsed >= pending.blend_duration {
            let pending = *pending;
            tracing::debug!(?pending.to, "transition committed");
            self.current = Some(pending.to);
            self.node_time = pending.to_time;
            self.pending = None;
        }
    }

    fn fire(&mut self, machine: &mut StateMachine, transition: &Transition) {
        for condition in &transition.conditions {
            machine.variables_mut().reset_trigger(&condition.variable);
        }

        if transition.duration_seconds > 0.0 {
            tracing::debug!(
                ?transition.to,
                duration = transition.duration_seconds,
                "starting cross-fade"
            );
            self.pending = Some(PendingTransition {
                transition: transition.id,
                to: transition.to,
                to_time: 0.0,
                blend_elapsed: 0.0,
                blend_duration: transition.duration_seconds,
            });
        } else {
            tracing::debug!(?transition.to, "hard cut");
            self.current = Some(transition.to);
            self.node_time = 0.0;
        }
    }

    fn node_pose<S: AnimationSampler>(
        node: &marionette_graph::StateNode,
        time: f32,
        machine: &StateMachine,
        sampler: &S,
    ) -> S::Pose {
        match &node.kind {
            NodeKind::Clip { animation } => sampler.sample_pose(animation, time),
            NodeKind::Blend {
                animation_a,
                animation_b,
                speed_b,
                blend_variable,
            } => {
                let weight = machine
                    .variables()
                    .get(blend_variable)
                    .and_then(|v| v.value.as_float())
                    .unwrap_or(0.0)
                    .clamp(0.0, 1.0);
                let time_a = wrap_time(time, sampler.duration_seconds(animation_a));
                let time_b = wrap_time(time * speed_b, sampler.duration_seconds(animation_b));
                let pose_a = sampler.sample_pose(animation_a, time_a);
                let pose_b = sampler.sample_pose(animation_b, time_b);
                sampler.blend_poses(&pose_a, &pose_b, weight)
            }
        }
    }
}

/// Wrap a time into a clip's [0, duration) range; zero-length clips pin to 0.
fn wrap_time(time: f32, duration: f32) -> f32 {
    if duration > 0.0 {
        time.rem_euclid(duration)
    } else {
        0.0
    }
}
