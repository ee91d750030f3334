// SPDX-License-Identifier: MIT OR Apache-2.0
//! The seam to the external skeletal animation sampler.

use marionette_graph::AnimationRef;

/// Low-level skeletal sampling, supplied by the engine.
///
/// The player never interprets [`AnimationRef`]s itself; it only asks the
/// sampler for clip durations and poses and blends what it gets back. A
/// sampler backed by a shared result cache may serve several players over
/// the same assets.
pub trait AnimationSampler {
    /// Per-bone transformation set at a point in time
    type Pose;

    /// Length of a clip in seconds.
    ///
    /// Unknown clips should report `0.0`; the player then treats the node as
    /// immediately finished rather than failing.
    fn duration_seconds(&self, animation: &AnimationRef) -> f32;

    /// Sample a clip at a clip-local time
    fn sample_pose(&self, animation: &AnimationRef, time: f32) -> Self::Pose;

    /// Linearly blend two poses; `weight` 0 is all `a`, 1 is all `b`
    fn blend_poses(&self, a: &Self::Pose, b: &Self::Pose, weight: f32) -> Self::Pose;
}
