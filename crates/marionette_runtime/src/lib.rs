// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime player for Marionette animation state machines.
//!
//! This crate drives the machines defined in `marionette_graph`:
//! - [`Player`] ticks a machine once per frame, evaluates transition
//!   conditions, and performs hard cuts or timed cross-fades
//! - [`AnimationSampler`] is the seam to the engine's skeletal sampler;
//!   the player composes poses, it never produces them
//!
//! ## Architecture
//!
//! Players borrow their machine per call instead of holding references into
//! it, so structural edits between ticks can never leave a player with a
//! dangling handle; a deleted current node simply re-resolves to the entry
//! node on the next step. One player drives one machine (or one layer's
//! machine); layered rigs run one player per layer and composite the poses
//! externally using the layers' bone masks.

pub mod player;
pub mod sampler;

pub use player::{PendingTransition, Player};
pub use sampler::AnimationSampler;
