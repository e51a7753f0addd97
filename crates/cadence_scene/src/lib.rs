//! Cadence Scenes
//!
//! Composes animation primitives into per-frame visual state.
//!
//! # Features
//!
//! - **Phase tables**: named, non-overlapping frame ranges validated at
//!   construction
//! - **Signals**: scalar expression trees over the frame clock, phases and
//!   springs
//! - **Channels**: numbers, vectors, colors, typewriter text, blink and
//!   visibility flags, and phase-selected formulas
//! - **Scenes and series**: `resolve(frame, fps)` builds a fresh
//!   [`VisualState`] for any frame, in any order, on any thread
//! - **Scene files**: the same model described in TOML

pub mod channel;
pub mod config;
pub mod phase;
pub mod scene;
pub mod series;
pub mod signal;

pub use cadence_core::{ConfigError, Result, Value, VisualState};
pub use channel::{Channel, CustomFn};
pub use config::{Composition, SceneFile};
pub use phase::{ActivePhase, Phase, PhaseTable, PhaseTableBuilder};
pub use scene::{Scene, SceneBuilder};
pub use series::{Series, SEGMENT_CHANNEL, SEGMENT_FRAME_CHANNEL};
pub use signal::{FrameContext, Signal, WaveShape};
