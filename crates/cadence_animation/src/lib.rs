//! Cadence Animation Primitives
//!
//! Deterministic building blocks that turn a frame index into a value.
//!
//! # Features
//!
//! - **Easing**: named curves, CSS cubic Béziers, and in/out combinators
//! - **Range mapping**: piecewise-linear interpolation between breakpoints
//!   with per-segment easing and clamp/extend extrapolation
//! - **Springs**: closed-form damped oscillators evaluated at any frame
//!   offset, with settle-time measurement
//! - **Timelines**: named fixed-duration segments with nesting
//!
//! Nothing here holds state between frames. Every evaluation is a pure
//! function of its inputs and may run on any thread.
//!
//! # Example
//!
//! ```rust
//! use cadence_animation::{Easing, RangeMapper, Spring, SpringConfig};
//!
//! let fade = RangeMapper::new([0.0, 30.0], [0.0_f32, 1.0])
//!     .unwrap()
//!     .easing(Easing::EaseOutCubic);
//! assert_eq!(fade.map(45.0), 1.0);
//!
//! let spring = Spring::new(SpringConfig::default()).unwrap();
//! assert_eq!(spring.evaluate(0.0, 30).position, 0.0);
//! ```

pub mod easing;
pub mod interpolate;
pub mod presets;
pub mod sequence;
pub mod spring;
pub mod values;

pub use easing::{CubicBezier, Easing};
pub use interpolate::{interpolate, Extrapolate, InterpolateOptions, RangeMapper};
pub use presets::EasingPreset;
pub use sequence::{
    ActiveSegment, PathEntry, Segment, SegmentContent, SegmentPath, Timeline, TimelineBuilder,
};
pub use spring::{Regime, Spring, SpringConfig, SpringState, Tolerance};
pub use values::Interpolate;
