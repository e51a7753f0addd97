//! Scalar signals
//!
//! A [`Signal`] is a small expression tree that turns a [`FrameContext`] into
//! one `f32`. Leaves read the frame clock, a phase, or a spring; interior nodes
//! reshape other signals through range mappers, waves, sums and products.
//! Signals hold no state, so the same tree can be evaluated for any frame on
//! any thread.

use cadence_animation::{RangeMapper, Spring};
use cadence_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};

use crate::phase::PhaseTable;

/// Everything a signal or channel may read while resolving one frame
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    /// Current frame. Fractional or negative once a delay has been applied.
    pub frame: f32,
    pub fps: u32,
    pub phases: &'a PhaseTable,
}

impl<'a> FrameContext<'a> {
    pub fn new(frame: u32, fps: u32, phases: &'a PhaseTable) -> Self {
        Self {
            frame: frame as f32,
            fps,
            phases,
        }
    }

    /// Elapsed seconds; an `fps` of zero counts as one
    pub fn seconds(&self) -> f32 {
        self.frame / self.fps.max(1) as f32
    }

    /// The same context `frames` later on the clock, i.e. with the frame
    /// counter shifted back
    pub fn delayed(&self, frames: f32) -> Self {
        Self {
            frame: self.frame - frames,
            ..*self
        }
    }
}

/// Periodic function used by [`Signal::Wave`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveShape {
    #[default]
    Sine,
    Cosine,
}

/// A scalar function of the frame context
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// The current frame number
    Frame,
    /// Elapsed seconds, `frame / fps`
    Seconds,
    Constant(f32),
    /// Progress through a named phase, 0 before it starts and 1 after it ends
    PhaseProgress(String),
    /// Frames since a named phase started; negative before it starts
    PhaseFrame(String),
    /// Spring position, released `delay` frames into the context
    Spring { spring: Spring, delay: f32 },
    /// Another signal reshaped by a range mapper
    Map {
        input: Box<Signal>,
        mapper: RangeMapper,
    },
    /// `offset + amplitude * shape(frame / period + phase)`
    Wave {
        shape: WaveShape,
        offset: f32,
        amplitude: f32,
        period: f32,
        phase: f32,
    },
    /// Another signal evaluated `frames` later
    Delay { input: Box<Signal>, frames: f32 },
    Sum(Vec<Signal>),
    Product(Vec<Signal>),
}

impl Signal {
    pub fn constant(value: f32) -> Self {
        Signal::Constant(value)
    }

    pub fn phase_progress(phase: impl Into<String>) -> Self {
        Signal::PhaseProgress(phase.into())
    }

    pub fn phase_frame(phase: impl Into<String>) -> Self {
        Signal::PhaseFrame(phase.into())
    }

    pub fn spring(spring: Spring) -> Self {
        Signal::Spring { spring, delay: 0.0 }
    }

    pub fn delayed_spring(spring: Spring, delay: f32) -> Self {
        Signal::Spring { spring, delay }
    }

    /// The frame clock reshaped by `mapper`
    pub fn frames(mapper: RangeMapper) -> Self {
        Signal::Frame.map(mapper)
    }

    /// Sinusoidal drift around `offset`
    pub fn wave(offset: f32, amplitude: f32, period: f32) -> Self {
        Signal::Wave {
            shape: WaveShape::Sine,
            offset,
            amplitude,
            period,
            phase: 0.0,
        }
    }

    /// Reshape this signal through `mapper`
    pub fn map(self, mapper: RangeMapper) -> Self {
        Signal::Map {
            input: Box::new(self),
            mapper,
        }
    }

    pub fn delay(self, frames: f32) -> Self {
        Signal::Delay {
            input: Box::new(self),
            frames,
        }
    }

    pub fn evaluate(&self, ctx: &FrameContext<'_>) -> f32 {
        match self {
            Signal::Frame => ctx.frame,
            Signal::Seconds => ctx.seconds(),
            Signal::Constant(value) => *value,
            Signal::PhaseProgress(name) => ctx.phases.progress(name, ctx.frame).unwrap_or(0.0),
            Signal::PhaseFrame(name) => ctx
                .phases
                .get(name)
                .map_or(0.0, |phase| ctx.frame - phase.start() as f32),
            Signal::Spring { spring, delay } => spring.evaluate(ctx.frame - delay, ctx.fps).position,
            Signal::Map { input, mapper } => mapper.map(input.evaluate(ctx)),
            Signal::Wave {
                shape,
                offset,
                amplitude,
                period,
                phase,
            } => {
                let angle = ctx.frame / period + phase;
                let wave = match shape {
                    WaveShape::Sine => angle.sin(),
                    WaveShape::Cosine => angle.cos(),
                };
                offset + amplitude * wave
            }
            Signal::Delay { input, frames } => input.evaluate(&ctx.delayed(*frames)),
            Signal::Sum(terms) => terms.iter().map(|term| term.evaluate(ctx)).sum(),
            Signal::Product(factors) => factors.iter().map(|factor| factor.evaluate(ctx)).product(),
        }
    }

    /// Every spring in this tree with the frame at which it is released
    pub fn springs(&self) -> Vec<(&Spring, f32)> {
        let mut found = Vec::new();
        self.collect_springs(0.0, &mut found);
        found
    }

    pub(crate) fn collect_springs<'s>(&'s self, offset: f32, found: &mut Vec<(&'s Spring, f32)>) {
        match self {
            Signal::Spring { spring, delay } => found.push((spring, offset + delay)),
            Signal::Map { input, .. } => input.collect_springs(offset, found),
            Signal::Delay { input, frames } => input.collect_springs(offset + frames, found),
            Signal::Sum(signals) | Signal::Product(signals) => {
                for signal in signals {
                    signal.collect_springs(offset, found);
                }
            }
            Signal::Frame
            | Signal::Seconds
            | Signal::Constant(_)
            | Signal::PhaseProgress(_)
            | Signal::PhaseFrame(_)
            | Signal::Wave { .. } => {}
        }
    }

    /// Check phase references against `phases` and numeric parameters
    pub fn validate(&self, phases: &PhaseTable) -> Result<()> {
        match self {
            Signal::Frame | Signal::Seconds | Signal::Spring { .. } => Ok(()),
            Signal::Constant(value) => finite(*value, "constant signal"),
            Signal::PhaseProgress(name) | Signal::PhaseFrame(name) => {
                if phases.get(name).is_some() {
                    Ok(())
                } else {
                    Err(ConfigError::UnknownPhase(name.clone()))
                }
            }
            Signal::Map { input, .. } => input.validate(phases),
            Signal::Wave {
                offset,
                amplitude,
                period,
                phase,
                ..
            } => {
                finite(*offset, "wave offset")?;
                finite(*amplitude, "wave amplitude")?;
                finite(*phase, "wave phase")?;
                finite(*period, "wave period")?;
                if *period == 0.0 {
                    return Err(ConfigError::InvalidParameter {
                        name: "wave period",
                        reason: "must not be zero".to_string(),
                    });
                }
                Ok(())
            }
            Signal::Delay { input, frames } => {
                finite(*frames, "delay")?;
                input.validate(phases)
            }
            Signal::Sum(signals) | Signal::Product(signals) => {
                signals.iter().try_for_each(|signal| signal.validate(phases))
            }
        }
    }
}

fn finite(value: f32, name: &'static str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite(name))
    }
}
