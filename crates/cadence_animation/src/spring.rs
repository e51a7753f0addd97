//! Spring physics
//!
//! Closed-form evaluation of a damped harmonic oscillator
//! `m·x'' + c·x' + k·(x - to) = 0` released from `from` with an optional
//! initial velocity. The solution is classified once at construction by the
//! discriminant `c² - 4mk` and its coefficients are precomputed, so any frame
//! offset can be evaluated directly, in any order, with no integration error
//! and no dependence on step count.

use cadence_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Relative tolerance used to classify a spring as critically damped
const CRITICAL_TOLERANCE: f64 = 1e-6;

/// Smallest absolute settle threshold, used when `from == to`
const MIN_SETTLE_THRESHOLD: f64 = 1e-6;

/// Physical parameters and endpoints of a spring.
///
/// Defaults match the common UI spring: mass 1, stiffness 100, damping 10,
/// animating from 0 to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub mass: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub from: f32,
    pub to: f32,
    /// Initial velocity in units per second
    pub initial_velocity: Option<f32>,
    /// Never report a position past `to`
    pub overshoot_clamping: bool,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 100.0,
            damping: 10.0,
            from: 0.0,
            to: 1.0,
            initial_velocity: None,
            overshoot_clamping: false,
        }
    }
}

impl SpringConfig {
    /// Create a config with custom coefficients, animating from 0 to 1
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            ..Default::default()
        }
    }

    pub fn from(mut self, from: f32) -> Self {
        self.from = from;
        self
    }

    pub fn to(mut self, to: f32) -> Self {
        self.to = to;
        self
    }

    pub fn range(self, from: f32, to: f32) -> Self {
        self.from(from).to(to)
    }

    pub fn velocity(mut self, velocity: f32) -> Self {
        self.initial_velocity = Some(velocity);
        self
    }

    pub fn overshoot_clamping(mut self, clamp: bool) -> Self {
        self.overshoot_clamping = clamp;
        self
    }

    /// `c / (2·sqrt(m·k))`: below 1 oscillates, 1 is critical, above 1 creeps
    pub fn damping_ratio(&self) -> f32 {
        let critical = 2.0 * (self.mass * self.stiffness).sqrt();
        if critical == 0.0 {
            f32::INFINITY
        } else {
            self.damping / critical
        }
    }

    /// Check that mass > 0, stiffness >= 0, damping >= 0 and all values are finite
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.mass,
            self.stiffness,
            self.damping,
            self.from,
            self.to,
            self.initial_velocity.unwrap_or(0.0),
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite("spring parameter"));
        }
        if self.mass <= 0.0 {
            return Err(ConfigError::InvalidSpring(format!(
                "mass must be positive, got {}",
                self.mass
            )));
        }
        if self.stiffness < 0.0 {
            return Err(ConfigError::InvalidSpring(format!(
                "stiffness must not be negative, got {}",
                self.stiffness
            )));
        }
        if self.damping < 0.0 {
            return Err(ConfigError::InvalidSpring(format!(
                "damping must not be negative, got {}",
                self.damping
            )));
        }
        Ok(())
    }
}

/// Damping regime, from the sign of `c² - 4mk`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Regime {
    Underdamped,
    CriticallyDamped,
    Overdamped,
}

/// Position and velocity (units per second) at one instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringState {
    pub position: f32,
    pub velocity: f32,
}

/// How close to `to` counts as settled
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tolerance {
    /// Fraction of `|to - from|`
    Relative(f32),
    /// Absolute distance from `to`
    Absolute(f32),
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Relative(0.001)
    }
}

/// Displacement from the target, `x(t) = position(t) - to`
#[derive(Clone, Copy, Debug, PartialEq)]
enum Motion {
    /// `e^{-βt}·(a·cos ωt + b·sin ωt)`
    Under { beta: f64, omega: f64, a: f64, b: f64 },
    /// `e^{-βt}·(a + b·t)`
    Critical { beta: f64, a: f64, b: f64 },
    /// `c1·e^{r1·t} + c2·e^{r2·t}` with `r2 < r1 <= 0`
    Over { r1: f64, r2: f64, c1: f64, c2: f64 },
}

impl Motion {
    fn solve(config: &SpringConfig) -> Self {
        let m = config.mass as f64;
        let k = config.stiffness as f64;
        let c = config.damping as f64;
        let x0 = config.from as f64 - config.to as f64;
        let v0 = config.initial_velocity.unwrap_or(0.0) as f64;

        let beta = c / (2.0 * m);
        let discriminant = c * c - 4.0 * m * k;
        let scale = c * c + 4.0 * m * k;

        if discriminant.abs() <= CRITICAL_TOLERANCE * scale {
            Motion::Critical {
                beta,
                a: x0,
                b: v0 + beta * x0,
            }
        } else if discriminant < 0.0 {
            let omega = (-discriminant).sqrt() / (2.0 * m);
            Motion::Under {
                beta,
                omega,
                a: x0,
                b: (v0 + beta * x0) / omega,
            }
        } else {
            let root = discriminant.sqrt() / (2.0 * m);
            let r1 = -beta + root;
            let r2 = -beta - root;
            let c2 = (v0 - r1 * x0) / (r2 - r1);
            Motion::Over {
                r1,
                r2,
                c1: x0 - c2,
                c2,
            }
        }
    }

    fn regime(&self) -> Regime {
        match self {
            Motion::Under { .. } => Regime::Underdamped,
            Motion::Critical { .. } => Regime::CriticallyDamped,
            Motion::Over { .. } => Regime::Overdamped,
        }
    }

    fn displacement(&self, t: f64) -> f64 {
        match *self {
            Motion::Under { beta, omega, a, b } => {
                (-beta * t).exp() * (a * (omega * t).cos() + b * (omega * t).sin())
            }
            Motion::Critical { beta, a, b } => (-beta * t).exp() * (a + b * t),
            Motion::Over { r1, r2, c1, c2 } => c1 * (r1 * t).exp() + c2 * (r2 * t).exp(),
        }
    }

    fn velocity(&self, t: f64) -> f64 {
        match *self {
            Motion::Under { beta, omega, a, b } => {
                let (sin, cos) = (omega * t).sin_cos();
                (-beta * t).exp() * ((b * omega - beta * a) * cos - (a * omega + beta * b) * sin)
            }
            Motion::Critical { beta, a, b } => (-beta * t).exp() * (b - beta * (a + b * t)),
            Motion::Over { r1, r2, c1, c2 } => {
                c1 * r1 * (r1 * t).exp() + c2 * r2 * (r2 * t).exp()
            }
        }
    }

    /// Earliest time after which `|x|` stays within `eps` (and, for the
    /// non-oscillating regimes, keeps shrinking). `None` if it never does.
    fn settle_time(&self, eps: f64) -> Option<f64> {
        match *self {
            Motion::Under { beta, a, b, .. } => {
                // |x| is bounded by the envelope amplitude·e^{-βt}
                let amplitude = a.hypot(b);
                if amplitude <= eps {
                    Some(0.0)
                } else if beta <= 0.0 {
                    None
                } else {
                    Some((amplitude / eps).ln() / beta)
                }
            }
            Motion::Critical { beta, a, b } => {
                if beta <= 0.0 {
                    return (a == 0.0 && b == 0.0).then_some(0.0);
                }
                // x' changes sign once, at 1/β - a/b
                let turn = if b != 0.0 { 1.0 / beta - a / b } else { 0.0 };
                self.first_within(turn.max(0.0), 1.0 / beta, eps)
            }
            Motion::Over { r1, r2, c1, c2 } => {
                if r1 > -1e-9 {
                    // No restoring force: the slow mode never decays
                    if c1.abs() > eps {
                        return None;
                    }
                    return self.first_within(0.0, -1.0 / r2, eps);
                }
                let ratio = -(c2 * r2) / (c1 * r1);
                let turn = if ratio.is_finite() && ratio > 0.0 {
                    ratio.ln() / (r1 - r2)
                } else {
                    0.0
                };
                self.first_within(turn.max(0.0), -1.0 / r1, eps)
            }
        }
    }

    /// Smallest `t >= start` with `|x(t)| <= eps`, given `|x|` is
    /// non-increasing from `start` on.
    fn first_within(&self, start: f64, time_scale: f64, eps: f64) -> Option<f64> {
        if self.displacement(start).abs() <= eps {
            return Some(start);
        }

        let mut lo = start;
        let mut step = time_scale.max(1e-6);
        let mut hi = start + step;
        let mut expansions = 0;
        while self.displacement(hi).abs() > eps {
            expansions += 1;
            if expansions > 64 || !hi.is_finite() {
                return None;
            }
            lo = hi;
            step *= 2.0;
            hi += step;
        }

        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            if self.displacement(mid).abs() <= eps {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Some(hi)
    }
}

/// A validated spring with its closed-form solution precomputed.
///
/// ```rust
/// use cadence_animation::{Spring, SpringConfig};
///
/// let spring = Spring::new(SpringConfig::default().range(20.0, 0.0)).unwrap();
/// assert_eq!(spring.evaluate(0.0, 60).position, 20.0);
/// assert!((spring.evaluate(300.0, 60).position).abs() < 0.01);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    config: SpringConfig,
    motion: Motion,
}

impl Spring {
    pub fn new(config: SpringConfig) -> Result<Self> {
        config.validate()?;
        let motion = Motion::solve(&config);
        debug!(
            regime = ?motion.regime(),
            damping_ratio = config.damping_ratio(),
            from = config.from,
            to = config.to,
            "spring solved"
        );
        Ok(Self { config, motion })
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    pub fn regime(&self) -> Regime {
        self.motion.regime()
    }

    /// Evaluate `frame_offset` frames after release at `fps` frames per second.
    ///
    /// Offsets at or before zero (and NaN) report the initial state. An `fps`
    /// of zero is treated as one.
    pub fn evaluate(&self, frame_offset: f32, fps: u32) -> SpringState {
        let initial = SpringState {
            position: self.config.from,
            velocity: self.config.initial_velocity.unwrap_or(0.0),
        };
        if frame_offset.is_nan() || frame_offset <= 0.0 {
            return initial;
        }

        let t = frame_offset as f64 / fps.max(1) as f64;
        self.state_at(t)
    }

    /// Evaluate at `t` seconds after release
    pub fn state_at(&self, t: f64) -> SpringState {
        let config = &self.config;
        if t.is_nan() || t <= 0.0 {
            return SpringState {
                position: config.from,
                velocity: config.initial_velocity.unwrap_or(0.0),
            };
        }

        let to = config.to as f64;
        let position = to + self.motion.displacement(t);
        let velocity = self.motion.velocity(t);

        if config.overshoot_clamping && config.from != config.to {
            let passed = if config.from < config.to {
                position > to
            } else {
                position < to
            };
            if passed {
                return SpringState {
                    position: config.to,
                    velocity: 0.0,
                };
            }
        }

        SpringState {
            position: position as f32,
            velocity: velocity as f32,
        }
    }

    /// Seconds after which the position stays within `tolerance` of `to`.
    ///
    /// For critically and over-damped springs the distance to `to` is also
    /// non-increasing from that point on. Returns `None` for springs that
    /// never settle (no damping, or no stiffness while displaced).
    pub fn settle_time(&self, tolerance: Tolerance) -> Option<f64> {
        let eps = self.threshold(tolerance);
        let settle = self.motion.settle_time(eps);
        if settle.is_none() {
            warn!(
                stiffness = self.config.stiffness,
                damping = self.config.damping,
                "spring never settles"
            );
        }
        settle
    }

    /// [`settle_time`](Self::settle_time) rounded up to whole frames
    pub fn settle_frames(&self, fps: u32, tolerance: Tolerance) -> Option<u32> {
        self.settle_time(tolerance)
            .map(|t| (t * fps.max(1) as f64).ceil() as u32)
    }

    fn threshold(&self, tolerance: Tolerance) -> f64 {
        let eps = match tolerance {
            Tolerance::Relative(fraction) => {
                fraction.abs() as f64 * (self.config.to as f64 - self.config.from as f64).abs()
            }
            Tolerance::Absolute(distance) => distance.abs() as f64,
        };
        eps.max(MIN_SETTLE_THRESHOLD)
    }
}

/// One-shot spring evaluation; validates `config` on every call
pub fn evaluate(frame_offset: f32, fps: u32, config: &SpringConfig) -> Result<SpringState> {
    Ok(Spring::new(*config)?.evaluate(frame_offset, fps))
}
