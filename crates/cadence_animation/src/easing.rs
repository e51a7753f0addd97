//! Easing functions for animations
//!
//! Every curve maps linear progress to shaped progress. Curves are defined on
//! `0.0..=1.0` but accept any real input; overshooting curves such as
//! [`Easing::Back`] and [`Easing::Elastic`] leave the unit interval on purpose.

use std::f32::consts::PI;

use cadence_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Easing function type
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    /// Remotion `Easing.ease`, `cubic-bezier(0.42, 0, 1, 1)`. Not the CSS
    /// `ease` keyword, which is [`EasingPreset::css_ease`](crate::EasingPreset::css_ease).
    Ease,
    Quad,
    Cubic,
    /// `t^n`
    Poly(i32),
    Sine,
    Circle,
    Expo,
    /// Pulls back before moving forward; the parameter sets the overshoot
    Back(f32),
    /// Spring-like oscillation; the parameter sets the bounciness
    Elastic(f32),
    Bounce,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    CubicBezier(CubicBezier),
    /// Runs the inner curve forwards (identity wrapper)
    In(Box<Easing>),
    /// Runs the inner curve backwards: `1 - f(1 - t)`
    Out(Box<Easing>),
    /// Inner curve for the first half, its reversal for the second
    InOut(Box<Easing>),
}

impl Easing {
    /// Standard back overshoot used when no amount is given
    pub const DEFAULT_BACK: f32 = 1.70158;

    /// A validated cubic Bézier; x control points must lie within `0..=1`
    pub fn bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self> {
        CubicBezier::new(x1, y1, x2, y2).map(Easing::CubicBezier)
    }

    pub fn in_(curve: Easing) -> Self {
        Easing::In(Box::new(curve))
    }

    /// Convert an "ease-in" shape into the matching "ease-out" shape
    pub fn out(curve: Easing) -> Self {
        Easing::Out(Box::new(curve))
    }

    pub fn in_out(curve: Easing) -> Self {
        Easing::InOut(Box::new(curve))
    }

    /// Apply the easing function to a progress value (nominally 0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::Ease => CubicBezier::unchecked(0.42, 0.0, 1.0, 1.0).solve(t),
            Easing::Quad | Easing::EaseInQuad => t * t,
            Easing::Cubic | Easing::EaseIn | Easing::EaseInCubic => t * t * t,
            Easing::Poly(n) => t.powi(*n),
            Easing::Sine => 1.0 - (t * PI / 2.0).cos(),
            Easing::Circle => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Easing::Expo => 2f32.powf(10.0 * (t - 1.0)),
            Easing::Back(s) => t * t * ((s + 1.0) * t - s),
            Easing::Elastic(bounciness) => {
                let p = bounciness * PI;
                1.0 - (t * PI / 2.0).cos().powi(3) * (t * p).cos()
            }
            Easing::Bounce => bounce(t),
            Easing::EaseOut | Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut | Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::CubicBezier(curve) => curve.solve(t),
            Easing::In(inner) => inner.apply(t),
            Easing::Out(inner) => 1.0 - inner.apply(1.0 - t),
            Easing::InOut(inner) => {
                if t < 0.5 {
                    inner.apply(t * 2.0) / 2.0
                } else {
                    1.0 - inner.apply((1.0 - t) * 2.0) / 2.0
                }
            }
        }
    }

    /// Check curve parameters.
    ///
    /// Bézier curves are checked when they are built; this covers the
    /// remaining parameters, which must be finite.
    pub fn validate(&self) -> Result<()> {
        match self {
            Easing::Poly(_) | Easing::CubicBezier(_) => Ok(()),
            Easing::Back(v) | Easing::Elastic(v) if !v.is_finite() => {
                Err(ConfigError::NonFinite("easing parameter"))
            }
            Easing::In(inner) | Easing::Out(inner) | Easing::InOut(inner) => inner.validate(),
            _ => Ok(()),
        }
    }
}

fn bounce(t: f32) -> f32 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}

/// A CSS `cubic-bezier(x1, y1, x2, y2)` timing curve.
///
/// Both x control points lie within `0..=1`, so x is monotonic in the curve
/// parameter and every progress value has exactly one y. The polynomial
/// coefficients are expanded once at construction and the solve runs in f64.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f32; 4]", into = "[f32; 4]")]
pub struct CubicBezier {
    points: [f32; 4],
    x: Cubic,
    y: Cubic,
}

/// `a·p³ + b·p² + c·p` for one axis of a curve anchored at 0 and 1
#[derive(Clone, Copy, Debug, PartialEq)]
struct Cubic {
    a: f64,
    b: f64,
    c: f64,
}

impl Cubic {
    fn through(p1: f32, p2: f32) -> Self {
        let (p1, p2) = (p1 as f64, p2 as f64);
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        Self {
            a: 1.0 - c - b,
            b,
            c,
        }
    }

    #[inline]
    fn at(&self, p: f64) -> f64 {
        ((self.a * p + self.b) * p + self.c) * p
    }

    #[inline]
    fn slope(&self, p: f64) -> f64 {
        (3.0 * self.a * p + 2.0 * self.b) * p + self.c
    }
}

impl CubicBezier {
    const EPSILON: f64 = 1e-7;

    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::NonFinite("cubic-bezier control point"));
        }
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(ConfigError::InvalidParameter {
                name: "cubic-bezier",
                reason: format!("x control points must be within [0, 1], got {x1} and {x2}"),
            });
        }
        Ok(Self::unchecked(x1, y1, x2, y2))
    }

    /// For control points known to be valid
    pub(crate) fn unchecked(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            points: [x1, y1, x2, y2],
            x: Cubic::through(x1, x2),
            y: Cubic::through(y1, y2),
        }
    }

    /// `[x1, y1, x2, y2]`
    pub fn control_points(&self) -> [f32; 4] {
        self.points
    }

    /// The y of the curve at horizontal progress `t`; exact at 0 and 1
    pub fn solve(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let target = t as f64;
        self.y.at(self.parameter_for(target)) as f32
    }

    /// Curve parameter whose x equals `target`: Newton steps first, then
    /// bisection when the slope flattens out
    fn parameter_for(&self, target: f64) -> f64 {
        let mut p = target;
        for _ in 0..8 {
            let error = self.x.at(p) - target;
            if error.abs() < Self::EPSILON {
                return p;
            }
            let slope = self.x.slope(p);
            if slope.abs() < Self::EPSILON {
                break;
            }
            p -= error / slope;
        }

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        p = target;
        for _ in 0..30 {
            let x = self.x.at(p);
            if (x - target).abs() < Self::EPSILON {
                break;
            }
            if x < target {
                lo = p;
            } else {
                hi = p;
            }
            p = (lo + hi) * 0.5;
        }
        p
    }
}

impl TryFrom<[f32; 4]> for CubicBezier {
    type Error = ConfigError;

    fn try_from([x1, y1, x2, y2]: [f32; 4]) -> Result<Self> {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<CubicBezier> for [f32; 4] {
    fn from(curve: CubicBezier) -> Self {
        curve.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_endpoints_of_standard_curves() {
        let curves = [
            Easing::Linear,
            Easing::Ease,
            Easing::Quad,
            Easing::Cubic,
            Easing::Sine,
            Easing::Circle,
            Easing::Bounce,
            Easing::EaseOutCubic,
            Easing::EaseInOutQuart,
            Easing::bezier(0.33, 1.0, 0.68, 1.0).unwrap(),
            Easing::out(Easing::Cubic),
            Easing::in_out(Easing::Quad),
        ];
        for curve in &curves {
            assert!(approx(curve.apply(0.0), 0.0, 1e-6), "{curve:?} at 0");
            assert!(approx(curve.apply(1.0), 1.0, 1e-6), "{curve:?} at 1");
        }
    }

    #[test]
    fn test_ease_out_cubic_formula() {
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            assert_eq!(Easing::EaseOutCubic.apply(t), 1.0 - (1.0 - t).powi(3));
        }
        assert!(approx(Easing::EaseOutCubic.apply(0.5), 0.875, 1e-6));
    }

    #[test]
    fn test_out_reverses_in_curve() {
        let out_cubic = Easing::out(Easing::Cubic);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!(approx(out_cubic.apply(t), Easing::EaseOutCubic.apply(t), 1e-6));
            assert!(approx(out_cubic.apply(t), 1.0 - Easing::Cubic.apply(1.0 - t), 0.0));
        }
    }

    #[test]
    fn test_in_is_identity_wrapper() {
        let wrapped = Easing::in_(Easing::Sine);
        assert_eq!(wrapped.apply(0.3), Easing::Sine.apply(0.3));
    }

    #[test]
    fn test_cubic_bezier_accuracy() {
        // Linear control points reproduce the identity
        let linear = Easing::bezier(0.0, 0.0, 1.0, 1.0).unwrap();
        for i in 1..10 {
            let t = i as f32 / 10.0;
            assert!(approx(linear.apply(t), t, 1e-4));
        }

        // Symmetric ease-in-out passes through the midpoint
        let standard = Easing::bezier(0.42, 0.0, 0.58, 1.0).unwrap();
        assert!(approx(standard.apply(0.5), 0.5, 1e-4));
        assert!(standard.apply(0.25) < 0.25);
        assert!(standard.apply(0.75) > 0.75);
    }

    #[test]
    fn test_cubic_bezier_is_monotonic() {
        let curve = Easing::bezier(0.25, 0.1, 0.25, 1.0).unwrap();
        let mut previous = 0.0;
        for i in 1..=100 {
            let value = curve.apply(i as f32 / 100.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn test_back_overshoots_below_zero() {
        let back = Easing::Back(Easing::DEFAULT_BACK);
        assert!(back.apply(0.2) < 0.0);
        assert!(approx(back.apply(1.0), 1.0, 1e-5));

        let out_back = Easing::out(back);
        assert!(out_back.apply(0.8) > 1.0);
    }

    #[test]
    fn test_accepts_out_of_range_input() {
        assert_eq!(Easing::Linear.apply(1.5), 1.5);
        assert!(Easing::Quad.apply(-1.0) > 0.0);
        assert_eq!(Easing::Ease.apply(-0.5), 0.0);
    }

    #[test]
    fn test_bezier_rejects_invalid_control_points() {
        assert!(Easing::bezier(0.33, 1.0, 0.68, 1.0).is_ok());
        assert!(Easing::bezier(1.2, 0.0, 0.5, 1.0).is_err());
        assert!(Easing::bezier(3.0, 0.0, -2.0, 1.0).is_err());
        assert_eq!(
            CubicBezier::new(0.5, f32::NAN, 0.5, 1.0).unwrap_err(),
            ConfigError::NonFinite("cubic-bezier control point")
        );
    }

    #[test]
    fn test_validate_checks_nested_parameters() {
        assert!(Easing::out(Easing::Back(Easing::DEFAULT_BACK)).validate().is_ok());
        assert!(Easing::in_out(Easing::Elastic(f32::INFINITY))
            .validate()
            .is_err());
    }

    #[test]
    fn test_ease_matches_its_control_points() {
        let explicit = Easing::bezier(0.42, 0.0, 1.0, 1.0).unwrap();
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert_eq!(Easing::Ease.apply(t), explicit.apply(t));
        }
    }

    #[test]
    fn test_bezier_deserializes_from_control_points() {
        let curve: Easing = serde_json::from_str(r#"{"cubic_bezier":[0.4,0,0.2,1]}"#).unwrap();
        assert_eq!(curve, Easing::bezier(0.4, 0.0, 0.2, 1.0).unwrap());
        let Easing::CubicBezier(inner) = &curve else {
            panic!("expected a bezier");
        };
        assert_eq!(inner.control_points(), [0.4, 0.0, 0.2, 1.0]);

        let invalid = serde_json::from_str::<Easing>(r#"{"cubic_bezier":[1.5,0,0.2,1]}"#);
        assert!(invalid.is_err());
    }
}
