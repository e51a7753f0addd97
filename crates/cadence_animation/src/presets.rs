//! Spring and easing presets
//!
//! Named configurations for the motions scenes reach for most often.

use crate::easing::{CubicBezier, Easing};
use crate::spring::SpringConfig;

impl SpringConfig {
    /// Soft with a little overshoot
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// Visibly bouncy
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    /// Fast with minimal overshoot
    pub fn stiff() -> Self {
        Self::new(210.0, 20.0, 1.0)
    }

    /// Very fast, slightly underdamped; good for clicks and toggles
    pub fn snappy() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    /// Heavily overdamped, no bounce at all
    pub fn smooth() -> Self {
        Self::new(100.0, 200.0, 1.0)
    }
}

/// Pre-built easing curves for common patterns
pub struct EasingPreset;

impl EasingPreset {
    /// Decelerating cubic, used for reveals and slide-ins
    pub fn reveal() -> Easing {
        Easing::out(Easing::Cubic)
    }

    /// The CSS `ease` keyword
    pub fn css_ease() -> Easing {
        Easing::CubicBezier(CubicBezier::unchecked(0.25, 0.1, 0.25, 1.0))
    }

    /// Material standard curve
    pub fn standard() -> Easing {
        Easing::CubicBezier(CubicBezier::unchecked(0.4, 0.0, 0.2, 1.0))
    }

    /// Material decelerate curve, for elements entering the screen
    pub fn decelerate() -> Easing {
        Easing::CubicBezier(CubicBezier::unchecked(0.0, 0.0, 0.2, 1.0))
    }

    /// Material accelerate curve, for elements leaving the screen
    pub fn accelerate() -> Easing {
        Easing::CubicBezier(CubicBezier::unchecked(0.4, 0.0, 1.0, 1.0))
    }

    /// Overshoot then settle, for pop-ins
    pub fn pop() -> Easing {
        Easing::out(Easing::Back(Easing::DEFAULT_BACK))
    }
}
