//! Interpolatable value types
//!
//! [`RangeMapper`](crate::interpolate::RangeMapper) outputs can be anything
//! that knows how to blend linearly toward another value of its type.

use cadence_core::Color;

/// Linear blending between two values of the same type.
///
/// `t` is not clamped: values outside `0.0..=1.0` must extrapolate along the
/// same line, which is what the `Extend` policy and overshooting easing
/// curves rely on.
pub trait Interpolate: Clone {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + t * (other - self)
    }
}

impl<const N: usize> Interpolate for [f32; N] {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut out = *self;
        for (slot, target) in out.iter_mut().zip(other) {
            *slot = slot.lerp(target, t);
        }
        out
    }
}

impl Interpolate for (f32, f32) {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        (self.0.lerp(&other.0, t), self.1.lerp(&other.1, t))
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }
}
