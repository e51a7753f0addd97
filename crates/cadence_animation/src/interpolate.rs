//! Range mapping
//!
//! Piecewise-linear interpolation between ordered breakpoints. Each adjacent
//! pair of breakpoints forms a segment; the configured easing reshapes the
//! local progress within whichever segment contains the input, never across
//! the whole range.
//!
//! ```rust
//! use cadence_animation::{Easing, RangeMapper};
//!
//! let fade = RangeMapper::new([0.0, 18.0], [0.0_f32, 1.0])
//!     .unwrap()
//!     .easing(Easing::out(Easing::Cubic));
//!
//! assert_eq!(fade.map(0.0), 0.0);
//! assert_eq!(fade.map(40.0), 1.0); // clamped
//! ```

use cadence_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::easing::Easing;
use crate::values::Interpolate;

/// What a mapper returns for inputs outside its breakpoints
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolate {
    /// Hold the boundary output
    #[default]
    Clamp,
    /// Continue the slope of the nearest segment (linearly, without easing)
    Extend,
}

/// Options for the one-shot [`interpolate`] function
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpolateOptions {
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub extrapolate_left: Extrapolate,
    #[serde(default)]
    pub extrapolate_right: Extrapolate,
}

impl InterpolateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Use the same policy on both sides
    pub fn extrapolate(mut self, policy: Extrapolate) -> Self {
        self.extrapolate_left = policy;
        self.extrapolate_right = policy;
        self
    }

    pub fn extrapolate_left(mut self, policy: Extrapolate) -> Self {
        self.extrapolate_left = policy;
        self
    }

    pub fn extrapolate_right(mut self, policy: Extrapolate) -> Self {
        self.extrapolate_right = policy;
        self
    }
}

/// A validated breakpoint table mapping `f32` inputs to values of type `T`.
///
/// Construction rejects mismatched lengths, fewer than two breakpoints,
/// non-finite inputs and breakpoints that are not strictly increasing, so
/// [`map`](Self::map) never divides by zero and never fails.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeMapper<T: Interpolate = f32> {
    inputs: SmallVec<[f32; 4]>,
    outputs: SmallVec<[T; 4]>,
    easing: Easing,
    extrapolate_left: Extrapolate,
    extrapolate_right: Extrapolate,
}

impl<T: Interpolate> RangeMapper<T> {
    /// Create a mapper with linear easing and clamping on both sides
    pub fn new(
        inputs: impl IntoIterator<Item = f32>,
        outputs: impl IntoIterator<Item = T>,
    ) -> Result<Self> {
        let inputs: SmallVec<[f32; 4]> = inputs.into_iter().collect();
        let outputs: SmallVec<[T; 4]> = outputs.into_iter().collect();
        validate_breakpoints(&inputs, outputs.len())?;

        Ok(Self {
            inputs,
            outputs,
            easing: Easing::Linear,
            extrapolate_left: Extrapolate::Clamp,
            extrapolate_right: Extrapolate::Clamp,
        })
    }

    /// Map `0.0..=1.0` onto `from..=to`
    pub fn between(from: T, to: T) -> Self {
        Self {
            inputs: SmallVec::from_slice(&[0.0, 1.0]),
            outputs: SmallVec::from_iter([from, to]),
            easing: Easing::Linear,
            extrapolate_left: Extrapolate::Clamp,
            extrapolate_right: Extrapolate::Clamp,
        }
    }

    /// Create a mapper from a full set of options, validating the easing too
    pub fn with_options(
        inputs: impl IntoIterator<Item = f32>,
        outputs: impl IntoIterator<Item = T>,
        options: InterpolateOptions,
    ) -> Result<Self> {
        Ok(Self::new(inputs, outputs)?
            .try_easing(options.easing)?
            .extrapolate_left(options.extrapolate_left)
            .extrapolate_right(options.extrapolate_right))
    }

    /// Set the per-segment curve. Bézier curves are validated by
    /// [`Easing::bezier`]; use [`try_easing`](Self::try_easing) to also check
    /// the `Back` and `Elastic` parameters.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the per-segment curve after [`Easing::validate`]
    pub fn try_easing(self, easing: Easing) -> Result<Self> {
        easing.validate()?;
        Ok(self.easing(easing))
    }

    /// Use the same policy on both sides
    pub fn extrapolate(mut self, policy: Extrapolate) -> Self {
        self.extrapolate_left = policy;
        self.extrapolate_right = policy;
        self
    }

    pub fn extrapolate_left(mut self, policy: Extrapolate) -> Self {
        self.extrapolate_left = policy;
        self
    }

    pub fn extrapolate_right(mut self, policy: Extrapolate) -> Self {
        self.extrapolate_right = policy;
        self
    }

    pub fn inputs(&self) -> &[f32] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[T] {
        &self.outputs
    }

    pub fn easing_curve(&self) -> &Easing {
        &self.easing
    }

    /// First and last breakpoint
    pub fn domain(&self) -> (f32, f32) {
        (self.inputs[0], self.inputs[self.inputs.len() - 1])
    }

    /// Evaluate the mapper at `x`
    pub fn map(&self, x: f32) -> T {
        let last = self.inputs.len() - 1;
        let (first_input, last_input) = self.domain();

        if x.is_nan() {
            return self.outputs[0].clone();
        }

        if x < first_input {
            return match self.extrapolate_left {
                Extrapolate::Clamp => self.outputs[0].clone(),
                Extrapolate::Extend => self.linear(0, x),
            };
        }

        if x > last_input {
            return match self.extrapolate_right {
                Extrapolate::Clamp => self.outputs[last].clone(),
                Extrapolate::Extend => self.linear(last - 1, x),
            };
        }

        // Number of breakpoints <= x; at least 1 because x >= first_input
        let pos = self.inputs.partition_point(|&b| b <= x);
        let i = pos - 1;
        if self.inputs[i] == x {
            return self.outputs[i].clone();
        }

        let t = self.progress(i, x);
        let eased = self.easing.apply(t);
        self.outputs[i].lerp(&self.outputs[i + 1], eased)
    }

    #[inline]
    fn progress(&self, segment: usize, x: f32) -> f32 {
        let start = self.inputs[segment];
        let end = self.inputs[segment + 1];
        (x - start) / (end - start)
    }

    fn linear(&self, segment: usize, x: f32) -> T {
        let t = self.progress(segment, x);
        self.outputs[segment].lerp(&self.outputs[segment + 1], t)
    }
}

fn validate_breakpoints(inputs: &[f32], outputs: usize) -> Result<()> {
    if inputs.len() != outputs {
        return Err(ConfigError::LengthMismatch {
            inputs: inputs.len(),
            outputs,
        });
    }
    if inputs.len() < 2 {
        return Err(ConfigError::TooFewBreakpoints(inputs.len()));
    }
    if inputs.iter().any(|b| !b.is_finite()) {
        return Err(ConfigError::NonFinite("breakpoint"));
    }
    for (index, pair) in inputs.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(ConfigError::NonMonotonic {
                index: index + 1,
                previous: pair[0],
                value: pair[1],
            });
        }
    }
    Ok(())
}

/// One-shot interpolation.
///
/// Validates the breakpoints on every call; build a [`RangeMapper`] once when
/// the same table is evaluated for many frames.
pub fn interpolate<T: Interpolate>(
    x: f32,
    inputs: &[f32],
    outputs: &[T],
    options: &InterpolateOptions,
) -> Result<T> {
    let mapper = RangeMapper::with_options(
        inputs.iter().copied(),
        outputs.iter().cloned(),
        options.clone(),
    )?;
    Ok(mapper.map(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_linear_clamped_reference_points() {
        let options = InterpolateOptions::new();
        let f = |x: f32| interpolate(x, &[0.0, 10.0], &[0.0_f32, 100.0], &options).unwrap();

        assert_eq!(f(0.0), 0.0);
        assert_eq!(f(5.0), 50.0);
        assert_eq!(f(10.0), 100.0);
        assert_eq!(f(-5.0), 0.0);
        assert_eq!(f(20.0), 100.0);
    }

    #[test]
    fn test_breakpoints_return_pinned_outputs_exactly() {
        let mapper = RangeMapper::new([3.0, 7.5], [0.1_f32, 0.7])
            .unwrap()
            .easing(Easing::bezier(0.25, 0.1, 0.25, 1.0).unwrap());
        assert_eq!(mapper.map(3.0), 0.1);
        assert_eq!(mapper.map(7.5), 0.7);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let mapper = RangeMapper::new([0.0, 12.0, 30.0], [0.0_f32, 0.88, 1.0])
            .unwrap()
            .easing(Easing::out(Easing::Cubic));
        for frame in 0..40 {
            let x = frame as f32 * 0.77;
            assert_eq!(mapper.map(x).to_bits(), mapper.map(x).to_bits());
        }
    }

    #[test]
    fn test_easing_applies_per_segment() {
        let mapper = RangeMapper::new([0.0, 10.0, 20.0], [0.0_f32, 100.0, 200.0])
            .unwrap()
            .easing(Easing::Quad);

        // Halfway through each segment the quad curve gives 25% of that segment
        assert_eq!(mapper.map(5.0), 25.0);
        assert_eq!(mapper.map(15.0), 125.0);
        assert_eq!(mapper.map(10.0), 100.0);
    }

    #[test]
    fn test_multi_point_click_bounce() {
        let scale = RangeMapper::new([75.0, 80.0, 85.0, 90.0], [1.0_f32, 0.88, 0.88, 1.0]).unwrap();
        assert_eq!(scale.map(70.0), 1.0);
        assert_eq!(scale.map(82.0), 0.88);
        assert!((scale.map(77.5) - 0.94).abs() < 1e-6);
        assert_eq!(scale.map(95.0), 1.0);
    }

    #[test]
    fn test_extend_continues_nearest_slope() {
        let mapper = RangeMapper::new([0.0, 10.0, 20.0], [0.0_f32, 10.0, 40.0])
            .unwrap()
            .easing(Easing::Cubic)
            .extrapolate(Extrapolate::Extend);

        // Left uses the first segment's slope (1 per frame), linearly
        assert_eq!(mapper.map(-5.0), -5.0);
        // Right uses the last segment's slope (3 per frame)
        assert_eq!(mapper.map(25.0), 55.0);
    }

    #[test]
    fn test_mixed_extrapolation_sides() {
        let mapper = RangeMapper::new([0.0, 1.0], [1.0_f32, 15.0])
            .unwrap()
            .extrapolate_left(Extrapolate::Clamp)
            .extrapolate_right(Extrapolate::Extend);
        assert_eq!(mapper.map(-1.0), 1.0);
        assert_eq!(mapper.map(2.0), 29.0);
    }

    #[test]
    fn test_multidimensional_outputs() {
        let path = RangeMapper::new([0.0, 10.0], [[400.0_f32, 900.0], [960.0, 755.0]]).unwrap();
        assert_eq!(path.map(5.0), [680.0, 827.5]);

        let fill = RangeMapper::new([0.0, 1.0], [Color::BLACK, Color::WHITE]).unwrap();
        assert_eq!(fill.map(0.5), Color::rgb(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_between_maps_unit_interval() {
        let mouse_x = RangeMapper::between(650.0_f32, 755.0);
        assert_eq!(mouse_x.map(0.0), 650.0);
        assert_eq!(mouse_x.map(1.0), 755.0);
        assert_eq!(mouse_x.map(1.2), 755.0);
    }

    #[test]
    fn test_nan_input_holds_first_output() {
        let mapper = RangeMapper::new([0.0, 1.0], [3.0_f32, 4.0]).unwrap();
        assert_eq!(mapper.map(f32::NAN), 3.0);
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert_eq!(
            RangeMapper::new([0.0, 1.0, 2.0], [0.0_f32, 1.0]).unwrap_err(),
            ConfigError::LengthMismatch {
                inputs: 3,
                outputs: 2
            }
        );
        assert_eq!(
            RangeMapper::new([0.0], [0.0_f32]).unwrap_err(),
            ConfigError::TooFewBreakpoints(1)
        );
        assert!(matches!(
            RangeMapper::new([0.0, 5.0, 5.0], [0.0_f32, 1.0, 2.0]),
            Err(ConfigError::NonMonotonic { index: 2, .. })
        ));
        assert!(matches!(
            RangeMapper::new([10.0, 0.0], [0.0_f32, 1.0]),
            Err(ConfigError::NonMonotonic { index: 1, .. })
        ));
        assert_eq!(
            RangeMapper::new([0.0, f32::INFINITY], [0.0_f32, 1.0]).unwrap_err(),
            ConfigError::NonFinite("breakpoint")
        );
    }

    #[test]
    fn test_options_validate_easing() {
        let options = InterpolateOptions::new().easing(Easing::Back(f32::NAN));
        assert!(interpolate(0.5, &[0.0, 1.0], &[0.0_f32, 1.0], &options).is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_curves() {
        assert!(Easing::bezier(3.0, 0.0, -2.0, 1.0).is_err());

        let mapper = RangeMapper::new([0.0, 1.0], [0.0_f32, 1.0]).unwrap();
        assert_eq!(
            mapper.clone().try_easing(Easing::Back(f32::NAN)).unwrap_err(),
            ConfigError::NonFinite("easing parameter")
        );
        let eased = mapper.try_easing(Easing::out(Easing::Quad)).unwrap();
        assert_eq!(eased.map(0.5), 0.75);
    }
}
