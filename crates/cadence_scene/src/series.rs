//! Series of scenes
//!
//! A [`Series`] plays scenes back to back on one global frame axis. Each scene
//! sees only its own segment-local frame, so lengthening one segment never
//! shifts the animation inside another. The series adds two entries of its
//! own to every state, so scenes in a series may not use those names.

use cadence_animation::{SegmentContent, Timeline};
use cadence_core::{ConfigError, Result, Value, VisualState};

use crate::scene::Scene;

/// Channel holding the `/`-joined path of the active segment
pub const SEGMENT_CHANNEL: &str = "segment";
/// Channel holding the frame local to the innermost active segment
pub const SEGMENT_FRAME_CHANNEL: &str = "segment_frame";

/// A timeline whose leaves are scenes
#[derive(Clone, Debug)]
pub struct Series {
    timeline: Timeline<Scene>,
}

impl Series {
    /// Fails if any scene, at any nesting depth, defines a channel named
    /// [`SEGMENT_CHANNEL`] or [`SEGMENT_FRAME_CHANNEL`]
    pub fn new(timeline: Timeline<Scene>) -> Result<Self> {
        check_reserved_channels(&timeline)?;
        Ok(Self { timeline })
    }

    pub fn timeline(&self) -> &Timeline<Scene> {
        &self.timeline
    }

    pub fn total_duration(&self) -> u32 {
        self.timeline.total_duration()
    }

    /// Resolve the scene active at the global `frame`.
    ///
    /// Returns `None` once the series has ended, and while a nested timeline
    /// that finished early is still holding its segment. Callers decide
    /// whether to keep the last state or render nothing.
    pub fn resolve(&self, frame: u32, fps: u32) -> Option<VisualState> {
        let path = self.timeline.resolve(frame)?;
        let scene = path.leaf?;
        let local_frame = path.local_frame();
        let inner = scene.resolve(local_frame, fps);

        let mut state = VisualState::with_capacity(frame, inner.len() + 2);
        state.insert(SEGMENT_CHANNEL, Value::Text(path.qualified_name()));
        state.insert(SEGMENT_FRAME_CHANNEL, Value::Number(local_frame as f32));
        for (name, value) in inner.iter() {
            state.insert(name, value.clone());
        }
        Some(state)
    }
}

impl TryFrom<Timeline<Scene>> for Series {
    type Error = ConfigError;

    fn try_from(timeline: Timeline<Scene>) -> Result<Self> {
        Self::new(timeline)
    }
}

fn check_reserved_channels(timeline: &Timeline<Scene>) -> Result<()> {
    for segment in timeline.segments() {
        match segment.content() {
            SegmentContent::Leaf(scene) => {
                let reserved = [SEGMENT_CHANNEL, SEGMENT_FRAME_CHANNEL]
                    .into_iter()
                    .find(|name| scene.channel(name).is_some());
                if let Some(name) = reserved {
                    return Err(ConfigError::DuplicateName {
                        kind: "series channel",
                        name: format!("{}/{name}", segment.name()),
                    });
                }
            }
            SegmentContent::Nested(inner) => check_reserved_channels(inner)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use pretty_assertions::assert_eq;

    fn scene(name: &str, value: f32) -> Scene {
        Scene::builder(name)
            .number("value", Signal::constant(value))
            .number("local", Signal::Frame)
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_uses_segment_local_frames() {
        let series = Series::new(
            Timeline::builder()
                .segment("product_reveal", 300, scene("reveal", 1.0))
                .segment("design_system_select", 600, scene("select", 2.0))
                .segment("magic_path", 300, scene("path", 3.0))
                .segment("submit_action", 120, scene("submit", 4.0))
                .build()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(series.total_duration(), 1320);

        let state = series.resolve(299, 30).unwrap();
        assert_eq!(state.frame(), 299);
        assert_eq!(state.text(SEGMENT_CHANNEL), Some("product_reveal"));
        assert_eq!(state.number("local"), Some(299.0));

        let state = series.resolve(300, 30).unwrap();
        assert_eq!(state.text(SEGMENT_CHANNEL), Some("design_system_select"));
        assert_eq!(state.number(SEGMENT_FRAME_CHANNEL), Some(0.0));
        assert_eq!(state.number("value"), Some(2.0));

        assert!(series.resolve(1320, 30).is_none());
    }

    #[test]
    fn test_nested_series() {
        let inner = Timeline::builder()
            .segment("a", 10, scene("a", 1.0))
            .segment("b", 10, scene("b", 2.0))
            .build()
            .unwrap();
        let series: Series = Timeline::builder()
            .nested_for("intro", 30, inner)
            .segment("main", 10, scene("main", 3.0))
            .build()
            .unwrap()
            .try_into()
            .unwrap();

        let state = series.resolve(15, 30).unwrap();
        assert_eq!(state.text(SEGMENT_CHANNEL), Some("intro/b"));
        assert_eq!(state.number("local"), Some(5.0));

        // inner timeline ended at 20 but the segment lasts until 30
        assert!(series.resolve(25, 30).is_none());
        assert_eq!(series.resolve(30, 30).unwrap().number("value"), Some(3.0));
    }

    #[test]
    fn test_rejects_scene_channels_named_like_series_entries() {
        let clashing = Scene::builder("intro")
            .number(SEGMENT_CHANNEL, Signal::constant(7.0))
            .build()
            .unwrap();
        let err = Series::new(
            Timeline::builder()
                .segment("intro", 10, clashing)
                .build()
                .unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateName {
                kind: "series channel",
                name: "intro/segment".to_string(),
            }
        );

        let nested_clash = Scene::builder("inner")
            .number(SEGMENT_FRAME_CHANNEL, Signal::Frame)
            .build()
            .unwrap();
        let inner = Timeline::builder()
            .segment("deep", 5, nested_clash)
            .build()
            .unwrap();
        let result = Series::try_from(
            Timeline::builder()
                .nested("outer", inner)
                .build()
                .unwrap(),
        );
        assert!(matches!(result, Err(ConfigError::DuplicateName { .. })));

        // the same scene is fine on its own
        let scene = Scene::builder("alone")
            .number(SEGMENT_CHANNEL, Signal::constant(7.0))
            .build()
            .unwrap();
        assert_eq!(scene.resolve(0, 30).number(SEGMENT_CHANNEL), Some(7.0));
    }
}
