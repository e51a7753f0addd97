//! Scenes
//!
//! A [`Scene`] is a fixed registry of named channels plus the phase table
//! they read. [`Scene::resolve`] evaluates every channel independently for
//! one frame and collects the results into a fresh [`VisualState`].
//!
//! ```rust
//! use cadence_animation::{Easing, RangeMapper, Spring, SpringConfig};
//! use cadence_scene::{Channel, Scene, Signal};
//!
//! let scene = Scene::builder("card")
//!     .channel(
//!         "opacity",
//!         Channel::Number(Signal::frames(
//!             RangeMapper::new([0.0, 18.0], [0.0, 1.0])
//!                 .unwrap()
//!                 .easing(Easing::EaseOutCubic),
//!         )),
//!     )
//!     .channel(
//!         "y",
//!         Channel::Number(Signal::spring(
//!             Spring::new(SpringConfig::stiff().range(40.0, 0.0)).unwrap(),
//!         )),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let state = scene.resolve(0, 30);
//! assert_eq!(state.number("opacity"), Some(0.0));
//! assert_eq!(state.number("y"), Some(40.0));
//! ```

use cadence_core::{ConfigError, Result, VisualState};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::channel::Channel;
use crate::phase::{ActivePhase, PhaseTable};
use crate::signal::{FrameContext, Signal};

/// An immutable set of channels evaluated together
#[derive(Clone, Debug)]
pub struct Scene {
    name: String,
    duration: Option<u32>,
    phases: PhaseTable,
    channels: Vec<(String, Channel)>,
}

impl Scene {
    pub fn builder(name: impl Into<String>) -> SceneBuilder {
        SceneBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit duration, or the end of the last phase
    pub fn duration(&self) -> Option<u32> {
        self.duration.or_else(|| self.phases.end())
    }

    pub fn phases(&self) -> &PhaseTable {
        &self.phases
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, &Channel)> {
        self.channels
            .iter()
            .map(|(name, channel)| (name.as_str(), channel))
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|(channel, _)| channel == name)
            .map(|(_, channel)| channel)
    }

    pub fn active_phase(&self, frame: u32) -> Option<ActivePhase<'_>> {
        self.phases.active(frame)
    }

    /// Evaluate every channel at `frame`
    pub fn resolve(&self, frame: u32, fps: u32) -> VisualState {
        trace!(scene = %self.name, frame, fps, "resolve");
        let ctx = FrameContext::new(frame, fps, &self.phases);
        let mut state = VisualState::with_capacity(frame, self.channels.len());
        for (name, channel) in &self.channels {
            state.insert(name.as_str(), channel.evaluate(&ctx));
        }
        state
    }
}

/// Builder for [`Scene`]
pub struct SceneBuilder {
    name: String,
    duration: Option<u32>,
    phases: PhaseTable,
    channels: Vec<(String, Channel)>,
}

impl SceneBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: None,
            phases: PhaseTable::empty(),
            channels: Vec::new(),
        }
    }

    pub fn phases(mut self, phases: PhaseTable) -> Self {
        self.phases = phases;
        self
    }

    /// Scene length in frames, used when the scene is placed in a series
    pub fn duration(mut self, frames: u32) -> Self {
        self.duration = Some(frames);
        self
    }

    pub fn channel(mut self, name: impl Into<String>, channel: Channel) -> Self {
        self.channels.push((name.into(), channel));
        self
    }

    /// Shorthand for a [`Channel::Number`]
    pub fn number(self, name: impl Into<String>, signal: Signal) -> Self {
        self.channel(name, Channel::Number(signal))
    }

    /// Register `count` channels named `{prefix}_{i}`, each built from its
    /// index and a delay of `i * step` frames
    pub fn stagger<F>(mut self, prefix: &str, count: usize, step: f32, mut channel: F) -> Self
    where
        F: FnMut(usize, f32) -> Channel,
    {
        for index in 0..count {
            let delay = index as f32 * step;
            self.channels
                .push((format!("{prefix}_{index}"), channel(index, delay)));
        }
        self
    }

    pub fn build(self) -> Result<Scene> {
        if self.duration == Some(0) {
            return Err(ConfigError::ZeroDuration(self.name));
        }

        let mut seen = FxHashSet::default();
        for (name, channel) in &self.channels {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    kind: "channel",
                    name: name.clone(),
                });
            }
            channel.validate(&self.phases)?;
        }

        debug!(
            scene = %self.name,
            channels = self.channels.len(),
            phases = self.phases.len(),
            "scene built"
        );
        Ok(Scene {
            name: self.name,
            duration: self.duration,
            phases: self.phases,
            channels: self.channels,
        })
    }
}
