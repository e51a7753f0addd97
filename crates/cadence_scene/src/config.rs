//! Declarative scene files
//!
//! Scenes and series can be described in TOML and turned into a [`Scene`] or
//! [`Series`] with [`SceneFile::build`]. Every validation rule of the builder
//! APIs applies; failures surface as [`ConfigError`].
//!
//! ```toml
//! fps = 30
//!
//! [scene]
//! name = "card"
//! duration = 90
//!
//! [[scene.phases]]
//! name = "enter"
//! duration = 30
//!
//! [scene.channels.opacity]
//! kind = "number"
//! source = { kind = "interpolate", inputs = [0, 18], outputs = [0, 1], easing = "ease_out_cubic" }
//!
//! [scene.channels.y]
//! kind = "number"
//! source = { kind = "spring", preset = "stiff", from = 40, to = 0, after = "enter" }
//! ```

use cadence_animation::{
    Easing, Extrapolate, Interpolate, InterpolateOptions, RangeMapper, Spring, SpringConfig,
    Timeline,
};
use cadence_core::{Color, ConfigError, Result, Value, VisualState};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::channel::Channel;
use crate::phase::PhaseTable;
use crate::scene::Scene;
use crate::series::Series;
use crate::signal::{Signal, WaveShape};

/// Top-level scene file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// A single scene
    #[serde(default)]
    pub scene: Option<SceneDef>,
    /// A series of scenes; mutually exclusive with `scene`
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
}

fn default_fps() -> u32 {
    30
}

/// What a scene file describes once built
#[derive(Clone, Debug)]
pub enum Composition {
    Scene(Scene),
    Series(Series),
}

impl Composition {
    /// Length in frames, if known
    pub fn duration(&self) -> Option<u32> {
        match self {
            Composition::Scene(scene) => scene.duration(),
            Composition::Series(series) => Some(series.total_duration()),
        }
    }

    /// Resolve one frame; `None` when a series has nothing active
    pub fn resolve(&self, frame: u32, fps: u32) -> Option<VisualState> {
        match self {
            Composition::Scene(scene) => Some(scene.resolve(frame, fps)),
            Composition::Series(series) => series.resolve(frame, fps),
        }
    }
}

impl SceneFile {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn build(&self) -> Result<Composition> {
        if self.fps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "fps",
                reason: "must be at least 1".to_string(),
            });
        }

        let composition = match (&self.scene, self.segments.is_empty()) {
            (Some(scene), true) => Composition::Scene(scene.build()?),
            (None, false) => Composition::Series(Series::new(build_timeline(&self.segments)?)?),
            (Some(_), false) => {
                return Err(ConfigError::InvalidParameter {
                    name: "scene file",
                    reason: "defines both a scene and segments".to_string(),
                })
            }
            (None, true) => {
                return Err(ConfigError::InvalidParameter {
                    name: "scene file",
                    reason: "defines neither a scene nor segments".to_string(),
                })
            }
        };

        debug!(fps = self.fps, duration = ?composition.duration(), "scene file built");
        Ok(composition)
    }
}

/// One scene: phases, channels and staggered channel groups
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDef {
    pub name: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub phases: Vec<PhaseDef>,
    #[serde(default)]
    pub channels: IndexMap<String, ChannelDef>,
    #[serde(default)]
    pub stagger: Vec<StaggerDef>,
}

impl SceneDef {
    pub fn build(&self) -> Result<Scene> {
        let phases = build_phases(&self.phases)?;

        let mut channels = Vec::with_capacity(self.channels.len());
        for (name, def) in &self.channels {
            channels.push((name.clone(), def.build(&phases)?));
        }
        let mut groups = Vec::with_capacity(self.stagger.len());
        for group in &self.stagger {
            groups.push((group, group.channel.build(&phases)?));
        }

        let mut builder = Scene::builder(self.name.clone()).phases(phases);
        if let Some(duration) = self.duration {
            builder = builder.duration(duration);
        }
        for (name, channel) in channels {
            builder = builder.channel(name, channel);
        }
        for (group, channel) in groups {
            builder = builder.stagger(&group.prefix, group.count, group.step, |_, delay| {
                channel.clone().delayed(delay)
            });
        }
        builder.build()
    }
}

/// A phase given by `start`/`end`, `start`/`duration`, or just `duration`
/// (starting where the previous phase ended)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseDef {
    pub name: String,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub end: Option<u32>,
    #[serde(default)]
    pub duration: Option<u32>,
}

fn build_phases(defs: &[PhaseDef]) -> Result<PhaseTable> {
    let mut builder = PhaseTable::builder();
    let mut cursor = 0u32;
    for def in defs {
        let start = def.start.unwrap_or(cursor);
        let end = match (def.end, def.duration) {
            (Some(end), None) => end,
            (None, Some(duration)) => start.saturating_add(duration),
            _ => {
                return Err(ConfigError::InvalidParameter {
                    name: "phase",
                    reason: format!("'{}' needs exactly one of end or duration", def.name),
                })
            }
        };
        builder = builder.phase(def.name.clone(), start, end);
        cursor = end;
    }
    builder.build()
}

/// A series segment holding either a scene or nested segments
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentDef {
    pub name: String,
    /// Defaults to the scene's duration, or the nested segments' total
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub scene: Option<SceneDef>,
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
}

fn build_timeline(defs: &[SegmentDef]) -> Result<Timeline<Scene>> {
    let mut builder = Timeline::builder();
    for def in defs {
        builder = match (&def.scene, def.segments.is_empty()) {
            (Some(scene), true) => {
                let scene = scene.build()?;
                let duration = def.duration.or_else(|| scene.duration()).ok_or_else(|| {
                    ConfigError::InvalidParameter {
                        name: "segment duration",
                        reason: format!("segment '{}' has no duration", def.name),
                    }
                })?;
                builder.segment(def.name.clone(), duration, scene)
            }
            (None, false) => {
                let inner = build_timeline(&def.segments)?;
                match def.duration {
                    Some(duration) => builder.nested_for(def.name.clone(), duration, inner),
                    None => builder.nested(def.name.clone(), inner),
                }
            }
            _ => {
                return Err(ConfigError::InvalidParameter {
                    name: "segment",
                    reason: format!("'{}' needs exactly one of scene or segments", def.name),
                })
            }
        };
    }
    builder.build()
}

/// Named spring configurations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpringPreset {
    #[default]
    Default,
    Gentle,
    Wobbly,
    Stiff,
    Snappy,
    Smooth,
}

impl SpringPreset {
    pub fn config(self) -> SpringConfig {
        match self {
            SpringPreset::Default => SpringConfig::default(),
            SpringPreset::Gentle => SpringConfig::gentle(),
            SpringPreset::Wobbly => SpringConfig::wobbly(),
            SpringPreset::Stiff => SpringConfig::stiff(),
            SpringPreset::Snappy => SpringConfig::snappy(),
            SpringPreset::Smooth => SpringConfig::smooth(),
        }
    }
}

/// Spring source: a preset with optional overrides, released `delay` frames
/// after the start of phase `after` (or after frame 0)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpringDef {
    #[serde(default)]
    pub preset: SpringPreset,
    pub mass: Option<f32>,
    pub stiffness: Option<f32>,
    pub damping: Option<f32>,
    pub from: Option<f32>,
    pub to: Option<f32>,
    pub velocity: Option<f32>,
    #[serde(default)]
    pub overshoot_clamping: bool,
    #[serde(default)]
    pub delay: f32,
    pub after: Option<String>,
}

impl SpringDef {
    pub fn config(&self) -> SpringConfig {
        let base = self.preset.config();
        SpringConfig {
            mass: self.mass.unwrap_or(base.mass),
            stiffness: self.stiffness.unwrap_or(base.stiffness),
            damping: self.damping.unwrap_or(base.damping),
            from: self.from.unwrap_or(base.from),
            to: self.to.unwrap_or(base.to),
            initial_velocity: self.velocity.or(base.initial_velocity),
            overshoot_clamping: self.overshoot_clamping,
        }
    }

    fn build(&self, phases: &PhaseTable) -> Result<Signal> {
        let spring = Spring::new(self.config())?;
        let start = match &self.after {
            Some(name) => phases
                .get(name)
                .ok_or_else(|| ConfigError::UnknownPhase(name.clone()))?
                .start() as f32,
            None => 0.0,
        };
        Ok(Signal::delayed_spring(spring, start + self.delay))
    }
}

/// Breakpoint table applied to an input signal (the frame by default)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapDef<T> {
    #[serde(default)]
    pub input: Option<Box<SignalDef>>,
    pub inputs: Vec<f32>,
    pub outputs: Vec<T>,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub extrapolate: Option<Extrapolate>,
    #[serde(default)]
    pub extrapolate_left: Option<Extrapolate>,
    #[serde(default)]
    pub extrapolate_right: Option<Extrapolate>,
}

impl<T: Interpolate> MapDef<T> {
    fn mapper(&self) -> Result<RangeMapper<T>> {
        let both = self.extrapolate.unwrap_or_default();
        let options = InterpolateOptions::new()
            .easing(self.easing.clone())
            .extrapolate_left(self.extrapolate_left.unwrap_or(both))
            .extrapolate_right(self.extrapolate_right.unwrap_or(both));
        RangeMapper::with_options(
            self.inputs.iter().copied(),
            self.outputs.iter().cloned(),
            options,
        )
    }

    fn input(&self, phases: &PhaseTable) -> Result<Signal> {
        match &self.input {
            Some(def) => def.build(phases),
            None => Ok(Signal::Frame),
        }
    }
}

/// Scalar source, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum SignalDef {
    Frame,
    Seconds,
    Constant {
        value: f32,
    },
    PhaseProgress {
        phase: String,
    },
    PhaseFrame {
        phase: String,
    },
    Spring(SpringDef),
    Interpolate(MapDef<f32>),
    Wave {
        #[serde(default)]
        offset: f32,
        amplitude: f32,
        period: f32,
        #[serde(default)]
        phase: f32,
        #[serde(default)]
        shape: WaveShape,
    },
    Delay {
        input: Box<SignalDef>,
        frames: f32,
    },
    Sum {
        terms: Vec<SignalDef>,
    },
    Product {
        factors: Vec<SignalDef>,
    },
}

impl SignalDef {
    pub fn build(&self, phases: &PhaseTable) -> Result<Signal> {
        Ok(match self {
            SignalDef::Frame => Signal::Frame,
            SignalDef::Seconds => Signal::Seconds,
            SignalDef::Constant { value } => Signal::Constant(*value),
            SignalDef::PhaseProgress { phase } => Signal::PhaseProgress(phase.clone()),
            SignalDef::PhaseFrame { phase } => Signal::PhaseFrame(phase.clone()),
            SignalDef::Spring(spring) => spring.build(phases)?,
            SignalDef::Interpolate(map) => map.input(phases)?.map(map.mapper()?),
            SignalDef::Wave {
                offset,
                amplitude,
                period,
                phase,
                shape,
            } => Signal::Wave {
                shape: *shape,
                offset: *offset,
                amplitude: *amplitude,
                period: *period,
                phase: *phase,
            },
            SignalDef::Delay { input, frames } => input.build(phases)?.delay(*frames),
            SignalDef::Sum { terms } => Signal::Sum(build_all(terms, phases)?),
            SignalDef::Product { factors } => Signal::Product(build_all(factors, phases)?),
        })
    }
}

fn build_all(defs: &[SignalDef], phases: &PhaseTable) -> Result<Vec<Signal>> {
    defs.iter().map(|def| def.build(phases)).collect()
}

/// Channel definition, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ChannelDef {
    Number {
        source: SignalDef,
    },
    Text {
        value: String,
    },
    Flag {
        value: bool,
    },
    Vec2(MapDef<[f32; 2]>),
    Point {
        x: SignalDef,
        y: SignalDef,
    },
    Color(MapDef<Color>),
    Typewriter {
        text: String,
        source: SignalDef,
    },
    Blink {
        period: u32,
    },
    Visible {
        #[serde(default)]
        from: u32,
        #[serde(default)]
        until: Option<u32>,
    },
    Phased {
        arms: Vec<ArmDef>,
        #[serde(default)]
        otherwise: Option<Box<ChannelDef>>,
    },
    Delay {
        frames: f32,
        channel: Box<ChannelDef>,
    },
}

/// One arm of a phased channel
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmDef {
    pub phase: String,
    pub channel: ChannelDef,
}

impl ChannelDef {
    pub fn build(&self, phases: &PhaseTable) -> Result<Channel> {
        Ok(match self {
            ChannelDef::Number { source } => Channel::Number(source.build(phases)?),
            ChannelDef::Text { value } => Channel::Constant(Value::Text(value.clone())),
            ChannelDef::Flag { value } => Channel::Constant(Value::Bool(*value)),
            ChannelDef::Vec2(map) => Channel::Vec2 {
                input: map.input(phases)?,
                mapper: map.mapper()?,
            },
            ChannelDef::Point { x, y } => Channel::Point {
                x: x.build(phases)?,
                y: y.build(phases)?,
            },
            ChannelDef::Color(map) => Channel::Color {
                input: map.input(phases)?,
                mapper: map.mapper()?,
            },
            ChannelDef::Typewriter { text, source } => {
                Channel::typewriter(text.clone(), source.build(phases)?)
            }
            ChannelDef::Blink { period } => Channel::Blink { period: *period },
            ChannelDef::Visible { from, until } => Channel::Visible {
                from: *from,
                until: *until,
            },
            ChannelDef::Phased { arms, otherwise } => {
                let mut channel = Channel::phased();
                for arm in arms {
                    channel = channel.arm(arm.phase.clone(), arm.channel.build(phases)?);
                }
                if let Some(otherwise) = otherwise {
                    channel = channel.otherwise(otherwise.build(phases)?);
                }
                channel
            }
            ChannelDef::Delay { frames, channel } => channel.build(phases)?.delayed(*frames),
        })
    }
}

/// A group of `count` copies of one channel, each delayed `step` frames more
/// than the previous, registered as `{prefix}_{i}`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaggerDef {
    pub prefix: String,
    pub count: usize,
    pub step: f32,
    pub channel: ChannelDef,
}
