//! Channel definitions
//!
//! A channel is one named entry of the visual state. Each variant turns the
//! frame context into a [`Value`], usually by evaluating one or more
//! [`Signal`]s. Channels never read each other.

use std::fmt;
use std::sync::Arc;

use cadence_animation::{RangeMapper, Spring};
use cadence_core::{Color, ConfigError, Result, Value};

use crate::phase::PhaseTable;
use crate::signal::{FrameContext, Signal};

/// Closure channel for values no built-in variant covers
pub type CustomFn = Arc<dyn Fn(&FrameContext<'_>) -> Value + Send + Sync>;

/// How one visual-state entry is computed
#[derive(Clone)]
pub enum Channel {
    Number(Signal),
    /// A fixed value, e.g. a label
    Constant(Value),
    /// A 2D value mapped from one driving signal
    Vec2 {
        input: Signal,
        mapper: RangeMapper<[f32; 2]>,
    },
    /// A 2D value whose components are driven independently
    Point { x: Signal, y: Signal },
    Color {
        input: Signal,
        mapper: RangeMapper<Color>,
    },
    /// The first `floor(input)` characters of `text`
    Typewriter { text: String, input: Signal },
    /// `true` for `period` frames, then `false` for `period` frames
    Blink { period: u32 },
    /// `true` from frame `from` until (excluding) frame `until`
    Visible { from: u32, until: Option<u32> },
    /// Picks a sub-channel by the most recent phase that has an arm. Before
    /// any armed phase starts, `otherwise` is used, or the first arm.
    Phased {
        arms: Vec<(String, Channel)>,
        otherwise: Option<Box<Channel>>,
    },
    /// Evaluates the inner channel `frames` later
    Delayed { channel: Box<Channel>, frames: f32 },
    Custom(CustomFn),
}

impl Channel {
    pub fn number(signal: Signal) -> Self {
        Channel::Number(signal)
    }

    pub fn typewriter(text: impl Into<String>, input: Signal) -> Self {
        Channel::Typewriter {
            text: text.into(),
            input,
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&FrameContext<'_>) -> Value + Send + Sync + 'static,
    {
        Channel::Custom(Arc::new(f))
    }

    /// Start a phase-selected channel with no arms
    pub fn phased() -> Self {
        Channel::Phased {
            arms: Vec::new(),
            otherwise: None,
        }
    }

    /// Add an arm to a [`Channel::Phased`]; other variants are returned as-is
    pub fn arm(mut self, phase: impl Into<String>, channel: Channel) -> Self {
        if let Channel::Phased { arms, .. } = &mut self {
            arms.push((phase.into(), channel));
        }
        self
    }

    /// Set the fallback of a [`Channel::Phased`] used before its first arm
    pub fn otherwise(mut self, channel: Channel) -> Self {
        if let Channel::Phased { otherwise, .. } = &mut self {
            *otherwise = Some(Box::new(channel));
        }
        self
    }

    pub fn delayed(self, frames: f32) -> Self {
        Channel::Delayed {
            channel: Box::new(self),
            frames,
        }
    }

    pub fn evaluate(&self, ctx: &FrameContext<'_>) -> Value {
        match self {
            Channel::Number(signal) => Value::Number(signal.evaluate(ctx)),
            Channel::Constant(value) => value.clone(),
            Channel::Vec2 { input, mapper } => Value::Vec2(mapper.map(input.evaluate(ctx))),
            Channel::Point { x, y } => Value::Vec2([x.evaluate(ctx), y.evaluate(ctx)]),
            Channel::Color { input, mapper } => Value::Color(mapper.map(input.evaluate(ctx))),
            Channel::Typewriter { text, input } => {
                Value::Text(reveal(text, input.evaluate(ctx)).to_string())
            }
            Channel::Blink { period } => {
                let cycle = (ctx.frame / (*period).max(1) as f32).floor();
                Value::Bool(cycle.rem_euclid(2.0) == 0.0)
            }
            Channel::Visible { from, until } => {
                let after_start = ctx.frame >= *from as f32;
                let before_end = until.map_or(true, |until| ctx.frame < until as f32);
                Value::Bool(after_start && before_end)
            }
            Channel::Phased { arms, otherwise } => {
                let fallback = || otherwise.as_deref().or(arms.first().map(|(_, arm)| arm));
                match select_arm(arms, ctx).or_else(fallback) {
                    Some(channel) => channel.evaluate(ctx),
                    None => Value::Number(0.0),
                }
            }
            Channel::Delayed { channel, frames } => channel.evaluate(&ctx.delayed(*frames)),
            Channel::Custom(f) => f(ctx),
        }
    }

    /// Every spring this channel reads, with the frame at which it is released
    pub fn springs(&self) -> Vec<(&Spring, f32)> {
        let mut found = Vec::new();
        self.collect_springs(0.0, &mut found);
        found
    }

    fn collect_springs<'s>(&'s self, offset: f32, found: &mut Vec<(&'s Spring, f32)>) {
        match self {
            Channel::Number(signal)
            | Channel::Vec2 { input: signal, .. }
            | Channel::Color { input: signal, .. }
            | Channel::Typewriter { input: signal, .. } => signal.collect_springs(offset, found),
            Channel::Point { x, y } => {
                x.collect_springs(offset, found);
                y.collect_springs(offset, found);
            }
            Channel::Phased { arms, otherwise } => {
                for (_, channel) in arms {
                    channel.collect_springs(offset, found);
                }
                if let Some(channel) = otherwise {
                    channel.collect_springs(offset, found);
                }
            }
            Channel::Delayed { channel, frames } => channel.collect_springs(offset + frames, found),
            Channel::Constant(_)
            | Channel::Blink { .. }
            | Channel::Visible { .. }
            | Channel::Custom(_) => {}
        }
    }

    /// Check phase references and parameters against `phases`
    pub fn validate(&self, phases: &PhaseTable) -> Result<()> {
        match self {
            Channel::Number(signal)
            | Channel::Vec2 { input: signal, .. }
            | Channel::Color { input: signal, .. }
            | Channel::Typewriter { input: signal, .. } => signal.validate(phases),
            Channel::Point { x, y } => {
                x.validate(phases)?;
                y.validate(phases)
            }
            Channel::Blink { period } => {
                if *period == 0 {
                    return Err(ConfigError::InvalidParameter {
                        name: "blink period",
                        reason: "must be at least one frame".to_string(),
                    });
                }
                Ok(())
            }
            Channel::Visible { from, until } => match until {
                Some(until) if until <= from => Err(ConfigError::InvalidParameter {
                    name: "visible window",
                    reason: format!("ends at frame {until} before it starts at frame {from}"),
                }),
                _ => Ok(()),
            },
            Channel::Phased { arms, otherwise } => {
                if arms.is_empty() && otherwise.is_none() {
                    return Err(ConfigError::InvalidParameter {
                        name: "phased channel",
                        reason: "needs at least one arm".to_string(),
                    });
                }
                for (index, (phase, channel)) in arms.iter().enumerate() {
                    if phases.get(phase).is_none() {
                        return Err(ConfigError::UnknownPhase(phase.clone()));
                    }
                    if arms[..index].iter().any(|(other, _)| other == phase) {
                        return Err(ConfigError::DuplicateName {
                            kind: "phase arm",
                            name: phase.clone(),
                        });
                    }
                    channel.validate(phases)?;
                }
                match otherwise {
                    Some(channel) => channel.validate(phases),
                    None => Ok(()),
                }
            }
            Channel::Delayed { channel, frames } => {
                if !frames.is_finite() {
                    return Err(ConfigError::NonFinite("delay"));
                }
                channel.validate(phases)
            }
            Channel::Constant(_) | Channel::Custom(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Number(signal) => f.debug_tuple("Number").field(signal).finish(),
            Channel::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Channel::Vec2 { input, mapper } => f
                .debug_struct("Vec2")
                .field("input", input)
                .field("mapper", mapper)
                .finish(),
            Channel::Point { x, y } => f.debug_struct("Point").field("x", x).field("y", y).finish(),
            Channel::Color { input, mapper } => f
                .debug_struct("Color")
                .field("input", input)
                .field("mapper", mapper)
                .finish(),
            Channel::Typewriter { text, input } => f
                .debug_struct("Typewriter")
                .field("text", text)
                .field("input", input)
                .finish(),
            Channel::Blink { period } => f.debug_struct("Blink").field("period", period).finish(),
            Channel::Visible { from, until } => f
                .debug_struct("Visible")
                .field("from", from)
                .field("until", until)
                .finish(),
            Channel::Phased { arms, otherwise } => f
                .debug_struct("Phased")
                .field("arms", arms)
                .field("otherwise", otherwise)
                .finish(),
            Channel::Delayed { channel, frames } => f
                .debug_struct("Delayed")
                .field("channel", channel)
                .field("frames", frames)
                .finish(),
            Channel::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Prefix of `text` holding `floor(count)` characters, clamped to the text
fn reveal(text: &str, count: f32) -> &str {
    if count.is_nan() || count < 1.0 {
        return "";
    }
    let count = count.floor() as usize;
    match text.char_indices().nth(count) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// The arm whose phase started most recently at or before the current frame
fn select_arm<'c>(arms: &'c [(String, Channel)], ctx: &FrameContext<'_>) -> Option<&'c Channel> {
    arms.iter()
        .filter_map(|(name, channel)| {
            let start = ctx.phases.get(name)?.start() as f32;
            (start <= ctx.frame).then_some((start, channel))
        })
        .fold(None, |best: Option<(f32, &Channel)>, (start, channel)| match best {
            Some((best_start, _)) if best_start >= start => best,
            _ => Some((start, channel)),
        })
        .map(|(_, channel)| channel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(frame: u32, phases: &PhaseTable) -> FrameContext<'_> {
        FrameContext::new(frame, 30, phases)
    }

    #[test]
    fn test_typewriter_reveals_whole_characters() {
        let table = PhaseTable::empty();
        let typing = Channel::typewriter(
            "Jupiter",
            Signal::frames(RangeMapper::new([0.0, 70.0], [0.0, 7.0]).unwrap()),
        );
        assert_eq!(typing.evaluate(&at(0, &table)), Value::Text(String::new()));
        assert_eq!(typing.evaluate(&at(29, &table)), Value::Text("Ju".to_string()));
        assert_eq!(typing.evaluate(&at(200, &table)), Value::Text("Jupiter".to_string()));
    }

    #[test]
    fn test_typewriter_is_char_boundary_safe() {
        assert_eq!(reveal("héllo✓", 2.0), "hé");
        assert_eq!(reveal("héllo✓", 5.9), "héllo");
        assert_eq!(reveal("héllo✓", 6.0), "héllo✓");
        assert_eq!(reveal("héllo✓", 99.0), "héllo✓");
        assert_eq!(reveal("héllo✓", -3.0), "");
        assert_eq!(reveal("héllo✓", f32::NAN), "");
    }

    #[test]
    fn test_blink_alternates() {
        let table = PhaseTable::empty();
        let cursor = Channel::Blink { period: 45 };
        assert_eq!(cursor.evaluate(&at(0, &table)), Value::Bool(true));
        assert_eq!(cursor.evaluate(&at(44, &table)), Value::Bool(true));
        assert_eq!(cursor.evaluate(&at(45, &table)), Value::Bool(false));
        assert_eq!(cursor.evaluate(&at(90, &table)), Value::Bool(true));
    }

    #[test]
    fn test_visible_window() {
        let table = PhaseTable::empty();
        let badge = Channel::Visible {
            from: 10,
            until: Some(20),
        };
        assert_eq!(badge.evaluate(&at(9, &table)), Value::Bool(false));
        assert_eq!(badge.evaluate(&at(10, &table)), Value::Bool(true));
        assert_eq!(badge.evaluate(&at(20, &table)), Value::Bool(false));

        let forever = Channel::Visible { from: 0, until: None };
        assert_eq!(forever.evaluate(&at(100_000, &table)), Value::Bool(true));
    }

    #[test]
    fn test_phased_selects_latest_armed_phase() {
        let table = PhaseTable::builder()
            .phase("approach", 10, 40)
            .phase("hover", 40, 60)
            .phase("click", 60, 70)
            .build()
            .unwrap();
        let cursor = Channel::phased()
            .arm("approach", Channel::Number(Signal::phase_progress("approach")))
            .arm("click", Channel::Number(Signal::constant(2.0)))
            .otherwise(Channel::Number(Signal::constant(-1.0)));

        assert_eq!(cursor.evaluate(&at(0, &table)), Value::Number(-1.0));
        assert_eq!(cursor.evaluate(&at(25, &table)), Value::Number(0.5));
        // no arm for hover: approach stays selected and holds at 1
        assert_eq!(cursor.evaluate(&at(50, &table)), Value::Number(1.0));
        assert_eq!(cursor.evaluate(&at(60, &table)), Value::Number(2.0));
        assert_eq!(cursor.evaluate(&at(500, &table)), Value::Number(2.0));
    }

    #[test]
    fn test_springs_include_channel_delay() {
        let spring = Spring::new(cadence_animation::SpringConfig::stiff()).unwrap();
        let card = Channel::Number(Signal::delayed_spring(spring, 110.0)).delayed(16.0);
        let releases: Vec<f32> = card.springs().into_iter().map(|(_, at)| at).collect();
        assert_eq!(releases, vec![126.0]);
        assert!(Channel::Blink { period: 30 }.springs().is_empty());
    }

    #[test]
    fn test_delayed_channel() {
        let table = PhaseTable::empty();
        let late = Channel::Visible { from: 0, until: None }.delayed(16.0);
        assert_eq!(late.evaluate(&at(15, &table)), Value::Bool(false));
        assert_eq!(late.evaluate(&at(16, &table)), Value::Bool(true));
    }

    #[test]
    fn test_custom_and_color_channels() {
        let table = PhaseTable::empty();
        let custom = Channel::custom(|ctx| Value::Number(ctx.frame * 2.0));
        assert_eq!(custom.evaluate(&at(4, &table)), Value::Number(8.0));
        assert_eq!(format!("{custom:?}"), "Custom(..)");

        let tint = Channel::Color {
            input: Signal::Frame,
            mapper: RangeMapper::new([0.0, 10.0], [Color::BLACK, Color::WHITE]).unwrap(),
        };
        assert_eq!(tint.evaluate(&at(10, &table)), Value::Color(Color::WHITE));
    }

    #[test]
    fn test_validation() {
        let table = PhaseTable::builder().phase("hover", 0, 10).build().unwrap();
        assert!(Channel::Blink { period: 0 }.validate(&table).is_err());
        assert!(Channel::Visible {
            from: 10,
            until: Some(5)
        }
        .validate(&table)
        .is_err());
        assert_eq!(
            Channel::phased()
                .arm("missing", Channel::Constant(Value::Bool(true)))
                .validate(&table),
            Err(ConfigError::UnknownPhase("missing".to_string()))
        );
        assert!(Channel::phased().validate(&table).is_err());
        assert!(Channel::phased()
            .arm("hover", Channel::Number(Signal::Frame))
            .validate(&table)
            .is_ok());
    }
}
