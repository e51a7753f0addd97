//! Configuration error types

use thiserror::Error;

/// Errors raised while constructing animation configuration.
///
/// Evaluation never fails: once a mapper, spring, timeline or scene has been
/// built, every frame resolves to a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Breakpoint and output arrays differ in length
    #[error("breakpoint count ({inputs}) does not match output count ({outputs})")]
    LengthMismatch { inputs: usize, outputs: usize },

    /// Fewer than two breakpoints were supplied
    #[error("at least 2 breakpoints are required, got {0}")]
    TooFewBreakpoints(usize),

    /// Breakpoints are not strictly increasing
    #[error("breakpoints must be strictly increasing: [{index}] = {value} follows {previous}")]
    NonMonotonic {
        index: usize,
        previous: f32,
        value: f32,
    },

    /// A numeric parameter is NaN or infinite
    #[error("{0} must be finite")]
    NonFinite(&'static str),

    /// A segment or phase has no frames
    #[error("'{0}' has a duration of zero frames")]
    ZeroDuration(String),

    /// A timeline has no segments
    #[error("timeline has no segments")]
    EmptyTimeline,

    /// Spring coefficients are outside their valid domain
    #[error("invalid spring: {0}")]
    InvalidSpring(String),

    /// Phase boundaries overlap or are out of order
    #[error("phase '{next}' starts at frame {next_start} before '{previous}' ends at frame {previous_end}")]
    PhaseOverlap {
        previous: String,
        previous_end: u32,
        next: String,
        next_start: u32,
    },

    /// A phase ends before (or where) it starts
    #[error("phase '{name}' is empty: [{start}, {end})")]
    EmptyPhase { name: String, start: u32, end: u32 },

    /// A name is registered twice
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    /// A channel refers to a phase that the scene does not define
    #[error("unknown phase '{0}'")]
    UnknownPhase(String),

    /// A color string could not be parsed
    #[error("invalid color '{0}'")]
    InvalidColor(String),

    /// Any other out-of-range parameter
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A scene description could not be parsed
    #[error("failed to parse scene: {0}")]
    Parse(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
