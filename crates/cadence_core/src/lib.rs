//! Cadence Core Types
//!
//! Shared primitives for the Cadence animation engine:
//!
//! - **Configuration errors**: every invalid scene parameter is rejected at
//!   construction time with a [`ConfigError`]
//! - **Colors**: linear RGBA values that can be parsed from hex and blended
//! - **Visual state**: the flat, per-frame record of evaluated channel values
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Color, Value, VisualState};
//!
//! let mut state = VisualState::new(12);
//! state.insert("opacity", Value::Number(0.5));
//! state.insert("accent", Value::Color(Color::from_hex(0x2563eb)));
//!
//! assert_eq!(state.number("opacity"), Some(0.5));
//! ```

pub mod color;
pub mod error;
pub mod value;

pub use color::Color;
pub use error::{ConfigError, Result};
pub use value::{Value, VisualState};
