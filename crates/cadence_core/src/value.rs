//! Evaluated channel values and the per-frame visual state

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::color::Color;

/// The evaluated value of a single channel.
///
/// Serialized without a tag: numbers as JSON numbers, vectors as arrays,
/// colors as hex strings.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f32),
    Vec2([f32; 2]),
    Color(Color),
    Text(String),
    Bool(bool),
}

impl Value {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<[f32; 2]> {
        match self {
            Value::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(v)
    }
}

impl From<[f32; 2]> for Value {
    fn from(v: [f32; 2]) -> Self {
        Value::Vec2(v)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Channel values computed for one frame.
///
/// Entries keep the order in which channels were registered. A state is built
/// fresh for every frame and carries no identity beyond the frame number it
/// was computed for.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct VisualState {
    frame: u32,
    values: IndexMap<String, Value>,
}

impl VisualState {
    pub fn new(frame: u32) -> Self {
        Self {
            frame,
            values: IndexMap::new(),
        }
    }

    pub fn with_capacity(frame: u32, capacity: usize) -> Self {
        Self {
            frame,
            values: IndexMap::with_capacity(capacity),
        }
    }

    /// The frame this state was computed for
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn insert(&mut self, channel: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(channel.into(), value.into());
    }

    pub fn get(&self, channel: &str) -> Option<&Value> {
        self.values.get(channel)
    }

    pub fn number(&self, channel: &str) -> Option<f32> {
        self.get(channel).and_then(Value::as_number)
    }

    pub fn vec2(&self, channel: &str) -> Option<[f32; 2]> {
        self.get(channel).and_then(Value::as_vec2)
    }

    pub fn color(&self, channel: &str) -> Option<Color> {
        self.get(channel).and_then(Value::as_color)
    }

    pub fn text(&self, channel: &str) -> Option<&str> {
        self.get(channel).and_then(Value::as_text)
    }

    pub fn flag(&self, channel: &str) -> Option<bool> {
        self.get(channel).and_then(Value::as_bool)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Serializes as a flat `{ channel: value }` object; the frame number is
/// left to the caller.
impl Serialize for VisualState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
