//! Bedrock animation file parsing.

use serde::Deserialize;
use serde_json::{Map, Value};

/// An animation file: `{"animations": {"animation.x.walk": {...}}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimationFile {
    #[serde(default)]
    pub animations: Map<String, Value>,
}

/// The parts of an animation the project generator carries over.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimationDefinition {
    #[serde(default, rename = "loop")]
    pub looping: Option<Value>,
    #[serde(default)]
    pub override_previous_animation: bool,
    #[serde(default)]
    pub animation_length: Option<f32>,
    #[serde(default)]
    pub bones: Option<Value>,
}

/// Loop behaviour as the editor names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    Hold,
}

impl LoopMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopMode::Once => "once",
            LoopMode::Loop => "loop",
            LoopMode::Hold => "hold",
        }
    }
}

impl AnimationDefinition {
    /// `true` loops, `"hold_on_last_frame"` holds, anything else plays once.
    pub fn loop_mode(&self) -> LoopMode {
        match &self.looping {
            Some(Value::Bool(true)) => LoopMode::Loop,
            Some(Value::String(s)) if s == "hold_on_last_frame" => LoopMode::Hold,
            Some(Value::String(s)) if s == "true" => LoopMode::Loop,
            _ => LoopMode::Once,
        }
    }

    pub fn length(&self) -> f32 {
        self.animation_length.unwrap_or(0.0)
    }
}
