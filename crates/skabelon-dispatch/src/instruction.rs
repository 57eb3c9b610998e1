//! Render instructions and their line-oriented wire format.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One unit of work: which template to render, with what data, and where to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderInstruction {
    /// Template name, relative to the template directory.
    pub template: String,
    /// Variable bindings for the template.
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Destination file.
    pub output: PathBuf,
}

/// The two accepted encodings of an instruction line.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireInstruction {
    Triple(String, Map<String, Value>, PathBuf),
    Named(RenderInstruction),
}

impl RenderInstruction {
    pub fn new(
        template: impl Into<String>,
        context: Map<String, Value>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            template: template.into(),
            context,
            output: output.into(),
        }
    }

    /// Builds an instruction from any JSON value, which must be an object.
    ///
    /// Non-object contexts are replaced by an empty context; use
    /// [`from_line`](Self::from_line) to reject them instead.
    pub fn with_value(
        template: impl Into<String>,
        context: Value,
        output: impl Into<PathBuf>,
    ) -> Self {
        let context = match context {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(template, context, output)
    }

    /// Decodes one line of dispatch output.
    ///
    /// Accepts `["template", {...}, "output"]` or
    /// `{"template": ..., "context": {...}, "output": ...}`.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        let wire: WireInstruction = serde_json::from_str(line)?;
        Ok(match wire {
            WireInstruction::Triple(template, context, output) => Self {
                template,
                context,
                output,
            },
            WireInstruction::Named(instruction) => instruction,
        })
    }

    /// The context as a JSON value, ready for the template engine.
    pub fn context_value(&self) -> Value {
        Value::Object(self.context.clone())
    }
}
