pub mod audio_fetch;
pub mod registry;

pub use audio_fetch::AudioFetchNode;
pub use registry::NodeRegistry;

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::audio::AudioBatch;
use crate::error::{FetchError, FetchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InputType {
    String,
    Int,
    Float,
    Boolean,
}

/// Declaration of one node input, as shown to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: InputType,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_on: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_off: Option<&'static str>,
}

impl InputSpec {
    fn new(name: &'static str, kind: InputType, default: Value) -> Self {
        Self {
            name,
            kind,
            default,
            min: None,
            max: None,
            step: None,
            display: None,
            multiline: false,
            toggle_on: None,
            toggle_off: None,
        }
    }

    pub fn string(name: &'static str, default: &str) -> Self {
        Self::new(name, InputType::String, Value::from(default))
    }

    pub fn int(name: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            min: Some(min as f64),
            max: Some(max as f64),
            step: Some(1.0),
            display: Some("number"),
            ..Self::new(name, InputType::Int, Value::from(default))
        }
    }

    pub fn float(name: &'static str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            step: Some(step),
            display: Some("slider"),
            ..Self::new(name, InputType::Float, Value::from(default))
        }
    }

    pub fn boolean(name: &'static str, default: bool) -> Self {
        Self::new(name, InputType::Boolean, Value::from(default))
    }

    pub fn toggles(mut self, on: &'static str, off: &'static str) -> Self {
        self.toggle_on = Some(on);
        self.toggle_off = Some(off);
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputSchema {
    pub required: Vec<InputSpec>,
    pub optional: Vec<InputSpec>,
}

impl InputSchema {
    pub fn find(&self, name: &str) -> Option<&InputSpec> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|spec| spec.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Values produced by a node, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Audio(AudioBatch),
}

/// Input values supplied by the host for one execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeInputs {
    values: Map<String, Value>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// The supplied value, else the schema default. `null` counts as absent.
    fn lookup<'a>(&'a self, schema: &'a InputSchema, name: &str) -> FetchResult<Option<&'a Value>> {
        let spec = schema
            .find(name)
            .ok_or_else(|| FetchError::InvalidInput(format!("undeclared input '{}'", name)))?;
        Ok(self
            .values
            .get(name)
            .filter(|v| !v.is_null())
            .or(Some(&spec.default).filter(|v| !v.is_null())))
    }

    pub fn string(&self, schema: &InputSchema, name: &str) -> FetchResult<Option<String>> {
        match self.lookup(schema, name)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(type_error(name, "a string", other)),
        }
    }

    pub fn int(&self, schema: &InputSchema, name: &str) -> FetchResult<Option<i64>> {
        match self.lookup(schema, name)? {
            None => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or_else(|| type_error(name, "an integer", v)),
        }
    }

    pub fn float(&self, schema: &InputSchema, name: &str) -> FetchResult<Option<f64>> {
        match self.lookup(schema, name)? {
            None => Ok(None),
            Some(v) => v.as_f64().map(Some).ok_or_else(|| type_error(name, "a number", v)),
        }
    }

    pub fn boolean(&self, schema: &InputSchema, name: &str) -> FetchResult<Option<bool>> {
        match self.lookup(schema, name)? {
            None => Ok(None),
            Some(v) => v.as_bool().map(Some).ok_or_else(|| type_error(name, "a boolean", v)),
        }
    }
}

fn type_error(name: &str, expected: &str, got: &Value) -> FetchError {
    FetchError::InvalidInput(format!("input '{}' must be {}, got {}", name, expected, got))
}

/// Where the host keeps user-facing input media.
pub trait InputDirectory {
    fn input_directory(&self) -> PathBuf;
}

#[derive(Debug, Clone)]
pub struct FixedInputDirectory(PathBuf);

impl FixedInputDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl InputDirectory for FixedInputDirectory {
    fn input_directory(&self) -> PathBuf {
        self.0.clone()
    }
}

/// Host services available while a node executes.
pub struct ExecutionContext<'a> {
    pub input_dir: &'a dyn InputDirectory,
    /// Match files against Windows-safe names as well.
    pub restrict_filenames: bool,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(input_dir: &'a dyn InputDirectory) -> Self {
        Self {
            input_dir,
            restrict_filenames: cfg!(windows),
        }
    }
}

/// A unit of work the host graph can schedule.
pub trait Node {
    fn describe_inputs(&self) -> InputSchema;

    fn describe_outputs(&self) -> Vec<OutputSpec>;

    fn category(&self) -> &'static str;

    /// Output nodes are executed for their side effects even when nothing
    /// consumes their values.
    fn is_output_node(&self) -> bool {
        false
    }

    fn execute(&self, ctx: &ExecutionContext, inputs: &NodeInputs) -> FetchResult<Vec<NodeValue>>;
}
