use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::audio_fetch::{AudioFetchNode, NODE_NAME};
use super::Node;
use crate::download::YtDlp;
use crate::error::{FetchError, FetchResult};

pub type NodeFactory = Box<dyn Fn() -> Box<dyn Node>>;

/// Class-name lookup table the host uses to instantiate nodes.
#[derive(Default)]
pub struct NodeRegistry {
    factories: BTreeMap<String, NodeFactory>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every node this crate provides.
    pub fn with_defaults(ytdlp: YtDlp) -> Self {
        let mut registry = Self::new();
        registry.register(NODE_NAME, move || {
            Box::new(AudioFetchNode::new(Box::new(ytdlp.clone()))) as Box<dyn Node>
        });
        registry
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Node> + 'static,
    {
        if self.factories.insert(name.to_string(), Box::new(factory)).is_some() {
            log::warn!("Replaced existing node registration '{}'", name);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn create(&self, name: &str) -> FetchResult<Box<dyn Node>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| {
                FetchError::UnknownNode(format!(
                    "'{}'. Registered nodes: {:?}",
                    name,
                    self.names().collect::<Vec<_>>()
                ))
            })
    }

    /// Schema of every registered node, keyed by class name.
    pub fn describe(&self) -> FetchResult<Value> {
        let mut out = Map::new();
        for (name, factory) in &self.factories {
            let node = factory();
            out.insert(
                name.clone(),
                json!({
                    "input": serde_json::to_value(node.describe_inputs())?,
                    "output": serde_json::to_value(node.describe_outputs())?,
                    "output_node": node.is_output_node(),
                    "category": node.category(),
                }),
            );
        }
        Ok(Value::Object(out))
    }
}
