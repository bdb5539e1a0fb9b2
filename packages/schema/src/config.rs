//! Schema layers described as JSON, for configuration files.
//!
//! ```json
//! {
//!   "layers": [{
//!     "name": "article",
//!     "priority": 10,
//!     "rules": [
//!       { "object": "block", "type": "quote",
//!         "nodes": [{ "match": [{ "type": "paragraph" }], "min": 1 }] },
//!       { "object": "block", "type": "image", "isVoid": true },
//!       { "object": "block", "type": "heading", "data": { "level": "number" } }
//!     ]
//!   }]
//! }
//! ```

use crate::error::{SchemaError, SchemaResult};
use crate::layer::SchemaLayer;
use crate::matcher::{DataPredicate, NodeMatcher};
use crate::rule::{ChildGroup, Rule};
use folio_model::Object;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,

    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Object>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(rename = "match")]
    pub matchers: Vec<MatcherConfig>,

    #[serde(default)]
    pub min: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataConfig {
    Present,
    String,
    Number,
    Bool,
    Equals(serde_json::Value),
    OneOf(Vec<serde_json::Value>),
    Pattern(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    #[serde(flatten)]
    pub matcher: MatcherConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Vec<MatcherConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<GroupConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<Vec<MatcherConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<Vec<MatcherConfig>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, DataConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<String>>,

    #[serde(default)]
    pub is_void: bool,
}

impl SchemaConfig {
    /// Build the configured layers
    pub fn build(&self) -> SchemaResult<Vec<SchemaLayer>> {
        self.layers.iter().map(LayerConfig::build).collect()
    }
}

impl LayerConfig {
    pub fn build(&self) -> SchemaResult<SchemaLayer> {
        let mut layer = SchemaLayer::new(self.name.clone()).with_priority(self.priority);
        for rule in &self.rules {
            if rule.matcher.object.is_none() && rule.matcher.node_type.is_none() {
                return Err(SchemaError::UnboundRule {
                    layer: self.name.clone(),
                });
            }
            layer = layer.rule(rule.build()?);
        }
        Ok(layer)
    }
}

impl MatcherConfig {
    fn build(&self) -> NodeMatcher {
        let mut matcher = match &self.node_type {
            Some(node_type) => NodeMatcher::node_type(node_type),
            None => NodeMatcher::any(),
        };
        if let Some(object) = self.object {
            matcher = matcher.with_object(object);
        }
        matcher
    }
}

fn build_matchers(configs: &[MatcherConfig]) -> Vec<NodeMatcher> {
    configs.iter().map(MatcherConfig::build).collect()
}

fn compile(pattern: &str) -> SchemaResult<Regex> {
    Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl DataConfig {
    fn build(&self) -> SchemaResult<DataPredicate> {
        Ok(match self {
            DataConfig::Present => DataPredicate::Present,
            DataConfig::String => DataPredicate::String,
            DataConfig::Number => DataPredicate::Number,
            DataConfig::Bool => DataPredicate::Bool,
            DataConfig::Equals(value) => DataPredicate::Equals(value.clone()),
            DataConfig::OneOf(values) => DataPredicate::OneOf(values.clone()),
            DataConfig::Pattern(pattern) => DataPredicate::Pattern(compile(pattern)?),
        })
    }
}

impl RuleConfig {
    pub fn build(&self) -> SchemaResult<Rule> {
        let mut rule = Rule::new(self.matcher.build());
        if let Some(parent) = &self.parent {
            rule = rule.parent(build_matchers(parent));
        }
        if let Some(groups) = &self.nodes {
            rule = rule.nodes(
                groups
                    .iter()
                    .map(|group| {
                        let mut built = ChildGroup::new(build_matchers(&group.matchers)).min(group.min);
                        if let Some(max) = group.max {
                            built = built.max(max);
                        }
                        if let Some(wrap) = &group.wrap {
                            built = built.wrap(wrap.clone());
                        }
                        built
                    })
                    .collect(),
            );
        }
        if let Some(first) = &self.first {
            rule = rule.first(build_matchers(first));
        }
        if let Some(last) = &self.last {
            rule = rule.last(build_matchers(last));
        }
        for (key, predicate) in &self.data {
            rule = rule.data(key.clone(), predicate.build()?);
        }
        if let Some(pattern) = &self.text {
            rule = rule.text(compile(pattern)?);
        }
        if let Some(marks) = &self.marks {
            let marks: Vec<&str> = marks.iter().map(String::as_str).collect();
            rule = rule.marks(&marks);
        }
        if self.is_void {
            rule = rule.void();
        }
        Ok(rule)
    }
}
