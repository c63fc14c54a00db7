//! Compiled template data model
//!
//! A template is an ordered sequence of literal fragments and operation nodes,
//! produced by the external markup compiler. The JSON interchange form is:
//!
//! ```text
//! [
//!   "<ul>",
//!   { "op": "apply", "set": "items", "template": ["<li>$e.name$</li>"] },
//!   "</ul>"
//! ]
//! ```
//!
//! Fragments are JSON strings, nested sequences are JSON arrays and operations
//! are objects tagged by `op`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Set expression the markup compiler emits for "reuse the ambient context"
pub const AMBIENT_SET: &str = "YST.Aux.emptyArray";

pub type Template = Vec<Node>;

/// One element of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Literal text containing `$expr$` markers
    Text(String),
    /// Operation node
    Op(Operation),
    /// Nested sequence, evaluated inline; empty groups emit nothing
    Group(Template),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<Operation> for Node {
    fn from(op: Operation) -> Self {
        Node::Op(op)
    }
}

/// One condition of a `select`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub condition: String,
    #[serde(default, deserialize_with = "deserialize_aux", skip_serializing_if = "Option::is_none")]
    pub aux: Option<Template>,
    pub template: Template,
}

impl Branch {
    pub fn new(condition: impl Into<String>, template: Template) -> Self {
        Self {
            condition: condition.into(),
            aux: None,
            template,
        }
    }
}

/// The fixed operation library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Operation {
    /// Emit `template` with HTML-encoded expression results
    Value {
        #[serde(default, deserialize_with = "deserialize_aux", skip_serializing_if = "Option::is_none")]
        aux: Option<Template>,
        template: Template,
    },
    /// Emit `template` with raw expression results
    Literal {
        #[serde(default, deserialize_with = "deserialize_aux", skip_serializing_if = "Option::is_none")]
        aux: Option<Template>,
        template: Template,
    },
    /// Repeat `template` once per element of the value set
    Apply {
        #[serde(default, deserialize_with = "deserialize_aux", skip_serializing_if = "Option::is_none")]
        aux: Option<Template>,
        set: String,
        template: Template,
    },
    /// Emit every branch whose condition holds, per element
    Select {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        set: Option<String>,
        branches: Vec<Branch>,
    },
    /// One conditional branch over the current element
    Iff {
        #[serde(default, deserialize_with = "deserialize_aux", skip_serializing_if = "Option::is_none")]
        aux: Option<Template>,
        condition: String,
        template: Template,
    },
    /// Call a registered entry point by name
    Include {
        #[serde(default, deserialize_with = "deserialize_aux", skip_serializing_if = "Option::is_none")]
        aux: Option<Template>,
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<String>,
    },
    /// Synthesize boolean attributes from a name-to-flag mapping
    Bool { spec: String },
}

impl Operation {
    pub fn value(template: Template) -> Self {
        Operation::Value { aux: None, template }
    }

    pub fn literal(template: Template) -> Self {
        Operation::Literal { aux: None, template }
    }

    pub fn apply(set: impl Into<String>, template: Template) -> Self {
        Operation::Apply {
            aux: None,
            set: set.into(),
            template,
        }
    }

    pub fn select(set: Option<&str>, branches: Vec<Branch>) -> Self {
        Operation::Select {
            set: set.map(str::to_string),
            branches,
        }
    }

    pub fn iff(condition: impl Into<String>, template: Template) -> Self {
        Operation::Iff {
            aux: None,
            condition: condition.into(),
            template,
        }
    }

    pub fn include(target: impl Into<String>, params: Option<&str>) -> Self {
        Operation::Include {
            aux: None,
            target: target.into(),
            params: params.map(str::to_string),
        }
    }

    pub fn bool(spec: impl Into<String>) -> Self {
        Operation::Bool { spec: spec.into() }
    }

    /// Attach an auxiliary template; `select` and `bool` carry none
    pub fn with_aux(mut self, template: Template) -> Self {
        match &mut self {
            Operation::Value { aux, .. }
            | Operation::Literal { aux, .. }
            | Operation::Apply { aux, .. }
            | Operation::Iff { aux, .. }
            | Operation::Include { aux, .. } => *aux = Some(template),
            Operation::Select { .. } | Operation::Bool { .. } => {}
        }
        self
    }

    /// Name of the runtime function this node stands for
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Value { .. } => "YST.Txt.value",
            Operation::Literal { .. } => "YST.Txt.literal",
            Operation::Apply { .. } => "YST.Txt.apply",
            Operation::Select { .. } => "YST.Txt.select",
            Operation::Iff { .. } => "YST.Txt.iff",
            Operation::Include { .. } => "YST.Txt.include",
            Operation::Bool { .. } => "YST.Txt.ystBool",
        }
    }
}

/// An aux may be written as a bare fragment or as a full template
fn deserialize_aux<'de, D>(deserializer: D) -> std::result::Result<Option<Template>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AuxRepr {
        Fragment(String),
        Template(Template),
    }

    Ok(Option::<AuxRepr>::deserialize(deserializer)?.map(|repr| match repr {
        AuxRepr::Fragment(text) => vec![Node::Text(text)],
        AuxRepr::Template(template) => template,
    }))
}

/// A set of named templates as produced by the markup compiler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub templates: BTreeMap<String, Template>,
}

impl Bundle {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }
}
