//! YST - string-template evaluation engine
//!
//! Renders compiled templates into HTML. A template is a sequence of literal
//! fragments carrying `$expr$` markers and operation nodes (`apply`, `select`,
//! `iff`, `include`, ...) evaluated against a context of data values.
//!
//! # Architecture
//!
//! ```text
//! Engine ── Config, Registry, globals
//!   └── Session ── variables assigned by expressions
//!         ├── ops          value / literal / apply / select / iff / include / bool
//!         ├── interpreter  fragment scanning and marker substitution
//!         ├── resolver     set expressions -> value sets
//!         └── expr         sandboxed expression language
//! ```
//!
//! # Example
//!
//! ```ignore
//! use yst::{Bundle, Context, Engine, Registry};
//!
//! let bundle = Bundle::load("templates.json")?;
//! let mut engine = Engine::default().with_registry(Registry::from_bundle(bundle));
//! engine.set_global("items", serde_json::json!(["a", "b"]));
//! let html = engine.render("list", &Context::default())?;
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod context;
pub mod debug;
pub mod engine;
pub mod entities;
pub mod error;
pub mod expr;
pub mod interpreter;
mod ops;
pub mod registry;
pub mod resolver;
pub mod template;

pub use config::Config;
pub use context::{Context, Params, ValueSet};
pub use engine::{Engine, Session};
pub use error::{Result, YstError};
pub use registry::{CompiledTemplate, EntryPoint, Registry};
pub use template::{Branch, Bundle, Node, Operation, Template};
