//! Engine and per-call evaluation session

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Config;
use crate::context::{Context, Scope, Variables};
use crate::error::{Result, YstError};
use crate::registry::{EntryPoint, Registry};
use crate::template::{Node, Template};

/// Owns the configuration, the entry-point registry and host globals
///
/// The engine itself is never mutated by evaluation; every top-level call
/// opens a [`Session`] that carries the variables expressions assign to.
pub struct Engine {
    config: Config,
    registry: Registry,
    globals: Map<String, Value>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: Registry::new(),
            globals: Map::new(),
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register an entry point under `name`
    pub fn register(&mut self, name: impl Into<String>, entry: impl EntryPoint + 'static) {
        self.registry.register(name, entry);
    }

    /// Register a host function as an entry point
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Session<'_>, &Context) -> Result<String> + 'static,
    {
        self.registry.register_fn(name, f);
    }

    /// Register a compiled template as an entry point
    pub fn register_template(&mut self, name: impl Into<String>, template: Template) {
        self.registry.register_template(name, template);
    }

    /// Expose a host value to every expression under `name`
    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    pub fn globals(&self) -> &Map<String, Value> {
        &self.globals
    }

    /// Open a session for one top-level evaluation
    pub fn session(&self) -> Session<'_> {
        Session {
            engine: self,
            variables: Variables::default(),
        }
    }

    /// Call a registered entry point by name
    pub fn render(&self, name: &str, ctx: &Context) -> Result<String> {
        debug!(name, "render: called");
        let entry = self
            .registry
            .get(name)
            .ok_or_else(|| YstError::IncludeResolution { target: name.to_string() })?;
        entry.invoke(&self.session(), ctx)
    }

    /// Value-emit entry point in a fresh session
    pub fn value(&self, ctx: &Context, aux: Option<&[Node]>, template: &[Node]) -> Result<String> {
        self.session().value(ctx, aux, template)
    }

    /// Literal-emit entry point in a fresh session
    pub fn literal(&self, ctx: &Context, aux: Option<&[Node]>, template: &[Node]) -> Result<String> {
        self.session().literal(ctx, aux, template)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// State of one top-level evaluation
pub struct Session<'e> {
    engine: &'e Engine,
    variables: Variables,
}

impl<'e> Session<'e> {
    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    pub fn config(&self) -> &'e Config {
        &self.engine.config
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Scope binding the current element(s) of `ctx`
    pub fn scope<'a>(&'a self, ctx: &'a Context) -> Scope<'a> {
        Scope::new(ctx, self.config().allow_multi_set, &self.variables, &self.engine.globals)
    }
}
