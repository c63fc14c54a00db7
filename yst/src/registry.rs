//! Entry-point registry - resolves `include` targets by name

use std::collections::HashMap;

use tracing::debug;

use crate::context::Context;
use crate::engine::Session;
use crate::error::Result;
use crate::template::{Bundle, Template};

/// A callable template entry point
pub trait EntryPoint {
    /// Render with the caller's value set and index and the actual params
    fn invoke(&self, session: &Session<'_>, ctx: &Context) -> Result<String>;
}

impl<F> EntryPoint for F
where
    F: Fn(&Session<'_>, &Context) -> Result<String>,
{
    fn invoke(&self, session: &Session<'_>, ctx: &Context) -> Result<String> {
        self(session, ctx)
    }
}

/// A compiled template, run through value-emit when invoked
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    pub template: Template,
}

impl CompiledTemplate {
    pub fn new(template: Template) -> Self {
        Self { template }
    }
}

impl EntryPoint for CompiledTemplate {
    fn invoke(&self, session: &Session<'_>, ctx: &Context) -> Result<String> {
        session.value(ctx, None, &self.template)
    }
}

/// Maps entry-point names to their implementations
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Box<dyn EntryPoint>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every template of a compiled bundle
    pub fn from_bundle(bundle: Bundle) -> Self {
        let mut registry = Self::new();
        for (name, template) in bundle.templates {
            registry.register_template(name, template);
        }
        debug!(count = registry.entries.len(), "Registry::from_bundle: registered templates");
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, entry: impl EntryPoint + 'static) {
        self.entries.insert(name.into(), Box::new(entry));
    }

    /// Register a host function as an entry point
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Session<'_>, &Context) -> Result<String> + 'static,
    {
        self.register(name, f);
    }

    pub fn register_template(&mut self, name: impl Into<String>, template: Template) {
        self.register(name, CompiledTemplate::new(template));
    }

    pub fn get(&self, name: &str) -> Option<&dyn EntryPoint> {
        self.entries.get(name).map(|entry| entry.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
