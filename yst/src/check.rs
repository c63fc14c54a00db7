//! Static checks over compiled templates
//!
//! Parses every expression a template carries without evaluating anything,
//! and verifies that include targets name templates of the same bundle.

use std::fmt;

use crate::entities;
use crate::expr;
use crate::interpreter::{Scanner, Segment};
use crate::template::{AMBIENT_SET, Bundle, Node, Operation, Template};

/// A defect found in one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub template: String,
    /// Which part of the template the expression came from
    pub location: &'static str,
    pub expression: String,
    pub message: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} '{}': {}", self.template, self.location, self.expression, self.message)
    }
}

/// Check every template of `bundle`
pub fn check_bundle(bundle: &Bundle, multi_set: bool) -> Vec<Problem> {
    bundle
        .templates
        .iter()
        .flat_map(|(name, template)| check(name, template, multi_set, Some(bundle)))
        .collect()
}

/// Check a single template; include targets are not verified
pub fn check_template(name: &str, template: &[Node], multi_set: bool) -> Vec<Problem> {
    check(name, template, multi_set, None)
}

fn check(name: &str, template: &[Node], multi_set: bool, bundle: Option<&Bundle>) -> Vec<Problem> {
    let mut checker = Checker {
        name,
        multi_set,
        bundle,
        problems: Vec::new(),
    };
    checker.template(template);
    checker.problems
}

struct Checker<'a> {
    name: &'a str,
    multi_set: bool,
    bundle: Option<&'a Bundle>,
    problems: Vec<Problem>,
}

impl Checker<'_> {
    fn report(&mut self, location: &'static str, expression: &str, message: impl Into<String>) {
        self.problems.push(Problem {
            template: self.name.to_string(),
            location,
            expression: expression.to_string(),
            message: message.into(),
        });
    }

    fn template(&mut self, template: &[Node]) {
        for node in template {
            match node {
                Node::Text(fragment) => self.fragment("marker", fragment),
                Node::Group(nodes) => self.template(nodes),
                Node::Op(op) => self.operation(op),
            }
        }
    }

    fn aux(&mut self, aux: Option<&Template>) {
        if let Some(aux) = aux {
            self.template(aux);
        }
    }

    fn fragment(&mut self, location: &'static str, fragment: &str) {
        for segment in Scanner::new(fragment) {
            match segment {
                Ok(Segment::Text(_)) => {}
                Ok(Segment::Marker { expr, .. }) => self.expression(location, &entities::decode(expr)),
                Err(e) => self.report(location, fragment, e.to_string()),
            }
        }
    }

    fn expression(&mut self, location: &'static str, source: &str) {
        if let Err(e) = expr::parse(source) {
            self.report(location, source, e.to_string());
        }
    }

    fn set(&mut self, spec: &str) {
        let spec = spec.trim();
        if spec.is_empty() || spec == AMBIENT_SET {
            return;
        }
        if self.multi_set {
            for part in spec.split(' ').filter(|part| !part.is_empty()) {
                self.expression("set", part);
            }
        } else {
            self.expression("set", spec);
        }
    }

    fn operation(&mut self, op: &Operation) {
        match op {
            Operation::Value { aux, template } | Operation::Literal { aux, template } => {
                self.aux(aux.as_ref());
                self.template(template);
            }
            Operation::Apply { aux, set, template } => {
                self.aux(aux.as_ref());
                self.set(set);
                self.template(template);
            }
            Operation::Select { set, branches } => {
                if let Some(set) = set {
                    self.set(set);
                }
                for branch in branches {
                    self.aux(branch.aux.as_ref());
                    self.expression("condition", &branch.condition);
                    self.template(&branch.template);
                }
            }
            Operation::Iff { aux, condition, template } => {
                self.aux(aux.as_ref());
                self.expression("condition", condition);
                self.template(template);
            }
            Operation::Include { aux, target, params } => {
                self.aux(aux.as_ref());
                if let Some(params) = params {
                    self.fragment("params", params);
                }
                if let Some(bundle) = self.bundle
                    && !target.is_empty()
                    && bundle.get(target).is_none()
                {
                    self.report("include", target, "Template not found");
                }
            }
            Operation::Bool { spec } => self.expression("bool", spec),
        }
    }
}
