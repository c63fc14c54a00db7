//! Operation library
//!
//! Every operation runs against the caller's context and returns the text it
//! contributes. Failures are shielded according to `Config::alert_errors`:
//! rendered as an error panel in place of the output, or propagated.

use serde_json::Value;
use tracing::{debug, warn};

use crate::context::{Context, Params};
use crate::debug::{condition_panel, include_panel, params_panel, print_template, set_panel, template_panel};
use crate::engine::Session;
use crate::error::{Result, YstError};
use crate::expr::{
    self, ExprError,
    value::{truthy, type_of},
};
use crate::resolver::ResolvedSet;
use crate::template::{Branch, Node, Operation};

/// One `(condition, aux, template)` triple of a select
struct Condition<'a> {
    condition: &'a str,
    aux: Option<&'a [Node]>,
    template: &'a [Node],
}

impl<'a> From<&'a Branch> for Condition<'a> {
    fn from(branch: &'a Branch) -> Self {
        Self {
            condition: &branch.condition,
            aux: branch.aux.as_deref(),
            template: &branch.template,
        }
    }
}

impl Session<'_> {
    /// Run an operation node found while walking a template
    pub(crate) fn dispatch(&self, ctx: &Context, op: &Operation) -> Result<String> {
        match op {
            Operation::Value { aux, template } => self.value(ctx, aux.as_deref(), template),
            Operation::Literal { aux, template } => self.literal(ctx, aux.as_deref(), template),
            Operation::Apply { aux, set, template } => self.apply(ctx, aux.as_deref(), set, template),
            Operation::Select { set, branches } => self.select(ctx, set.as_deref(), branches),
            Operation::Iff { aux, condition, template } => self.iff(ctx, aux.as_deref(), condition, template),
            Operation::Include { aux, target, params } => self.include(ctx, aux.as_deref(), target, params.as_deref()),
            Operation::Bool { spec } => self.bool_attribute(ctx, spec),
        }
    }

    /// Value-emit: run `aux`, then `template` with HTML-encoded results
    pub fn value(&self, ctx: &Context, aux: Option<&[Node]>, template: &[Node]) -> Result<String> {
        self.emit(ctx, aux, template, false)
    }

    /// Literal-emit: like [`Session::value`] but results are inserted raw
    pub fn literal(&self, ctx: &Context, aux: Option<&[Node]>, template: &[Node]) -> Result<String> {
        self.emit(ctx, aux, template, true)
    }

    fn emit(&self, ctx: &Context, aux: Option<&[Node]>, template: &[Node], raw: bool) -> Result<String> {
        debug!(raw, nodes = template.len(), index = ctx.index, "emit: called");
        if self.config().debug {
            debug!("emit: template\n{}", print_template(template, ""));
        }

        let result = self.run_aux(ctx, aux).and_then(|()| self.evaluate(ctx, template, raw));
        self.shield(result, |e| template_panel(e, template))
    }

    /// Repeat `template` once per index of the resolved value set
    pub fn apply(&self, ctx: &Context, aux: Option<&[Node]>, set: &str, template: &[Node]) -> Result<String> {
        debug!(set, "apply: called");
        let value_set = match self.resolve(ctx, Some(set)) {
            Ok(ResolvedSet::Set(value_set)) => value_set,
            Ok(ResolvedSet::Ambient) => return Ok(String::new()),
            Err(e) => return self.shield(Err(e), |e| set_panel(e, template)),
        };

        let mut out = String::new();
        for index in 0..value_set.iteration_len() {
            let item = ctx.iterate(value_set.clone(), index);
            let result = self.run_aux(&item, aux).and_then(|()| self.evaluate(&item, template, false));
            out.push_str(&self.shield(result, |e| template_panel(e, template))?);
        }
        Ok(out)
    }

    /// Emit every branch whose condition holds, at every index of the set
    ///
    /// Without a set expression the caller's context is used as is, so the
    /// branches see the same current element as the surrounding template.
    pub fn select(&self, ctx: &Context, set: Option<&str>, branches: &[Branch]) -> Result<String> {
        let conditions: Vec<Condition<'_>> = branches.iter().map(Condition::from).collect();
        self.select_conditions(ctx, set, &conditions)
    }

    /// A single-branch select over the current element
    pub fn iff(&self, ctx: &Context, aux: Option<&[Node]>, condition: &str, template: &[Node]) -> Result<String> {
        let condition = Condition {
            condition,
            aux,
            template,
        };
        self.select_conditions(ctx, None, &[condition])
    }

    fn select_conditions(&self, ctx: &Context, set: Option<&str>, conditions: &[Condition<'_>]) -> Result<String> {
        debug!(set, conditions = conditions.len(), "select: called");
        let element: &[Node] = conditions.first().map(|c| c.template).unwrap_or_default();

        let contexts: Vec<Context> = match self.resolve(ctx, set) {
            Ok(ResolvedSet::Ambient) => vec![ctx.clone()],
            Ok(ResolvedSet::Set(value_set)) => (0..value_set.iteration_len())
                .map(|index| ctx.iterate(value_set.clone(), index))
                .collect(),
            Err(e) => return self.shield(Err(e), |e| set_panel(e, element)),
        };

        let mut out = String::new();
        for item in &contexts {
            for condition in conditions {
                let result = self.branch(item, condition);
                out.push_str(&self.shield(result, |e| condition_panel(e, element, item.index))?);
            }
        }
        Ok(out)
    }

    fn branch(&self, ctx: &Context, condition: &Condition<'_>) -> Result<String> {
        self.run_aux(ctx, condition.aux)?;
        let value = expr::eval_str(condition.condition, &self.scope(ctx))?;
        if truthy(value.as_ref()) {
            self.evaluate(ctx, condition.template, false)
        } else {
            Ok(String::new())
        }
    }

    /// Call the entry point `target` with the current value set and index
    ///
    /// `params` is a fragment that, after raw substitution, must read as an
    /// object expression; it becomes the callee's `params`. When it does not,
    /// the params panel is emitted and the target still runs with no params.
    pub fn include(&self, ctx: &Context, aux: Option<&[Node]>, target: &str, params: Option<&str>) -> Result<String> {
        debug!(target, "include: called");

        let mut out = String::new();
        let actual = match params.filter(|text| !text.is_empty()) {
            Some(text) => {
                self.run_aux(ctx, aux)?;
                let scope = self.scope(ctx);
                let mut substituted = String::new();
                self.substitute(&scope, text, true, &mut substituted)?;
                match parse_params(&substituted, &scope) {
                    Ok(actual) => actual,
                    Err(e) => {
                        out.push_str(&self.shield(Err(e), |e| params_panel(e, &substituted))?);
                        Params::new()
                    }
                }
            }
            None => Params::new(),
        };

        if target.is_empty() {
            return Ok(out);
        }

        let result = match self.engine().registry().get(target) {
            Some(entry) => entry.invoke(self, &ctx.clone().with_params(actual)),
            None => Err(YstError::IncludeResolution {
                target: target.to_string(),
            }),
        };
        out.push_str(&self.shield(result, include_panel)?);
        Ok(out)
    }

    /// Emit `name="name" ` for every truthy entry of the attribute map
    ///
    /// Failures are never shielded here.
    pub fn bool_attribute(&self, ctx: &Context, spec: &str) -> Result<String> {
        self.boolean_attributes(ctx, spec)
            .map_err(|e| YstError::BooleanAttribute {
                spec: spec.to_string(),
                message: e.to_string(),
            })
    }

    fn boolean_attributes(&self, ctx: &Context, spec: &str) -> Result<String> {
        match expr::eval_str(spec, &self.scope(ctx))? {
            Some(Value::Object(flags)) => Ok(flags
                .iter()
                .filter(|(_, flag)| truthy(Some(flag)))
                .map(|(name, _)| {
                    let name = name.to_lowercase();
                    format!("{}=\"{}\" ", name, name)
                })
                .collect()),
            None | Some(Value::Null) => Ok(String::new()),
            Some(other) => Err(ExprError::Type(format!("{} is not an attribute map", type_of(Some(&other)))).into()),
        }
    }

    fn run_aux(&self, ctx: &Context, aux: Option<&[Node]>) -> Result<()> {
        if let Some(aux) = aux {
            self.evaluate(ctx, aux, false)?;
        }
        Ok(())
    }

    fn shield(&self, result: Result<String>, panel: impl FnOnce(&YstError) -> String) -> Result<String> {
        match result {
            Err(e) if self.config().alert_errors => {
                warn!(error = %e, "shield: rendering error panel");
                Ok(panel(&e))
            }
            other => other,
        }
    }
}

fn parse_params(text: &str, scope: &dyn expr::Bindings) -> Result<Params> {
    let parse_error = |message: String| YstError::ParamsParse {
        params: text.to_string(),
        message,
    };

    match expr::eval_str(text, scope).map_err(|e| parse_error(e.to_string()))? {
        Some(Value::Object(params)) => Ok(params),
        None | Some(Value::Null) => Ok(Params::new()),
        Some(other) => Err(parse_error(format!("expected an object, found {}", type_of(Some(&other))))),
    }
}
