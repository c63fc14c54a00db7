//! Diagnostics: template pretty-printer and error panels
//!
//! The printer renders a template the way the runtime dumps it in error
//! panels: fragments in single quotes, operations by runtime name followed
//! by their argument list.

use crate::error::YstError;
use crate::template::{AMBIENT_SET, Node, Operation, Template};

/// Printable shape of a template element
enum Item<'a> {
    Null,
    Str(&'a str),
    Name(&'static str),
    List(Vec<Item<'a>>),
}

/// Pretty-print `template`, indenting nested lines with `pre`
pub fn print_template(template: &[Node], pre: &str) -> String {
    print_list(&items(template), pre)
}

fn items(template: &[Node]) -> Vec<Item<'_>> {
    let mut items = Vec::with_capacity(template.len());
    for node in template {
        match node {
            Node::Text(text) => items.push(Item::Str(text)),
            Node::Group(nodes) => items.push(Item::List(self::items(nodes))),
            Node::Op(op) => {
                items.push(Item::Name(op.name()));
                items.push(Item::List(arguments(op)));
            }
        }
    }
    items
}

fn arguments(op: &Operation) -> Vec<Item<'_>> {
    match op {
        Operation::Value { aux, template } | Operation::Literal { aux, template } => {
            vec![aux_item(aux.as_ref()), Item::List(items(template))]
        }
        Operation::Apply { aux, set, template } => {
            vec![aux_item(aux.as_ref()), Item::Str(set), Item::List(items(template))]
        }
        Operation::Select { set, branches } => {
            let mut args = vec![Item::Str(set.as_deref().unwrap_or(AMBIENT_SET))];
            for branch in branches {
                args.push(Item::Str(&branch.condition));
                args.push(aux_item(branch.aux.as_ref()));
                args.push(Item::List(items(&branch.template)));
            }
            args
        }
        Operation::Iff { aux, condition, template } => {
            vec![aux_item(aux.as_ref()), Item::Str(condition), Item::List(items(template))]
        }
        Operation::Include { aux, target, params } => vec![
            aux_item(aux.as_ref()),
            Item::Str(target),
            params.as_deref().map(Item::Str).unwrap_or(Item::Null),
        ],
        Operation::Bool { spec } => vec![Item::Str(spec)],
    }
}

fn aux_item(aux: Option<&Template>) -> Item<'_> {
    match aux.map(Vec::as_slice) {
        None => Item::Null,
        Some([Node::Text(text)]) => Item::Str(text),
        Some(template) => Item::List(items(template)),
    }
}

fn print_list(items: &[Item<'_>], pre: &str) -> String {
    let nested = format!("{}  ", pre);
    let mut out = format!("{}[ ", pre);

    match items {
        [] => {}
        [only] => out.push_str(&print_item(only, "", "")),
        [first, middle @ .., last] => {
            out.push_str(&print_item(first, "", ",\n"));
            for item in middle {
                out.push_str(&print_item(item, &nested, ",\n"));
            }
            out.push_str(&print_item(last, &nested, ""));
        }
    }

    out.push('\n');
    out.push_str(pre);
    out.push(']');
    out
}

fn print_item(item: &Item<'_>, pre: &str, post: &str) -> String {
    match item {
        Item::Null => format!("{}'null'{}", pre, post),
        Item::Str(text) => format!("{}'{}'{}", pre, text, post),
        Item::Name(name) => format!("{}{}{}", pre, name, post),
        // Empty lists print nothing at all, separator included
        Item::List(items) if items.is_empty() => String::new(),
        Item::List(items) => format!("{}{}", print_list(items, pre), post),
    }
}

/// Panel for a failed value/literal emit or a failed `apply` iteration
pub fn template_panel(err: &YstError, template: &[Node]) -> String {
    format!(
        "<p><b>Error processing template. \n  Error message: {}\n  Erroneous template: \n{}</b></p>",
        err,
        print_template(template, "  ")
    )
}

/// Panel for a set expression that could not be resolved
pub fn set_panel(err: &YstError, template: &[Node]) -> String {
    format!(
        "<p><b>Error processing set attribute. \n  Error message: {}\n  Erroneous element: \n{}</b></p>",
        err,
        print_template(template, "  ")
    )
}

/// Panel for a failed `select`/`iff` condition at `index`
pub fn condition_panel(err: &YstError, template: &[Node], index: usize) -> String {
    format!(
        "<p><b>Error processing conditional element. \n  Error message: {}\n  Erroneous element: \n{}\n  Set index: {}</b></p>",
        err,
        print_template(template, "  "),
        index
    )
}

/// Panel for include params that did not parse
pub fn params_panel(err: &YstError, params: &str) -> String {
    format!(
        "<p><b>Error processing params attribute. \n  Error message: {}\n  Erroneous params attribute: {}</b></p>",
        err, params
    )
}

pub fn include_panel(err: &YstError) -> String {
    format!("<p><b>Error including Yeast template. \n  Error message: {}</b></p>", err)
}
