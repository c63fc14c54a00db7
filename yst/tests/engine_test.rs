//! End-to-end rendering of compiled bundles

use serde_json::json;
use yst::{Bundle, Config, Context, Engine, Params, Registry, ValueSet, YstError};

const BUNDLE: &str = r##"{
  "templates": {
    "page": [
      "<h1>$title$</h1>",
      { "op": "include", "target": "list", "params": "{heading: '$subtitle$'}" },
      { "op": "include", "target": "footer" }
    ],
    "list": [
      "<h2>$params.heading$</h2><ul>",
      { "op": "apply", "set": "items", "template": [
          "<li",
          { "op": "iff", "condition": "e.price > 10", "template": [" class=\"dear\""] },
          ">$e.name$",
          { "op": "select", "branches": [
              { "condition": "e.tags.length == 0", "template": [" (untagged)"] },
              { "condition": "e.tags.length > 0", "template": [
                  " [",
                  { "op": "apply", "set": "e.tags", "template": ["$i &gt; 0 ? ',' : ''$$e$"] },
                  "]"
              ] }
          ] },
          "</li>"
      ] },
      "</ul>"
    ],
    "footer": ["<footer>$#year = 2024$&copy; $year$</footer>"],
    "checkbox": [
      "<input type=\"checkbox\" ",
      { "op": "bool", "spec": "{CHECKED: e.done, disabled: e.locked}" },
      "/>"
    ],
    "broken": ["<p>$items.nope.deeper$</p>"]
  }
}"##;

fn engine(config: Config) -> Engine {
    let bundle = Bundle::from_json(BUNDLE).unwrap();
    let mut engine = Engine::new(config).with_registry(Registry::from_bundle(bundle));
    engine.set_global("title", json!("Shop <Spring>"));
    engine.set_global("subtitle", json!("Items"));
    engine.set_global(
        "items",
        json!([
            { "name": "Pen", "price": 2, "tags": [] },
            { "name": "Lamp", "price": 25, "tags": ["home", "light"] }
        ]),
    );
    engine
}

#[test]
fn test_render_page_end_to_end() {
    let html = engine(Config::default()).render("page", &Context::default()).unwrap();
    assert_eq!(
        html,
        "<h1>Shop &lt;Spring></h1>\
         <h2>Items</h2><ul>\
         <li>Pen (untagged)</li>\
         <li class=\"dear\">Lamp [home,light]</li>\
         </ul>\
         <footer>&copy; 2024</footer>"
    );
}

#[test]
fn test_render_bool_attributes() {
    let engine = engine(Config::default());
    let ctx = Context::single(vec![json!({"done": true, "locked": false})]);
    assert_eq!(
        engine.render("checkbox", &ctx).unwrap(),
        "<input type=\"checkbox\" checked=\"checked\" />"
    );
}

#[test]
fn test_marker_error_is_inline_and_page_survives() {
    let html = engine(Config::default()).render("broken", &Context::default()).unwrap();
    assert_eq!(
        html,
        "<p>[YST_Error! - Cannot read property 'deeper' of undefined]</p>"
    );
}

#[test]
fn test_strict_mode_propagates_operation_failures() {
    let mut engine = engine(Config::strict());
    engine.register_template(
        "bad-set",
        serde_json::from_value(json!([{ "op": "apply", "set": "missing", "template": ["x"] }])).unwrap(),
    );

    let err = engine.render("bad-set", &Context::default()).unwrap_err();
    assert!(matches!(err, YstError::UndefinedValueSet { .. }));
}

#[test]
fn test_unknown_entry_point() {
    let err = engine(Config::default()).render("nowhere", &Context::default()).unwrap_err();
    assert_eq!(err.to_string(), "Template not found: nowhere");
}

#[test]
fn test_host_entry_point_sees_include_params() {
    let mut engine = engine(Config::default());
    engine.register_fn("badge", |_, ctx| {
        Ok(format!("<b>{}</b>", ctx.params.get("label").and_then(|v| v.as_str()).unwrap_or("?")))
    });
    engine.register_template(
        "uses-badge",
        serde_json::from_value(json!([{ "op": "include", "target": "badge", "params": "{label: 'new'}" }])).unwrap(),
    );

    assert_eq!(engine.render("uses-badge", &Context::default()).unwrap(), "<b>new</b>");
}

#[test]
fn test_multi_set_iteration_uses_longest_dimension() {
    let mut engine = Engine::new(Config {
        allow_multi_set: true,
        ..Config::default()
    });
    engine.set_global("names", json!(["a", "b", "c"]));
    engine.set_global("scores", json!([1, 2]));
    engine.register_template(
        "pairs",
        serde_json::from_value(json!([{
            "op": "apply",
            "set": "names scores",
            "template": ["$e0$=$e1 == null ? '-' : e1$;"]
        }]))
        .unwrap(),
    );

    assert_eq!(engine.render("pairs", &Context::default()).unwrap(), "a=1;b=2;c=-;");
}

#[test]
fn test_caller_supplied_context_and_params() {
    let mut engine = Engine::default();
    engine.register_template(
        "row",
        serde_json::from_value(json!(["$params.prefix$$e$ of $values.length$"])).unwrap(),
    );

    let mut params = Params::new();
    params.insert("prefix".to_string(), json!("#"));
    let ctx = Context::new(ValueSet::single(vec![json!("x"), json!("y")]), 1, params);
    assert_eq!(engine.render("row", &ctx).unwrap(), "#y of 2");
}
