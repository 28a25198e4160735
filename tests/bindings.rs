//! Template composition and live bindings through the document engine

use std::cell::Cell;

use latte::view::standard::Label;
use latte::{DocumentEngine, MarkupError, RenderConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn label_doc(text: &str) -> String {
    json!({"@layout": [{"@isa": "UILabel", "@id": "t", "text": text}]}).to_string()
}

#[test]
fn composes_numbers_and_array_elements() {
    let data = json!({"user": {"name": "Ada", "age": 36}, "tags": ["x", "y"]});
    let rendered = DocumentEngine::new()
        .render_str(
            &label_doc("#{object.user.name} (#{object.user.age}) #{object.tags.1}"),
            &data,
        )
        .unwrap();
    assert_eq!(rendered.view_by_id::<Label>("t").unwrap().text, "Ada (36) y");
    assert!(rendered.bindings().is_empty());
}

#[test]
fn closure_data_source_is_read_on_every_recompose() {
    let count = Cell::new(0);
    let data = |segments: &[String]| -> Option<Value> {
        match segments {
            [name] if name == "count" => Some(json!(count.get())),
            _ => None,
        }
    };

    let mut rendered = DocumentEngine::new()
        .render_str(&label_doc("n=#{@bind(object.count)}"), &data)
        .unwrap();
    assert_eq!(rendered.view_by_id::<Label>("t").unwrap().text, "n=0");

    count.set(5);
    let updates = rendered.invalidate("object.count", &data);
    assert_eq!(updates.len(), 1);
    assert_eq!(rendered.view_by_id::<Label>("t").unwrap().text, "n=5");
}

#[test]
fn parent_path_invalidation_reaches_nested_bindings() {
    let mut data = json!({"user": {"name": "Ada"}});
    let mut rendered = DocumentEngine::new()
        .render_str(&label_doc("#{@bind(object.user.name)}"), &data)
        .unwrap();

    data["user"] = json!({"name": "Grace"});
    let updates = rendered.invalidate("object.user", &data);
    assert_eq!(updates.len(), 1);
    assert_eq!(rendered.view_by_id::<Label>("t").unwrap().text, "Grace");

    // A sibling of the bound path is unrelated
    assert!(rendered.invalidate("object.username", &data).is_empty());
}

#[test]
fn child_path_invalidation_reaches_bindings_on_the_parent() {
    let mut data = json!({"user": {"name": "Ada"}});
    let mut rendered = DocumentEngine::new()
        .render_str(&label_doc("#{@bind(object.user)}"), &data)
        .unwrap();
    assert_eq!(rendered.view_by_id::<Label>("t").unwrap().text, r#"{"name":"Ada"}"#);

    data["user"]["name"] = json!("Grace");
    let updates = rendered.invalidate("object.user.name", &data);
    assert_eq!(updates.len(), 1);
    assert_eq!(rendered.view_by_id::<Label>("t").unwrap().text, r#"{"name":"Grace"}"#);
}

#[test]
fn braces_outside_expressions_are_text() {
    let rendered = DocumentEngine::new()
        .render_str(&label_doc("{ok} #{object.a} }"), &json!({"a": 1}))
        .unwrap();
    assert_eq!(rendered.view_by_id::<Label>("t").unwrap().text, "{ok} 1 }");
}

#[test]
fn unterminated_expression_fails_the_render() {
    let err = DocumentEngine::new()
        .render_str(&label_doc("Hello #{object.name"), &json!({"name": "x"}))
        .unwrap_err();
    match &err {
        MarkupError::UnterminatedTemplateExpression {
            key_path, offset, ..
        } => {
            assert_eq!(key_path, "@layout[0].text");
            assert_eq!(*offset, 6);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.format("doc.json").contains("unterminated template expression"));
}

#[test]
fn configured_data_root() {
    let config = RenderConfig::from_toml_str(
        r#"
[bindings]
root = "model"
"#,
    )
    .unwrap();
    let mut data = json!({"title": "A"});
    let mut rendered = DocumentEngine::new()
        .with_config(config)
        .render_str(&label_doc("#{@bind(model.title)}"), &data)
        .unwrap();
    assert_eq!(rendered.bindings().paths(), vec!["title"]);

    data["title"] = json!("B");
    rendered.invalidate("model.title", &data);
    assert_eq!(rendered.view_by_id::<Label>("t").unwrap().text, "B");
}
