//! "Core Blocks": basic content blocks.
//!
//! `table` is dynamic: once mounted, its cells are edited in place by the
//! host and persisted through the hidden `rows` setting, so settings edits
//! never re-render it.

use pagecraft_editor::{Block, BlockPlugin, EditorPlugin, SettingField, VNode};
use serde_json::{json, Value};

pub const NAME: &str = "Core Blocks";

pub fn plugin() -> EditorPlugin {
    EditorPlugin::new(NAME)
        .with_block(
            BlockPlugin::new("text", text)
                .with_schema(vec![SettingField::text("text", "Text")])
                .with_defaults(json!({ "text": "Your text here" })),
        )
        .with_block(
            BlockPlugin::new("image", image)
                .with_schema(vec![
                    SettingField::text("src", "Image URL"),
                    SettingField::text("alt", "Alt Text"),
                ])
                .with_defaults(json!({ "src": "", "alt": "" })),
        )
        .with_block(
            BlockPlugin::new("link", link)
                .with_schema(vec![
                    SettingField::text("label", "Text"),
                    SettingField::text("href", "URL"),
                ])
                .with_defaults(json!({ "label": "Click me", "href": "#" })),
        )
        .with_block(
            BlockPlugin::new("button", button)
                .with_schema(vec![SettingField::text("label", "Text")])
                .with_defaults(json!({ "label": "Click me" })),
        )
        .with_block(
            BlockPlugin::new("table", table)
                .with_schema(vec![
                    SettingField::text("caption", "Caption"),
                    SettingField::boolean("header", "First Row Is Header"),
                    SettingField::textarea("rows", "Rows").hidden(),
                ])
                .with_defaults(json!({
                    "caption": "",
                    "header": true,
                    "rows": [["Name", "Value"], ["", ""]]
                }))
                .dynamic(),
        )
}

fn text(block: &Block) -> VNode {
    VNode::element("p").with_text(block.setting_str("text").unwrap_or("Text block"))
}

fn image(block: &Block) -> VNode {
    VNode::element("img")
        .with_attr("src", block.setting_str("src").unwrap_or_default())
        .with_attr("alt", block.setting_str("alt").unwrap_or_default())
        .with_style("max-width", "40%")
}

fn link(block: &Block) -> VNode {
    VNode::element("a")
        .with_class("link")
        .with_attr("href", block.setting_str("href").unwrap_or("#"))
        .with_text(block.setting_str("label").unwrap_or("Button"))
}

fn button(block: &Block) -> VNode {
    VNode::element("button")
        .with_class("btn")
        .with_text(block.setting_str("label").unwrap_or("Button"))
}

fn table(block: &Block) -> VNode {
    let header = block.settings.get("header").and_then(Value::as_bool) == Some(true);
    let mut el = VNode::element("table").with_class("table");

    if let Some(caption) = block.setting_str("caption") {
        el = el.with_child(VNode::element("caption").with_text(caption));
    }

    for (index, row) in table_rows(block.settings.get("rows")).into_iter().enumerate() {
        let cell_tag = if header && index == 0 { "th" } else { "td" };
        let cells = row
            .into_iter()
            .map(|cell| {
                VNode::element(cell_tag)
                    .with_attr("contenteditable", "true")
                    .with_text(cell)
            })
            .collect();
        el = el.with_child(VNode::element("tr").with_children(cells));
    }
    el
}

/// Rows as a JSON array of string arrays, or that array encoded as a string
/// (which is what a raw text edit of the hidden field stores)
pub fn table_rows(value: Option<&Value>) -> Vec<Vec<String>> {
    let parsed;
    let value = match value {
        Some(Value::String(source)) => {
            parsed = serde_json::from_str::<Value>(source).unwrap_or(Value::Null);
            &parsed
        }
        Some(value) => value,
        None => return Vec::new(),
    };

    value
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(Value::as_array)
                .map(|row| row.iter().map(cell_text).collect())
                .collect()
        })
        .unwrap_or_default()
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_editor::Settings;

    fn block(type_name: &str, settings: Value) -> Block {
        let settings = match settings {
            Value::Object(map) => map,
            _ => Settings::new(),
        };
        Block::new("b1", type_name).with_settings(settings)
    }

    #[test]
    fn test_fallback_labels() {
        assert_eq!(
            text(&block("text", json!({}))).children(),
            &[VNode::text("Text block")]
        );
        assert_eq!(
            button(&block("button", json!({ "label": "" }))).children(),
            &[VNode::text("Button")]
        );
    }

    #[test]
    fn test_table_header_row() {
        let vnode = table(&block(
            "table",
            json!({ "caption": "Prices", "header": true, "rows": [["Item", "Cost"], ["Tea", 3]] }),
        ));
        let children = vnode.children();
        assert_eq!(children.len(), 3);

        let VNode::Element { tag, .. } = &children[1].children()[0] else {
            panic!("expected header cell");
        };
        assert_eq!(tag, "th");
        assert_eq!(children[2].children()[1].children(), &[VNode::text("3")]);
    }

    #[test]
    fn test_table_rows_from_string() {
        let rows = table_rows(Some(&json!("[[\"a\", \"b\"]]")));
        assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
        assert!(table_rows(Some(&json!("not json"))).is_empty());
        assert!(table_rows(None).is_empty());
    }
}
