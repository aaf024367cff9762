//! "Quote Block": a styled pull quote.

use pagecraft_editor::{Block, BlockPlugin, EditorPlugin, SettingField, VNode};
use serde_json::json;

pub const NAME: &str = "Quote Block";

pub fn plugin() -> EditorPlugin {
    EditorPlugin::new(NAME).with_block(
        BlockPlugin::new("quote", quote)
            .with_schema(vec![SettingField::text("text", "Text")])
            .with_defaults(json!({ "text": "This is a quote" })),
    )
}

fn quote(block: &Block) -> VNode {
    VNode::element("blockquote")
        .with_style("border-left", "4px solid #000")
        .with_style("padding-left", "12px")
        .with_style("opacity", "0.8")
        .with_text(block.setting_str("text").unwrap_or("Quote..."))
}
