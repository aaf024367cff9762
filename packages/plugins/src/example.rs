use pagecraft_editor::{Block, Page, Section, Settings};
use serde_json::{json, Value};

fn settings(value: Value) -> Settings {
    match value {
        Value::Object(map) => map,
        _ => Settings::new(),
    }
}

/// Starter "About Us" page written by `pagecraft init`
pub fn about_us_page() -> Page {
    let mut page = Page::new();
    page.push_section(
        Section::new("content", "rich-text")
            .with_settings(settings(json!({ "heading": "About Us" })))
            .with_blocks(vec![
                Block::new("b1", "text").with_settings(settings(json!({
                    "text": "We are building a modern block editor."
                }))),
                Block::new("b4", "link").with_settings(settings(json!({
                    "label": "Contact",
                    "href": "/contact"
                }))),
                Block::new("b5", "button").with_settings(settings(json!({ "label": "Click me" }))),
                Block::new("b6", "quote").with_settings(settings(json!({
                    "text": "Hello world, this is quote"
                }))),
            ]),
    );
    page.push_section(
        Section::new("contact", "contact-form")
            .with_settings(settings(json!({ "heading": "Get in touch" }))),
    );
    page
}
