//! "Core Sections": layout and content sections.

use crate::styles::{apply_base_styles, base_style_schema};
use pagecraft_editor::{EditorPlugin, RenderContext, Section, SectionPlugin, SettingField, VNode};
use serde_json::json;

pub const NAME: &str = "Core Sections";

pub fn plugin() -> EditorPlugin {
    EditorPlugin::new(NAME)
        .with_section(SectionPlugin::new("container", container).with_schema(base_style_schema()))
        .with_section(
            SectionPlugin::new("rich-text", rich_text)
                .with_schema(vec![SettingField::text("heading", "Heading")]),
        )
        .with_section(
            SectionPlugin::new("featured-collection", featured_collection).with_schema(vec![
                SettingField::text("title", "Title"),
                SettingField::text("textContent", "Description"),
            ]),
        )
        .with_section(
            SectionPlugin::new("contact-form", contact_form)
                .with_schema(vec![
                    SettingField::text("heading", "Text"),
                    SettingField::text("buttonText", "Button Text"),
                    SettingField::text("namePlaceholder", "Name Placeholder"),
                    SettingField::text("emailPlaceholder", "Email Placeholder"),
                    SettingField::text("messagePlaceholder", "Message Placeholder"),
                    SettingField::color("buttonColor", "Button Color"),
                    SettingField::color("buttonBackgroundColor", "Button Background Color"),
                    SettingField::color("buttonBorderColor", "Button Border Color"),
                ])
                .with_defaults(json!({
                    "heading": "Contact Us",
                    "buttonText": "Send"
                })),
        )
}

/// Styleable wrapper around a block list
fn container(section: &Section, ctx: &RenderContext<'_>) -> VNode {
    let el = VNode::element("section").with_class("container");
    apply_base_styles(el, &section.settings).with_child(ctx.render_blocks(section.blocks.as_deref()))
}

fn rich_text(section: &Section, ctx: &RenderContext<'_>) -> VNode {
    let mut el = VNode::element("section").with_class("rich-text");
    if let Some(heading) = section.setting_str("heading") {
        el = el.with_child(VNode::element("h2").with_text(heading));
    }
    el.with_child(ctx.render_blocks(section.blocks.as_deref()))
}

/// Editor-only product preview; has no blocks
fn featured_collection(section: &Section, _: &RenderContext<'_>) -> VNode {
    VNode::element("section")
        .with_class("featured-collection")
        .with_child(
            VNode::element("h2")
                .with_text(section.setting_str("title").unwrap_or("Featured Collection")),
        )
        .with_child(
            VNode::element("div")
                .with_style("opacity", "0.6")
                .with_text(
                    section
                        .setting_str("textContent")
                        .unwrap_or("🛒 Product preview (editor only)"),
                ),
        )
}

fn contact_form(section: &Section, _: &RenderContext<'_>) -> VNode {
    let setting = |key: &str, fallback: &'static str| -> String {
        section.setting_str(key).unwrap_or(fallback).to_string()
    };

    let button = VNode::element("button")
        .with_attr("type", "submit")
        .with_style("color", setting("buttonColor", "#fff"))
        .with_style("background-color", setting("buttonBackgroundColor", "#007bff"))
        .with_style("border-color", setting("buttonBorderColor", "#007bff"))
        .with_text(setting("buttonText", "Send"));

    let form = VNode::element("form")
        .with_child(
            VNode::element("input")
                .with_attr("type", "text")
                .with_attr("placeholder", setting("namePlaceholder", "Name")),
        )
        .with_child(VNode::element("br"))
        .with_child(
            VNode::element("input")
                .with_attr("type", "email")
                .with_attr("placeholder", setting("emailPlaceholder", "Email")),
        )
        .with_child(VNode::element("br"))
        .with_child(
            VNode::element("textarea")
                .with_attr("placeholder", setting("messagePlaceholder", "Message")),
        )
        .with_child(VNode::element("br"))
        .with_child(button);

    VNode::element("section")
        .with_class("contact-form")
        .with_child(VNode::element("h2").with_text(setting("heading", "Contact Us")))
        .with_child(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_editor::{Registry, Settings};
    use serde_json::Value;

    fn render(section: &Section) -> VNode {
        let mut registry = Registry::new();
        registry.register(plugin());
        let ctx = RenderContext::new(&registry, &section.id);
        let vnode = registry
            .section(&section.type_name)
            .map(|p| p.renderer.render(section, &ctx));
        vnode.unwrap()
    }

    fn settings(value: Value) -> Settings {
        match value {
            Value::Object(map) => map,
            _ => Settings::new(),
        }
    }

    #[test]
    fn test_container_applies_styles_and_embeds_blocks() {
        let section = Section::new("s1", "container")
            .with_settings(settings(json!({ "paddingTop": "24px", "display": "none" })))
            .with_blocks(vec![]);
        let vnode = render(&section);

        assert_eq!(vnode.style("padding-top"), Some("24px"));
        assert_eq!(vnode.style("display"), Some("none"));
        assert_eq!(vnode.children().len(), 1);
    }

    #[test]
    fn test_rich_text_heading_is_optional() {
        let vnode = render(&Section::new("s1", "rich-text"));
        assert_eq!(vnode.children().len(), 1);

        let vnode = render(
            &Section::new("s1", "rich-text").with_settings(settings(json!({ "heading": "Hi" }))),
        );
        assert_eq!(vnode.children().len(), 2);
    }

    #[test]
    fn test_contact_form_fallbacks() {
        let vnode = render(&Section::new("s1", "contact-form"));
        let form = &vnode.children()[1];
        let button = form.children().last().unwrap();
        assert_eq!(button.style("background-color"), Some("#007bff"));
        assert_eq!(button.children(), &[VNode::text("Send")]);
    }
}
