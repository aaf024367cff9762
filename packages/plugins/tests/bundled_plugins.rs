//! Bundled plugins driven through the editor engine

use pagecraft_editor::{
    read_order, Engine, EntityKind, EntityRef, HtmlOptions, InputValue, Registry,
};
use pagecraft_plugins::{about_us_page, bundled, default_registry, register_bundled, PluginError};

#[test]
fn test_default_registry_palette() {
    let registry = default_registry();
    let engine = Engine::new(&registry);
    let palette = engine.palette();

    assert_eq!(
        palette.sections,
        vec!["container", "rich-text", "featured-collection", "contact-form"]
    );
    assert_eq!(
        palette.blocks,
        vec!["text", "image", "link", "button", "table", "quote"]
    );
    assert_eq!(
        registry.plugin_names(),
        &["Core Sections", "Core Blocks", "Quote Block"]
    );
}

#[test]
fn test_about_us_page_renders_every_block() {
    let registry = default_registry();
    let mut engine = Engine::new(&registry);
    engine.load(about_us_page());

    let list = engine.block_list_of("content").unwrap();
    assert_eq!(
        read_order(engine.view(), list, EntityKind::Block),
        vec!["b1", "b4", "b5", "b6"]
    );

    let html = engine.render_html(&HtmlOptions::default());
    assert!(html.contains("<h2>About Us</h2>"));
    assert!(html.contains("<a class=\"link\" href=\"/contact\">Contact</a>"));
    assert!(html.contains("<button class=\"btn\">Click me</button>"));
    assert!(html.contains("Hello world, this is quote"));
    assert!(html.contains("<h2>Get in touch</h2>"));
    assert_eq!(engine.serialize(), about_us_page().to_value());
}

#[test]
fn test_register_bundled_rejects_unknown_keys() {
    let mut registry = Registry::new();
    let err = register_bundled(&mut registry, &["core-blocks", "gallery"]).unwrap_err();
    assert_eq!(err, PluginError::Unknown("gallery".to_string()));
    assert!(registry.list_blocks().is_empty());
}

#[test]
fn test_duplicate_bundle_is_skipped() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    let reports = register_bundled(&mut registry, &["quote", "quote"])?;
    assert_eq!(reports[0].accepted.len(), 1);
    assert_eq!(reports[1].skipped, vec![(EntityKind::Block, "quote".to_string())]);
    assert_eq!(registry.list_blocks().len(), 1);
    Ok(())
}

#[test]
fn test_table_block_keeps_its_node_on_edit() {
    let registry = default_registry();
    let mut engine = Engine::new(&registry);
    engine.load(about_us_page());

    let id = engine.add_block("content", "table").unwrap();
    let entity = EntityRef::Block(id.clone());
    let node = engine.node_of(&entity).unwrap();

    assert!(engine.edit_field("caption", &InputValue::text("Opening hours")));
    assert!(engine.edit_field("rows", &InputValue::text("[[\"Mon\", \"9-5\"]]")));

    assert_eq!(engine.node_of(&entity), Some(node));
    let block = engine.page().find_block(&id).map(|(_, b)| b.clone()).unwrap();
    assert_eq!(block.settings["caption"], "Opening hours");
    assert_eq!(block.settings["rows"], "[[\"Mon\", \"9-5\"]]");

    // hidden fields get no control
    let panel = engine.settings_panel().unwrap();
    assert!(panel.field("rows").is_none());
    assert!(panel.field("caption").is_some());
}

#[test]
fn test_container_section_styles_from_panel() {
    let registry = default_registry();
    let mut engine = Engine::new(&registry);

    let id = engine.add_section("container").unwrap();
    engine.add_block(&id, "text");
    engine.select(EntityRef::Section(id.clone()));
    assert!(engine.edit_field("backgroundColor", &InputValue::text("#eeeeee")));
    assert!(engine.edit_field("display", &InputValue::text("none")));

    let html = engine.render_html(&HtmlOptions::default());
    assert!(html.contains(
        "<section class=\"container\" style=\"background-color: #eeeeee; display: none;\">"
    ));
    assert!(html.contains("<p>Your text here</p>"));
}

#[test]
fn test_bundled_lookup() {
    assert!(bundled("core-sections").is_some());
    assert!(bundled("nope").is_none());
}
