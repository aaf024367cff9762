//! Base style settings shared by styleable sections.
//!
//! Each entry maps a settings key to the CSS property it controls. Most
//! typography selects use `"none"` as their "unset" option, so for those
//! keys that value is never emitted; `display` and `float` pass it through
//! as real CSS.

use pagecraft_editor::{SettingField, Settings, VNode};
use serde_json::Value;

/// Settings key → CSS property
pub const STYLE_PROPERTIES: &[(&str, &str)] = &[
    ("color", "color"),
    ("backgroundColor", "background-color"),
    ("height", "height"),
    ("width", "width"),
    ("paddingTop", "padding-top"),
    ("paddingRight", "padding-right"),
    ("paddingBottom", "padding-bottom"),
    ("paddingLeft", "padding-left"),
    ("marginTop", "margin-top"),
    ("marginRight", "margin-right"),
    ("marginBottom", "margin-bottom"),
    ("marginLeft", "margin-left"),
    ("borderRadius", "border-radius"),
    ("borderWidth", "border-width"),
    ("borderColor", "border-color"),
    ("display", "display"),
    ("position", "position"),
    ("top", "top"),
    ("right", "right"),
    ("left", "left"),
    ("bottom", "bottom"),
    ("float", "float"),
    ("font", "font-family"),
    ("fontSize", "font-size"),
    ("fontWeight", "font-weight"),
    ("fontStyle", "font-style"),
    ("lineHeight", "line-height"),
    ("textAlign", "text-align"),
    ("textDecoration", "text-decoration"),
    ("textTransform", "text-transform"),
    ("letterSpacing", "letter-spacing"),
];

/// Settings schema exposing every base style
pub fn base_style_schema() -> Vec<SettingField> {
    vec![
        SettingField::color("color", "Color"),
        SettingField::color("backgroundColor", "Background Color"),
        SettingField::text("height", "Height"),
        SettingField::text("width", "Width"),
        // padding
        SettingField::text("paddingTop", "Padding Top"),
        SettingField::text("paddingRight", "Padding Right"),
        SettingField::text("paddingBottom", "Padding Bottom"),
        SettingField::text("paddingLeft", "Padding Left"),
        // margin
        SettingField::text("marginTop", "Margin Top"),
        SettingField::text("marginRight", "Margin Right"),
        SettingField::text("marginBottom", "Margin Bottom"),
        SettingField::text("marginLeft", "Margin Left"),
        // border
        SettingField::text("borderRadius", "Border Radius"),
        SettingField::text("borderWidth", "Border Width"),
        SettingField::color("borderColor", "Border Color"),
        // display & position
        SettingField::select(
            "display",
            "Display",
            ["block", "flex", "inline", "inline-block", "none"],
        ),
        SettingField::select(
            "position",
            "Position",
            ["static", "relative", "absolute", "fixed", "sticky"],
        ),
        SettingField::text("top", "Top"),
        SettingField::text("right", "Right"),
        SettingField::text("left", "Left"),
        SettingField::text("bottom", "Bottom"),
        SettingField::select("float", "Float", ["none", "left", "right"]),
        // font
        SettingField::select(
            "font",
            "Font",
            ["none", "Arial", "Helvetica", "Times New Roman"],
        ),
        SettingField::select(
            "fontSize",
            "Font Size",
            ["none", "12px", "14px", "16px", "18px", "20px"],
        ),
        SettingField::select(
            "fontWeight",
            "Font Weight",
            ["none", "normal", "bold", "bolder", "lighter"],
        ),
        SettingField::select(
            "fontStyle",
            "Font Style",
            ["none", "normal", "italic", "oblique"],
        ),
        SettingField::select("lineHeight", "Line Height", ["none", "1", "1.5", "2", "2.5"]),
        // text
        SettingField::select("textAlign", "Text Align", ["none", "left", "center", "right"]),
        SettingField::select(
            "textDecoration",
            "Text Decoration",
            ["none", "underline", "overline", "line-through"],
        ),
        SettingField::select(
            "textTransform",
            "Text Transform",
            ["none", "uppercase", "lowercase", "capitalize"],
        ),
        SettingField::text("letterSpacing", "Letter Spacing"),
    ]
}

/// Keys whose select lists `"none"` as the unset option
const NONE_MEANS_UNSET: &[&str] = &[
    "font",
    "fontSize",
    "fontWeight",
    "fontStyle",
    "lineHeight",
    "textAlign",
    "textDecoration",
    "textTransform",
];

/// Inline every present, non-empty base style on a node
pub fn apply_base_styles(mut node: VNode, settings: &Settings) -> VNode {
    for (key, property) in STYLE_PROPERTIES {
        if let Some(value) = settings.get(*key).and_then(|v| css_value(key, v)) {
            node.set_style(*property, value);
        }
    }
    node
}

fn css_value(key: &str, value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) if s == "none" && NONE_MEANS_UNSET.contains(&key) => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: Value) -> Settings {
        match value {
            Value::Object(map) => map,
            _ => Settings::new(),
        }
    }

    #[test]
    fn test_schema_covers_every_property() {
        let schema = base_style_schema();
        assert_eq!(schema.len(), STYLE_PROPERTIES.len());
        for (key, _) in STYLE_PROPERTIES {
            assert!(schema.iter().any(|f| f.key == *key), "missing {}", key);
        }
    }

    #[test]
    fn test_apply_skips_empty_and_none() {
        let node = apply_base_styles(
            VNode::element("section"),
            &settings(json!({
                "backgroundColor": "#fafafa",
                "paddingTop": "",
                "fontSize": "none",
                "font": "Arial",
                "lineHeight": 1.5,
                "textDecoration": "none",
                "unrelated": "x"
            })),
        );

        assert_eq!(node.style("background-color"), Some("#fafafa"));
        assert_eq!(node.style("font-family"), Some("Arial"));
        assert_eq!(node.style("line-height"), Some("1.5"));
        assert_eq!(node.style("padding-top"), None);
        assert_eq!(node.style("font-size"), None);
        assert_eq!(node.style("text-decoration"), None);
    }

    #[test]
    fn test_apply_keeps_none_for_display_and_float() {
        let node = apply_base_styles(
            VNode::element("section"),
            &settings(json!({ "display": "none", "float": "none" })),
        );

        assert_eq!(node.style("display"), Some("none"));
        assert_eq!(node.style("float"), Some("none"));
    }
}
