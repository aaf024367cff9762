use serde::{Deserialize, Serialize};

/// Kind of control a setting is edited with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    Select,
    Color,
    Textarea,
}

/// One editable property of a settings object.
///
/// Supplied by plugins; never stored in the page document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingField {
    pub key: String,
    pub label: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    /// Kept out of the panel but still writable (serialized widget state)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl SettingField {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            options: None,
            min: None,
            max: None,
            step: None,
            hidden: false,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldType::Text)
    }

    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldType::Number)
    }

    pub fn boolean(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldType::Boolean)
    }

    pub fn color(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldType::Color)
    }

    pub fn textarea(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldType::Textarea)
    }

    pub fn select<I, S>(key: impl Into<String>, label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut field = Self::new(key, label, FieldType::Select);
        field.options = Some(options.into_iter().map(Into::into).collect());
        field
    }

    pub fn with_range(mut self, min: f64, max: f64, step: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.step = Some(step);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_json_shape() {
        let field = SettingField::select("align", "Align", ["left", "right"]);
        let json = serde_json::to_value(&field).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "key": "align",
                "label": "Align",
                "type": "select",
                "options": ["left", "right"]
            })
        );
    }

    #[test]
    fn test_hidden_flag_parses() {
        let field: SettingField = serde_json::from_str(
            r#"{ "key": "rows", "label": "Rows", "type": "textarea", "hidden": true }"#,
        )
        .unwrap();

        assert!(field.hidden);
        assert_eq!(field.field_type, FieldType::Textarea);
        assert!(field.options().is_empty());
    }
}
