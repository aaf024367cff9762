//! # Settings Panel Generator
//!
//! Builds an editable form from a plugin's field schema, bound to a live
//! settings object.
//!
//! The panel never copies settings for editing. [`SettingsPanel::apply`]
//! coerces a raw input and writes it straight into the settings object it is
//! handed, which is the one stored in the document.

use crate::view::{Mount, VNode};
use pagecraft_schema::{FieldType, SettingField, Settings};
use serde_json::{Number, Value};

pub const PANEL_CLASS: &str = "settings-panel";

/// Raw state of an input control at the time it fired an edit event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputValue {
    pub value: String,
    pub checked: bool,
}

impl InputValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            checked: false,
        }
    }

    pub fn checked(checked: bool) -> Self {
        Self {
            value: if checked { "on" } else { "" }.to_string(),
            checked,
        }
    }
}

/// Generated control for one field
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// text, number and color inputs
    Input {
        input_type: &'static str,
        value: String,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Checkbox {
        checked: bool,
    },
    Select {
        options: Vec<String>,
        selected: Option<String>,
    },
    TextArea {
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelField {
    pub key: String,
    pub label: String,
    pub control: Control,
}

/// Form model for one entity's settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsPanel {
    pub title: String,
    /// Visible fields in schema order
    pub fields: Vec<PanelField>,
    schema: Vec<SettingField>,
}

/// Build the panel for a settings object.
///
/// Initial values come from `settings`, then `defaults`, then empty/false.
/// Hidden fields stay in the schema but get no control.
pub fn render_panel(
    settings: &Settings,
    schema: &[SettingField],
    defaults: Option<&Settings>,
) -> SettingsPanel {
    let fields = schema
        .iter()
        .filter(|field| !field.hidden)
        .map(|field| {
            let current = settings
                .get(&field.key)
                .or_else(|| defaults.and_then(|d| d.get(&field.key)));
            PanelField {
                key: field.key.clone(),
                label: field.label.clone(),
                control: control_for(field, current),
            }
        })
        .collect();

    SettingsPanel {
        title: String::new(),
        fields,
        schema: schema.to_vec(),
    }
}

fn control_for(field: &SettingField, current: Option<&Value>) -> Control {
    match field.field_type {
        FieldType::Boolean => Control::Checkbox {
            checked: current.is_some_and(truthy),
        },
        FieldType::Select => {
            let shown = current.map(display_value);
            let selected = shown.filter(|value| field.options().contains(value));
            Control::Select {
                options: field.options().to_vec(),
                selected,
            }
        }
        FieldType::Textarea => Control::TextArea {
            value: current.map(display_value).unwrap_or_default(),
        },
        FieldType::Text | FieldType::Number | FieldType::Color => Control::Input {
            input_type: match field.field_type {
                FieldType::Number => "number",
                FieldType::Color => "color",
                _ => "text",
            },
            value: current.map(display_value).unwrap_or_default(),
            min: field.min,
            max: field.max,
            step: field.step,
        },
    }
}

/// Coerce a raw input per field type
pub fn coerce(field_type: FieldType, input: &InputValue) -> Value {
    match field_type {
        FieldType::Boolean => Value::Bool(input.checked),
        FieldType::Number => parse_number(&input.value),
        _ => Value::String(input.value.clone()),
    }
}

/// Integral values stay integers; unparsable input becomes `null`
fn parse_number(raw: &str) -> Value {
    let Ok(parsed) = raw.trim().parse::<f64>() else {
        return Value::Null;
    };
    if parsed.fract() == 0.0 && parsed.abs() < i64::MAX as f64 {
        return Value::Number(Number::from(parsed as i64));
    }
    Number::from_f64(parsed).map_or(Value::Null, Value::Number)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text shown in a control for a stored value
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl SettingsPanel {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Full schema, hidden fields included
    pub fn schema(&self) -> &[SettingField] {
        &self.schema
    }

    pub fn field(&self, key: &str) -> Option<&PanelField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Coerce an edit and write it into the live settings object.
    ///
    /// Returns the stored value, or `None` if the key is not in the schema.
    pub fn apply(&mut self, settings: &mut Settings, key: &str, input: &InputValue) -> Option<Value> {
        let field_type = self.schema.iter().find(|f| f.key == key)?.field_type;
        let value = coerce(field_type, input);
        settings.insert(key.to_string(), value.clone());
        self.sync(key, &value);
        Some(value)
    }

    /// Keep the displayed control in step with a stored value
    fn sync(&mut self, key: &str, value: &Value) {
        let Some(field) = self.fields.iter_mut().find(|f| f.key == key) else {
            return;
        };
        match &mut field.control {
            Control::Checkbox { checked } => *checked = truthy(value),
            Control::Select { options, selected } => {
                let shown = display_value(value);
                *selected = options.contains(&shown).then_some(shown);
            }
            Control::Input { value: shown, .. } | Control::TextArea { value: shown } => {
                *shown = display_value(value);
            }
        }
    }

    /// Render the form; every control is marked for edit wiring
    pub fn to_vnode(&self) -> VNode {
        let mut root = VNode::element("div").with_class(PANEL_CLASS);
        if !self.title.is_empty() {
            root = root.with_child(VNode::element("h3").with_text(self.title.clone()));
        }

        if self.fields.is_empty() {
            return root.with_child(
                VNode::element("p")
                    .with_class("settings-empty")
                    .with_text("No editable settings"),
            );
        }

        for field in &self.fields {
            let control = field_vnode(field).with_mount(Mount::Field {
                key: field.key.clone(),
            });
            root = root.with_child(
                VNode::element("label")
                    .with_class("settings-field")
                    .with_child(VNode::element("span").with_text(field.label.clone()))
                    .with_child(control),
            );
        }

        root
    }
}

fn field_vnode(field: &PanelField) -> VNode {
    match &field.control {
        Control::Input {
            input_type,
            value,
            min,
            max,
            step,
        } => {
            let mut node = VNode::element("input")
                .with_attr("type", *input_type)
                .with_attr("name", field.key.clone())
                .with_attr("value", value.clone());
            for (attr, bound) in [("min", min), ("max", max), ("step", step)] {
                if let Some(bound) = bound {
                    node = node.with_attr(attr, bound.to_string());
                }
            }
            node
        }
        Control::Checkbox { checked } => {
            let node = VNode::element("input")
                .with_attr("type", "checkbox")
                .with_attr("name", field.key.clone());
            if *checked {
                node.with_attr("checked", "checked")
            } else {
                node
            }
        }
        Control::Select { options, selected } => {
            let children = options
                .iter()
                .map(|option| {
                    let node = VNode::element("option")
                        .with_attr("value", option.clone())
                        .with_text(option.clone());
                    if selected.as_ref() == Some(option) {
                        node.with_attr("selected", "selected")
                    } else {
                        node
                    }
                })
                .collect();
            VNode::element("select")
                .with_attr("name", field.key.clone())
                .with_children(children)
        }
        Control::TextArea { value } => VNode::element("textarea")
            .with_attr("name", field.key.clone())
            .with_text(value.clone()),
    }
}
