//! Field definitions: the schema every row follows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a field's values.
///
/// Unknown type tags in stored data deserialize as [`FieldType::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Decimal number, parsed as a finite float.
    Number,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    /// Literal `true` or `false`.
    Boolean,
    /// Free text; also the fallback for unknown tags.
    #[default]
    #[serde(other)]
    Text,
}

impl FieldType {
    /// Display label shown next to a field in the schema editor.
    pub fn label(self) -> &'static str {
        match self {
            FieldType::Text => "文本",
            FieldType::Number => "数字",
            FieldType::Date => "日期",
            FieldType::Boolean => "布尔值",
        }
    }

    /// Whether `value` is acceptable for this type.
    ///
    /// Empty values are always accepted; presence is checked separately
    /// for required fields.
    pub fn accepts(self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        match self {
            FieldType::Text => true,
            FieldType::Number => value.parse::<f64>().is_ok_and(f64::is_finite),
            FieldType::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            FieldType::Boolean => matches!(value, "true" | "false"),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
        };
        f.write_str(tag)
    }
}

/// A named, typed column of the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Unique, immutable key. Rows store values under this name.
    pub name: String,
    /// Declared value type, stored under `type`.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Must be non-empty on every row before a validated save.
    #[serde(default)]
    pub required: bool,
    /// Shown on screen and included in exports.
    pub visible: bool,
    /// Display sequence; ties keep insertion order.
    pub order: i64,
}

impl Field {
    /// A visible field.
    pub fn new(name: impl Into<String>, field_type: FieldType, required: bool, order: i64) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
            visible: true,
            order,
        }
    }
}

/// The fixed schema every workbook starts with: `(name, required)`.
///
/// These are the only fields that cannot be removed. All are text.
pub const DEFAULT_FIELDS: [(&str, bool); 5] = [
    ("变量名", true),
    ("物理意义", true),
    ("参数值", true),
    ("数据类型", true),
    ("备注", false),
];

/// Whether `name` belongs to the fixed default schema.
pub fn is_default_field(name: &str) -> bool {
    DEFAULT_FIELDS.iter().any(|(default, _)| *default == name)
}
