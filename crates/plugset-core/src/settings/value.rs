use std::fmt;

use crate::settings::error::SettingsError;

/// Declared type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    Bool,
    Int,
    Number,
    String,
}

impl SettingKind {
    /// Map a schema `type` attribute onto a value kind.
    ///
    /// Returns `None` for presentational entries (`action`, `sep`, `lsep`) that
    /// carry no value. Unknown types are treated as strings.
    pub fn from_schema_type(schema_type: Option<&str>) -> Option<Self> {
        let schema_type = match schema_type {
            Some(t) => t.trim().to_ascii_lowercase(),
            None => return Some(SettingKind::String),
        };
        match schema_type.as_str() {
            "bool" | "boolean" => Some(SettingKind::Bool),
            "int" | "integer" | "enum" => Some(SettingKind::Int),
            "number" | "slider" => Some(SettingKind::Number),
            "action" | "sep" | "lsep" => None,
            _ => Some(SettingKind::String),
        }
    }

    /// The value a setting of this kind takes when the schema gives no default
    pub fn zero_value(&self) -> SettingValue {
        match self {
            SettingKind::Bool => SettingValue::Bool(false),
            SettingKind::Int => SettingValue::Int(0),
            SettingKind::Number => SettingValue::Number(0.0),
            SettingKind::String => SettingValue::String(String::new()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKind::Bool => "bool",
            SettingKind::Int => "int",
            SettingKind::Number => "number",
            SettingKind::String => "string",
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed setting value
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Number(f64),
    String(String),
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::Bool(_) => SettingKind::Bool,
            SettingValue::Int(_) => SettingKind::Int,
            SettingValue::Number(_) => SettingKind::Number,
            SettingValue::String(_) => SettingKind::String,
        }
    }

    /// Parse the textual form of a value of the given kind
    pub fn parse(kind: SettingKind, text: &str) -> Result<Self, SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            kind,
            text: text.to_string(),
        };
        match kind {
            SettingKind::Bool => {
                let trimmed = text.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(SettingValue::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(SettingValue::Bool(false))
                } else {
                    Err(invalid())
                }
            }
            SettingKind::Int => text.trim().parse::<i64>().map(SettingValue::Int).map_err(|_| invalid()),
            SettingKind::Number => text
                .trim()
                .parse::<f64>()
                .map(SettingValue::Number)
                .map_err(|_| invalid()),
            SettingKind::String => Ok(SettingValue::String(text.to_string())),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            SettingValue::Int(i) => write!(f, "{}", i),
            SettingValue::Number(n) => write!(f, "{}", n),
            SettingValue::String(s) => f.write_str(s),
        }
    }
}

/// Rust types that map onto exactly one [`SettingKind`].
///
/// Typed accessors match on the cell's kind and fail closed on a mismatch;
/// no conversion between kinds ever happens.
pub trait SettingType: Sized {
    const KIND: SettingKind;

    fn from_value(value: &SettingValue) -> Option<Self>;

    fn into_value(self) -> SettingValue;
}

impl SettingType for bool {
    const KIND: SettingKind = SettingKind::Bool;

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn into_value(self) -> SettingValue {
        SettingValue::Bool(self)
    }
}

impl SettingType for i64 {
    const KIND: SettingKind = SettingKind::Int;

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn into_value(self) -> SettingValue {
        SettingValue::Int(self)
    }
}

impl SettingType for f64 {
    const KIND: SettingKind = SettingKind::Number;

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn into_value(self) -> SettingValue {
        SettingValue::Number(self)
    }
}

impl SettingType for String {
    const KIND: SettingKind = SettingKind::String;

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> SettingValue {
        SettingValue::String(self)
    }
}

/// One setting's current value together with its schema default.
///
/// The kind is fixed at construction; every write is checked against it.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingCell {
    value: SettingValue,
    default: SettingValue,
    defined: bool,
}

impl SettingCell {
    /// A cell declared by the schema
    pub fn defined(default: SettingValue) -> Self {
        Self {
            value: default.clone(),
            default,
            defined: true,
        }
    }

    /// A cell created at runtime for a key the schema does not know
    pub fn undefined(value: SettingValue) -> Self {
        Self {
            default: value.clone(),
            value,
            defined: false,
        }
    }

    pub fn kind(&self) -> SettingKind {
        self.value.kind()
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    pub fn default_value(&self) -> &SettingValue {
        &self.default
    }

    /// Whether the schema declared this setting
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn is_default(&self) -> bool {
        self.value == self.default
    }

    /// Textual form of the current value
    pub fn to_text(&self) -> String {
        self.value.to_string()
    }

    /// Replace the value from its textual form, parsed as this cell's kind
    pub fn set_from_text(&mut self, text: &str) -> Result<(), SettingsError> {
        self.value = SettingValue::parse(self.kind(), text)?;
        Ok(())
    }

    /// Replace the value; the new value must have the cell's kind
    pub fn set_value(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        if value.kind() != self.kind() {
            return Err(SettingsError::TypeMismatch {
                key: key.to_string(),
                declared: self.kind(),
                requested: value.kind(),
            });
        }
        self.value = value;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    pub fn get<T: SettingType>(&self) -> Option<T> {
        T::from_value(&self.value)
    }
}
