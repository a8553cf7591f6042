//! Declarative field and column configuration.
//!
//! Form presentation ([`FieldDescriptor`]) and table presentation
//! ([`ColumnDescriptor`]) are configured independently, both keyed by field
//! name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field stamped by the form controller on every update.
pub const UPDATE_TIMESTAMP_FIELD: &str = "updatedate";

/// Field set by the backend on insert.
pub const INSERT_TIMESTAMP_FIELD: &str = "insertdate";

pub fn is_timestamp_field(name: &str) -> bool {
    name == UPDATE_TIMESTAMP_FIELD || name == INSERT_TIMESTAMP_FIELD
}

/// Form mode a field can be shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub create: bool,
    pub edit: bool,
}

impl Visibility {
    pub const ALWAYS: Visibility = Visibility {
        create: true,
        edit: true,
    };
    pub const EDIT_ONLY: Visibility = Visibility {
        create: false,
        edit: true,
    };
    pub const NEVER: Visibility = Visibility {
        create: false,
        edit: false,
    };

    pub fn in_mode(&self, mode: FormMode) -> bool {
        match mode {
            FormMode::Create => self.create,
            FormMode::Edit => self.edit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Date,
    Timestamp,
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub editable: bool,
    pub visible: Visibility,
    pub required: bool,
    pub input: InputKind,
    pub title: Option<String>,
    pub placeholder: Option<String>,
}

impl FieldDescriptor {
    /// Descriptor applied to fields with no catalog entry.
    pub fn fallback() -> Self {
        Self {
            editable: true,
            visible: Visibility::ALWAYS,
            required: false,
            input: InputKind::Text,
            title: None,
            placeholder: None,
        }
    }

    pub fn read_only(title: &str) -> Self {
        Self {
            editable: false,
            visible: Visibility::EDIT_ONLY,
            title: Some(title.to_string()),
            ..Self::fallback()
        }
    }

    pub fn text(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::fallback()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn input(mut self, input: InputKind) -> Self {
        self.input = input;
        self
    }

    pub fn visible(mut self, visible: Visibility) -> Self {
        self.visible = visible;
        self
    }

    /// Title shown in labels and error lists, falling back to the field name.
    pub fn title_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(name)
    }

    pub fn placeholder_or(&self, name: &str) -> String {
        match &self.placeholder {
            Some(placeholder) => placeholder.clone(),
            None => format!("Enter {}", self.title_or(name).to_lowercase()),
        }
    }
}

/// Field descriptors keyed by name with a default for unknown fields.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    fields: HashMap<String, FieldDescriptor>,
    fallback: FieldDescriptor,
}

impl FieldCatalog {
    pub fn new(fallback: FieldDescriptor) -> Self {
        Self {
            fields: HashMap::new(),
            fallback,
        }
    }

    pub fn with(mut self, name: &str, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(name.to_string(), descriptor);
        self
    }

    pub fn descriptor(&self, name: &str) -> &FieldDescriptor {
        self.fields.get(name).unwrap_or(&self.fallback)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::new(FieldDescriptor::fallback())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnWidth {
    Fixed(u16),
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub title: String,
    pub width: ColumnWidth,
    pub align: Align,
    pub visible: bool,
}

impl ColumnDescriptor {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            width: ColumnWidth::Auto,
            align: Align::Left,
            visible: true,
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Ordered table columns keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<(String, ColumnDescriptor)>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, column: ColumnDescriptor) -> Self {
        self.columns.push((field.to_string(), column));
        self
    }

    pub fn visible(&self) -> impl Iterator<Item = (&str, &ColumnDescriptor)> {
        self.columns
            .iter()
            .filter(|(_, column)| column.visible)
            .map(|(field, column)| (field.as_str(), column))
    }

    pub fn get(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, column)| column)
    }

    pub fn visible_len(&self) -> usize {
        self.visible().count()
    }
}

/// Field entry of a table schema as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
        }
    }
}
