//! Ordered, visibility-flagged field definitions.

use crate::model::{is_default_field, is_reserved_key, Field, FieldType, SheetError, DEFAULT_FIELDS};
use tracing::{info, warn};

/// A schema change the row store has to mirror onto every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Every row gains this key with an empty value.
    Added(String),
    /// Every row loses this key.
    Removed(String),
}

impl FieldChange {
    /// Name of the affected field.
    pub fn field(&self) -> &str {
        match self {
            FieldChange::Added(name) | FieldChange::Removed(name) => name,
        }
    }
}

/// The sheet's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRegistry {
    fields: Vec<Field>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FieldRegistry {
    /// Registry seeded with the fixed default fields.
    pub fn with_defaults() -> Self {
        let fields = DEFAULT_FIELDS
            .iter()
            .zip(0..)
            .map(|((name, required), order)| Field::new(*name, FieldType::Text, *required, order))
            .collect();
        Self { fields }
    }

    /// Registry holding exactly `fields`, stably sorted by `order`.
    ///
    /// Later duplicates of a name are dropped, as are fields named after a
    /// reserved row key.
    pub fn from_fields(fields: Vec<Field>) -> Self {
        let mut unique: Vec<Field> = Vec::with_capacity(fields.len());
        for field in fields {
            if is_reserved_key(&field.name) {
                warn!(field = %field.name, "Dropping field with reserved name");
            } else if unique.iter().all(|f| f.name != field.name) {
                unique.push(field);
            }
        }
        unique.sort_by_key(|f| f.order);
        Self { fields: unique }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields, sorted by order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Look up a field by exact name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a field with `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Define a new visible field at the end of the display order.
    ///
    /// The returned change must be applied to the row store.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for a blank name, `ReservedName` for a row metadata key,
    /// `DuplicateName` when it already exists.
    pub fn add(
        &mut self,
        name: &str,
        field_type: FieldType,
        required: bool,
    ) -> Result<FieldChange, SheetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SheetError::EmptyInput {
                input: "field name",
            });
        }
        if is_reserved_key(name) {
            return Err(SheetError::ReservedName(name.to_string()));
        }
        if self.contains(name) {
            return Err(SheetError::DuplicateName(name.to_string()));
        }
        let order = self.fields.iter().map(|f| f.order).max().unwrap_or(-1) + 1;
        self.fields.push(Field::new(name, field_type, required, order));
        info!(field = name, %field_type, order, "Field added");
        Ok(FieldChange::Added(name.to_string()))
    }

    /// Remove a user-defined field.
    ///
    /// # Errors
    ///
    /// `Protected` for a default field, `UnknownField` otherwise when absent.
    pub fn remove(&mut self, name: &str) -> Result<FieldChange, SheetError> {
        if is_default_field(name) {
            return Err(SheetError::Protected(name.to_string()));
        }
        let pos = self
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| SheetError::UnknownField(name.to_string()))?;
        self.fields.remove(pos);
        info!(field = name, "Field removed");
        Ok(FieldChange::Removed(name.to_string()))
    }

    /// Show or hide one field.
    ///
    /// # Errors
    ///
    /// `UnknownField` when no field has this name.
    pub fn set_visible(&mut self, name: &str, visible: bool) -> Result<(), SheetError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| SheetError::UnknownField(name.to_string()))?;
        field.visible = visible;
        Ok(())
    }

    /// Show or hide every field at once.
    pub fn toggle_all(&mut self, visible: bool) {
        for field in &mut self.fields {
            field.visible = visible;
        }
    }

    /// Visible fields in display order.
    pub fn visible_ordered(&self) -> Vec<&Field> {
        let mut visible: Vec<&Field> = self.fields.iter().filter(|f| f.visible).collect();
        visible.sort_by_key(|f| f.order);
        visible
    }

    /// Whether every field is visible; drives a "select all" toggle.
    pub fn all_visible(&self) -> bool {
        self.fields.iter().all(|f| f.visible)
    }
}
