//! Entity profiles and the route registry.
//!
//! Each managed table is described by an [`EntityProfile`]: its columns,
//! which fields the search box matches, and how deletion works. Pages are
//! resolved by route name through [`PageRegistry`].

use crate::error::CatalogError;
use crate::schema::{
    Align, ColumnDescriptor, ColumnSet, FieldCatalog, FieldDescriptor, InputKind, Visibility,
    INSERT_TIMESTAMP_FIELD, UPDATE_TIMESTAMP_FIELD,
};
use crate::validation::{UniqueFieldRule, ValidatorSet};
use serde::{Deserialize, Serialize};

pub const NOMENCLATURE: &str = "nomenclature";
pub const INDIVIDUALS: &str = "individuals";
pub const STAFFERS: &str = "staffers";

/// What the delete action does for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// `update(id, {deleted: true})`, reversible by restore.
    Soft,
    /// `delete(id)`, irreversible.
    Hard,
}

/// Fields the search query is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    Fields(Vec<String>),
    AllFields,
}

impl SearchScope {
    pub fn fields(names: &[&str]) -> Self {
        Self::Fields(names.iter().map(|name| name.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityProfile {
    pub table: String,
    pub title: String,
    pub columns: ColumnSet,
    pub search: SearchScope,
    pub delete_policy: DeletePolicy,
}

impl EntityProfile {
    pub fn new(table: &str, title: &str) -> Self {
        Self {
            table: table.to_string(),
            title: title.to_string(),
            columns: ColumnSet::new(),
            search: SearchScope::AllFields,
            delete_policy: DeletePolicy::Hard,
        }
    }

    pub fn columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    pub fn search(mut self, search: SearchScope) -> Self {
        self.search = search;
        self
    }

    pub fn delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }
}

pub fn nomenclature() -> EntityProfile {
    EntityProfile::new(NOMENCLATURE, "Nomenclature")
        .columns(
            ColumnSet::new()
                .with("id", ColumnDescriptor::new("ID").width(8).align(Align::Center))
                .with("code", ColumnDescriptor::new("Code").width(16))
                .with("represent", ColumnDescriptor::new("Name")),
        )
        .search(SearchScope::fields(&["code", "represent"]))
        .delete_policy(DeletePolicy::Soft)
}

pub fn individuals() -> EntityProfile {
    EntityProfile::new(INDIVIDUALS, "Individuals")
        .columns(
            ColumnSet::new()
                .with("id", ColumnDescriptor::new("ID").width(8).align(Align::Center))
                .with("iin", ColumnDescriptor::new("National ID").width(14))
                .with("represent", ColumnDescriptor::new("Full name")),
        )
        .search(SearchScope::fields(&["iin", "represent"]))
}

pub fn staffers() -> EntityProfile {
    EntityProfile::new(STAFFERS, "Staffers").columns(
        ColumnSet::new()
            .with(
                "individual_id",
                ColumnDescriptor::new("Individual").width(12).align(Align::Center),
            )
            .with("tab_number", ColumnDescriptor::new("Tab number").width(12))
            .with("represent", ColumnDescriptor::new("Name")),
    )
}

/// Form field descriptors shared by every table.
pub fn default_fields() -> FieldCatalog {
    FieldCatalog::default()
        .with("id", FieldDescriptor::read_only("ID"))
        .with("uuid", FieldDescriptor::read_only("UUID"))
        .with(
            "code",
            FieldDescriptor::text("Code").placeholder("Enter a unique code"),
        )
        .with("represent", FieldDescriptor::text("Name").required())
        .with(
            "iin",
            FieldDescriptor::text("National ID").placeholder("12 digits"),
        )
        .with(
            INSERT_TIMESTAMP_FIELD,
            FieldDescriptor::read_only("Created").input(InputKind::Timestamp),
        )
        .with(
            UPDATE_TIMESTAMP_FIELD,
            FieldDescriptor::read_only("Updated").input(InputKind::Timestamp),
        )
        .with(
            "deleted",
            FieldDescriptor {
                editable: false,
                ..FieldDescriptor::text("Deleted")
                    .input(InputKind::Flag)
                    .visible(Visibility::NEVER)
            },
        )
}

/// Validators for the fields that carry format and uniqueness rules.
pub fn default_validators() -> ValidatorSet {
    ValidatorSet::new()
        .with(UniqueFieldRule::code())
        .with(UniqueFieldRule::national_id())
}

/// Static mapping from route name to profile factory.
#[derive(Debug, Clone)]
pub struct PageRegistry {
    entries: Vec<(&'static str, fn() -> EntityProfile)>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new()
            .register(NOMENCLATURE, nomenclature)
            .register(INDIVIDUALS, individuals)
            .register(STAFFERS, staffers)
    }

    pub fn register(mut self, name: &'static str, factory: fn() -> EntityProfile) -> Self {
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, factory));
        self
    }

    pub fn resolve(&self, name: &str) -> Result<EntityProfile, CatalogError> {
        self.entries
            .iter()
            .find(|(route, _)| *route == name)
            .map(|(_, factory)| factory())
            .ok_or_else(|| CatalogError::UnknownRoute {
                name: name.to_string(),
            })
    }

    /// Route names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }
}

impl Default for PageRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
