//! Field validators.
//!
//! A validator receives the candidate value, the value the form was opened
//! with, and the record to leave out of uniqueness checks. Format rules run
//! first; the uniqueness lookup only happens when the candidate differs from
//! the original.

use crate::gateway::RecordGateway;
use crate::record::RecordId;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of validating one field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(String),
}

impl Verdict {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// Empty for valid values.
    pub fn message(&self) -> &str {
        match self {
            Verdict::Valid => "",
            Verdict::Invalid(reason) => reason,
        }
    }
}

#[async_trait]
pub trait FieldValidator: Send + Sync {
    fn field(&self) -> &str;

    async fn validate(
        &self,
        gateway: &dyn RecordGateway,
        candidate: &str,
        original: &str,
        exclude: Option<&RecordId>,
    ) -> Verdict;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthRule {
    AtLeast(usize),
    Exactly(usize),
}

impl LengthRule {
    fn accepts(&self, len: usize) -> bool {
        match self {
            LengthRule::AtLeast(min) => len >= *min,
            LengthRule::Exactly(n) => len == *n,
        }
    }
}

/// Length, character set and uniqueness rule for one field.
#[derive(Debug, Clone)]
pub struct UniqueFieldRule {
    field: String,
    table: String,
    length: LengthRule,
    length_message: String,
    charset: Regex,
    charset_message: String,
    duplicate_message: String,
    lookup_failed_message: String,
    case_insensitive: bool,
}

impl UniqueFieldRule {
    /// Nomenclature code: at least three Latin letters, digits or hyphens,
    /// unique ignoring case.
    pub fn code() -> Self {
        Self {
            field: "code".to_string(),
            table: "nomenclature".to_string(),
            length: LengthRule::AtLeast(3),
            length_message: "Minimum 3 characters".to_string(),
            charset: Regex::new(r"^[a-zA-Z0-9-]*$").expect("Invalid code regex"),
            charset_message: "Only Latin letters, digits and hyphen are allowed".to_string(),
            duplicate_message: "Code already exists".to_string(),
            lookup_failed_message: "Uniqueness check failed".to_string(),
            case_insensitive: true,
        }
    }

    /// National identification number: exactly twelve digits, unique.
    pub fn national_id() -> Self {
        Self {
            field: "iin".to_string(),
            table: "individuals".to_string(),
            length: LengthRule::Exactly(12),
            length_message: "National ID must contain exactly 12 digits".to_string(),
            charset: Regex::new(r"^[0-9]*$").expect("Invalid national ID regex"),
            charset_message: "National ID may contain only digits".to_string(),
            duplicate_message: "National ID already exists".to_string(),
            lookup_failed_message: "National ID uniqueness check failed".to_string(),
            case_insensitive: false,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Format checks that need no lookup.
    pub fn check_format(&self, value: &str) -> Verdict {
        if !self.length.accepts(value.chars().count()) {
            return Verdict::invalid(&self.length_message);
        }
        if !self.charset.is_match(value) {
            return Verdict::invalid(&self.charset_message);
        }
        Verdict::Valid
    }

    fn same_value(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive {
            a.to_lowercase() == b.to_lowercase()
        } else {
            a == b
        }
    }
}

#[async_trait]
impl FieldValidator for UniqueFieldRule {
    fn field(&self) -> &str {
        &self.field
    }

    async fn validate(
        &self,
        gateway: &dyn RecordGateway,
        candidate: &str,
        original: &str,
        exclude: Option<&RecordId>,
    ) -> Verdict {
        let value = candidate.trim();
        let format = self.check_format(value);
        if !format.is_valid() {
            return format;
        }
        if value == original {
            return Verdict::Valid;
        }

        match gateway.list(&self.table).await {
            Ok(records) => {
                let taken = records.iter().any(|record| {
                    let other = record.text(&self.field);
                    let is_excluded = match (exclude, record.id()) {
                        (Some(excluded), Some(id)) => *excluded == id,
                        _ => false,
                    };
                    !is_excluded && !other.is_empty() && self.same_value(&other, value)
                });
                debug!(field = %self.field, taken, "Uniqueness lookup finished");
                if taken {
                    Verdict::invalid(&self.duplicate_message)
                } else {
                    Verdict::Valid
                }
            }
            Err(err) => {
                warn!(field = %self.field, error = %err, "Uniqueness lookup failed");
                Verdict::invalid(&self.lookup_failed_message)
            }
        }
    }
}

/// Validators keyed by field name.
#[derive(Clone, Default)]
pub struct ValidatorSet {
    validators: HashMap<String, Arc<dyn FieldValidator>>,
}

impl ValidatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, validator: impl FieldValidator + 'static) -> Self {
        self.validators
            .insert(validator.field().to_string(), Arc::new(validator));
        self
    }

    pub fn get(&self, field: &str) -> Option<Arc<dyn FieldValidator>> {
        self.validators.get(field).cloned()
    }

    pub fn covers(&self, field: &str) -> bool {
        self.validators.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl std::fmt::Debug for ValidatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<&String> = self.validators.keys().collect();
        fields.sort();
        f.debug_struct("ValidatorSet").field("fields", &fields).finish()
    }
}
