//! Registrar Test Utilities
//!
//! Shared test infrastructure for the Registrar workspace:
//! - In-memory record gateway with a call log and failure injection
//! - Proptest generators for records
//! - Record fixtures for the three standard tables
//! - Assertions over gateway traffic

pub use registrar_core::{
    GatewayError, Record, RecordGateway, RecordId, SchemaField,
};

use async_trait::async_trait;
use registrar_core::record::ID_FIELD;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

// ============================================================================
// MEMORY GATEWAY
// ============================================================================

/// One gateway call as observed by [`MemoryGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    List { table: String },
    Schema { table: String },
    SelectOne { table: String, id: RecordId },
    Insert { table: String, data: Record },
    Update { table: String, id: RecordId, data: Record },
    Delete { table: String, id: RecordId },
}

impl GatewayCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            GatewayCall::Insert { .. } | GatewayCall::Update { .. } | GatewayCall::Delete { .. }
        )
    }
}

/// In-memory gateway for testing. Clones share the same tables and log.
#[derive(Debug, Default, Clone)]
pub struct MemoryGateway {
    tables: Arc<RwLock<HashMap<String, Vec<Record>>>>,
    schemas: Arc<RwLock<HashMap<String, Vec<SchemaField>>>>,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
    failure: Arc<Mutex<Option<GatewayError>>>,
}

impl MemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with records.
    pub fn with_table(self, table: &str, records: Vec<Record>) -> Self {
        self.tables
            .write()
            .unwrap()
            .insert(table.to_string(), records);
        self
    }

    /// Register an explicit schema. Without one, the schema is the union of
    /// the table's field names.
    pub fn with_schema(self, table: &str, fields: &[&str]) -> Self {
        self.schemas.write().unwrap().insert(
            table.to_string(),
            fields.iter().map(|name| SchemaField::new(*name)).collect(),
        );
        self
    }

    /// Make every following call fail with `err`.
    pub fn fail_with(&self, err: GatewayError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn heal(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Current contents of a table.
    pub fn records(&self, table: &str) -> Vec<Record> {
        self.tables
            .read()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn find(&self, table: &str, id: &RecordId) -> Option<Record> {
        self.records(table)
            .into_iter()
            .find(|record| record.id().as_ref() == Some(id))
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn mutations(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(GatewayCall::is_mutation)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record_call(&self, call: GatewayCall) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found() -> GatewayError {
        GatewayError::rejected(404, "Record not found")
    }
}

#[async_trait]
impl RecordGateway for MemoryGateway {
    async fn list(&self, table: &str) -> Result<Vec<Record>, GatewayError> {
        self.record_call(GatewayCall::List {
            table: table.to_string(),
        })?;
        Ok(self.records(table))
    }

    async fn schema(&self, table: &str) -> Result<Vec<SchemaField>, GatewayError> {
        self.record_call(GatewayCall::Schema {
            table: table.to_string(),
        })?;
        if let Some(fields) = self.schemas.read().unwrap().get(table) {
            return Ok(fields.clone());
        }
        let mut names: Vec<String> = Vec::new();
        for record in self.records(table) {
            for (name, _) in record.fields() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        Ok(names.into_iter().map(SchemaField::new).collect())
    }

    async fn select_one(&self, table: &str, id: &RecordId) -> Result<Record, GatewayError> {
        self.record_call(GatewayCall::SelectOne {
            table: table.to_string(),
            id: id.clone(),
        })?;
        self.find(table, id).ok_or_else(Self::not_found)
    }

    async fn insert(&self, table: &str, data: Record) -> Result<(), GatewayError> {
        self.record_call(GatewayCall::Insert {
            table: table.to_string(),
            data: data.clone(),
        })?;
        let mut tables = self.tables.write().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let next_id = rows
            .iter()
            .filter_map(|record| record.get("id").and_then(|value| value.as_i64()))
            .max()
            .unwrap_or(0)
            + 1;
        let mut record = Record::new()
            .with(ID_FIELD, Uuid::now_v7().to_string())
            .with("id", next_id)
            .with("insertdate", chrono::Utc::now().to_rfc3339());
        for (name, value) in data.into_map() {
            record.set(name, value);
        }
        rows.push(record);
        Ok(())
    }

    async fn update(&self, table: &str, id: &RecordId, data: Record) -> Result<(), GatewayError> {
        self.record_call(GatewayCall::Update {
            table: table.to_string(),
            id: id.clone(),
            data: data.clone(),
        })?;
        let mut tables = self.tables.write().unwrap();
        let record = tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|record| record.id().as_ref() == Some(id))
            })
            .ok_or_else(Self::not_found)?;
        for (name, value) in data.into_map() {
            record.set(name, value);
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: &RecordId) -> Result<(), GatewayError> {
        self.record_call(GatewayCall::Delete {
            table: table.to_string(),
            id: id.clone(),
        })?;
        let mut tables = self.tables.write().unwrap();
        let rows = tables.get_mut(table).ok_or_else(Self::not_found)?;
        let before = rows.len();
        rows.retain(|record| record.id().as_ref() != Some(id));
        if rows.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating records.

    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    /// Generate a record identifier.
    pub fn arb_record_id() -> impl Strategy<Value = RecordId> {
        any::<[u8; 16]>().prop_map(|bytes| RecordId::new(Uuid::from_bytes(bytes).to_string()))
    }

    /// Generate a code that passes the format rules.
    pub fn arb_valid_code() -> impl Strategy<Value = String> {
        "[A-Za-z0-9-]{3,12}"
    }

    /// Generate a twelve digit national ID.
    pub fn arb_national_id() -> impl Strategy<Value = String> {
        "[0-9]{12}"
    }

    /// Generate a scalar field value, null included.
    pub fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-1000i64..1000).prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
        ]
    }

    /// Generate a nomenclature record.
    pub fn arb_nomenclature_record() -> impl Strategy<Value = Record> {
        (
            arb_record_id(),
            1i64..10_000,
            prop::option::of(arb_valid_code()),
            "[A-Za-z ]{1,20}",
            any::<bool>(),
        )
            .prop_map(|(uuid, id, code, represent, deleted)| {
                Record::new()
                    .with(ID_FIELD, uuid.as_str())
                    .with("id", id)
                    .with("code", code.map(Value::from).unwrap_or(Value::Null))
                    .with("represent", represent)
                    .with("deleted", deleted)
            })
    }

    /// Generate a list of nomenclature records.
    pub fn arb_nomenclature(max: usize) -> impl Strategy<Value = Vec<Record>> {
        prop::collection::vec(arb_nomenclature_record(), 0..max)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for the standard tables.

    use super::*;

    pub const CREATED_AT: &str = "2024-01-15T09:30:00+00:00";

    /// `n` live nomenclature records with codes `N-001`, `N-002`, ...
    pub fn nomenclature(n: usize) -> Vec<Record> {
        (1..=n).map(nomenclature_item).collect()
    }

    pub fn nomenclature_item(i: usize) -> Record {
        Record::new()
            .with("id", i)
            .with(ID_FIELD, format!("nom-{i}"))
            .with("code", format!("N-{i:03}"))
            .with("represent", format!("Item {i}"))
            .with("deleted", false)
            .with("insertdate", CREATED_AT)
            .with("updatedate", CREATED_AT)
    }

    pub fn individuals(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                Record::new()
                    .with("id", i)
                    .with(ID_FIELD, format!("ind-{i}"))
                    .with("iin", format!("{:012}", 900_000_000_000u64 + i as u64))
                    .with("represent", format!("Person {i}"))
            })
            .collect()
    }

    pub fn staffers(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                Record::new()
                    .with(ID_FIELD, format!("stf-{i}"))
                    .with("individual_id", i)
                    .with("tab_number", format!("T{i:04}"))
                    .with("represent", format!("Staffer {i}"))
            })
            .collect()
    }

    /// Gateway holding `n` records in each standard table.
    pub fn seeded_gateway(n: usize) -> MemoryGateway {
        MemoryGateway::new()
            .with_table("nomenclature", nomenclature(n))
            .with_table("individuals", individuals(n))
            .with_table("staffers", staffers(n))
            .with_schema(
                "nomenclature",
                &["id", ID_FIELD, "code", "represent", "insertdate", "updatedate", "deleted"],
            )
            .with_schema("individuals", &["id", ID_FIELD, "iin", "represent"])
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over gateway traffic.

    use super::*;

    /// Assert that no gateway call was made since `before`.
    #[track_caller]
    pub fn assert_no_calls_since(gateway: &MemoryGateway, before: usize) {
        let calls = gateway.calls();
        assert_eq!(
            calls.len(),
            before,
            "Expected no gateway calls, got: {:?}",
            &calls[before.min(calls.len())..]
        );
    }

    /// Assert that no insert, update or delete was issued.
    #[track_caller]
    pub fn assert_no_mutations(gateway: &MemoryGateway) {
        let mutations = gateway.mutations();
        assert!(
            mutations.is_empty(),
            "Expected no mutations, got: {:?}",
            mutations
        );
    }

    /// Assert that the last mutation matches `expected`.
    #[track_caller]
    pub fn assert_last_mutation(gateway: &MemoryGateway, expected: &GatewayCall) {
        match gateway.mutations().last() {
            Some(call) => assert_eq!(call, expected),
            None => panic!("Expected mutation {:?}, got none", expected),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
