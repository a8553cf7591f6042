//! Registrar Core - Record Browser Engine
//!
//! Configuration-driven record browsing: field and column descriptors,
//! table view derivation (filter, search, sort, paginate), field validators
//! and the modal form workflow. Everything talks to the backend through the
//! [`RecordGateway`] trait; this crate has no UI and no transport.

pub mod catalog;
pub mod collection;
pub mod debounce;
pub mod error;
pub mod form;
pub mod gateway;
pub mod record;
pub mod schema;
pub mod validation;
pub mod view;

pub use catalog::{
    default_fields, default_validators, DeletePolicy, EntityProfile, PageRegistry, SearchScope,
};
pub use collection::{Collection, RecordCollection};
pub use debounce::{Debounced, RequestTokens};
pub use error::{CatalogError, FormError, GatewayError};
pub use form::{Confirmation, FormController, FormField, FormOutcome, FormPhase, ValidationTicket};
pub use gateway::{Envelope, RecordGateway, SchemaResponse, STATUS_OK};
pub use record::{Record, RecordId};
pub use schema::{
    ColumnDescriptor, ColumnSet, FieldCatalog, FieldDescriptor, FormMode, SchemaField,
};
pub use validation::{FieldValidator, UniqueFieldRule, ValidatorSet, Verdict};
pub use view::{SortDirection, SortState, TableIntent, TableView, ViewStatus};
