//! Modal form controller.
//!
//! The controller is `Closed` until a create or edit intent opens it against
//! a [`Collection`]. Validated fields carry a pending token while their
//! validator runs; verdicts for superseded tokens are discarded. Submission
//! is refused outright while any validated field is invalid or pending.

use crate::catalog::DeletePolicy;
use crate::collection::Collection;
use crate::debounce::RequestTokens;
use crate::error::{FormError, GatewayError};
use crate::gateway::RecordGateway;
use crate::record::{value_text, Record, RecordId, DELETED_FIELD};
use crate::schema::{
    is_timestamp_field, FieldCatalog, FieldDescriptor, FormMode, InputKind,
    UPDATE_TIMESTAMP_FIELD,
};
use crate::validation::{ValidatorSet, Verdict};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DISPLAY_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Loading,
    Ready,
    /// Schema or record fetch failed; the reason is shown in the field area.
    Failed(String),
}

/// Destructive action awaiting an explicit yes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Delete,
    Restore,
}

impl Confirmation {
    pub fn prompt(&self) -> &'static str {
        match self {
            Confirmation::Delete => "Delete this record?",
            Confirmation::Restore => "Restore this record?",
        }
    }
}

/// Successful end of a form session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Created,
    Updated,
    Deleted,
    Restored,
}

impl FormOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            FormOutcome::Created => "Record created",
            FormOutcome::Updated => "Updated",
            FormOutcome::Deleted => "Deleted",
            FormOutcome::Restored => "Restored",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub descriptor: FieldDescriptor,
    pub value: String,
    /// Value the form was opened with.
    pub original: String,
    pub enabled: bool,
    /// `None` for fields without a validator.
    pub verdict: Option<Verdict>,
    pub pending: Option<u64>,
}

impl FormField {
    pub fn title(&self) -> &str {
        self.descriptor.title_or(&self.name)
    }

    pub fn placeholder(&self) -> String {
        self.descriptor.placeholder_or(&self.name)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.verdict, Some(Verdict::Invalid(_)))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.verdict {
            Some(Verdict::Invalid(reason)) => Some(reason),
            _ => None,
        }
    }
}

/// One validator run requested by the form. The verdict is applied only
/// while `token` is still the field's pending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationTicket {
    pub field: String,
    pub token: u64,
    pub candidate: String,
    pub original: String,
    pub exclude: Option<RecordId>,
}

impl ValidationTicket {
    pub async fn run(&self, validators: &ValidatorSet, gateway: &dyn RecordGateway) -> Verdict {
        match validators.get(&self.field) {
            Some(validator) => {
                validator
                    .validate(
                        gateway,
                        &self.candidate,
                        &self.original,
                        self.exclude.as_ref(),
                    )
                    .await
            }
            None => Verdict::Valid,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormController {
    catalog: Arc<FieldCatalog>,
    validators: Arc<ValidatorSet>,
    mode: Option<FormMode>,
    table: String,
    delete_policy: DeletePolicy,
    record_id: Option<RecordId>,
    original: Record,
    deleted: bool,
    fields: Vec<FormField>,
    phase: FormPhase,
    notice: Option<String>,
    confirmation: Option<Confirmation>,
    focus: usize,
    tokens: RequestTokens,
}

impl FormController {
    pub fn new(catalog: Arc<FieldCatalog>, validators: Arc<ValidatorSet>) -> Self {
        Self {
            catalog,
            validators,
            mode: None,
            table: String::new(),
            delete_policy: DeletePolicy::Hard,
            record_id: None,
            original: Record::new(),
            deleted: false,
            fields: Vec::new(),
            phase: FormPhase::Loading,
            notice: None,
            confirmation: None,
            focus: 0,
            tokens: RequestTokens::new(),
        }
    }

    pub fn validators(&self) -> Arc<ValidatorSet> {
        Arc::clone(&self.validators)
    }

    pub fn mode(&self) -> Option<FormMode> {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        self.record_id.as_ref()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn confirmation(&self) -> Option<Confirmation> {
        self.confirmation
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            Some(FormMode::Create) => "New record",
            Some(FormMode::Edit) => "Edit record",
            None => "",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            Some(FormMode::Create) => "Create",
            _ => "Save",
        }
    }

    /// Only soft-delete tables offer restore.
    pub fn delete_label(&self) -> &'static str {
        if self.restores() {
            "Restore"
        } else {
            "Delete"
        }
    }

    pub fn delete_available(&self) -> bool {
        self.mode == Some(FormMode::Edit) && self.record_id.is_some()
    }

    /// Soft-deleted records are read-only until restored.
    pub fn submit_available(&self) -> bool {
        self.is_open() && !self.restores()
    }

    fn restores(&self) -> bool {
        self.deleted && self.delete_policy == DeletePolicy::Soft
    }

    /// Open an empty form for `collection` from the table schema.
    pub async fn open_create(
        &mut self,
        collection: &dyn Collection,
        gateway: &dyn RecordGateway,
    ) -> Result<Vec<ValidationTicket>, FormError> {
        self.reset(FormMode::Create, collection);
        let schema = match gateway.schema(&self.table).await {
            Ok(schema) => schema,
            Err(err) => return Err(self.load_failed(err)),
        };

        self.fields = schema
            .into_iter()
            .filter_map(|field| {
                let descriptor = self.catalog.descriptor(&field.name).clone();
                descriptor.visible.create.then(|| FormField {
                    enabled: descriptor.editable,
                    name: field.name,
                    descriptor,
                    value: String::new(),
                    original: String::new(),
                    verdict: None,
                    pending: None,
                })
            })
            .collect();
        self.ready();
        info!(table = %self.table, fields = self.fields.len(), "Create form opened");
        Ok(self.initial_tickets())
    }

    /// Open `id` for editing, one input per present field.
    pub async fn open_edit(
        &mut self,
        collection: &dyn Collection,
        id: &RecordId,
        gateway: &dyn RecordGateway,
    ) -> Result<Vec<ValidationTicket>, FormError> {
        self.reset(FormMode::Edit, collection);
        self.record_id = Some(id.clone());
        let record = match gateway.select_one(&self.table, id).await {
            Ok(record) => record,
            Err(err) => return Err(self.load_failed(err)),
        };

        self.deleted = record.is_deleted();
        self.fields = record
            .fields()
            .filter_map(|(name, value)| {
                let descriptor = self.catalog.descriptor(name).clone();
                if !descriptor.visible.edit {
                    return None;
                }
                let timestamp =
                    descriptor.input == InputKind::Timestamp || is_timestamp_field(name);
                let text = if timestamp {
                    display_timestamp(&value_text(value))
                } else {
                    value_text(value)
                };
                Some(FormField {
                    enabled: descriptor.editable && !timestamp,
                    name: name.clone(),
                    descriptor,
                    original: text.clone(),
                    value: text,
                    verdict: None,
                    pending: None,
                })
            })
            .collect();
        self.original = record;
        self.ready();
        info!(table = %self.table, id = %id, deleted = self.deleted, "Edit form opened");
        Ok(self.initial_tickets())
    }

    pub fn close(&mut self) {
        if self.is_open() {
            debug!(table = %self.table, "Form closed");
        }
        self.mode = None;
        self.record_id = None;
        self.original = Record::new();
        self.deleted = false;
        self.fields.clear();
        self.phase = FormPhase::Loading;
        self.notice = None;
        self.confirmation = None;
        self.focus = 0;
    }

    /// Replace a field value. Returns a ticket when the field is validated.
    pub fn input(&mut self, name: &str, value: &str) -> Option<ValidationTicket> {
        if !self.is_open() {
            return None;
        }
        let covered = self.validators.covers(name);
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.name == name && field.enabled)?;
        field.value = value.to_string();
        if !covered {
            return None;
        }
        let token = self.tokens.issue();
        field.pending = Some(token);
        Some(ValidationTicket {
            field: field.name.clone(),
            token,
            candidate: field.value.clone(),
            original: field.original.clone(),
            exclude: self.record_id.clone(),
        })
    }

    pub fn type_char(&mut self, c: char) -> Option<ValidationTicket> {
        let (name, mut value) = self.focused_value()?;
        value.push(c);
        self.input(&name, &value)
    }

    pub fn backspace(&mut self) -> Option<ValidationTicket> {
        let (name, mut value) = self.focused_value()?;
        value.pop()?;
        self.input(&name, &value)
    }

    fn focused_value(&self) -> Option<(String, String)> {
        self.fields
            .get(self.focus)
            .filter(|field| field.enabled)
            .map(|field| (field.name.clone(), field.value.clone()))
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_previous(&mut self) {
        self.move_focus(self.fields.len().saturating_sub(1));
    }

    fn move_focus(&mut self, offset: usize) {
        let len = self.fields.len();
        for step in 1..=len {
            let index = (self.focus + offset * step) % len;
            if self.fields[index].enabled {
                self.focus = index;
                return;
            }
        }
    }

    /// Apply a verdict. Returns `false` when the ticket was superseded.
    pub fn apply_verdict(&mut self, ticket: &ValidationTicket, verdict: Verdict) -> bool {
        let Some(field) = self
            .fields
            .iter_mut()
            .find(|field| field.name == ticket.field)
        else {
            return false;
        };
        if field.pending != Some(ticket.token) {
            debug!(field = %ticket.field, token = ticket.token, "Dropping stale verdict");
            return false;
        }
        field.pending = None;
        field.verdict = Some(verdict);
        true
    }

    /// Run a ticket in place and apply its verdict.
    pub async fn run_validation(
        &mut self,
        ticket: ValidationTicket,
        gateway: &dyn RecordGateway,
    ) -> bool {
        let validators = Arc::clone(&self.validators);
        let verdict = ticket.run(&validators, gateway).await;
        self.apply_verdict(&ticket, verdict)
    }

    /// Whether the submit action may proceed right now.
    pub fn submit_state(&self) -> Result<(), FormError> {
        if !self.is_open() {
            return Err(FormError::Closed);
        }
        if self.phase != FormPhase::Ready {
            return Err(blocked("Form is not ready"));
        }
        if self.restores() {
            return Err(blocked("Restore the record before editing"));
        }
        if self.fields.iter().any(|field| field.pending.is_some()) {
            return Err(blocked("Validation in progress"));
        }
        if let Some(reason) = self.fields.iter().find_map(FormField::error) {
            return Err(blocked(reason));
        }
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.submit_state().is_ok()
    }

    /// Insert or update from the current field values.
    pub async fn submit(
        &mut self,
        gateway: &dyn RecordGateway,
        collection: &mut dyn Collection,
    ) -> Result<FormOutcome, FormError> {
        if let Err(err) = self.submit_state() {
            return Err(self.refuse(err));
        }
        let payload = match self.collect_payload() {
            Ok(payload) => payload,
            Err(err) => return Err(self.refuse(err)),
        };

        let (result, outcome) = match (self.mode, self.record_id.clone()) {
            (Some(FormMode::Edit), Some(id)) => {
                let mut changes = self.changed_fields(payload);
                if changes.is_empty() {
                    return Err(self.refuse(FormError::NoChanges));
                }
                changes.set(UPDATE_TIMESTAMP_FIELD, Utc::now().to_rfc3339());
                let result = gateway.update(&self.table, &id, changes).await;
                (result, FormOutcome::Updated)
            }
            _ => {
                let result = gateway.insert(&self.table, payload).await;
                (result, FormOutcome::Created)
            }
        };
        self.finish(result, outcome, gateway, collection).await
    }

    /// First step of delete or restore.
    pub fn request_delete(&mut self) -> Result<Confirmation, FormError> {
        if !self.is_open() {
            return Err(FormError::Closed);
        }
        if !self.delete_available() {
            return Err(self.refuse(blocked("Only saved records can be deleted")));
        }
        let confirmation = if self.restores() {
            Confirmation::Restore
        } else {
            Confirmation::Delete
        };
        self.confirmation = Some(confirmation);
        Ok(confirmation)
    }

    pub fn cancel_confirmation(&mut self) {
        self.confirmation = None;
    }

    /// Second step of delete or restore.
    pub async fn confirm(
        &mut self,
        gateway: &dyn RecordGateway,
        collection: &mut dyn Collection,
    ) -> Result<FormOutcome, FormError> {
        let confirmation = self.confirmation.take().ok_or(FormError::NoConfirmation)?;
        let id = self.record_id.clone().ok_or(FormError::Closed)?;

        let (result, outcome) = match (confirmation, self.delete_policy) {
            (Confirmation::Restore, _) => {
                let data = Record::new().with(DELETED_FIELD, false);
                (
                    gateway.update(&self.table, &id, data).await,
                    FormOutcome::Restored,
                )
            }
            (Confirmation::Delete, DeletePolicy::Soft) => {
                let data = Record::new().with(DELETED_FIELD, true);
                (
                    gateway.update(&self.table, &id, data).await,
                    FormOutcome::Deleted,
                )
            }
            (Confirmation::Delete, DeletePolicy::Hard) => (
                gateway.delete(&self.table, &id).await,
                FormOutcome::Deleted,
            ),
        };
        self.finish(result, outcome, gateway, collection).await
    }

    fn reset(&mut self, mode: FormMode, collection: &dyn Collection) {
        self.close();
        self.mode = Some(mode);
        self.table = collection.name().to_string();
        self.delete_policy = collection.delete_policy();
    }

    fn ready(&mut self) {
        self.phase = FormPhase::Ready;
        self.focus = self
            .fields
            .iter()
            .position(|field| field.enabled)
            .unwrap_or(0);
    }

    fn load_failed(&mut self, err: GatewayError) -> FormError {
        let reason = err.user_message();
        warn!(table = %self.table, error = %err, "Form data could not be loaded");
        self.phase = FormPhase::Failed(reason.clone());
        self.notice = Some(reason);
        FormError::Gateway(err)
    }

    fn refuse(&mut self, err: FormError) -> FormError {
        debug!(table = %self.table, reason = %err, "Form action refused");
        self.notice = Some(err.to_string());
        err
    }

    /// One ticket per validated field, run against its starting value.
    fn initial_tickets(&mut self) -> Vec<ValidationTicket> {
        let names: Vec<(String, String)> = self
            .fields
            .iter()
            .filter(|field| field.enabled && self.validators.covers(&field.name))
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect();
        names
            .into_iter()
            .filter_map(|(name, value)| self.input(&name, &value))
            .collect()
    }

    /// Trimmed values of enabled fields, blanks omitted.
    fn collect_payload(&self) -> Result<Record, FormError> {
        let mut payload = Record::new();
        let mut missing = Vec::new();
        for field in self.fields.iter().filter(|field| field.enabled) {
            let value = field.value.trim();
            if value.is_empty() {
                if field.descriptor.required {
                    missing.push(field.title().to_string());
                }
                continue;
            }
            payload.set(field.name.clone(), value);
        }
        if !missing.is_empty() {
            return Err(FormError::MissingRequired { titles: missing });
        }
        if payload.is_empty() {
            return Err(FormError::EmptyPayload);
        }
        Ok(payload)
    }

    fn changed_fields(&self, payload: Record) -> Record {
        payload
            .into_map()
            .into_iter()
            .filter(|(name, value)| {
                name != UPDATE_TIMESTAMP_FIELD && self.original.text(name) != value_text(value)
            })
            .collect()
    }

    async fn finish(
        &mut self,
        result: Result<(), GatewayError>,
        outcome: FormOutcome,
        gateway: &dyn RecordGateway,
        collection: &mut dyn Collection,
    ) -> Result<FormOutcome, FormError> {
        if let Err(err) = result {
            warn!(table = %self.table, error = %err, ?outcome, "Form action failed");
            self.notice = Some(err.user_message());
            return Err(FormError::Gateway(err));
        }
        info!(table = %self.table, ?outcome, "Form action succeeded");
        self.close();
        if let Err(err) = collection.reload(gateway).await {
            warn!(table = %collection.name(), error = %err, "Reload after change failed");
        }
        Ok(outcome)
    }
}

fn blocked(reason: &str) -> FormError {
    FormError::Blocked {
        reason: reason.to_string(),
    }
}

/// Timestamp text formatted for display; unparseable input is kept as is.
pub fn display_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc).format(DISPLAY_TIMESTAMP).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(DISPLAY_TIMESTAMP).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return parsed.format(DISPLAY_TIMESTAMP).to_string();
    }
    raw.to_string()
}
