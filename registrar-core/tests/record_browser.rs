//! End-to-end flows of the table view and form controller against the
//! in-memory gateway.

use registrar_core::catalog::{self, default_fields, default_validators};
use registrar_core::{
    Collection, Confirmation, FormController, FormError, FormMode, FormOutcome, GatewayError,
    Record, RecordCollection, RecordGateway, RecordId, TableIntent, ValidationTicket, Verdict,
    ViewStatus,
};
use registrar_test_utils::assertions::{
    assert_last_mutation, assert_no_calls_since, assert_no_mutations,
};
use registrar_test_utils::{fixtures, GatewayCall, MemoryGateway};
use std::sync::Arc;

fn form() -> FormController {
    FormController::new(Arc::new(default_fields()), Arc::new(default_validators()))
}

async fn loaded(gateway: &MemoryGateway, profile: catalog::EntityProfile) -> RecordCollection {
    let mut collection = RecordCollection::new(profile, 10);
    collection.reload(gateway).await.unwrap();
    collection
}

/// Run every ticket to completion, in order.
async fn settle(form: &mut FormController, tickets: Vec<ValidationTicket>, gateway: &MemoryGateway) {
    for ticket in tickets {
        form.run_validation(ticket, gateway).await;
    }
}

#[tokio::test]
async fn test_fifteen_records_paginate_into_two_pages() {
    let gateway = fixtures::seeded_gateway(15);
    let mut collection = loaded(&gateway, catalog::nomenclature()).await;

    assert_eq!(collection.view.visible_rows().len(), 10);
    assert_eq!(collection.view.page_buttons(), [1, 2]);
    assert!(collection.view.set_page(2));
    let rows = collection.view.visible_rows();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].text("code"), "N-011");
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_rows() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::nomenclature()).await;
    gateway.fail_with(GatewayError::transport("connection refused"));

    assert!(collection.reload(&gateway).await.is_err());
    assert_eq!(collection.view.visible_rows().len(), 3);
    assert!(matches!(collection.view.status(), ViewStatus::Error(reason) if reason.contains("connection refused")));
}

#[tokio::test]
async fn test_short_code_disables_submit_and_valid_code_enables_it() {
    let gateway = fixtures::seeded_gateway(3);
    let collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();

    let tickets = form.open_create(&collection, &gateway).await.unwrap();
    settle(&mut form, tickets, &gateway).await;
    assert_eq!(form.mode(), Some(FormMode::Create));

    let ticket = form.input("code", "AB").unwrap();
    form.run_validation(ticket, &gateway).await;
    assert_eq!(
        form.field("code").and_then(|f| f.error()),
        Some("Minimum 3 characters")
    );
    assert!(!form.can_submit());

    let ticket = form.input("code", "AB-").unwrap();
    form.run_validation(ticket, &gateway).await;
    assert_eq!(form.field("code").and_then(|f| f.verdict.clone()), Some(Verdict::Valid));
    assert!(form.can_submit());
}

#[tokio::test]
async fn test_duplicate_code_is_rejected_ignoring_case() {
    let gateway = fixtures::seeded_gateway(3);
    let collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();
    form.open_create(&collection, &gateway).await.unwrap();

    let ticket = form.input("code", "n-002").unwrap();
    form.run_validation(ticket, &gateway).await;
    assert_eq!(
        form.field("code").and_then(|f| f.error()),
        Some("Code already exists")
    );
}

#[tokio::test]
async fn test_blocked_submit_issues_no_call() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();
    let tickets = form.open_create(&collection, &gateway).await.unwrap();
    settle(&mut form, tickets, &gateway).await;

    let before = gateway.call_count();
    let result = form.submit(&gateway, &mut collection).await;
    assert!(matches!(result, Err(FormError::Blocked { .. })));
    assert_no_calls_since(&gateway, before);
    assert!(form.is_open());
}

#[tokio::test]
async fn test_required_blank_reports_title_without_network() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();
    form.open_create(&collection, &gateway).await.unwrap();
    let ticket = form.input("code", "NEW-1").unwrap();
    form.run_validation(ticket, &gateway).await;

    let before = gateway.call_count();
    let result = form.submit(&gateway, &mut collection).await;
    assert_eq!(
        result,
        Err(FormError::MissingRequired {
            titles: vec!["Name".to_string()]
        })
    );
    assert_eq!(form.notice(), Some("Fill in: Name"));
    assert_no_calls_since(&gateway, before);
}

#[tokio::test]
async fn test_create_inserts_and_reloads() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();
    form.open_create(&collection, &gateway).await.unwrap();
    let ticket = form.input("code", "NEW-1").unwrap();
    form.run_validation(ticket, &gateway).await;
    form.input("represent", "  Washer ");

    let outcome = form.submit(&gateway, &mut collection).await.unwrap();
    assert_eq!(outcome, FormOutcome::Created);
    assert!(!form.is_open());
    assert_last_mutation(
        &gateway,
        &GatewayCall::Insert {
            table: "nomenclature".to_string(),
            data: Record::new().with("code", "NEW-1").with("represent", "Washer"),
        },
    );
    assert_eq!(collection.view.filtered_len(), 4);
}

#[tokio::test]
async fn test_unchanged_update_issues_no_call() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();
    let id = RecordId::new("nom-2");

    let tickets = form.open_edit(&collection, &id, &gateway).await.unwrap();
    let before = gateway.call_count();
    settle(&mut form, tickets, &gateway).await;
    assert_no_calls_since(&gateway, before);

    let result = form.submit(&gateway, &mut collection).await;
    assert_eq!(result, Err(FormError::NoChanges));
    assert_no_calls_since(&gateway, before);
    assert!(form.is_open());
}

#[tokio::test]
async fn test_update_sends_changed_fields_with_timestamp() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();
    let id = RecordId::new("nom-2");
    let tickets = form.open_edit(&collection, &id, &gateway).await.unwrap();
    settle(&mut form, tickets, &gateway).await;

    assert!(!form.field("uuid").unwrap().enabled);
    assert!(!form.field("updatedate").unwrap().enabled);
    assert_eq!(form.field("insertdate").unwrap().value, "2024-01-15 09:30:00");

    form.input("represent", "Renamed");
    assert_eq!(
        form.submit(&gateway, &mut collection).await,
        Ok(FormOutcome::Updated)
    );

    let Some(GatewayCall::Update { data, .. }) = gateway.mutations().pop() else {
        panic!("expected an update");
    };
    let fields: Vec<&String> = data.fields().map(|(name, _)| name).collect();
    assert_eq!(fields, ["represent", "updatedate"]);
    assert_eq!(gateway.find("nomenclature", &id).unwrap().text("represent"), "Renamed");
}

#[tokio::test]
async fn test_unchanged_unique_field_skips_lookup() {
    let gateway = fixtures::seeded_gateway(3);
    let collection = loaded(&gateway, catalog::individuals()).await;
    let mut form = form();
    let id = RecordId::new("ind-1");
    form.open_edit(&collection, &id, &gateway).await.unwrap();
    let original = form.field("iin").unwrap().original.clone();

    let before = gateway.call_count();
    for _ in 0..2 {
        let ticket = form.input("iin", &original).unwrap();
        form.run_validation(ticket, &gateway).await;
    }
    assert_no_calls_since(&gateway, before);
    assert!(form.can_submit());
}

#[tokio::test]
async fn test_national_id_excludes_edited_record() {
    let gateway = fixtures::seeded_gateway(3);
    let collection = loaded(&gateway, catalog::individuals()).await;
    let mut form = form();
    form.open_edit(&collection, &RecordId::new("ind-1"), &gateway)
        .await
        .unwrap();
    let taken = fixtures::individuals(3)[1].text("iin");

    let ticket = form.input("iin", &taken).unwrap();
    form.run_validation(ticket, &gateway).await;
    assert_eq!(
        form.field("iin").and_then(|f| f.error()),
        Some("National ID already exists")
    );
}

#[tokio::test]
async fn test_soft_delete_then_restore() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();
    let id = RecordId::new("nom-1");

    form.open_edit(&collection, &id, &gateway).await.unwrap();
    assert_eq!(form.delete_label(), "Delete");
    assert_eq!(form.request_delete(), Ok(Confirmation::Delete));
    let outcome = form.confirm(&gateway, &mut collection).await.unwrap();
    assert_eq!(outcome, FormOutcome::Deleted);
    assert_last_mutation(
        &gateway,
        &GatewayCall::Update {
            table: "nomenclature".to_string(),
            id: id.clone(),
            data: Record::new().with("deleted", true),
        },
    );
    assert_eq!(collection.view.filtered_len(), 2);

    collection.view.set_show_deleted(true);
    let rows = collection.view.visible_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id(), Some(id.clone()));
    assert_eq!(collection.view.activate(), Some(TableIntent::Edit(id.clone())));

    form.open_edit(&collection, &id, &gateway).await.unwrap();
    assert_eq!(form.delete_label(), "Restore");
    assert!(!form.submit_available());
    assert_eq!(form.request_delete(), Ok(Confirmation::Restore));
    assert_eq!(
        form.confirm(&gateway, &mut collection).await,
        Ok(FormOutcome::Restored)
    );
    assert!(!gateway.find("nomenclature", &id).unwrap().is_deleted());
}

#[tokio::test]
async fn test_hard_delete_removes_record() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::individuals()).await;
    let mut form = form();
    let id = RecordId::new("ind-2");
    form.open_edit(&collection, &id, &gateway).await.unwrap();

    form.request_delete().unwrap();
    form.confirm(&gateway, &mut collection).await.unwrap();
    assert_last_mutation(
        &gateway,
        &GatewayCall::Delete {
            table: "individuals".to_string(),
            id: id.clone(),
        },
    );
    assert!(gateway.find("individuals", &id).is_none());
    assert_eq!(collection.view.filtered_len(), 2);
}

#[tokio::test]
async fn test_cancelled_confirmation_issues_nothing() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::individuals()).await;
    let mut form = form();
    form.open_edit(&collection, &RecordId::new("ind-2"), &gateway)
        .await
        .unwrap();

    form.request_delete().unwrap();
    form.cancel_confirmation();
    assert_eq!(
        form.confirm(&gateway, &mut collection).await,
        Err(FormError::NoConfirmation)
    );
    assert_no_mutations(&gateway);
}

#[tokio::test]
async fn test_gateway_failure_keeps_form_open_with_message() {
    let gateway = fixtures::seeded_gateway(3);
    let mut collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();
    let tickets = form
        .open_edit(&collection, &RecordId::new("nom-3"), &gateway)
        .await
        .unwrap();
    settle(&mut form, tickets, &gateway).await;
    form.input("represent", "Changed");

    gateway.fail_with(GatewayError::rejected(500, "duplicate key value"));
    let result = form.submit(&gateway, &mut collection).await;
    assert!(matches!(result, Err(FormError::Gateway(_))));
    assert!(form.is_open());
    assert_eq!(form.notice(), Some("duplicate key value"));
}

#[tokio::test]
async fn test_missing_record_fails_edit_form() {
    let gateway = fixtures::seeded_gateway(1);
    let collection = loaded(&gateway, catalog::staffers()).await;
    let mut form = form();
    let result = form
        .open_edit(&collection, &RecordId::new("missing"), &gateway)
        .await;
    assert!(result.is_err());
    assert!(form.is_open());
    assert_eq!(form.notice(), Some("Record not found"));
    assert!(!form.can_submit());
}

#[tokio::test]
async fn test_stale_uniqueness_verdict_is_dropped() {
    let gateway = fixtures::seeded_gateway(3);
    let collection = loaded(&gateway, catalog::nomenclature()).await;
    let mut form = form();
    form.open_create(&collection, &gateway).await.unwrap();
    let validators = form.validators();

    let stale = form.input("code", "N-001").unwrap();
    let fresh = form.input("code", "N-999").unwrap();
    let fresh_verdict = fresh.run(&validators, &gateway).await;
    let stale_verdict = stale.run(&validators, &gateway).await;

    assert!(form.apply_verdict(&fresh, fresh_verdict));
    assert!(!form.apply_verdict(&stale, stale_verdict));
    assert!(form.field("code").unwrap().error().is_none());
}

#[tokio::test]
async fn test_gateway_trait_object_is_usable() {
    let gateway: Arc<dyn RecordGateway> = Arc::new(fixtures::seeded_gateway(2));
    let records = gateway.list("staffers").await.unwrap();
    assert_eq!(records.len(), 2);
}
