//! Table view state and the row derivation pipeline.
//!
//! Rows shown on screen are never stored. They are derived on demand from
//! the loaded records and the view state in a fixed order: deleted flag,
//! search query, sort, page.

use crate::catalog::SearchScope;
use crate::record::{compare_values, value_text, Record, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Loading,
    Ready,
    /// Loaded, but nothing survives filtering.
    Empty,
    /// Last refresh failed; previously loaded records are kept.
    Error(String),
}

/// Intent raised by the table for the form controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIntent {
    Create,
    Edit(RecordId),
}

#[derive(Debug, Clone)]
pub struct TableView {
    records: Vec<Record>,
    search: SearchScope,
    show_deleted: bool,
    query: String,
    sort: Option<SortState>,
    page: usize,
    page_size: usize,
    reset_page_on_sort: bool,
    selected: Option<RecordId>,
    status: ViewStatus,
}

impl TableView {
    pub fn new(search: SearchScope, page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            search,
            show_deleted: false,
            query: String::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
            reset_page_on_sort: false,
            selected: None,
            status: ViewStatus::Loading,
        }
    }

    pub fn with_reset_page_on_sort(mut self, reset: bool) -> Self {
        self.reset_page_on_sort = reset;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn show_deleted(&self) -> bool {
        self.show_deleted
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn selected(&self) -> Option<&RecordId> {
        self.selected.as_ref()
    }

    /// Replace the record set and return to the first page.
    pub fn load(&mut self, records: Vec<Record>) {
        self.records = records;
        self.page = 1;
        self.status = ViewStatus::Ready;
        self.refresh();
    }

    pub fn begin_loading(&mut self) {
        self.status = ViewStatus::Loading;
    }

    /// Show a failed refresh without touching the loaded records.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = ViewStatus::Error(reason.into());
    }

    pub fn set_show_deleted(&mut self, flag: bool) {
        self.show_deleted = flag;
        self.page = 1;
        self.refresh();
    }

    pub fn set_search_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.page = 1;
        self.refresh();
    }

    /// Same field twice toggles direction; a new field starts ascending.
    pub fn sort_by(&mut self, field: &str) {
        let direction = match &self.sort {
            Some(current) if current.field == field => current.direction.toggled(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortState {
            field: field.to_string(),
            direction,
        });
        if self.reset_page_on_sort {
            self.page = 1;
        }
        self.refresh();
    }

    /// Only pages that have a button are accepted.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.page_count().max(1) {
            return false;
        }
        self.page = page;
        self.refresh();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.page > 1 && self.set_page(self.page - 1)
    }

    /// Records after the deleted-flag filter, search and sort.
    pub fn filtered(&self) -> Vec<&Record> {
        let needle = self.query.trim().to_lowercase();
        let rows: Vec<&Record> = self
            .records
            .iter()
            .filter(|record| record.is_deleted() == self.show_deleted)
            .filter(|record| matches_query(record, &self.search, &needle))
            .collect();
        match &self.sort {
            Some(sort) => sort_rows(rows, sort),
            None => rows,
        }
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered().len()
    }

    /// Rows of the current page.
    pub fn visible_rows(&self) -> Vec<&Record> {
        let start = (self.page - 1) * self.page_size;
        self.filtered()
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.filtered_len().div_ceil(self.page_size)
    }

    /// Page buttons to offer; none when everything fits on one page.
    pub fn page_buttons(&self) -> Vec<usize> {
        let count = self.page_count();
        if count <= 1 {
            Vec::new()
        } else {
            (1..=count).collect()
        }
    }

    pub fn select_next(&mut self) {
        let ids = self.visible_ids();
        self.selected = step(&ids, self.selected.as_ref(), 1);
    }

    pub fn select_previous(&mut self) {
        let ids = self.visible_ids();
        self.selected = step(&ids, self.selected.as_ref(), ids.len().saturating_sub(1));
    }

    pub fn selected_record(&self) -> Option<&Record> {
        let selected = self.selected.as_ref()?;
        self.records
            .iter()
            .find(|record| record.id().as_ref() == Some(selected))
    }

    /// Edit intent for the selected row.
    pub fn activate(&self) -> Option<TableIntent> {
        self.selected.clone().map(TableIntent::Edit)
    }

    pub fn request_create(&self) -> TableIntent {
        TableIntent::Create
    }

    fn visible_ids(&self) -> Vec<RecordId> {
        self.visible_rows()
            .into_iter()
            .filter_map(Record::id)
            .collect()
    }

    /// Keep the status and selection consistent with the derived rows.
    fn refresh(&mut self) {
        if matches!(self.status, ViewStatus::Ready | ViewStatus::Empty) {
            self.status = if self.filtered_len() == 0 {
                ViewStatus::Empty
            } else {
                ViewStatus::Ready
            };
        }
        let ids = self.visible_ids();
        let still_visible = self
            .selected
            .as_ref()
            .is_some_and(|selected| ids.contains(selected));
        if !still_visible {
            self.selected = ids.first().cloned();
        }
    }
}

/// Case-insensitive substring match. `needle` must already be lowercase.
pub fn matches_query(record: &Record, scope: &SearchScope, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |value: &Value| value_text(value).to_lowercase().contains(needle);
    match scope {
        SearchScope::Fields(fields) => fields
            .iter()
            .filter_map(|field| record.get(field))
            .any(contains),
        SearchScope::AllFields => record.fields().any(|(_, value)| contains(value)),
    }
}

/// Null and missing values go last in both directions. Descending order is
/// the exact reverse of ascending order over the non-null rows.
pub fn sort_rows<'a>(rows: Vec<&'a Record>, sort: &SortState) -> Vec<&'a Record> {
    let (mut present, nulls): (Vec<&Record>, Vec<&Record>) = rows
        .into_iter()
        .partition(|record| !matches!(record.get(&sort.field), None | Some(Value::Null)));
    present.sort_by(|a, b| match (a.get(&sort.field), b.get(&sort.field)) {
        (Some(x), Some(y)) => compare_values(x, y),
        _ => std::cmp::Ordering::Equal,
    });
    if sort.direction == SortDirection::Descending {
        present.reverse();
    }
    present.extend(nulls);
    present
}

fn step(ids: &[RecordId], current: Option<&RecordId>, offset: usize) -> Option<RecordId> {
    if ids.is_empty() {
        return None;
    }
    let next = match current.and_then(|id| ids.iter().position(|candidate| candidate == id)) {
        Some(index) => (index + offset) % ids.len(),
        None => 0,
    };
    ids.get(next).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(n: usize) -> Record {
        Record::new()
            .with("uuid", format!("u-{n}"))
            .with("id", n)
            .with("code", format!("C-{n:03}"))
            .with("represent", format!("Item {n}"))
    }

    fn view_with(records: Vec<Record>) -> TableView {
        let mut view = TableView::new(SearchScope::fields(&["code", "represent"]), 10);
        view.load(records);
        view
    }

    #[test]
    fn test_fifteen_records_make_two_pages() {
        let mut view = view_with((1..=15).map(item).collect());
        assert_eq!(view.visible_rows().len(), 10);
        assert_eq!(view.page_buttons(), [1, 2]);
        assert!(view.set_page(2));
        assert_eq!(view.visible_rows().len(), 5);
        assert!(!view.set_page(3));
        assert_eq!(view.page(), 2);
    }

    #[test]
    fn test_single_page_has_no_buttons() {
        let view = view_with((1..=10).map(item).collect());
        assert!(view.page_buttons().is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_and_resets_page() {
        let mut view = view_with((1..=15).map(item).collect());
        view.set_page(2);
        view.set_search_query("item 1");
        assert_eq!(view.page(), 1);
        // Item 1 and Item 10..=15
        assert_eq!(view.filtered_len(), 7);
    }

    #[test]
    fn test_search_ignores_fields_outside_scope() {
        let mut view = view_with(vec![item(1).with("note", "needle")]);
        view.set_search_query("needle");
        assert_eq!(view.filtered_len(), 0);
        assert_eq!(view.status(), &ViewStatus::Empty);
    }

    #[test]
    fn test_all_fields_scope_matches_any_value() {
        let mut view = TableView::new(SearchScope::AllFields, 10);
        view.load(vec![item(1).with("note", "Needle"), item(2)]);
        view.set_search_query("NEEDLE");
        assert_eq!(view.filtered_len(), 1);
    }

    #[test]
    fn test_sort_does_not_reset_page_by_default() {
        let mut view = view_with((1..=15).map(item).collect());
        view.set_page(2);
        view.sort_by("code");
        assert_eq!(view.page(), 2);

        let mut resetting = view_with((1..=15).map(item).collect()).with_reset_page_on_sort(true);
        resetting.set_page(2);
        resetting.sort_by("code");
        assert_eq!(resetting.page(), 1);
    }

    #[test]
    fn test_sort_toggles_then_restarts_on_new_field() {
        let mut view = view_with((1..=3).map(item).collect());
        view.sort_by("code");
        view.sort_by("code");
        assert_eq!(
            view.sort().map(|s| s.direction),
            Some(SortDirection::Descending)
        );
        view.sort_by("represent");
        assert_eq!(
            view.sort().map(|s| s.direction),
            Some(SortDirection::Ascending)
        );
    }

    #[test]
    fn test_nulls_sort_last_in_both_directions() {
        let mut view = view_with(vec![
            item(2),
            item(1).with("code", Value::Null),
            item(3),
        ]);
        view.sort_by("code");
        let codes: Vec<String> = view.visible_rows().iter().map(|r| r.text("code")).collect();
        assert_eq!(codes, ["C-002", "C-003", ""]);
        view.sort_by("code");
        let codes: Vec<String> = view.visible_rows().iter().map(|r| r.text("code")).collect();
        assert_eq!(codes, ["C-003", "C-002", ""]);
    }

    #[test]
    fn test_failed_refresh_keeps_rows() {
        let mut view = view_with((1..=3).map(item).collect());
        view.begin_loading();
        view.fail("Backend unreachable");
        assert_eq!(view.visible_rows().len(), 3);
        assert_eq!(
            view.status(),
            &ViewStatus::Error("Backend unreachable".to_string())
        );
    }

    #[test]
    fn test_selection_wraps_and_activates() {
        let mut view = view_with((1..=3).map(item).collect());
        assert_eq!(view.selected(), Some(&RecordId::new("u-1")));
        view.select_previous();
        assert_eq!(view.selected(), Some(&RecordId::new("u-3")));
        view.select_next();
        assert_eq!(
            view.activate(),
            Some(TableIntent::Edit(RecordId::new("u-1")))
        );
        assert_eq!(view.request_create(), TableIntent::Create);
    }

    #[test]
    fn test_mixed_number_and_text_column_sorts() {
        let records: Vec<Record> = (0..40)
            .map(|i| {
                let rank = if i % 3 == 0 {
                    Value::from(format!("{}", i * 7 % 23))
                } else {
                    Value::from(i * 11 % 29)
                };
                item(i).with("rank", rank)
            })
            .collect();
        let mut view = TableView::new(SearchScope::AllFields, 100);
        view.load(records);
        view.sort_by("rank");
        let rows = view.filtered();
        assert_eq!(rows.len(), 40);
        let first_text = rows
            .iter()
            .position(|r| matches!(r.get("rank"), Some(Value::String(_))))
            .unwrap();
        assert!(rows[..first_text]
            .iter()
            .all(|r| matches!(r.get("rank"), Some(Value::Number(_)))));
        assert!(rows[first_text..]
            .iter()
            .all(|r| matches!(r.get("rank"), Some(Value::String(_)))));
    }

    fn arb_row() -> impl Strategy<Value = (Option<i64>, bool, String)> {
        (
            prop::option::of(-50i64..50),
            any::<bool>(),
            "[a-c]{0,3}",
        )
    }

    fn rows_from(specs: Vec<(Option<i64>, bool, String)>) -> Vec<Record> {
        specs
            .into_iter()
            .enumerate()
            .map(|(n, (rank, deleted, name))| {
                let rank = rank.map(Value::from).unwrap_or(Value::Null);
                Record::new()
                    .with("uuid", format!("u-{n}"))
                    .with("rank", rank)
                    .with("deleted", deleted)
                    .with("represent", name)
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_deleted_toggle_and_query_select_rows(
            specs in prop::collection::vec(arb_row(), 0..40),
            flag in any::<bool>(),
            query in "[a-cA-C]{0,2}",
        ) {
            let records = rows_from(specs);
            let scope = SearchScope::fields(&["represent"]);
            let mut view = TableView::new(scope.clone(), 10);
            view.load(records.clone());
            view.set_show_deleted(flag);
            view.set_search_query(&query);
            let needle = query.to_lowercase();
            let expected: Vec<&Record> = records
                .iter()
                .filter(|r| r.is_deleted() == flag)
                .filter(|r| matches_query(r, &scope, &needle))
                .collect();
            prop_assert!(expected
                .iter()
                .all(|r| r.text("represent").to_lowercase().contains(&needle)));
            prop_assert_eq!(view.filtered(), expected);
        }

        #[test]
        fn prop_second_sort_reverses_first(specs in prop::collection::vec(arb_row(), 0..40)) {
            let mut view = TableView::new(SearchScope::AllFields, 100);
            view.load(rows_from(specs));
            view.sort_by("rank");
            let ascending: Vec<Record> = view.filtered().into_iter().cloned().collect();
            view.sort_by("rank");
            let descending: Vec<Record> = view.filtered().into_iter().cloned().collect();

            let split = |rows: &[Record]| {
                let nulls = rows.iter().filter(|r| r.get("rank") == Some(&Value::Null)).count();
                rows.len() - nulls
            };
            let present = split(&ascending);
            prop_assert_eq!(present, split(&descending));
            let mut reversed = ascending[..present].to_vec();
            reversed.reverse();
            prop_assert_eq!(&descending[..present], &reversed[..]);
            prop_assert!(ascending[present..].iter().all(|r| r.get("rank") == Some(&Value::Null)));
            prop_assert!(descending[present..].iter().all(|r| r.get("rank") == Some(&Value::Null)));
        }

        #[test]
        fn prop_page_buttons_match_ceiling(n in 0usize..60, page_size in 1usize..15) {
            let mut view = TableView::new(SearchScope::AllFields, page_size);
            view.load((0..n).map(item).collect());
            let buttons = view.page_buttons().len();
            if n <= page_size {
                prop_assert_eq!(buttons, 0);
            } else {
                prop_assert_eq!(buttons, n.div_ceil(page_size));
            }
        }
    }
}
