use std::collections::BTreeMap;

use log::debug;
use strum::{AsRefStr, Display, EnumString};

use crate::query_string::{join_pairs, parse_pairs};

pub const PAGE_KEY: &str = "page";
pub const SIZE_KEY: &str = "size";
pub const SORT_KEY: &str = "sort";
pub const SEARCH_KEY: &str = "search";
pub const EXPORT_KEY: &str = "export";

const RESERVED_KEYS: [&str; 5] = [PAGE_KEY, SIZE_KEY, SORT_KEY, SEARCH_KEY, EXPORT_KEY];

#[derive(AsRefStr, EnumString, Debug, Display, PartialEq, Eq, Copy, Clone)]
pub enum SortDirection {
    #[strum(serialize = "asc")]
    Ascending,
    #[strum(serialize = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Values a fresh listing starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefaults {
    pub page_size: u32,
    pub sort_field: String,
    pub sort_direction: SortDirection,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        QueryDefaults {
            page_size: 10,
            sort_field: "id".to_string(),
            sort_direction: SortDirection::Descending,
        }
    }
}

/// Pagination, sort, search and filter parameters of an admin listing.
///
/// Every mutator except [`QueryState::set_page`] moves the listing back to
/// page 1. Fields are private so that rule cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    page: u32,
    page_size: u32,
    sort_field: String,
    sort_direction: SortDirection,
    search_text: String,
    filters: BTreeMap<String, String>,
}

impl QueryState {
    pub fn new(defaults: &QueryDefaults) -> Self {
        QueryState {
            page: 1,
            page_size: defaults.page_size.max(1),
            sort_field: defaults.sort_field.clone(),
            sort_direction: defaults.sort_direction,
            search_text: String::new(),
            filters: BTreeMap::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Clicking the active sort column flips its direction; any other column
    /// becomes the sort column in ascending order.
    pub fn toggle_sort(&mut self, field: &str) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_field = field.to_string();
            self.sort_direction = SortDirection::Ascending;
        }
        self.page = 1;
    }

    pub fn set_sort(&mut self, field: &str, direction: SortDirection) {
        self.sort_field = field.to_string();
        self.sort_direction = direction;
        self.page = 1;
    }

    pub fn set_search(&mut self, text: &str) {
        self.search_text = text.to_string();
        self.page = 1;
    }

    /// An empty value removes the filter.
    pub fn set_filter(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.filters.remove(name);
        } else {
            self.filters.insert(name.to_string(), value.to_string());
        }
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 1;
    }

    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            (PAGE_KEY.to_string(), self.page.to_string()),
            (SIZE_KEY.to_string(), self.page_size.to_string()),
            (
                SORT_KEY.to_string(),
                format!("{},{}", self.sort_field, self.sort_direction),
            ),
        ];

        if !self.search_text.is_empty() {
            pairs.push((SEARCH_KEY.to_string(), self.search_text.clone()));
        }

        for (name, value) in &self.filters {
            if value.is_empty() {
                continue;
            }
            if RESERVED_KEYS.contains(&name.as_str()) {
                debug!("Skipping filter '{}': name collides with a listing parameter", name);
                continue;
            }
            pairs.push((name.clone(), value.clone()));
        }

        pairs
    }

    /// `page`, `size`, `sort`, then `search` when set, then one entry per
    /// non-empty filter in name order.
    pub fn to_query_string(&self) -> String {
        let pairs = self.pairs();
        join_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// The current query plus `export=<format>`.
    pub fn export_query_string(&self, format: &str) -> String {
        let mut pairs = self.pairs();
        pairs.push((EXPORT_KEY.to_string(), format.to_string()));
        join_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Rebuilds a state from an address query. Unparseable values fall back
    /// to `defaults`; unrecognized keys become filters.
    pub fn from_query_string(query: &str, defaults: &QueryDefaults) -> Self {
        let mut state = QueryState::new(defaults);
        let mut page = 1;

        for (key, value) in parse_pairs(query) {
            match key.as_str() {
                PAGE_KEY => {
                    page = value.parse::<u32>().ok().filter(|p| *p > 0).unwrap_or(1);
                }
                SIZE_KEY => {
                    if let Some(size) = value.parse::<u32>().ok().filter(|s| *s > 0) {
                        state.page_size = size;
                    }
                }
                SORT_KEY => {
                    if let Some((field, dir)) = value.rsplit_once(',') {
                        if let Ok(direction) = dir.parse::<SortDirection>() {
                            if !field.is_empty() {
                                state.sort_field = field.to_string();
                                state.sort_direction = direction;
                            }
                        }
                    }
                }
                SEARCH_KEY => state.search_text = value,
                EXPORT_KEY => {}
                _ => {
                    if !value.is_empty() {
                        state.filters.insert(key, value);
                    }
                }
            }
        }

        state.page = page;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use crate::query_string::parse_pairs;

    fn default_state() -> QueryState {
        QueryState::new(&QueryDefaults::default())
    }

    #[test]
    fn test_default_state_serializes() {
        assert_eq!(default_state().to_query_string(), "page=1&size=10&sort=id,desc");
    }

    #[test]
    fn test_sort_direction_strings() {
        assert_eq!(SortDirection::Ascending.to_string(), "asc");
        assert_eq!(SortDirection::Descending.as_ref(), "desc");
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert!("ascending".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_search_and_filters_are_included() {
        let mut state = default_state();
        state.set_search("suç ve ceza");
        state.set_filter("status", "active");
        state.set_filter("category", "7");
        assert_eq!(
            state.to_query_string(),
            "page=1&size=10&sort=id,desc&search=su%C3%A7+ve+ceza&category=7&status=active"
        );
    }

    #[test]
    fn test_empty_filter_value_is_omitted() {
        let mut state = default_state();
        state.set_filter("status", "active");
        state.set_filter("status", "");
        assert!(state.filters().is_empty());
        assert_eq!(state.to_query_string(), "page=1&size=10&sort=id,desc");
    }

    #[test]
    fn test_unknown_filter_names_pass_through() {
        let mut state = default_state();
        state.set_filter("x-publisher.name", "İletişim");
        assert!(state
            .to_query_string()
            .ends_with("&x-publisher.name=%C4%B0leti%C5%9Fim"));
    }

    #[test]
    fn test_reserved_filter_names_do_not_shadow_page() {
        let mut state = default_state();
        state.set_filter("page", "9");
        state.set_page(4);
        assert_eq!(state.to_query_string(), "page=4&size=10&sort=id,desc");
    }

    #[test]
    fn test_mutators_reset_page() {
        let mut state = default_state();

        state.set_page(5);
        state.set_page_size(25);
        assert_eq!(state.page(), 1);

        state.set_page(5);
        state.toggle_sort("title");
        assert_eq!(state.page(), 1);

        state.set_page(5);
        state.set_search("dune");
        assert_eq!(state.page(), 1);

        state.set_page(5);
        state.set_filter("status", "active");
        assert_eq!(state.page(), 1);

        state.set_page(5);
        state.clear_filters();
        assert_eq!(state.page(), 1);

        state.set_page(5);
        state.set_sort("price", SortDirection::Descending);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_set_page_keeps_other_fields() {
        let mut state = default_state();
        state.set_search("dune");
        state.set_page(3);
        assert_eq!(state.page(), 3);
        assert_eq!(state.search_text(), "dune");
    }

    #[test]
    fn test_page_and_size_never_zero() {
        let mut state = default_state();
        state.set_page(0);
        assert_eq!(state.page(), 1);
        state.set_page_size(0);
        assert_eq!(state.page_size(), 1);
    }

    #[test]
    fn test_toggle_sort() {
        let mut state = default_state();

        // Same column flips
        state.toggle_sort("id");
        assert_eq!(state.sort_direction(), SortDirection::Ascending);
        state.toggle_sort("id");
        assert_eq!(state.sort_direction(), SortDirection::Descending);

        // New column starts ascending
        state.toggle_sort("title");
        assert_eq!(state.sort_field(), "title");
        assert_eq!(state.sort_direction(), SortDirection::Ascending);
    }

    #[test]
    fn test_export_query_string() {
        let mut state = default_state();
        state.set_search("dune");
        assert_eq!(
            state.export_query_string("excel"),
            "page=1&size=10&sort=id,desc&search=dune&export=excel"
        );
    }

    #[test]
    fn test_from_query_string() {
        let defaults = QueryDefaults::default();
        let state = QueryState::from_query_string(
            "?page=3&size=25&sort=title,asc&search=dune+messiah&status=active&export=pdf",
            &defaults,
        );
        assert_eq!(state.page(), 3);
        assert_eq!(state.page_size(), 25);
        assert_eq!(state.sort_field(), "title");
        assert_eq!(state.sort_direction(), SortDirection::Ascending);
        assert_eq!(state.search_text(), "dune messiah");
        assert_eq!(state.filters().get("status").map(String::as_str), Some("active"));
        assert_eq!(state.filters().len(), 1);
    }

    #[test]
    fn test_from_query_string_falls_back_on_garbage() {
        let defaults = QueryDefaults::default();
        let state =
            QueryState::from_query_string("page=-2&size=abc&sort=title,sideways&empty=", &defaults);
        assert_eq!(state, QueryState::new(&defaults));
    }

    fn arb_state() -> impl Strategy<Value = QueryState> {
        (
            1u32..10_000,
            1u32..500,
            "[a-z_]{1,12}",
            any::<bool>(),
            ".{0,20}",
            proptest::collection::btree_map("[a-z]{1,8}", ".{0,10}", 0..5),
        )
            .prop_map(|(page, size, field, asc, search, filters)| {
                let direction = if asc {
                    SortDirection::Ascending
                } else {
                    SortDirection::Descending
                };
                let mut state = QueryState::new(&QueryDefaults::default());
                state.set_sort(&field, direction);
                state.set_page_size(size);
                state.set_search(&search);
                for (name, value) in &filters {
                    state.set_filter(name, value);
                }
                state.set_page(page);
                state
            })
    }

    proptest! {
        #[test]
        fn test_query_holds_exactly_the_non_empty_fields(state in arb_state()) {
            let pairs = parse_pairs(&state.to_query_string());

            prop_assert_eq!(&pairs[0], &(PAGE_KEY.to_string(), state.page().to_string()));
            prop_assert_eq!(&pairs[1], &(SIZE_KEY.to_string(), state.page_size().to_string()));
            prop_assert_eq!(
                &pairs[2],
                &(SORT_KEY.to_string(), format!("{},{}", state.sort_field(), state.sort_direction()))
            );

            let mut expected = 3;
            if !state.search_text().is_empty() {
                prop_assert_eq!(&pairs[3], &(SEARCH_KEY.to_string(), state.search_text().to_string()));
                expected += 1;
            }
            let active: Vec<_> = state
                .filters()
                .iter()
                .filter(|(name, value)| !value.is_empty() && !RESERVED_KEYS.contains(&name.as_str()))
                .collect();
            expected += active.len();
            prop_assert_eq!(pairs.len(), expected);

            for (name, value) in active {
                prop_assert!(pairs.contains(&(name.clone(), value.clone())));
            }
        }

        #[test]
        fn test_any_non_page_change_resets_page(state in arb_state(), text in ".{0,10}") {
            let mut changed = state.clone();
            changed.set_search(&text);
            let pairs = parse_pairs(&changed.to_query_string());
            prop_assert_eq!(&pairs[0], &(PAGE_KEY.to_string(), "1".to_string()));
        }

        #[test]
        fn test_query_string_reparses_to_same_state(state in arb_state()) {
            let reparsed = QueryState::from_query_string(&state.to_query_string(), &QueryDefaults::default());
            let expected_filters: BTreeMap<String, String> = state
                .filters()
                .iter()
                .filter(|(name, _)| !RESERVED_KEYS.contains(&name.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            prop_assert_eq!(reparsed.page(), state.page());
            prop_assert_eq!(reparsed.search_text(), state.search_text());
            prop_assert_eq!(reparsed.filters(), &expected_filters);
        }
    }
}
