//! Detection history: paging, filters and search.

use super::{FetchTicket, PageNav, RequestGenerations};
use crate::api::{ApiError, DetectionQuery, PaginationResult};

pub const HISTORY_ERROR: &str = "Failed to load detection history";

/// Filters the current listing was fetched with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub min_people: Option<u32>,
    pub max_people: Option<u32>,
    pub search: Option<String>,
}

/// Text typed into the search and filter inputs, not yet submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryDraft {
    pub search: String,
    pub min_people: String,
    pub max_people: String,
}

/// A history request to run.
#[derive(Debug, Clone)]
pub struct HistoryFetch {
    pub ticket: FetchTicket,
    pub query: DetectionQuery,
}

/// State of the history page.
///
/// Draft inputs only take effect on submit. Every mutator reports whether
/// the effective query changed, which is when the caller should re-fetch.
#[derive(Debug)]
pub struct HistoryView {
    page: u32,
    limit: u32,
    filter: HistoryFilter,
    draft: HistoryDraft,
    result: Option<PaginationResult>,
    error: Option<String>,
    generations: RequestGenerations,
}

impl HistoryView {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            filter: HistoryFilter::default(),
            draft: HistoryDraft::default(),
            result: None,
            error: None,
            generations: RequestGenerations::default(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn filter(&self) -> &HistoryFilter {
        &self.filter
    }

    pub fn draft(&self) -> &HistoryDraft {
        &self.draft
    }

    pub fn result(&self) -> Option<&PaginationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_search_input(&mut self, input: impl Into<String>) {
        self.draft.search = input.into();
    }

    pub fn set_min_people_input(&mut self, input: impl Into<String>) {
        self.draft.min_people = input.into();
    }

    pub fn set_max_people_input(&mut self, input: impl Into<String>) {
        self.draft.max_people = input.into();
    }

    /// Commit the search input and go back to the first page.
    pub fn submit_search(&mut self) -> bool {
        let search = Some(self.draft.search.clone()).filter(|s| !s.is_empty());
        let changed = search != self.filter.search || self.page != 1;
        self.filter.search = search;
        self.page = 1;
        changed
    }

    /// Commit the people-count inputs and go back to the first page.
    ///
    /// Blank or non-numeric input clears that bound.
    pub fn submit_filter(&mut self) -> bool {
        let min_people = parse_count(&self.draft.min_people);
        let max_people = parse_count(&self.draft.max_people);
        let changed = min_people != self.filter.min_people
            || max_people != self.filter.max_people
            || self.page != 1;
        self.filter.min_people = min_people;
        self.filter.max_people = max_people;
        self.page = 1;
        changed
    }

    /// Move to `page`. Pages outside `[1, pages]` of the last result are ignored.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if page < 1 {
            return false;
        }
        if let Some(result) = &self.result {
            if page > result.pages {
                return false;
            }
        }

        let changed = page != self.page;
        self.page = page;
        changed
    }

    /// Move back to the last page when the current one lies past it.
    ///
    /// Only meaningful once a result is known; returns whether the page moved.
    pub fn clamp_to_last_page(&mut self) -> bool {
        match &self.result {
            Some(result) if result.pages >= 1 && self.page > result.pages => {
                self.page = result.pages;
                true
            }
            _ => false,
        }
    }

    pub fn query(&self) -> DetectionQuery {
        DetectionQuery {
            page: self.page,
            limit: self.limit,
            min_people: self.filter.min_people,
            max_people: self.filter.max_people,
            search: self.filter.search.clone(),
        }
    }

    /// Start a fetch for the current query, superseding any in flight.
    pub fn begin_fetch(&mut self) -> HistoryFetch {
        HistoryFetch {
            ticket: self.generations.next(),
            query: self.query(),
        }
    }

    /// Apply a fetch outcome. Returns `false` if the ticket was stale and
    /// the outcome was dropped.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<PaginationResult, ApiError>,
    ) -> bool {
        if !self.generations.is_current(ticket) {
            tracing::debug!("Dropping stale history response");
            return false;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("Error fetching detections: {}", e);
                self.error = Some(HISTORY_ERROR.to_string());
            }
        }
        true
    }

    pub fn page_nav(&self) -> Option<PageNav> {
        let result = self.result.as_ref()?;
        PageNav::new(self.page, result.pages, result.data.len(), result.total)
    }
}

fn parse_count(input: &str) -> Option<u32> {
    input.trim().parse().ok()
}
