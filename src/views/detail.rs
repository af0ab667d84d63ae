//! Single detection page.

use super::{FetchTicket, RequestGenerations};
use crate::api::{ApiError, DetectionResult};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(DetectionResult),
    NotFound,
    Failed(String),
    /// The route did not carry a usable id; nothing is fetched.
    InvalidId(String),
}

#[derive(Debug, Clone, Copy)]
pub struct DetailFetch {
    pub ticket: FetchTicket,
    pub id: i64,
}

#[derive(Debug)]
pub struct DetailView {
    id: Option<i64>,
    state: DetailState,
    generations: RequestGenerations,
}

impl DetailView {
    /// Build the view from the raw `{id}` route segment.
    pub fn from_route(raw_id: &str) -> Self {
        let raw_id = raw_id.trim();
        let (id, state) = if raw_id.is_empty() {
            (None, DetailState::InvalidId("Detection ID is missing".to_string()))
        } else {
            match raw_id.parse::<i64>() {
                Ok(id) => (Some(id), DetailState::Loading),
                Err(_) => (
                    None,
                    DetailState::InvalidId(format!("Invalid detection ID: {}", raw_id)),
                ),
            }
        };

        Self {
            id,
            state,
            generations: RequestGenerations::default(),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    /// Start loading the record; `None` when the id is unusable.
    pub fn begin_fetch(&mut self) -> Option<DetailFetch> {
        let id = self.id?;
        self.state = DetailState::Loading;
        Some(DetailFetch {
            ticket: self.generations.next(),
            id,
        })
    }

    /// Apply a fetch outcome, dropping it if a newer fetch has started.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<DetectionResult, ApiError>,
    ) -> bool {
        if !self.generations.is_current(ticket) {
            tracing::debug!("Dropping stale detection response");
            return false;
        }

        self.state = match outcome {
            Ok(detection) => DetailState::Loaded(detection),
            Err(ApiError::NotFound(_)) => DetailState::NotFound,
            Err(e) => {
                tracing::warn!("Error fetching detection details: {}", e);
                DetailState::Failed(format!("Failed to load detection details: {}", e))
            }
        };
        true
    }

    /// User-facing error for the current state, if any.
    pub fn error(&self) -> Option<String> {
        match &self.state {
            DetailState::NotFound => Some("Detection not found".to_string()),
            DetailState::Failed(message) | DetailState::InvalidId(message) => {
                Some(message.clone())
            }
            DetailState::Loading | DetailState::Loaded(_) => None,
        }
    }
}
