//! HTTP request handlers.

use super::{pages, AppState};
use crate::api::ImageUpload;
use crate::views::{DetailState, DetailView, HistoryView, UploadMode, UploadView};

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::Deserialize;

// ============================================================================
// Upload
// ============================================================================

pub async fn handle_upload_page(State(state): State<AppState>) -> impl IntoResponse {
    Html(pages::upload_page(&UploadView::new(), &state.images))
}

/// Fields of the upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub mode: UploadMode,
    pub file: Option<ImageUpload>,
    pub image_url: String,
    pub confidence: Option<f64>,
}

impl UploadForm {
    /// Feed the submitted fields into the view the way the inputs would.
    fn apply(self, view: &mut UploadView) {
        if let Some(confidence) = self.confidence {
            view.set_confidence(confidence);
        }
        match self.mode {
            UploadMode::File => match self.file {
                Some(file) => view.select_file(file),
                None => view.set_mode(UploadMode::File),
            },
            UploadMode::Url => view.set_image_url(self.image_url),
        }
    }
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was chosen
                if !filename.is_empty() || !bytes.is_empty() {
                    form.file = Some(ImageUpload::new(filename, bytes.to_vec()));
                }
            }
            "mode" => form.mode = UploadMode::from_form(&field.text().await?),
            "image_url" => form.image_url = field.text().await?,
            "confidence" => form.confidence = field.text().await?.trim().parse().ok(),
            _ => {}
        }
    }

    Ok(form)
}

pub async fn handle_upload_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut view = UploadView::new();

    let form = match read_upload_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("Failed to read upload form: {}", e);
            view.fail(format!("Could not read the uploaded form: {}", e.body_text()));
            return (e.status(), Html(pages::upload_page(&view, &state.images)));
        }
    };
    form.apply(&mut view);

    match view.begin_submit() {
        Ok(request) => {
            let outcome = request.send(&state.client).await;
            view.complete(outcome);
        }
        Err(rejected) => {
            tracing::debug!("Upload rejected: {}", rejected);
        }
    }

    (StatusCode::OK, Html(pages::upload_page(&view, &state.images)))
}

// ============================================================================
// History
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub min_people: Option<String>,
    #[serde(default)]
    pub max_people: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl HistoryParams {
    /// Rebuild the view a sequence of form submits would have produced.
    fn into_view(self, limit: u32) -> HistoryView {
        let mut view = HistoryView::new(limit);

        view.set_search_input(self.search.unwrap_or_default());
        view.submit_search();
        view.set_min_people_input(self.min_people.unwrap_or_default());
        view.set_max_people_input(self.max_people.unwrap_or_default());
        view.submit_filter();

        if let Some(page) = self.page.as_deref().and_then(|p| p.trim().parse().ok()) {
            view.go_to_page(page);
        }

        view
    }
}

pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    let mut view = params.into_view(state.config.page_size);

    let fetch = view.begin_fetch();
    let outcome = state.client.get_detections(&fetch.query).await;
    view.complete(fetch.ticket, outcome);

    let requested = view.page();
    if view.clamp_to_last_page() {
        tracing::debug!("Page {} is past the end, showing page {}", requested, view.page());
        let fetch = view.begin_fetch();
        let outcome = state.client.get_detections(&fetch.query).await;
        view.complete(fetch.ticket, outcome);
    }

    Html(pages::history_page(&view, &state.images))
}

// ============================================================================
// Detail
// ============================================================================

pub async fn handle_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut view = DetailView::from_route(&id);

    if let Some(fetch) = view.begin_fetch() {
        let outcome = state.client.get_detection_by_id(fetch.id).await;
        view.complete(fetch.ticket, outcome);
    }

    let status = match view.state() {
        DetailState::NotFound => StatusCode::NOT_FOUND,
        DetailState::InvalidId(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    };

    (status, Html(pages::detail_page(&view, &state.images)))
}

// ============================================================================
// Static Assets
// ============================================================================

pub async fn handle_favicon() -> impl IntoResponse {
    // Magnifier over a person silhouette
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
        <circle cx="50" cy="50" r="45" fill="#2563eb"/>
        <circle cx="50" cy="38" r="12" fill="white"/>
        <path d="M28 76 C30 58 70 58 72 76 Z" fill="white"/>
    </svg>"##;

    (
        [(axum::http::header::CONTENT_TYPE, "image/svg+xml")],
        svg
    )
}
