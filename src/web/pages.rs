//! HTML rendering for the Detectify pages.
//!
//! Templates are plain HTML with `{{name}}` placeholders. Every value taken
//! from user input or the backend goes through [`escape_html`] first.

use crate::api::{DetectionResult, ImageUrlResolver};
use crate::views::{
    Confidence, DetailState, DetailView, HistoryFilter, HistoryView, PageNav, UploadMode,
    UploadStatus, UploadView,
};

use chrono::Datelike;
use url::form_urlencoded;

const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");
const UPLOAD_TEMPLATE: &str = include_str!("templates/upload.html");
const HISTORY_TEMPLATE: &str = include_str!("templates/history.html");
const DETAIL_TEMPLATE: &str = include_str!("templates/detail.html");

const SUBMIT_LABEL: &str = "Detect People";
const PROCESSING_LABEL: &str = "Processing...";

// ============================================================================
// Shell
// ============================================================================

/// Wrap page content in the shared header, navigation and footer.
pub fn layout(title: &str, content: &str) -> String {
    LAYOUT_TEMPLATE
        .replace("{{title}}", &escape_html(title))
        .replace("{{year}}", &chrono::Utc::now().year().to_string())
        .replace("{{content}}", content)
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            other => out.push(other),
        }
    }
    out
}

fn error_banner(message: Option<&str>) -> String {
    message
        .map(|m| format!("<div class=\"error\">{}</div>", escape_html(m)))
        .unwrap_or_default()
}

fn image_tag(images: &ImageUrlResolver, detection: &DetectionResult, class: &str) -> String {
    match images.resolve(&detection.image_path) {
        Some(src) => format!(
            "<img src=\"{}\" alt=\"Detection {}\" class=\"{}\">",
            escape_html(&src),
            detection.id,
            class
        ),
        None => String::new(),
    }
}

// ============================================================================
// Upload
// ============================================================================

pub fn upload_page(view: &UploadView, images: &ImageUrlResolver) -> String {
    let checked = |mode: UploadMode| if view.mode() == mode { "checked" } else { "" };
    let (submit_label, submit_disabled) = match view.status() {
        UploadStatus::Submitting => (PROCESSING_LABEL, "disabled"),
        _ => (SUBMIT_LABEL, ""),
    };

    let content = UPLOAD_TEMPLATE
        .replace("{{file_checked}}", checked(UploadMode::File))
        .replace("{{url_checked}}", checked(UploadMode::Url))
        .replace("{{image_url}}", &escape_html(view.image_url()))
        .replace("{{confidence}}", &view.confidence().to_string())
        .replace("{{confidence_min}}", &Confidence::min().to_string())
        .replace("{{confidence_max}}", &Confidence::max().to_string())
        .replace("{{processing_label}}", PROCESSING_LABEL)
        .replace("{{submit_label}}", submit_label)
        .replace("{{submit_disabled}}", submit_disabled)
        .replace("{{error}}", &error_banner(view.error()))
        .replace(
            "{{result}}",
            &view.result().map(|r| upload_result(r, images)).unwrap_or_default(),
        );

    layout("Detectify", &content)
}

fn upload_result(result: &DetectionResult, images: &ImageUrlResolver) -> String {
    let mut facts = vec![format!(
        "<p><strong>Original filename:</strong> {}</p>",
        escape_html(&result.original_filename)
    )];
    if let Some(confidence) = result.confidence {
        facts.push(format!(
            "<p><strong>Confidence threshold:</strong> {:.2}</p>",
            confidence
        ));
    }
    if let Some(seconds) = result.processing_time {
        facts.push(format!("<p><strong>Processing time:</strong> {:.2}s</p>", seconds));
    }
    if let Some((width, height)) = result.dimensions() {
        facts.push(format!(
            "<p><strong>Image dimensions:</strong> {}&times;{}px</p>",
            width, height
        ));
    }
    facts.push(format!(
        "<p><strong>Detection timestamp:</strong> {}</p>",
        escape_html(&result.display_timestamp())
    ));

    format!(
        r#"<div class="panel">
    <h3>Detection Results</h3>
    <div class="grid">
        <div>{}</div>
        <div>
            <p><span class="count">{}</span> people detected</p>
            {}
            <p><a href="/detection/{}">View details</a></p>
        </div>
    </div>
</div>"#,
        image_tag(images, result, "result"),
        result.num_people,
        facts.join("\n            "),
        result.id
    )
}

// ============================================================================
// History
// ============================================================================

/// Link to a history page keeping the committed filters.
pub fn history_href(filter: &HistoryFilter, page: Option<u32>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(page) = page {
        query.append_pair("page", &page.to_string());
    }
    if let Some(min) = filter.min_people {
        query.append_pair("min_people", &min.to_string());
    }
    if let Some(max) = filter.max_people {
        query.append_pair("max_people", &max.to_string());
    }
    if let Some(search) = &filter.search {
        query.append_pair("search", search);
    }

    let query = query.finish();
    if query.is_empty() {
        "/history".to_string()
    } else {
        format!("/history?{}", query)
    }
}

pub fn history_page(view: &HistoryView, images: &ImageUrlResolver) -> String {
    let filter = view.filter();
    let draft = view.draft();
    let optional = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();

    let content = HISTORY_TEMPLATE
        .replace("{{search_input}}", &escape_html(&draft.search))
        .replace("{{min_people_input}}", &escape_html(&draft.min_people))
        .replace("{{max_people_input}}", &escape_html(&draft.max_people))
        .replace("{{search}}", &escape_html(filter.search.as_deref().unwrap_or_default()))
        .replace("{{min_people}}", &optional(filter.min_people))
        .replace("{{max_people}}", &optional(filter.max_people))
        .replace("{{error}}", &error_banner(view.error()))
        .replace("{{table}}", &history_table(view, images))
        .replace(
            "{{pager}}",
            &view
                .page_nav()
                .map(|nav| pager(&nav, filter))
                .unwrap_or_default(),
        );

    layout("Detection History - Detectify", &content)
}

fn history_table(view: &HistoryView, images: &ImageUrlResolver) -> String {
    let rows: Vec<String> = view
        .result()
        .map(|r| r.data.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|d| {
            format!(
                "<tr><td>{}</td><td>{}</td><td><strong>{}</strong></td><td>{}</td><td><a href=\"/detection/{}\">View Details</a></td></tr>",
                image_tag(images, d, "thumb"),
                escape_html(&d.original_filename),
                d.num_people,
                escape_html(&d.display_timestamp()),
                d.id
            )
        })
        .collect();

    if rows.is_empty() {
        return "<div class=\"panel\" style=\"text-align: center\"><p>No detection records found</p></div>"
            .to_string();
    }

    format!(
        "<table>\n<thead><tr><th>Image</th><th>Filename</th><th>People</th><th>Timestamp</th><th>Actions</th></tr></thead>\n<tbody>\n{}\n</tbody>\n</table>",
        rows.join("\n")
    )
}

fn pager(nav: &PageNav, filter: &HistoryFilter) -> String {
    let step = |target: Option<u32>, label: &str| match target {
        Some(page) => format!("<a href=\"{}\">{}</a>", escape_html(&history_href(filter, Some(page))), label),
        None => format!("<span class=\"page disabled\">{}</span>", label),
    };

    let numbers: Vec<String> = nav
        .window
        .iter()
        .map(|&page| {
            if page == nav.current {
                format!("<span class=\"page current\">{}</span>", page)
            } else {
                format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(&history_href(filter, Some(page))),
                    page
                )
            }
        })
        .collect();

    format!(
        "<div class=\"pager\">\n<div>Showing {} of {} results</div>\n<div>{} {} {}</div>\n</div>",
        nav.shown,
        nav.total,
        step(nav.previous, "Previous"),
        numbers.join(" "),
        step(nav.next, "Next")
    )
}

// ============================================================================
// Detail
// ============================================================================

pub fn detail_page(view: &DetailView, images: &ImageUrlResolver) -> String {
    let content = match view.state() {
        DetailState::Loaded(detection) => detail_content(detection, images),
        DetailState::Loading => "<p>Loading...</p>".to_string(),
        DetailState::NotFound | DetailState::Failed(_) | DetailState::InvalidId(_) => format!(
            "<a href=\"/history\">&larr; Back to History</a>\n{}",
            error_banner(view.error().as_deref())
        ),
    };

    let title = match view.id() {
        Some(id) => format!("Detection {} - Detectify", id),
        None => "Detection - Detectify".to_string(),
    };
    layout(&title, &content)
}

fn detail_content(detection: &DetectionResult, images: &ImageUrlResolver) -> String {
    let row = |label: &str, value: String| format!("<tr><th>{}</th><td>{}</td></tr>", label, value);

    let mut rows = vec![
        row("Detection ID", detection.id.to_string()),
        row("Timestamp", escape_html(&detection.display_timestamp())),
        row("Filename", escape_html(&detection.original_filename)),
    ];
    if let Some(seconds) = detection.processing_time {
        rows.push(row("Processing Time", format!("{:.2}s", seconds)));
    }
    if let Some(confidence) = detection.confidence {
        rows.push(row("Confidence Threshold", confidence.to_string()));
    }
    if let Some((width, height)) = detection.dimensions() {
        rows.push(row("Dimensions", format!("{} &times; {} px", width, height)));
    }

    DETAIL_TEMPLATE
        .replace("{{image}}", &image_tag(images, detection, "result"))
        .replace("{{filename}}", &escape_html(&detection.original_filename))
        .replace("{{num_people}}", &detection.num_people.to_string())
        .replace("{{rows}}", &rows.join("\n"))
        .replace("{{boxes}}", &bounding_boxes(detection))
}

fn bounding_boxes(detection: &DetectionResult) -> String {
    let boxes = detection.detections();
    if boxes.is_empty() {
        return String::new();
    }

    let rows: Vec<String> = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>({:.0}, {:.0}) &ndash; ({:.0}, {:.0})</td><td>{:.0} &times; {:.0}</td></tr>",
                i + 1,
                escape_html(&b.class_name),
                b.confidence,
                b.x1,
                b.y1,
                b.x2,
                b.y2,
                b.width(),
                b.height()
            )
        })
        .collect();

    format!(
        "<div class=\"panel\">\n<h3>Detected objects</h3>\n<table>\n<thead><tr><th>#</th><th>Class</th><th>Score</th><th>Box</th><th>Size</th></tr></thead>\n<tbody>\n{}\n</tbody>\n</table>\n</div>",
        rows.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, PaginationResult};
    use crate::test_support::sample_record;

    fn images() -> ImageUrlResolver {
        ImageUrlResolver::from_api_url("http://localhost:8000/api").unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom & Jerry's\"</b> {{title}}"),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt; &#123;&#123;title&#125;&#125;"
        );
    }

    #[test]
    fn test_history_href_keeps_filters() {
        let filter = HistoryFilter {
            min_people: Some(2),
            max_people: None,
            search: Some("beach & sun".to_string()),
        };
        assert_eq!(
            history_href(&filter, Some(3)),
            "/history?page=3&min_people=2&search=beach+%26+sun"
        );
        assert_eq!(history_href(&HistoryFilter::default(), None), "/history");
    }

    #[test]
    fn test_layout_has_navigation() {
        let page = layout("Detectify", "<p>hi</p>");
        assert!(page.contains("<title>Detectify</title>"));
        assert!(page.contains("href=\"/history\""));
        assert!(page.contains("<p>hi</p>"));
        assert!(page.contains("Detectify. All rights reserved."));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_upload_page_busy_indicator() {
        let idle = upload_page(&UploadView::new(), &images());
        assert!(idle.contains("<button type=\"submit\" >Detect People</button>"));
        assert!(idle.contains("b.textContent = 'Processing...'"));

        let mut view = UploadView::new();
        view.set_image_url("https://example.com/a.jpg");
        view.begin_submit().unwrap();
        let busy = upload_page(&view, &images());
        assert!(busy.contains("<button type=\"submit\" disabled>Processing...</button>"));
        assert!(!busy.contains("{{"));
    }

    #[test]
    fn test_upload_page_shows_result() {
        let mut view = UploadView::new();
        view.complete(Ok(sample_record(9, "party.jpg", 3, 0.45)));
        let page = upload_page(&view, &images());

        assert!(page.contains("<span class=\"count\">3</span> people detected"));
        assert!(page.contains("http://localhost:8000/static/images/result_party.jpg"));
        assert!(page.contains("Confidence threshold:</strong> 0.45"));
        assert!(page.contains("640&times;480px"));
        assert!(page.contains("href=\"/detection/9\""));
    }

    #[test]
    fn test_history_page_renders_rows_and_pager() {
        let mut view = HistoryView::new(2);
        view.set_search_input("photo");
        view.submit_search();
        let fetch = view.begin_fetch();
        view.complete(
            fetch.ticket,
            Ok(PaginationResult {
                total: 12,
                page: 1,
                limit: 2,
                pages: 6,
                data: vec![sample_record(12, "photo_12.jpg", 0, 0.5), sample_record(11, "photo_11.jpg", 3, 0.5)],
            }),
        );
        let page = history_page(&view, &images());

        assert!(page.contains("photo_12.jpg"));
        assert!(page.contains("href=\"/detection/11\""));
        assert!(page.contains("Showing 2 of 12 results"));
        assert!(page.contains("/history?page=2&amp;search=photo"));
        assert!(page.contains("<span class=\"page disabled\">Previous</span>"));
        assert!(page.contains("<p id=\"loading\" hidden>Loading...</p>"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_history_page_empty_and_error() {
        let mut view = HistoryView::new(10);
        let fetch = view.begin_fetch();
        view.complete(fetch.ticket, Err(ApiError::Timeout));
        let page = history_page(&view, &images());
        assert!(page.contains("Failed to load detection history"));
        assert!(page.contains("No detection records found"));
        assert!(!page.contains("class=\"pager\""));
    }

    #[test]
    fn test_detail_page_optional_fields() {
        let mut record = sample_record(4, "solo.png", 1, 0.5);
        record.processing_time = None;
        record.image_height = None;

        let mut view = DetailView::from_route("4");
        let fetch = view.begin_fetch().unwrap();
        view.complete(fetch.ticket, Ok(record));
        let page = detail_page(&view, &images());

        assert!(page.contains("Confidence Threshold"));
        assert!(!page.contains("Processing Time"));
        assert!(!page.contains("Dimensions"));
        assert!(page.contains("Detected objects"));
        assert!(page.contains("<td>person</td>"));
    }

    #[test]
    fn test_detail_page_not_found() {
        let mut view = DetailView::from_route("77");
        let fetch = view.begin_fetch().unwrap();
        view.complete(fetch.ticket, Err(ApiError::NotFound(77)));
        let page = detail_page(&view, &images());
        assert!(page.contains("Detection not found"));
        assert!(page.contains("Back to History"));
    }
}
