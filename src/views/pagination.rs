//! Page-number window for history navigation.

/// Most page buttons shown at once.
pub const WINDOW_SIZE: u32 = 5;

/// Page numbers to show around `current`.
///
/// The window is centred on the current page, pinned to the first pages
/// while `current <= 3` and to the last pages while `current >= pages - 2`.
pub fn page_window(current: u32, pages: u32) -> Vec<u32> {
    let len = WINDOW_SIZE.min(pages);

    let first = if pages <= WINDOW_SIZE || current <= 3 {
        1
    } else if current >= pages - 2 {
        pages - (WINDOW_SIZE - 1)
    } else {
        current - 2
    };

    (0..len).map(|i| first + i).collect()
}

/// Navigation controls for one rendered history page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageNav {
    pub current: u32,
    pub pages: u32,
    pub window: Vec<u32>,
    /// Target of the "Previous" control, if enabled
    pub previous: Option<u32>,
    /// Target of the "Next" control, if enabled
    pub next: Option<u32>,
    /// Rows on this page
    pub shown: usize,
    pub total: u64,
}

impl PageNav {
    /// Controls for `current` of `pages`; `None` when there is nothing to page through.
    pub fn new(current: u32, pages: u32, shown: usize, total: u64) -> Option<Self> {
        if pages <= 1 {
            return None;
        }

        Some(Self {
            current,
            pages,
            window: page_window(current, pages),
            previous: (current > 1).then(|| (current - 1).min(pages)),
            next: (current < pages).then(|| current + 1),
            shown,
            total,
        })
    }
}
