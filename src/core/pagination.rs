/// Number of page buttons shown at once.
pub const MAX_PAGE_BUTTONS: u32 = 5;

/// Inclusive row range for a 1-based page.
pub fn range_for(page: u32, limit: u32) -> (u64, u64) {
    let from = page.saturating_sub(1) as u64 * limit as u64;
    let to = (from + limit as u64).saturating_sub(1);
    (from, to)
}

pub fn total_pages(count: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    count.div_ceil(limit as u64) as u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<u32>,
    pub current: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Page buttons around `current`, or `None` when everything fits on one page.
/// A `current` outside `1..=total` is clamped into it.
pub fn page_window(current: u32, total: u32) -> Option<PageWindow> {
    if total <= 1 {
        return None;
    }
    let current = current.clamp(1, total);

    let mut start = current.saturating_sub(MAX_PAGE_BUTTONS / 2).max(1);
    let end = (start + MAX_PAGE_BUTTONS - 1).min(total);
    if end - start < MAX_PAGE_BUTTONS - 1 {
        start = end.saturating_sub(MAX_PAGE_BUTTONS - 1).max(1);
    }

    Some(PageWindow {
        pages: (start..=end).collect(),
        current,
        has_prev: current > 1,
        has_next: current < total,
    })
}

impl std::fmt::Display for PageWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::with_capacity(self.pages.len() + 2);
        if self.has_prev {
            parts.push("« Prev".to_string());
        }
        for page in &self.pages {
            if *page == self.current {
                parts.push(format!("[{}]", page));
            } else {
                parts.push(page.to_string());
            }
        }
        if self.has_next {
            parts.push("Next »".to_string());
        }
        write!(f, "{}", parts.join(" "))
    }
}
