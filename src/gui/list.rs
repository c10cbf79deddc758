use imgui::Ui;

use crate::api::ApiError;
use crate::remote::Remote;

/// Fixed page size shared by every management list.
pub const PAGE_SIZE: usize = 10;

/// Backing state for a management list screen: one remote collection, a
/// client-side filter and the current page. Every list page (resources,
/// customers, projects, tasks, assignments, timesheets) instantiates this
/// with its own fetch and filter predicate.
#[derive(Debug)]
pub struct ListView<T> {
    remote: Remote<Vec<T>>,
    pub filter: String,
    pub page: usize,
}

impl<T: Send + 'static> ListView<T> {
    pub fn new() -> Self {
        ListView {
            remote: Remote::new(),
            filter: String::new(),
            page: 0,
        }
    }

    /// Starts (or restarts) the backing fetch and rewinds to the first page.
    /// A restart supersedes any still-running fetch, so when a parent
    /// selection changes twice in quick succession the later results win.
    pub fn refetch<F>(&mut self, job: F)
    where
        F: FnOnce() -> Result<Vec<T>, ApiError> + Send + 'static,
    {
        self.page = 0;
        self.remote.start(job);
    }

    /// Drops fetched data and any in-flight fetch's right to land.
    pub fn reset(&mut self) {
        self.remote.reset();
        self.filter.clear();
        self.page = 0;
    }

    /// Frame upkeep. Returns a failure exactly once; the list then shows its
    /// empty state until the user re-navigates.
    pub fn poll(&mut self) -> Option<ApiError> {
        self.remote.poll();
        self.remote.take_failed()
    }

    pub fn is_loading(&self) -> bool {
        self.remote.is_loading()
    }

    pub fn items(&self) -> &[T] {
        self.remote.value().map(Vec::as_slice).unwrap_or(&[])
    }

    /// The rows of the current page after applying `matches` to the filter
    /// text, together with the page count. The page is clamped in case the
    /// filter shrank the result set below the remembered page.
    pub fn visible<F>(&self, matches: F) -> (Vec<&T>, usize)
    where
        F: Fn(&T, &str) -> bool,
    {
        let filtered: Vec<&T> = self
            .items()
            .iter()
            .filter(|item| matches(item, &self.filter))
            .collect();
        let pages = page_count(filtered.len(), PAGE_SIZE);
        let page = self.page.min(pages.saturating_sub(1));
        let rows = filtered
            .into_iter()
            .skip(page * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();
        (rows, pages)
    }
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size)
}

/// Case-insensitive substring match over a fixed set of display fields. An
/// empty or whitespace-only filter matches everything.
pub fn contains_ci(fields: &[&str], needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Filter box shared by the list screens. Editing the filter rewinds to the
/// first page.
pub fn draw_filter(ui: &Ui, filter: &mut String, page: &mut usize) {
    ui.set_next_item_width(240.0);
    if ui.input_text("##filter", filter).hint("Filter").build() {
        *page = 0;
    }
}

pub fn draw_pager(ui: &Ui, page: &mut usize, pages: usize) {
    if pages <= 1 {
        return;
    }
    *page = (*page).min(pages - 1);
    if ui.button("Prev") && *page > 0 {
        *page -= 1;
    }
    ui.same_line();
    ui.text(format!("Page {} of {}", *page + 1, pages));
    ui.same_line();
    if ui.button("Next") && *page + 1 < pages {
        *page += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        (1..=23).map(|i| format!("Customer {:02}", i)).collect()
    }

    fn view_with(items: Vec<String>) -> ListView<String> {
        let mut view = ListView::new();
        view.refetch(move || Ok(items));
        // The worker thread is real; wait for the fetch to land.
        while view.is_loading() {
            view.poll();
        }
        view
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        assert!(contains_ci(&["Ada Admin", "ada@x.test"], "ADMIN"));
        assert!(contains_ci(&["Ada Admin", "ada@x.test"], "a@x"));
        assert!(!contains_ci(&["Ada Admin"], "uma"));
        assert!(contains_ci(&["anything"], ""));
        assert!(contains_ci(&["anything"], "   "));
    }

    #[test]
    fn pages_are_fixed_size_with_a_short_tail() {
        let view = view_with(names());
        let (rows, pages) = view.visible(|_, _| true);
        assert_eq!(pages, 3);
        assert_eq!(rows.len(), PAGE_SIZE);
        assert_eq!(rows[0], "Customer 01");

        let mut view = view;
        view.page = 2;
        let (rows, _) = view.visible(|_, _| true);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], "Customer 21");
    }

    #[test]
    fn filtering_applies_before_pagination() {
        let mut view = view_with(names());
        {
            let (_, pages) = view.visible(|name, f| contains_ci(&[name.as_str()], f));
            assert_eq!(pages, 3);
        }
        view.filter = "customer 1".to_string();
        // "Customer 10".."Customer 19" survive the filter.
        let (rows, pages) = view.visible(|name, f| contains_ci(&[name.as_str()], f));
        assert_eq!(pages, 1);
        assert_eq!(rows.len(), PAGE_SIZE);
        assert_eq!(rows[0], "Customer 10");
    }

    #[test]
    fn page_is_clamped_when_the_filter_shrinks_the_result() {
        let mut view = view_with(names());
        view.page = 2;
        view.filter = "Customer 05".to_string();
        let (rows, pages) = view.visible(|name, f| contains_ci(&[name.as_str()], f));
        assert_eq!(pages, 1);
        assert_eq!(rows, vec!["Customer 05"]);
    }

    #[test]
    fn refetch_rewinds_to_the_first_page() {
        let mut view = view_with(names());
        view.page = 2;
        view.refetch(|| Ok(vec!["only".to_string()]));
        assert_eq!(view.page, 0);
    }

    #[test]
    fn failed_fetch_reports_once_and_leaves_the_list_empty() {
        let mut view: ListView<String> = ListView::new();
        view.refetch(|| Err(ApiError::Network("connection refused".to_string())));
        let mut error = None;
        while error.is_none() {
            error = view.poll();
        }
        assert_eq!(
            error,
            Some(ApiError::Network("connection refused".to_string()))
        );
        assert!(view.poll().is_none());
        assert!(view.items().is_empty());
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }
}
