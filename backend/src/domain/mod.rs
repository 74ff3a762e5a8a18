//! # Domain Layer
//!
//! Business logic for the donation tracker: one service per admin screen
//! concern, the public feed assembler, the stat reducers, and CSV export.
//! Services own their repositories and return `anyhow::Result`, raising
//! [`crate::error::DomainError`] for deliberate validation / not-found
//! failures.

pub mod disbursement_service;
pub mod donation_service;
pub mod event_service;
pub mod export;
pub mod feed;
pub mod mutation_service;
pub mod stats;
pub mod user_service;

pub use disbursement_service::DisbursementService;
pub use donation_service::DonationService;
pub use event_service::EventService;
pub use export::ExportService;
pub use feed::FeedService;
pub use mutation_service::MutationService;
pub use stats::StatsService;
pub use user_service::UserService;

/// Page sizes the list screens may request.
pub const PAGE_SIZES: [u32; 3] = [10, 20, 50];
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Slice a fully filtered result set down to one page.
///
/// With no `page` the whole set is returned (callers that still paginate in
/// the view). `per_page` values outside [`PAGE_SIZES`] fall back to the
/// default; a window past the end yields an empty page. The returned count is
/// always the size of the full filtered set.
pub fn page_slice<T>(items: Vec<T>, page: Option<u32>, per_page: Option<u32>) -> (Vec<T>, u32) {
    let total = items.len() as u32;
    let Some(page) = page else {
        return (items, total);
    };

    let size = per_page
        .filter(|size| PAGE_SIZES.contains(size))
        .unwrap_or(DEFAULT_PAGE_SIZE) as usize;
    let start = (page.max(1) as usize - 1) * size;
    if start >= items.len() {
        return (Vec::new(), total);
    }
    let end = (start + size).min(items.len());

    let page_items = items
        .into_iter()
        .skip(start)
        .take(end - start)
        .collect();
    (page_items, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_page_returns_everything() {
        let (items, total) = page_slice((0..25).collect(), None, None);
        assert_eq!(items.len(), 25);
        assert_eq!(total, 25);
    }

    #[test]
    fn pages_use_default_size_and_report_full_total() {
        let (first, total) = page_slice((0..25).collect(), Some(1), None);
        assert_eq!(first, (0..10).collect::<Vec<_>>());
        assert_eq!(total, 25);

        let (third, _) = page_slice((0..25).collect(), Some(3), None);
        assert_eq!(third, (20..25).collect::<Vec<_>>());
    }

    #[test]
    fn unknown_page_size_falls_back_to_default() {
        let (items, _) = page_slice((0..40).collect(), Some(1), Some(17));
        assert_eq!(items.len(), 10);

        let (items, _) = page_slice((0..40).collect(), Some(1), Some(20));
        assert_eq!(items.len(), 20);
    }

    #[test]
    fn window_past_the_end_is_empty() {
        let (items, total) = page_slice((0..5).collect::<Vec<i32>>(), Some(4), Some(10));
        assert!(items.is_empty());
        assert_eq!(total, 5);
    }
}
