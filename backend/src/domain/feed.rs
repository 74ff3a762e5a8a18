//! # Public Donation Feed
//!
//! Builds the ranked, deduplicated, bounded donation list shown on the
//! public page. Two fetches feed it: the pinned subset (donations whose
//! donor-name snapshot contains the affiliated organisation's name) and the
//! most recent donations overall. The merge keeps pinned entries ahead of
//! everything else regardless of date, never returns the same donation
//! twice, and never reaches past a fixed cap no matter how many donations
//! the event has.

use std::cmp::Reverse;
use std::collections::HashSet;

use anyhow::Result;

use shared::{Donation, FeedEntry, ANONYMOUS_DONOR_LABEL};

use crate::storage::TransactionRepository;

/// Most donations ever reachable through the feed, across all pages.
pub const FEED_CAP: usize = 50;
/// Donations per page in paginated mode.
pub const FEED_PAGE_SIZE: usize = 20;
/// Size of the first-page summary shown before the visitor expands the feed.
pub const FEED_PREVIEW_SIZE: usize = 10;

/// Which slice of the assembled feed a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedWindow {
    /// The short first-page summary.
    Preview,
    /// A full page, 1-based.
    Page(u32),
}

impl FeedWindow {
    /// Half-open `[start, end)` index range into the assembled feed.
    pub fn bounds(self) -> (usize, usize) {
        match self {
            FeedWindow::Preview => (0, FEED_PREVIEW_SIZE),
            FeedWindow::Page(page) => {
                let start = (page.max(1) as usize - 1) * FEED_PAGE_SIZE;
                (start, (start + FEED_PAGE_SIZE).min(FEED_CAP))
            }
        }
    }
}

/// Whether a donor-name snapshot marks an affiliated (pinned) donor.
pub fn is_pinned(donor_name: Option<&str>, keyword: &str) -> bool {
    donor_name
        .map(|name| name.to_lowercase().contains(&keyword.to_lowercase()))
        .unwrap_or(false)
}

/// Merge the two fetched subsets into the final page.
///
/// Order of operations matters: dedup keeps the first occurrence, and the
/// pinned set is concatenated first, so a donation present in both subsets
/// survives as its pinned-set copy. The sort is stable, so entries with
/// equal pinned-ness and equal date keep their fetch order.
pub fn assemble(
    pinned: Vec<Donation>,
    recent: Vec<Donation>,
    keyword: &str,
    window: FeedWindow,
) -> Vec<Donation> {
    let (start, end) = window.bounds();
    if start >= FEED_CAP {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut merged: Vec<Donation> = pinned
        .into_iter()
        .chain(recent)
        .filter(|donation| seen.insert(donation.id.clone()))
        .collect();

    merged.sort_by_key(|donation| {
        (
            !is_pinned(donation.donor_name.as_deref(), keyword),
            Reverse(donation.transaction_date),
        )
    });

    let end = end.min(merged.len());
    if start >= end {
        return Vec::new();
    }
    merged.into_iter().skip(start).take(end - start).collect()
}

/// Assembles the public donation feed for an event.
#[derive(Clone)]
pub struct FeedService {
    transactions: TransactionRepository,
    pinned_keyword: String,
}

impl FeedService {
    pub fn new(transactions: TransactionRepository, pinned_keyword: String) -> Self {
        Self {
            transactions,
            pinned_keyword,
        }
    }

    /// Fetch, merge and redact one window of the feed.
    ///
    /// A window past the cap short-circuits to an empty page without touching
    /// storage. The two fetches run concurrently; both must resolve before
    /// the merge. A failed fetch propagates unchanged, no retries.
    pub async fn window(&self, event_id: &str, window: FeedWindow) -> Result<Vec<FeedEntry>> {
        let (start, _) = window.bounds();
        if start >= FEED_CAP {
            return Ok(Vec::new());
        }

        let (pinned, recent) = tokio::try_join!(
            self.transactions
                .list_pinned(event_id, &self.pinned_keyword, FEED_CAP as u32),
            self.transactions.list_recent(event_id, FEED_CAP as u32),
        )?;

        let page = assemble(pinned, recent, &self.pinned_keyword, window);
        Ok(page
            .into_iter()
            .map(|donation| self.redact(donation))
            .collect())
    }

    /// Only the pinned affiliated donor's real name is ever shown publicly;
    /// every other entry gets the generic anonymous label no matter what
    /// name is stored.
    fn redact(&self, donation: Donation) -> FeedEntry {
        let display_name = match donation.donor_name {
            Some(name) if is_pinned(Some(&name), &self.pinned_keyword) => name,
            _ => ANONYMOUS_DONOR_LABEL.to_string(),
        };
        FeedEntry {
            id: donation.id,
            display_name,
            amount: donation.amount.unwrap_or(0),
            method: donation.method.label(),
            transaction_date: donation.transaction_date,
        }
    }
}
