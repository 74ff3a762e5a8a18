//! Stat reducers and the aggregate screens built on them.
//!
//! The reducers are pure functions over already-fetched rows: summation is
//! commutative, so none of them depend on input order, and missing amounts
//! count as zero.

use anyhow::Result;

use shared::{
    DashboardResponse, DonationBreakdown, DonationStats, PaymentMethod, PublicSummaryResponse,
};

use crate::storage::{DonorRepository, EventRepository, TransactionRepository};

/// Sum a list of possibly-missing amounts, treating None as zero.
pub fn sum_amounts(amounts: &[Option<i64>]) -> i64 {
    amounts.iter().map(|amount| amount.unwrap_or(0)).sum()
}

/// Running balance of an event: donations in minus disbursements out.
pub fn event_balance(donations: &[Option<i64>], disbursements: &[Option<i64>]) -> i64 {
    sum_amounts(donations) - sum_amounts(disbursements)
}

/// Bucket donation amounts by payment method.
///
/// Cash and transfers accumulate their own subtotals; transfers additionally
/// split per account label, with unqualified transfers in the other-transfer
/// bucket. `Other` methods only reach the grand total.
pub fn donation_breakdown<'a, I>(rows: I) -> DonationBreakdown
where
    I: IntoIterator<Item = (&'a PaymentMethod, Option<i64>)>,
{
    let mut breakdown = DonationBreakdown::default();
    for (method, amount) in rows {
        let amount = amount.unwrap_or(0);
        breakdown.total += amount;
        match method {
            PaymentMethod::Cash => breakdown.cash += amount,
            PaymentMethod::Transfer { account } => {
                breakdown.transfer += amount;
                match account {
                    Some(account) => {
                        *breakdown.by_account.entry(account.clone()).or_insert(0) += amount;
                    }
                    None => breakdown.other_transfer += amount,
                }
            }
            PaymentMethod::Other { .. } => {}
        }
    }
    breakdown
}

/// Aggregates for the public summary and the admin dashboard.
#[derive(Clone)]
pub struct StatsService {
    events: EventRepository,
    donors: DonorRepository,
    transactions: TransactionRepository,
}

impl StatsService {
    pub fn new(
        events: EventRepository,
        donors: DonorRepository,
        transactions: TransactionRepository,
    ) -> Self {
        Self {
            events,
            donors,
            transactions,
        }
    }

    /// The active event and its donation totals for the public page. No
    /// active event is an empty summary, not an error.
    pub async fn public_summary(&self) -> Result<PublicSummaryResponse> {
        let event = self.events.active_event().await?;

        let stats = match &event {
            Some(event) => {
                let amounts = self.transactions.amounts(Some(&event.id)).await?;
                DonationStats {
                    total_amount: sum_amounts(&amounts),
                    donation_count: amounts.len() as u32,
                }
            }
            None => DonationStats::default(),
        };

        Ok(PublicSummaryResponse { event, stats })
    }

    pub async fn dashboard(&self) -> Result<DashboardResponse> {
        let amounts = self.transactions.amounts(None).await?;

        Ok(DashboardResponse {
            total_donations: sum_amounts(&amounts),
            transaction_count: amounts.len() as u32,
            total_donors: self.donors.count().await?,
            active_events: self.events.count_active().await?,
            recent_activities: self.transactions.latest_activities(5).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lists_balance_to_zero() {
        assert_eq!(sum_amounts(&[]), 0);
        assert_eq!(event_balance(&[], &[]), 0);
    }

    #[test]
    fn missing_amounts_count_as_zero() {
        assert_eq!(sum_amounts(&[Some(100), None, Some(50)]), 150);
        assert_eq!(event_balance(&[Some(1_000), None], &[Some(400)]), 600);
    }

    #[test]
    fn balance_is_donations_minus_disbursements() {
        let donations = vec![Some(500_000), Some(250_000)];
        let disbursements = vec![Some(100_000), Some(50_000)];
        assert_eq!(event_balance(&donations, &disbursements), 600_000);
    }

    #[test]
    fn breakdown_buckets_by_method() {
        let bsi1 = PaymentMethod::Transfer {
            account: Some("BSI 7185674333".to_string()),
        };
        let bsi2 = PaymentMethod::Transfer {
            account: Some("BSI 7147181978".to_string()),
        };
        let plain_transfer = PaymentMethod::Transfer { account: None };
        let other = PaymentMethod::Other {
            label: "qris".to_string(),
        };

        let rows = vec![
            (&PaymentMethod::Cash, Some(100)),
            (&bsi1, Some(200)),
            (&bsi1, Some(50)),
            (&bsi2, Some(25)),
            (&plain_transfer, Some(10)),
            (&other, Some(7)),
            (&PaymentMethod::Cash, None),
        ];

        let breakdown = donation_breakdown(rows);
        assert_eq!(breakdown.total, 392);
        assert_eq!(breakdown.cash, 100);
        assert_eq!(breakdown.transfer, 285);
        assert_eq!(breakdown.by_account["BSI 7185674333"], 250);
        assert_eq!(breakdown.by_account["BSI 7147181978"], 25);
        assert_eq!(breakdown.other_transfer, 10);
    }

    #[test]
    fn breakdown_is_order_independent() {
        let bsi = PaymentMethod::Transfer {
            account: Some("BSI 7185674333".to_string()),
        };
        let mut rows = vec![
            (&PaymentMethod::Cash, Some(100)),
            (&bsi, Some(200)),
            (&PaymentMethod::Cash, Some(300)),
        ];

        let forward = donation_breakdown(rows.clone());
        rows.reverse();
        let backward = donation_breakdown(rows);
        assert_eq!(forward, backward);
    }
}
