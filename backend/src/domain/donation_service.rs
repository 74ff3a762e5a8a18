//! Donation recording and management.
//!
//! Recording a donation resolves the donor by exact-name lookup, creating a
//! donor row when nobody matches, and stores a snapshot of the name on the
//! transaction itself so historic displays survive later donor edits.

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared::{
    CreateDonationRequest, CreateDonorRequest, Donation, DonationListResponse, Donor,
    DonorListResponse, UpdateDonationRequest,
};

use crate::domain::{page_slice, stats::donation_breakdown};
use crate::error::DomainError;
use crate::storage::{DonorRepository, EventRepository, TransactionRepository};

#[derive(Clone)]
pub struct DonationService {
    transactions: TransactionRepository,
    donors: DonorRepository,
    events: EventRepository,
}

impl DonationService {
    pub fn new(
        transactions: TransactionRepository,
        donors: DonorRepository,
        events: EventRepository,
    ) -> Self {
        Self {
            transactions,
            donors,
            events,
        }
    }

    /// Admin list with the method breakdown computed over the full filtered
    /// set, not just the returned page.
    pub async fn list(
        &self,
        event_id: Option<&str>,
        search: Option<&str>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<DonationListResponse> {
        let rows = self.transactions.list(event_id, search).await?;
        let breakdown = donation_breakdown(
            rows.iter()
                .map(|row| (&row.donation.method, row.donation.amount)),
        );
        let (donations, total_items) = page_slice(rows, page, per_page);
        Ok(DonationListResponse {
            donations,
            total_items,
            breakdown,
        })
    }

    pub async fn create(&self, request: CreateDonationRequest) -> Result<Donation> {
        if request.amount < 0 {
            return Err(anyhow!(DomainError::Validation(
                "amount must not be negative".to_string()
            )));
        }
        if self.events.get(&request.event_id).await?.is_none() {
            return Err(anyhow!(DomainError::NotFound("event")));
        }

        let (donor_id, donor_name) = self
            .resolve_donor(request.donor_id.as_deref(), request.donor_name.as_deref())
            .await?;

        let donation = Donation {
            id: Uuid::new_v4().to_string(),
            event_id: request.event_id,
            donor_id: Some(donor_id),
            donor_name: Some(donor_name),
            amount: Some(request.amount),
            method: request.method,
            transaction_date: request.transaction_date.unwrap_or_else(Utc::now),
            created_at: Utc::now(),
        };
        self.transactions.store(&donation).await?;
        info!("recorded donation {} for event {}", donation.id, donation.event_id);
        Ok(donation)
    }

    /// Resolve who gave: an explicit donor id wins, otherwise exact-name
    /// lookup with creation on miss. The returned name is the snapshot to
    /// store on the transaction.
    async fn resolve_donor(
        &self,
        donor_id: Option<&str>,
        donor_name: Option<&str>,
    ) -> Result<(String, String)> {
        if let Some(donor_id) = donor_id {
            let donor = self
                .donors
                .get(donor_id)
                .await?
                .ok_or_else(|| anyhow!(DomainError::NotFound("donor")))?;
            return Ok((donor.id, donor.name));
        }

        let name = donor_name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(anyhow!(DomainError::Validation(
                "donor name must not be empty".to_string()
            )));
        }

        if let Some(existing) = self.donors.find_by_name(name).await? {
            return Ok((existing.id, existing.name));
        }

        let donor = Donor {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: None,
            created_at: Utc::now(),
        };
        self.donors.store(&donor).await?;
        info!("created donor {} ({})", donor.id, donor.name);
        Ok((donor.id, donor.name))
    }

    pub async fn get(&self, donation_id: &str) -> Result<Donation> {
        self.transactions
            .get(donation_id)
            .await?
            .ok_or_else(|| anyhow!(DomainError::NotFound("donation")))
    }

    pub async fn update(
        &self,
        donation_id: &str,
        request: UpdateDonationRequest,
    ) -> Result<Donation> {
        let mut donation = self.get(donation_id).await?;

        if let Some(event_id) = request.event_id {
            if self.events.get(&event_id).await?.is_none() {
                return Err(anyhow!(DomainError::NotFound("event")));
            }
            donation.event_id = event_id;
        }
        if request.donor_id.is_some() || request.donor_name.is_some() {
            let (donor_id, donor_name) = self
                .resolve_donor(request.donor_id.as_deref(), request.donor_name.as_deref())
                .await?;
            donation.donor_id = Some(donor_id);
            donation.donor_name = Some(donor_name);
        }
        if let Some(amount) = request.amount {
            if amount < 0 {
                return Err(anyhow!(DomainError::Validation(
                    "amount must not be negative".to_string()
                )));
            }
            donation.amount = Some(amount);
        }
        if let Some(method) = request.method {
            donation.method = method;
        }
        if let Some(transaction_date) = request.transaction_date {
            donation.transaction_date = transaction_date;
        }

        self.transactions.update(&donation).await?;
        Ok(donation)
    }

    pub async fn delete(&self, donation_id: &str) -> Result<()> {
        if !self.transactions.delete(donation_id).await? {
            return Err(anyhow!(DomainError::NotFound("donation")));
        }
        info!("deleted donation {}", donation_id);
        Ok(())
    }

    // Donor directory, backing the search box on the donation form.

    pub async fn list_donors(&self, search: Option<&str>) -> Result<DonorListResponse> {
        let donors = self.donors.list(search).await?;
        let total_items = donors.len() as u32;
        Ok(DonorListResponse {
            donors,
            total_items,
        })
    }

    pub async fn create_donor(&self, request: CreateDonorRequest) -> Result<Donor> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(anyhow!(DomainError::Validation(
                "donor name must not be empty".to_string()
            )));
        }
        if let Some(existing) = self.donors.find_by_name(name).await? {
            return Ok(existing);
        }

        let donor = Donor {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: request.phone,
            created_at: Utc::now(),
        };
        self.donors.store(&donor).await?;
        Ok(donor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;
    use shared::{CreateEventRequest, PaymentMethod};

    async fn setup() -> (DonationService, String) {
        let db = DbConnection::init_test().await.unwrap();
        let events = EventRepository::new(db.clone());
        let service = DonationService::new(
            TransactionRepository::new(db.clone()),
            DonorRepository::new(db),
            events.clone(),
        );

        let event = crate::domain::EventService::new(events)
            .create(CreateEventRequest {
                name: "Peduli Banjir".to_string(),
                description: None,
                start_date: None,
                end_date: None,
                target_amount: None,
            })
            .await
            .unwrap();
        (service, event.id)
    }

    fn request(event_id: &str, donor_name: &str, amount: i64) -> CreateDonationRequest {
        CreateDonationRequest {
            event_id: event_id.to_string(),
            donor_id: None,
            donor_name: Some(donor_name.to_string()),
            amount,
            method: PaymentMethod::Cash,
            transaction_date: None,
        }
    }

    #[tokio::test]
    async fn create_snapshots_the_donor_name() {
        let (service, event_id) = setup().await;

        let donation = service
            .create(request(&event_id, "Budi Santoso", 50_000))
            .await
            .unwrap();
        assert_eq!(donation.donor_name.as_deref(), Some("Budi Santoso"));
        assert!(donation.donor_id.is_some());
    }

    #[tokio::test]
    async fn repeated_names_reuse_the_donor_row() {
        let (service, event_id) = setup().await;

        let first = service
            .create(request(&event_id, "Budi", 10_000))
            .await
            .unwrap();
        let second = service
            .create(request(&event_id, "Budi", 20_000))
            .await
            .unwrap();
        assert_eq!(first.donor_id, second.donor_id);

        // A different exact name creates a new donor.
        let third = service
            .create(request(&event_id, "budi", 5_000))
            .await
            .unwrap();
        assert_ne!(first.donor_id, third.donor_id);

        let donors = service.list_donors(None).await.unwrap();
        assert_eq!(donors.total_items, 2);
    }

    #[tokio::test]
    async fn negative_amount_and_blank_name_are_rejected() {
        let (service, event_id) = setup().await;

        let err = service
            .create(request(&event_id, "Budi", -1))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));

        let err = service
            .create(request(&event_id, "   ", 1_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));

        // Nothing was written.
        let listed = service.list(None, None, None, None).await.unwrap();
        assert_eq!(listed.total_items, 0);
    }

    #[tokio::test]
    async fn renaming_a_donor_leaves_old_snapshots_alone() {
        let (service, event_id) = setup().await;

        let donation = service
            .create(request(&event_id, "Budi", 10_000))
            .await
            .unwrap();

        // Later donation is edited to a new name; the old row keeps what the
        // donor was called at donation time.
        let second = service
            .create(request(&event_id, "Budi", 20_000))
            .await
            .unwrap();
        service
            .update(
                &second.id,
                UpdateDonationRequest {
                    donor_name: Some("Budi Santoso".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let first = service.get(&donation.id).await.unwrap();
        assert_eq!(first.donor_name.as_deref(), Some("Budi"));
    }

    #[tokio::test]
    async fn list_breakdown_covers_all_pages() {
        let (service, event_id) = setup().await;

        for i in 0..15 {
            let mut req = request(&event_id, &format!("Donatur {}", i), 1_000);
            if i % 2 == 0 {
                req.method = PaymentMethod::Transfer {
                    account: Some("BSI 7185674333".to_string()),
                };
            }
            service.create(req).await.unwrap();
        }

        let page = service
            .list(Some(&event_id), None, Some(1), Some(10))
            .await
            .unwrap();
        assert_eq!(page.donations.len(), 10);
        assert_eq!(page.total_items, 15);
        // Breakdown reflects all 15 rows, not the visible 10.
        assert_eq!(page.breakdown.total, 15_000);
        assert_eq!(page.breakdown.by_account["BSI 7185674333"], 8_000);
    }

    #[tokio::test]
    async fn delete_missing_donation_is_not_found() {
        let (service, _) = setup().await;
        let err = service.delete("missing").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotFound("donation"))
        ));
    }
}
