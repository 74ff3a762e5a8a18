//! Inter-account fund mutations. The one hard rule: money cannot move from
//! an account to itself, checked before anything is written.

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared::{
    CreateFundMutationRequest, FundMutation, FundMutationListResponse, UpdateFundMutationRequest,
};

use crate::domain::page_slice;
use crate::error::DomainError;
use crate::storage::{EventRepository, MutationRepository};

#[derive(Clone)]
pub struct MutationService {
    mutations: MutationRepository,
    events: EventRepository,
}

impl MutationService {
    pub fn new(mutations: MutationRepository, events: EventRepository) -> Self {
        Self { mutations, events }
    }

    fn check_accounts(from_account: &str, to_account: &str) -> Result<()> {
        if from_account == to_account {
            return Err(anyhow!(DomainError::Validation(
                "source and destination accounts must differ".to_string()
            )));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        event_id: Option<&str>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<FundMutationListResponse> {
        let rows = self.mutations.list(event_id).await?;
        let (mutations, total_items) = page_slice(rows, page, per_page);
        Ok(FundMutationListResponse {
            mutations,
            total_items,
        })
    }

    pub async fn create(&self, request: CreateFundMutationRequest) -> Result<FundMutation> {
        Self::check_accounts(&request.from_account, &request.to_account)?;
        if request.amount < 0 {
            return Err(anyhow!(DomainError::Validation(
                "amount must not be negative".to_string()
            )));
        }
        if self.events.get(&request.event_id).await?.is_none() {
            return Err(anyhow!(DomainError::NotFound("event")));
        }

        let mutation = FundMutation {
            id: Uuid::new_v4().to_string(),
            event_id: request.event_id,
            mutation_date: request.mutation_date,
            from_account: request.from_account,
            to_account: request.to_account,
            amount: request.amount,
            notes: request.notes,
            created_at: Utc::now(),
        };
        self.mutations.store(&mutation).await?;
        info!(
            "recorded mutation {}: {} -> {}",
            mutation.id, mutation.from_account, mutation.to_account
        );
        Ok(mutation)
    }

    pub async fn get(&self, mutation_id: &str) -> Result<FundMutation> {
        self.mutations
            .get(mutation_id)
            .await?
            .ok_or_else(|| anyhow!(DomainError::NotFound("mutation")))
    }

    pub async fn update(
        &self,
        mutation_id: &str,
        request: UpdateFundMutationRequest,
    ) -> Result<FundMutation> {
        let mut mutation = self.get(mutation_id).await?;

        if let Some(event_id) = request.event_id {
            if self.events.get(&event_id).await?.is_none() {
                return Err(anyhow!(DomainError::NotFound("event")));
            }
            mutation.event_id = event_id;
        }
        if let Some(mutation_date) = request.mutation_date {
            mutation.mutation_date = mutation_date;
        }
        if let Some(from_account) = request.from_account {
            mutation.from_account = from_account;
        }
        if let Some(to_account) = request.to_account {
            mutation.to_account = to_account;
        }
        if let Some(amount) = request.amount {
            if amount < 0 {
                return Err(anyhow!(DomainError::Validation(
                    "amount must not be negative".to_string()
                )));
            }
            mutation.amount = amount;
        }
        if let Some(notes) = request.notes {
            mutation.notes = Some(notes);
        }

        // The invariant must hold for the combined result, not just the
        // fields present in the request.
        Self::check_accounts(&mutation.from_account, &mutation.to_account)?;

        self.mutations.update(&mutation).await?;
        Ok(mutation)
    }

    pub async fn delete(&self, mutation_id: &str) -> Result<()> {
        if !self.mutations.delete(mutation_id).await? {
            return Err(anyhow!(DomainError::NotFound("mutation")));
        }
        info!("deleted mutation {}", mutation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventService;
    use crate::storage::DbConnection;
    use shared::CreateEventRequest;

    async fn setup() -> (MutationService, String) {
        let db = DbConnection::init_test().await.unwrap();
        let events = EventRepository::new(db.clone());
        let service = MutationService::new(MutationRepository::new(db), events.clone());

        let event = EventService::new(events)
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

    fn request(event_id: &str, from: &str, to: &str) -> CreateFundMutationRequest {
        CreateFundMutationRequest {
            event_id: event_id.to_string(),
            mutation_date: Utc::now(),
            from_account: from.to_string(),
            to_account: to.to_string(),
            amount: 500_000,
            notes: None,
        }
    }

    #[tokio::test]
    async fn identical_accounts_are_rejected_before_any_write() {
        let (service, event_id) = setup().await;

        let err = service
            .create(request(&event_id, "tunai", "tunai"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));

        let listed = service.list(None, None, None).await.unwrap();
        assert_eq!(listed.total_items, 0);
    }

    #[tokio::test]
    async fn create_and_list() {
        let (service, event_id) = setup().await;

        service
            .create(request(&event_id, "tunai", "BSI 7185674333"))
            .await
            .unwrap();

        let listed = service.list(Some(&event_id), None, None).await.unwrap();
        assert_eq!(listed.total_items, 1);
        assert_eq!(listed.mutations[0].mutation.from_account, "tunai");
    }

    #[tokio::test]
    async fn update_cannot_collapse_the_accounts() {
        let (service, event_id) = setup().await;

        let mutation = service
            .create(request(&event_id, "tunai", "BSI 7185674333"))
            .await
            .unwrap();

        // Changing only the destination to match the stored source must fail.
        let err = service
            .update(
                &mutation.id,
                UpdateFundMutationRequest {
                    to_account: Some("tunai".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));

        // The stored row is untouched.
        let stored = service.get(&mutation.id).await.unwrap();
        assert_eq!(stored.to_account, "BSI 7185674333");
    }
}
