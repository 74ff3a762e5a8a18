//! Disbursement management plus the running-balance header shown on the
//! disbursement screen.

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared::{
    CreateDisbursementRequest, Disbursement, DisbursementListResponse, UpdateDisbursementRequest,
};

use crate::domain::{page_slice, stats::event_balance};
use crate::error::DomainError;
use crate::storage::{DisbursementRepository, EventRepository, TransactionRepository};

#[derive(Clone)]
pub struct DisbursementService {
    disbursements: DisbursementRepository,
    transactions: TransactionRepository,
    events: EventRepository,
}

impl DisbursementService {
    pub fn new(
        disbursements: DisbursementRepository,
        transactions: TransactionRepository,
        events: EventRepository,
    ) -> Self {
        Self {
            disbursements,
            transactions,
            events,
        }
    }

    /// List with the running balance for the current event filter. The
    /// balance ignores the text search: it is donations minus disbursements
    /// for the event scope.
    pub async fn list(
        &self,
        event_id: Option<&str>,
        search: Option<&str>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<DisbursementListResponse> {
        let rows = self.disbursements.list(event_id, search).await?;

        let donation_amounts = self.transactions.amounts(event_id).await?;
        let disbursement_amounts = self.disbursements.amounts(event_id).await?;
        let balance = event_balance(&donation_amounts, &disbursement_amounts);

        let (disbursements, total_items) = page_slice(rows, page, per_page);
        Ok(DisbursementListResponse {
            disbursements,
            total_items,
            balance,
        })
    }

    pub async fn create(&self, request: CreateDisbursementRequest) -> Result<Disbursement> {
        if request.description.trim().is_empty() {
            return Err(anyhow!(DomainError::Validation(
                "description must not be empty".to_string()
            )));
        }
        if request.recipient.trim().is_empty() {
            return Err(anyhow!(DomainError::Validation(
                "recipient must not be empty".to_string()
            )));
        }
        if request.amount < 0 {
            return Err(anyhow!(DomainError::Validation(
                "amount must not be negative".to_string()
            )));
        }
        if self.events.get(&request.event_id).await?.is_none() {
            return Err(anyhow!(DomainError::NotFound("event")));
        }

        let disbursement = Disbursement {
            id: Uuid::new_v4().to_string(),
            event_id: request.event_id,
            description: request.description.trim().to_string(),
            amount: Some(request.amount),
            disbursement_date: request.disbursement_date,
            recipient: request.recipient.trim().to_string(),
            method: request.method,
            category: request.category,
            notes: request.notes,
            created_at: Utc::now(),
        };
        self.disbursements.store(&disbursement).await?;
        info!(
            "recorded disbursement {} for event {}",
            disbursement.id, disbursement.event_id
        );
        Ok(disbursement)
    }

    pub async fn get(&self, disbursement_id: &str) -> Result<Disbursement> {
        self.disbursements
            .get(disbursement_id)
            .await?
            .ok_or_else(|| anyhow!(DomainError::NotFound("disbursement")))
    }

    pub async fn update(
        &self,
        disbursement_id: &str,
        request: UpdateDisbursementRequest,
    ) -> Result<Disbursement> {
        let mut disbursement = self.get(disbursement_id).await?;

        if let Some(event_id) = request.event_id {
            if self.events.get(&event_id).await?.is_none() {
                return Err(anyhow!(DomainError::NotFound("event")));
            }
            disbursement.event_id = event_id;
        }
        if let Some(description) = request.description {
            if description.trim().is_empty() {
                return Err(anyhow!(DomainError::Validation(
                    "description must not be empty".to_string()
                )));
            }
            disbursement.description = description.trim().to_string();
        }
        if let Some(amount) = request.amount {
            if amount < 0 {
                return Err(anyhow!(DomainError::Validation(
                    "amount must not be negative".to_string()
                )));
            }
            disbursement.amount = Some(amount);
        }
        if let Some(disbursement_date) = request.disbursement_date {
            disbursement.disbursement_date = disbursement_date;
        }
        if let Some(recipient) = request.recipient {
            disbursement.recipient = recipient;
        }
        if let Some(method) = request.method {
            disbursement.method = method;
        }
        if let Some(category) = request.category {
            disbursement.category = Some(category);
        }
        if let Some(notes) = request.notes {
            disbursement.notes = Some(notes);
        }

        self.disbursements.update(&disbursement).await?;
        Ok(disbursement)
    }

    pub async fn delete(&self, disbursement_id: &str) -> Result<()> {
        if !self.disbursements.delete(disbursement_id).await? {
            return Err(anyhow!(DomainError::NotFound("disbursement")));
        }
        info!("deleted disbursement {}", disbursement_id);
        Ok(())
    }
}
