//! Event management: list/create/edit plus the active-flag toggle. Events
//! are never deleted, so closed campaigns keep their history.

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared::{CreateEventRequest, Event, EventListResponse, EventStatus, UpdateEventRequest};

use crate::domain::page_slice;
use crate::error::DomainError;
use crate::storage::EventRepository;

#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
}

impl EventService {
    pub fn new(events: EventRepository) -> Self {
        Self { events }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<EventListResponse> {
        let events = self.events.list(search).await?;
        let (events, total_items) = page_slice(events, page, per_page);
        Ok(EventListResponse {
            events,
            total_items,
        })
    }

    pub async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        if request.name.trim().is_empty() {
            return Err(anyhow!(DomainError::Validation(
                "event name must not be empty".to_string()
            )));
        }

        let event = Event {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            description: request.description,
            start_date: request.start_date,
            end_date: request.end_date,
            is_active: true,
            status: EventStatus::Active,
            target_amount: request.target_amount,
            created_at: Utc::now(),
        };
        self.events.store(&event).await?;
        info!("created event {} ({})", event.id, event.name);
        Ok(event)
    }

    pub async fn get(&self, event_id: &str) -> Result<Event> {
        self.events
            .get(event_id)
            .await?
            .ok_or_else(|| anyhow!(DomainError::NotFound("event")))
    }

    /// The event the public page shows: most recently created active one.
    pub async fn active(&self) -> Result<Option<Event>> {
        self.events.active_event().await
    }

    pub async fn update(&self, event_id: &str, request: UpdateEventRequest) -> Result<Event> {
        let mut event = self.get(event_id).await?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(anyhow!(DomainError::Validation(
                    "event name must not be empty".to_string()
                )));
            }
            event.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            event.description = Some(description);
        }
        if let Some(start_date) = request.start_date {
            event.start_date = Some(start_date);
        }
        if let Some(end_date) = request.end_date {
            event.end_date = Some(end_date);
        }
        if let Some(target_amount) = request.target_amount {
            event.target_amount = Some(target_amount);
        }
        if let Some(status) = request.status {
            event.status = status;
        }
        if let Some(is_active) = request.is_active {
            event.is_active = is_active;
        }

        self.events.update(&event).await?;
        Ok(event)
    }

    /// Flip the public-visibility flag.
    pub async fn toggle_active(&self, event_id: &str) -> Result<Event> {
        let mut event = self.get(event_id).await?;
        event.is_active = !event.is_active;
        self.events.update(&event).await?;
        info!(
            "event {} is now {}",
            event.id,
            if event.is_active { "active" } else { "inactive" }
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::storage::DbConnection;
    use axum::http::StatusCode;

    async fn service() -> EventService {
        let db = DbConnection::init_test().await.unwrap();
        EventService::new(EventRepository::new(db))
    }

    fn create_request(name: &str) -> CreateEventRequest {
        CreateEventRequest {
            name: name.to_string(),
            description: Some("desc".to_string()),
            start_date: None,
            end_date: None,
            target_amount: Some(1_000_000),
        }
    }

    #[tokio::test]
    async fn create_defaults_to_active() {
        let service = service().await;
        let event = service.create(create_request("Peduli Banjir")).await.unwrap();

        assert!(event.is_active);
        assert_eq!(event.status, EventStatus::Active);
        assert_eq!(service.get(&event.id).await.unwrap(), event);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let service = service().await;
        let err = service.create(create_request("   ")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn toggle_flips_the_flag() {
        let service = service().await;
        let event = service.create(create_request("Peduli Banjir")).await.unwrap();

        let toggled = service.toggle_active(&event.id).await.unwrap();
        assert!(!toggled.is_active);
        let toggled = service.toggle_active(&event.id).await.unwrap();
        assert!(toggled.is_active);
    }

    #[tokio::test]
    async fn missing_event_maps_to_404() {
        let service = service().await;
        let err = service.get("missing").await.unwrap_err();
        let api: ApiError = ApiError::from_domain(err);
        assert!(matches!(api, ApiError::NotFound(_)));
        // And the response status agrees.
        let response = axum::response::IntoResponse::into_response(api);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let service = service().await;
        let event = service.create(create_request("Peduli Banjir")).await.unwrap();

        let updated = service
            .update(
                &event.id,
                UpdateEventRequest {
                    status: Some(EventStatus::Completed),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Peduli Banjir");
        assert_eq!(updated.status, EventStatus::Completed);
        assert!(!updated.is_active);
        assert_eq!(updated.target_amount, Some(1_000_000));
    }

    #[tokio::test]
    async fn list_paginates_over_the_filtered_set() {
        let service = service().await;
        for i in 0..12 {
            service
                .create(create_request(&format!("Event {:02}", i)))
                .await
                .unwrap();
        }

        let page = service.list(None, Some(2), Some(10)).await.unwrap();
        assert_eq!(page.total_items, 12);
        assert_eq!(page.events.len(), 2);

        let filtered = service.list(Some("event 03"), None, None).await.unwrap();
        assert_eq!(filtered.total_items, 1);
    }
}
