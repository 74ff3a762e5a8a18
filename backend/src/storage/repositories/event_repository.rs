use anyhow::{anyhow, Result};
use sqlx::{sqlite::SqliteRow, Row};

use shared::{Event, EventStatus};

use crate::storage::db::{parse_date, parse_ts, DbConnection};

/// Repository for fundraising events. Events are never deleted, so there is
/// deliberately no delete operation here.
#[derive(Clone)]
pub struct EventRepository {
    db: DbConnection,
}

impl EventRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Event> {
        let status: String = row.get("status");
        Ok(Event {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            start_date: row
                .get::<Option<String>, _>("start_date")
                .map(|raw| parse_date(&raw))
                .transpose()?,
            end_date: row
                .get::<Option<String>, _>("end_date")
                .map(|raw| parse_date(&raw))
                .transpose()?,
            is_active: row.get("is_active"),
            status: EventStatus::parse(&status)
                .ok_or_else(|| anyhow!("unknown event status: {}", status))?,
            target_amount: row.get("target_amount"),
            created_at: parse_ts(row.get("created_at"))?,
        })
    }

    pub async fn store(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, name, description, start_date, end_date,
                                is_active, status, target_amount, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.start_date.map(|d| d.to_string()))
        .bind(event.end_date.map(|d| d.to_string()))
        .bind(event.is_active)
        .bind(event.status.as_str())
        .bind(event.target_amount)
        .bind(event.created_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get(&self, event_id: &str) -> Result<Option<Event>> {
        let row = sqlx::query("SELECT * FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// List events newest first, optionally filtered by a case-insensitive
    /// substring over name and description.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Event>> {
        let mut sql = String::from("SELECT * FROM events WHERE 1=1");
        if search.is_some() {
            sql.push_str(" AND (lower(name) LIKE ? OR lower(coalesce(description, '')) LIKE ?)");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(search) = search {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.bind(pattern.clone()).bind(pattern);
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::map_row).collect()
    }

    pub async fn update(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE events
            SET name = ?, description = ?, start_date = ?, end_date = ?,
                is_active = ?, status = ?, target_amount = ?
            WHERE id = ?
            "#,
        )
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.start_date.map(|d| d.to_string()))
        .bind(event.end_date.map(|d| d.to_string()))
        .bind(event.is_active)
        .bind(event.status.as_str())
        .bind(event.target_amount)
        .bind(&event.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// The event shown on the public page: most recently created active one.
    pub async fn active_event(&self) -> Result<Option<Event>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM events
            WHERE is_active = 1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    pub async fn count_active(&self) -> Result<u32> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM events WHERE is_active = 1")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get::<i64, _>("n") as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn sample_event(id: &str, name: &str, is_active: bool) -> Event {
        Event {
            id: id.to_string(),
            name: name.to_string(),
            description: Some("Bantuan untuk korban banjir".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            is_active,
            status: EventStatus::Active,
            target_amount: Some(50_000_000),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn store_and_get_round_trip() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = EventRepository::new(db);

        let event = sample_event("ev-1", "Peduli Banjir", true);
        repo.store(&event).await.unwrap();

        let loaded = repo.get("ev-1").await.unwrap().expect("event exists");
        assert_eq!(loaded, event);
        assert!(repo.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_substring() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = EventRepository::new(db);

        repo.store(&sample_event("ev-1", "Peduli Banjir", true))
            .await
            .unwrap();
        repo.store(&sample_event("ev-2", "Santunan Yatim", false))
            .await
            .unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let hits = repo.list(Some("BANJIR")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "ev-1");
    }

    #[tokio::test]
    async fn active_event_prefers_newest() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = EventRepository::new(db);

        let mut older = sample_event("ev-1", "Lama", true);
        older.created_at = Utc::now() - chrono::Duration::days(7);
        repo.store(&older).await.unwrap();
        repo.store(&sample_event("ev-2", "Baru", true)).await.unwrap();
        repo.store(&sample_event("ev-3", "Nonaktif", false))
            .await
            .unwrap();

        let active = repo.active_event().await.unwrap().expect("active event");
        assert_eq!(active.id, "ev-2");
        assert_eq!(repo.count_active().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_overwrites_fields() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = EventRepository::new(db);

        let mut event = sample_event("ev-1", "Peduli Banjir", true);
        repo.store(&event).await.unwrap();

        event.is_active = false;
        event.status = EventStatus::Completed;
        event.target_amount = None;
        repo.update(&event).await.unwrap();

        let loaded = repo.get("ev-1").await.unwrap().unwrap();
        assert!(!loaded.is_active);
        assert_eq!(loaded.status, EventStatus::Completed);
        assert_eq!(loaded.target_amount, None);
    }
}
