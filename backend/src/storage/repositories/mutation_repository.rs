use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row};

use shared::{FundMutation, FundMutationRow};

use crate::storage::db::{parse_ts, DbConnection};

/// Repository for inter-account fund mutations.
#[derive(Clone)]
pub struct MutationRepository {
    db: DbConnection,
}

impl MutationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<FundMutation> {
        Ok(FundMutation {
            id: row.get("id"),
            event_id: row.get("event_id"),
            mutation_date: parse_ts(row.get("mutation_date"))?,
            from_account: row.get("from_account"),
            to_account: row.get("to_account"),
            amount: row.get("amount"),
            notes: row.get("notes"),
            created_at: parse_ts(row.get("created_at"))?,
        })
    }

    pub async fn store(&self, mutation: &FundMutation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fund_mutations (id, event_id, mutation_date, from_account,
                                        to_account, amount, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&mutation.id)
        .bind(&mutation.event_id)
        .bind(mutation.mutation_date.to_rfc3339())
        .bind(&mutation.from_account)
        .bind(&mutation.to_account)
        .bind(mutation.amount)
        .bind(&mutation.notes)
        .bind(mutation.created_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get(&self, mutation_id: &str) -> Result<Option<FundMutation>> {
        let row = sqlx::query("SELECT * FROM fund_mutations WHERE id = ?")
            .bind(mutation_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    pub async fn update(&self, mutation: &FundMutation) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE fund_mutations
            SET event_id = ?, mutation_date = ?, from_account = ?,
                to_account = ?, amount = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&mutation.event_id)
        .bind(mutation.mutation_date.to_rfc3339())
        .bind(&mutation.from_account)
        .bind(&mutation.to_account)
        .bind(mutation.amount)
        .bind(&mutation.notes)
        .bind(&mutation.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn delete(&self, mutation_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM fund_mutations WHERE id = ?")
            .bind(mutation_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Newest first, joined with the event name.
    pub async fn list(&self, event_id: Option<&str>) -> Result<Vec<FundMutationRow>> {
        let mut sql = String::from(
            r#"
            SELECT m.*, e.name AS event_name
            FROM fund_mutations m
            LEFT JOIN events e ON e.id = m.event_id
            WHERE 1=1
            "#,
        );
        if event_id.is_some() {
            sql.push_str(" AND m.event_id = ?");
        }
        sql.push_str(" ORDER BY m.mutation_date DESC, m.created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(event_id) = event_id {
            query = query.bind(event_id);
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        rows.iter()
            .map(|row| {
                Ok(FundMutationRow {
                    mutation: Self::map_row(row)?,
                    event_name: row.get("event_name"),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EventRepository;
    use chrono::Utc;
    use shared::{Event, EventStatus};

    async fn setup() -> (MutationRepository, EventRepository) {
        let db = DbConnection::init_test().await.unwrap();
        (
            MutationRepository::new(db.clone()),
            EventRepository::new(db),
        )
    }

    fn sample(id: &str, event_id: &str) -> FundMutation {
        FundMutation {
            id: id.to_string(),
            event_id: event_id.to_string(),
            mutation_date: Utc::now(),
            from_account: "tunai".to_string(),
            to_account: "BSI 7185674333".to_string(),
            amount: 500_000,
            notes: Some("Setoran kas mingguan".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn round_trip_and_list() {
        let (repo, events) = setup().await;
        events
            .store(&Event {
                id: "ev-1".to_string(),
                name: "Peduli Banjir".to_string(),
                description: None,
                start_date: None,
                end_date: None,
                is_active: true,
                status: EventStatus::Active,
                target_amount: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let mutation = sample("mut-1", "ev-1");
        repo.store(&mutation).await.unwrap();

        let loaded = repo.get("mut-1").await.unwrap().expect("row exists");
        assert_eq!(loaded, mutation);

        let listed = repo.list(Some("ev-1")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].event_name.as_deref(), Some("Peduli Banjir"));

        assert!(repo.delete("mut-1").await.unwrap());
        assert!(repo.list(None).await.unwrap().is_empty());
    }
}
