use anyhow::{anyhow, Result};
use sqlx::{sqlite::SqliteRow, Row};

use shared::{Disbursement, DisbursementMethod, DisbursementRow};

use crate::storage::db::{parse_ts, DbConnection};

/// Repository for disbursements (money paid out of an event's funds).
#[derive(Clone)]
pub struct DisbursementRepository {
    db: DbConnection,
}

impl DisbursementRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Disbursement> {
        let method: String = row.get("method");
        Ok(Disbursement {
            id: row.get("id"),
            event_id: row.get("event_id"),
            description: row.get("description"),
            amount: row.get("amount"),
            disbursement_date: parse_ts(row.get("disbursement_date"))?,
            recipient: row.get("recipient"),
            method: DisbursementMethod::parse(&method)
                .ok_or_else(|| anyhow!("unknown disbursement method: {}", method))?,
            category: row.get("category"),
            notes: row.get("notes"),
            created_at: parse_ts(row.get("created_at"))?,
        })
    }

    pub async fn store(&self, disbursement: &Disbursement) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO disbursements (id, event_id, description, amount,
                                       disbursement_date, recipient, method,
                                       category, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&disbursement.id)
        .bind(&disbursement.event_id)
        .bind(&disbursement.description)
        .bind(disbursement.amount)
        .bind(disbursement.disbursement_date.to_rfc3339())
        .bind(&disbursement.recipient)
        .bind(disbursement.method.as_str())
        .bind(&disbursement.category)
        .bind(&disbursement.notes)
        .bind(disbursement.created_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get(&self, disbursement_id: &str) -> Result<Option<Disbursement>> {
        let row = sqlx::query("SELECT * FROM disbursements WHERE id = ?")
            .bind(disbursement_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    pub async fn update(&self, disbursement: &Disbursement) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE disbursements
            SET event_id = ?, description = ?, amount = ?, disbursement_date = ?,
                recipient = ?, method = ?, category = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&disbursement.event_id)
        .bind(&disbursement.description)
        .bind(disbursement.amount)
        .bind(disbursement.disbursement_date.to_rfc3339())
        .bind(&disbursement.recipient)
        .bind(disbursement.method.as_str())
        .bind(&disbursement.category)
        .bind(&disbursement.notes)
        .bind(&disbursement.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn delete(&self, disbursement_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM disbursements WHERE id = ?")
            .bind(disbursement_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Newest first, joined with the event name; search covers recipient and
    /// description.
    pub async fn list(
        &self,
        event_id: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<DisbursementRow>> {
        let mut sql = String::from(
            r#"
            SELECT d.*, e.name AS event_name
            FROM disbursements d
            LEFT JOIN events e ON e.id = d.event_id
            WHERE 1=1
            "#,
        );
        if event_id.is_some() {
            sql.push_str(" AND d.event_id = ?");
        }
        if search.is_some() {
            sql.push_str(" AND (lower(d.recipient) LIKE ? OR lower(d.description) LIKE ?)");
        }
        sql.push_str(" ORDER BY d.disbursement_date DESC, d.created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(event_id) = event_id {
            query = query.bind(event_id);
        }
        if let Some(search) = search {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.bind(pattern.clone()).bind(pattern);
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        rows.iter()
            .map(|row| {
                Ok(DisbursementRow {
                    disbursement: Self::map_row(row)?,
                    event_name: row.get("event_name"),
                })
            })
            .collect()
    }

    /// Raw amounts for the balance reducer, optionally scoped to one event.
    pub async fn amounts(&self, event_id: Option<&str>) -> Result<Vec<Option<i64>>> {
        let mut sql = String::from("SELECT amount FROM disbursements WHERE 1=1");
        if event_id.is_some() {
            sql.push_str(" AND event_id = ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(event_id) = event_id {
            query = query.bind(event_id);
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(|row| row.get("amount")).collect())
    }
}
