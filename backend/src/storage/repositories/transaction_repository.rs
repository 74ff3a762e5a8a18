use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row};

use shared::{ActivityRow, Donation, DonationRow, PaymentMethod};

use crate::storage::db::{parse_ts, DbConnection};

/// Repository for donation transactions.
#[derive(Clone)]
pub struct TransactionRepository {
    db: DbConnection,
}

impl TransactionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Donation> {
        let method: String = row.get("method");
        Ok(Donation {
            id: row.get("id"),
            event_id: row.get("event_id"),
            donor_id: row.get("donor_id"),
            donor_name: row.get("donor_name_snapshot"),
            amount: row.get("amount"),
            method: PaymentMethod::parse(&method),
            transaction_date: parse_ts(row.get("transaction_date"))?,
            created_at: parse_ts(row.get("created_at"))?,
        })
    }

    fn map_joined_row(row: &SqliteRow) -> Result<DonationRow> {
        Ok(DonationRow {
            donation: Self::map_row(row)?,
            event_name: row.get("event_name"),
        })
    }

    pub async fn store(&self, donation: &Donation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, event_id, donor_id, donor_name_snapshot,
                                      amount, method, transaction_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&donation.id)
        .bind(&donation.event_id)
        .bind(&donation.donor_id)
        .bind(&donation.donor_name)
        .bind(donation.amount)
        .bind(donation.method.label())
        .bind(donation.transaction_date.to_rfc3339())
        .bind(donation.created_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get(&self, transaction_id: &str) -> Result<Option<Donation>> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = ?")
            .bind(transaction_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    pub async fn update(&self, donation: &Donation) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE transactions
            SET event_id = ?, donor_id = ?, donor_name_snapshot = ?,
                amount = ?, method = ?, transaction_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&donation.event_id)
        .bind(&donation.donor_id)
        .bind(&donation.donor_name)
        .bind(donation.amount)
        .bind(donation.method.label())
        .bind(donation.transaction_date.to_rfc3339())
        .bind(&donation.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Returns true if the row existed and was deleted.
    pub async fn delete(&self, transaction_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(transaction_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Admin list: newest first, joined with the owning event's name,
    /// optionally filtered by event and by a case-insensitive substring of
    /// the donor-name snapshot.
    pub async fn list(
        &self,
        event_id: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<DonationRow>> {
        let mut sql = String::from(
            r#"
            SELECT t.*, e.name AS event_name
            FROM transactions t
            LEFT JOIN events e ON e.id = t.event_id
            WHERE 1=1
            "#,
        );
        if event_id.is_some() {
            sql.push_str(" AND t.event_id = ?");
        }
        if search.is_some() {
            sql.push_str(" AND lower(coalesce(t.donor_name_snapshot, '')) LIKE ?");
        }
        sql.push_str(" ORDER BY t.transaction_date DESC, t.created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(event_id) = event_id {
            query = query.bind(event_id);
        }
        if let Some(search) = search {
            query = query.bind(format!("%{}%", search.to_lowercase()));
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::map_joined_row).collect()
    }

    /// Feed fetch #1: donations whose donor-name snapshot contains the
    /// pinned keyword, newest first.
    pub async fn list_pinned(
        &self,
        event_id: &str,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<Donation>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM transactions
            WHERE event_id = ?
              AND lower(coalesce(donor_name_snapshot, '')) LIKE ?
            ORDER BY transaction_date DESC
            LIMIT ?
            "#,
        )
        .bind(event_id)
        .bind(format!("%{}%", keyword.to_lowercase()))
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Feed fetch #2: most recent donations overall, creation timestamp as
    /// tie-break.
    pub async fn list_recent(&self, event_id: &str, limit: u32) -> Result<Vec<Donation>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM transactions
            WHERE event_id = ?
            ORDER BY transaction_date DESC, created_at DESC
            LIMIT ?
            "#,
        )
        .bind(event_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Raw amounts for the stat reducers, optionally scoped to one event.
    /// NULL amounts come back as None.
    pub async fn amounts(&self, event_id: Option<&str>) -> Result<Vec<Option<i64>>> {
        let mut sql = String::from("SELECT amount FROM transactions WHERE 1=1");
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

    pub async fn count(&self) -> Result<u32> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM transactions")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get::<i64, _>("n") as u32)
    }

    /// Latest recorded donations for the dashboard activity table.
    pub async fn latest_activities(&self, limit: u32) -> Result<Vec<ActivityRow>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.donor_name_snapshot, t.amount, t.created_at,
                   e.name AS event_name
            FROM transactions t
            LEFT JOIN events e ON e.id = t.event_id
            ORDER BY t.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ActivityRow {
                    id: row.get("id"),
                    donor_name: row.get("donor_name_snapshot"),
                    event_name: row.get("event_name"),
                    amount: row.get::<Option<i64>, _>("amount").unwrap_or(0),
                    created_at: parse_ts(row.get("created_at"))?,
                })
            })
            .collect()
    }
}
