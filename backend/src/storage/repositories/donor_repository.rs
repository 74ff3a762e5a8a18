use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row};

use shared::Donor;

use crate::storage::db::{parse_ts, DbConnection};

/// Repository for the donor directory. Donors are never deleted.
#[derive(Clone)]
pub struct DonorRepository {
    db: DbConnection,
}

impl DonorRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Donor> {
        Ok(Donor {
            id: row.get("id"),
            name: row.get("name"),
            phone: row.get("phone"),
            created_at: parse_ts(row.get("created_at"))?,
        })
    }

    pub async fn store(&self, donor: &Donor) -> Result<()> {
        sqlx::query("INSERT INTO donors (id, name, phone, created_at) VALUES (?, ?, ?, ?)")
            .bind(&donor.id)
            .bind(&donor.name)
            .bind(&donor.phone)
            .bind(donor.created_at.to_rfc3339())
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn get(&self, donor_id: &str) -> Result<Option<Donor>> {
        let row = sqlx::query("SELECT * FROM donors WHERE id = ?")
            .bind(donor_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// Exact-name lookup used by the lookup-or-create flow when recording a
    /// donation. Returns the oldest match if duplicates exist.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Donor>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM donors
            WHERE name = ?
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// List donors ordered by name, optionally filtered by a
    /// case-insensitive substring.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Donor>> {
        let mut sql = String::from("SELECT * FROM donors WHERE 1=1");
        if search.is_some() {
            sql.push_str(" AND lower(name) LIKE ?");
        }
        sql.push_str(" ORDER BY name ASC");

        let mut query = sqlx::query(&sql);
        if let Some(search) = search {
            query = query.bind(format!("%{}%", search.to_lowercase()));
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::map_row).collect()
    }

    pub async fn count(&self) -> Result<u32> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM donors")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get::<i64, _>("n") as u32)
    }
}
