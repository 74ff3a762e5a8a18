use anyhow::{anyhow, Result};
use sqlx::{sqlite::SqliteRow, Row};

use shared::{Profile, Role};

use crate::storage::db::{parse_ts, DbConnection};

/// Repository for user profiles.
#[derive(Clone)]
pub struct ProfileRepository {
    db: DbConnection,
}

impl ProfileRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Profile> {
        let role: String = row.get("role");
        Ok(Profile {
            id: row.get("id"),
            email: row.get("email"),
            full_name: row.get("full_name"),
            role: Role::parse(&role).ok_or_else(|| anyhow!("unknown role: {}", role))?,
            created_at: parse_ts(row.get("created_at"))?,
            updated_at: parse_ts(row.get("updated_at"))?,
        })
    }

    pub async fn store(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(profile.created_at.to_rfc3339())
        .bind(profile.updated_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query("SELECT * FROM profiles ORDER BY created_at DESC")
            .fetch_all(self.db.pool())
            .await?;
        rows.iter().map(Self::map_row).collect()
    }

    pub async fn update(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE profiles
            SET email = ?, full_name = ?, role = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(profile.updated_at.to_rfc3339())
        .bind(&profile.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(id: &str, email: &str, role: Role) -> Profile {
        Profile {
            id: id.to_string(),
            email: email.to_string(),
            full_name: "Sopyan".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn round_trip_and_email_lookup() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = ProfileRepository::new(db);

        let profile = sample("u-1", "admin@example.org", Role::Admin);
        repo.store(&profile).await.unwrap();

        assert_eq!(repo.get("u-1").await.unwrap(), Some(profile.clone()));
        assert_eq!(
            repo.find_by_email("admin@example.org")
                .await
                .unwrap()
                .map(|p| p.id),
            Some("u-1".to_string())
        );
        assert!(repo.find_by_email("other@example.org").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_and_delete() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = ProfileRepository::new(db);

        let mut profile = sample("u-1", "staff@example.org", Role::Staff);
        repo.store(&profile).await.unwrap();

        profile.role = Role::Admin;
        profile.full_name = "Sopyan Abu Hudzaifah".to_string();
        repo.update(&profile).await.unwrap();

        let loaded = repo.get("u-1").await.unwrap().unwrap();
        assert_eq!(loaded.role, Role::Admin);
        assert_eq!(loaded.full_name, "Sopyan Abu Hudzaifah");

        assert!(repo.delete("u-1").await.unwrap());
        assert!(!repo.delete("u-1").await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_schema() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = ProfileRepository::new(db);

        repo.store(&sample("u-1", "admin@example.org", Role::Admin))
            .await
            .unwrap();
        let duplicate = repo.store(&sample("u-2", "admin@example.org", Role::Staff)).await;
        assert!(duplicate.is_err());
    }
}
