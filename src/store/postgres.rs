use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;

use super::{IdentityStore, StoreError};
use crate::config::Config;
use crate::models::{Admin, User, UserProfile};

const SCHEMA: &str = include_str!("../../sql/schema.sql");
const ADDRESS_CONSTRAINT: &str = "user_address_key";

const USER_COLUMNS: &str =
    "id, name, address, status, chat_number, token, password_hash, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET application_name = 'chat_backend';")
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Creates the tables if they are missing.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some(ADDRESS_CONSTRAINT) {
                return StoreError::DuplicateAddress;
            }
            return StoreError::Conflict(db_err.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM "user" ORDER BY created_at, id"#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count_users_by_address(&self, address: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT count(*) FROM "user" WHERE address = $1"#)
            .bind(address)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_users_by_login(
        &self,
        name: &str,
        address: &str,
    ) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM "user" WHERE name = $1 AND address = $2"#
        ))
        .bind(name)
        .bind(address)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_user_with_profile(
        &self,
        user: &User,
        profile: &UserProfile,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let taken: i64 = sqlx::query_scalar(r#"SELECT count(*) FROM "user" WHERE address = $1"#)
            .bind(&user.address)
            .fetch_one(&mut *tx)
            .await?;
        if taken > 0 {
            return Err(StoreError::DuplicateAddress);
        }

        // the unique constraint catches signups racing past the count above
        sqlx::query(
            r#"
            INSERT INTO "user" (id, name, address, status, chat_number, token, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.address)
        .bind(user.status.as_str())
        .bind(user.chat_number)
        .bind(&user.token)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        sqlx::query(
            r#"
            INSERT INTO user_profile (id, comment, friend_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.comment)
        .bind(&profile.friend_id)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        tx.commit().await.map_err(map_insert_error)?;
        Ok(())
    }

    async fn update_user_token(
        &self,
        id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(r#"UPDATE "user" SET token = $1, updated_at = $2 WHERE id = $3"#)
            .bind(token)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_users_by_session(&self, id: &str, token: &str) -> Result<i64, StoreError> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT count(*) FROM "user" WHERE token = $1 AND id = $2"#)
                .bind(token)
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, comment, friend_id, created_at, updated_at
            FROM user_profile
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn update_profile_comment(
        &self,
        id: &str,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result =
            sqlx::query("UPDATE user_profile SET comment = $1, updated_at = $2 WHERE id = $3")
                .bind(comment)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn find_admin(&self, id: &str) -> Result<Option<Admin>, StoreError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, token, password_hash, created_at, updated_at FROM admin WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    async fn create_admin(&self, admin: &Admin) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO admin (id, token, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&admin.id)
        .bind(&admin.token)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .bind(admin.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_admin_token(
        &self,
        id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE admin SET token = $1, updated_at = $2 WHERE id = $3")
            .bind(token)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
