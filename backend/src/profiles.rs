use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};
use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("profile not found: {0}")]
    NotFound(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Stored EV profile for one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvProfile {
    pub user_id: String,
    pub ev_model: String,
    pub battery_capacity: f64,
    pub current_battery: i32,
    pub battery_health: i32,
    pub vehicle_load: Option<f64>,
    pub ambient_temperature: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied profile fields for create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvProfileData {
    pub ev_model: String,
    pub battery_capacity: f64,
    pub current_battery: i32,
    pub battery_health: i32,
    pub vehicle_load: Option<f64>,
    pub ambient_temperature: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpsertOutcome {
    pub success: bool,
    pub is_new: bool,
}

/// Key-value profile store over PostgreSQL, upsert semantics.
pub struct ProfileStore {
    pool: PgPool,
}

impl ProfileStore {
    /// # Errors
    /// Returns `ProfileError::Config` if DATABASE_URL is not set, or a
    /// database error if the pool cannot connect.
    pub async fn connect() -> Result<Self, ProfileError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| {
            ProfileError::Config("DATABASE_URL environment variable not set".to_string())
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool created");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), ProfileError> {
        let migration_sql = include_str!("../migrations/20250914_create_ev_profiles.sql");
        sqlx::raw_sql(migration_sql).execute(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    pub async fn get(&self, user_id: &str) -> Result<EvProfile, ProfileError> {
        sqlx::query_as::<_, EvProfile>("SELECT * FROM ev_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))
    }

    /// Insert or update the profile for `user_id`, reporting whether the
    /// row was new.
    pub async fn upsert(
        &self,
        user_id: &str,
        data: &EvProfileData,
    ) -> Result<UpsertOutcome, ProfileError> {
        let existing: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM ev_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        let is_new = existing.is_none();

        sqlx::query(
            r#"
            INSERT INTO ev_profiles (
                user_id, ev_model, battery_capacity, current_battery,
                battery_health, vehicle_load, ambient_temperature
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                ev_model = EXCLUDED.ev_model,
                battery_capacity = EXCLUDED.battery_capacity,
                current_battery = EXCLUDED.current_battery,
                battery_health = EXCLUDED.battery_health,
                vehicle_load = EXCLUDED.vehicle_load,
                ambient_temperature = EXCLUDED.ambient_temperature,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(&data.ev_model)
        .bind(data.battery_capacity)
        .bind(data.current_battery)
        .bind(data.battery_health)
        .bind(data.vehicle_load)
        .bind(data.ambient_temperature)
        .execute(&self.pool)
        .await?;

        tracing::info!("Profile upserted for {user_id} (new: {is_new})");
        Ok(UpsertOutcome {
            success: true,
            is_new,
        })
    }
}
