use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Row, sqlite::SqlitePool};
use tracing::info;
use viability_core::{ClientData, ClientDataStore, StoreError, SupportLevel, TimeInputMode};

use crate::decimal::get_decimal;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn get_date(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<NaiveDate, StoreError> {
    row.try_get::<NaiveDate, _>(column)
        .map_err(|e| StoreError::Database(format!("Failed to get {}: {}", column, e)))
}

fn get_code(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<String, StoreError> {
    row.try_get(column)
        .map_err(|e| StoreError::Database(format!("Failed to get {}: {}", column, e)))
}

fn row_to_client_data(row: &sqlx::sqlite::SqliteRow) -> Result<ClientData, StoreError> {
    let level_code = get_code(row, "support_level")?;
    let support_level = SupportLevel::parse(&level_code).ok_or_else(|| {
        StoreError::Database(format!("Invalid support level: {}", level_code))
    })?;
    let mode_code = get_code(row, "time_input_mode")?;
    let time_input_mode = TimeInputMode::parse(&mode_code).ok_or_else(|| {
        StoreError::Database(format!("Invalid time input mode: {}", mode_code))
    })?;

    Ok(ClientData {
        support_level,
        hourly_rate: get_decimal(row, "hourly_rate")?,
        time_input_mode,
        plan_start_date: get_date(row, "plan_start_date")?,
        plan_end_date: get_date(row, "plan_end_date")?,
        manual_weeks_remaining: get_decimal(row, "manual_weeks_remaining")?,
        total_budget: get_decimal(row, "total_budget")?,
        current_balance: get_decimal(row, "current_balance")?,
        hours_per_week: get_decimal(row, "hours_per_week")?,
    })
}

#[async_trait]
impl ClientDataStore for SqliteStore {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<ClientData>, StoreError> {
        let row = sqlx::query(
            "SELECT support_level, hourly_rate, time_input_mode,
                    plan_start_date, plan_end_date, manual_weeks_remaining,
                    total_budget, current_balance, hours_per_week
             FROM client_data WHERE store_key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.as_ref().map(row_to_client_data).transpose()
    }

    async fn save(
        &self,
        key: &str,
        data: &ClientData,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO client_data (
                store_key, support_level, hourly_rate, time_input_mode,
                plan_start_date, plan_end_date, manual_weeks_remaining,
                total_budget, current_balance, hours_per_week, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(store_key) DO UPDATE SET
                support_level = excluded.support_level,
                hourly_rate = excluded.hourly_rate,
                time_input_mode = excluded.time_input_mode,
                plan_start_date = excluded.plan_start_date,
                plan_end_date = excluded.plan_end_date,
                manual_weeks_remaining = excluded.manual_weeks_remaining,
                total_budget = excluded.total_budget,
                current_balance = excluded.current_balance,
                hours_per_week = excluded.hours_per_week,
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(data.support_level.as_str())
        .bind(data.hourly_rate.to_string())
        .bind(data.time_input_mode.as_str())
        .bind(data.plan_start_date)
        .bind(data.plan_end_date)
        .bind(data.manual_weeks_remaining.to_string())
        .bind(data.total_budget.to_string())
        .bind(data.current_balance.to_string())
        .bind(data.hours_per_week.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        info!(key, "saved client record");
        Ok(())
    }

    async fn delete(
        &self,
        key: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM client_data WHERE store_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        info!(key, "deleted client record");
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT store_key FROM client_data ORDER BY store_key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get("store_key")
                    .map_err(|e| StoreError::Database(e.to_string()))
            })
            .collect()
    }
}
