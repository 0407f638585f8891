use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::repo_types::{DaySums, FoodLogEntry, FoodLogRow};
use crate::nutrition::{NutritionRecord, Provenance};

/// Append-only log of nutrition records keyed by user and day.
#[async_trait]
pub trait FoodLogStore: Send + Sync {
    async fn append(
        &self,
        user_id: Uuid,
        date: Date,
        record: &NutritionRecord,
        provenance: Provenance,
    ) -> anyhow::Result<Uuid>;

    /// Entries for one day, oldest first.
    async fn list(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<FoodLogEntry>>;

    async fn sum_for_day(&self, user_id: Uuid, date: Date) -> anyhow::Result<DaySums>;
}

#[derive(Clone)]
pub struct PgFoodLogStore {
    db: PgPool,
}

impl PgFoodLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FoodLogStore for PgFoodLogStore {
    async fn append(
        &self,
        user_id: Uuid,
        date: Date,
        record: &NutritionRecord,
        provenance: Provenance,
    ) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        let mut tx = self.db.begin().await.context("begin tx")?;

        // Appends for one user are serialized; other users are unaffected.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("lock user log")?;

        sqlx::query(
            r#"
            INSERT INTO food_logs
                (id, user_id, log_date, food_name, calories, protein, carbs, fats,
                 vitamins, minerals, image_key, provenance)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(date)
        .bind(&record.food_name)
        .bind(i64::from(record.calories))
        .bind(record.protein)
        .bind(record.carbs)
        .bind(record.fats)
        .bind(&record.vitamins)
        .bind(&record.minerals)
        .bind(record.image_reference.as_deref())
        .bind(provenance.as_str())
        .execute(&mut *tx)
        .await
        .context("insert food log")?;

        tx.commit().await.context("commit tx")?;
        Ok(id)
    }

    async fn list(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<FoodLogEntry>> {
        let rows = sqlx::query_as::<_, FoodLogRow>(
            r#"
            SELECT id, user_id, log_date, food_name, calories, protein, carbs, fats,
                   vitamins, minerals, image_key, provenance, created_at
              FROM food_logs
             WHERE user_id = $1 AND log_date = $2
             ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.db)
        .await
        .context("list food logs")?;

        rows.into_iter().map(FoodLogEntry::try_from).collect()
    }

    async fn sum_for_day(&self, user_id: Uuid, date: Date) -> anyhow::Result<DaySums> {
        let sums = sqlx::query_as::<_, DaySums>(
            r#"
            SELECT COALESCE(SUM(calories), 0)::BIGINT AS calories,
                   COALESCE(SUM(protein), 0)::DOUBLE PRECISION AS protein
              FROM food_logs
             WHERE user_id = $1 AND log_date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.db)
        .await
        .context("sum food logs")?;
        Ok(sums)
    }
}
