use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Goal, GoalRow};

/// Read-only access to the targets set elsewhere in the app.
#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn get_goal(&self, user_id: Uuid) -> anyhow::Result<Option<Goal>>;
}

#[derive(Clone)]
pub struct PgGoalStore {
    db: PgPool,
}

impl PgGoalStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GoalStore for PgGoalStore {
    async fn get_goal(&self, user_id: Uuid) -> anyhow::Result<Option<Goal>> {
        let row = sqlx::query_as::<_, GoalRow>(
            r#"
            SELECT goal_type, daily_calories, daily_protein
              FROM goals
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get goal")?;
        Ok(row.map(Goal::from))
    }
}
