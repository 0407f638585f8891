use std::sync::Arc;

use crate::aggregate::Aggregator;
use crate::config::AppConfig;
use crate::db;
use crate::food_log::{EntryPipeline, FoodLogStore, PgFoodLogStore};
use crate::goals::{GoalStore, PgGoalStore};
use crate::storage::{S3ImageStore, StorageClient};
use crate::vision::{GeminiClient, VisionClient, VisionExtractor};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn FoodLogStore>,
    pub goals: Arc<dyn GoalStore>,
    pub pipeline: EntryPipeline,
    pub aggregator: Aggregator,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await;

        let storage = Arc::new(S3ImageStore::connect(&config.storage).await?) as Arc<dyn StorageClient>;
        let vision = Arc::new(GeminiClient::new(&config.vision)?) as Arc<dyn VisionClient>;

        Ok(Self::from_parts(
            config,
            Arc::new(PgFoodLogStore::new(pool.clone())),
            Arc::new(PgGoalStore::new(pool)),
            storage,
            vision,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn FoodLogStore>,
        goals: Arc<dyn GoalStore>,
        storage: Arc<dyn StorageClient>,
        vision: Arc<dyn VisionClient>,
    ) -> Self {
        let extractor = VisionExtractor::new(vision, config.vision.timeout());
        let pipeline = EntryPipeline::new(extractor, store.clone(), storage);
        let aggregator = Aggregator::new(store.clone());
        Self {
            config,
            store,
            goals,
            pipeline,
            aggregator,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory state for router tests.
    pub fn fake(vision: crate::testing::StubVision) -> Self {
        Self::fake_with_goals(vision, crate::testing::MemoryGoalStore::default())
    }

    pub fn fake_with_goals(
        vision: crate::testing::StubVision,
        goals: crate::testing::MemoryGoalStore,
    ) -> Self {
        Self::from_parts(
            Arc::new(crate::testing::config()),
            Arc::new(crate::testing::MemoryFoodLogStore::default()),
            Arc::new(goals),
            Arc::new(crate::testing::FakeStorage::default()),
            Arc::new(vision),
        )
    }
}
