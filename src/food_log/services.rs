use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{error, info, instrument};

use super::dto::{ManualFields, StoredEntry};
use super::repo::FoodLogStore;
use crate::context::RequestContext;
use crate::error::{EntryError, ManualInputError};
use crate::images::services::{discard_image, store_image, UploadItem};
use crate::nutrition::{FallbackPolicy, NutritionRecord, NutritionValidator, Provenance};
use crate::storage::StorageClient;
use crate::vision::VisionExtractor;

pub struct ImageUpload {
    pub body: Bytes,
    pub mime_type: String,
}

pub enum EntryInput {
    Image(ImageUpload),
    Manual(ManualFields),
}

/// Turns one incoming entry into a stored record.
#[derive(Clone)]
pub struct EntryPipeline {
    extractor: VisionExtractor,
    store: Arc<dyn FoodLogStore>,
    images: Arc<dyn StorageClient>,
}

impl EntryPipeline {
    pub fn new(
        extractor: VisionExtractor,
        store: Arc<dyn FoodLogStore>,
        images: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            extractor,
            store,
            images,
        }
    }

    pub async fn submit(
        &self,
        ctx: &RequestContext,
        input: EntryInput,
    ) -> Result<StoredEntry, EntryError> {
        match input {
            EntryInput::Image(upload) => self.submit_image(ctx, upload).await,
            EntryInput::Manual(fields) => self.submit_manual(ctx, fields).await,
        }
    }

    #[instrument(skip(self, upload), fields(user_id = %ctx.user_id, date = %ctx.date, bytes = upload.body.len()))]
    async fn submit_image(
        &self,
        ctx: &RequestContext,
        upload: ImageUpload,
    ) -> Result<StoredEntry, EntryError> {
        let mime_type = self
            .extractor
            .check_format(&upload.mime_type)
            .map_err(EntryError::UnsupportedFormat)?;

        let attempt = self
            .extractor
            .extract(&upload.body, mime_type)
            .await
            .and_then(|candidate| NutritionValidator::into_record(&candidate).map_err(Into::into));
        let resolution = FallbackPolicy::resolve(attempt);

        let key = store_image(
            self.images.as_ref(),
            ctx,
            UploadItem {
                body: upload.body,
                content_type: mime_type,
            },
        )
        .await
        .map_err(EntryError::Storage)?;

        let mut record = resolution.record;
        record.image_reference = Some(key.clone());

        match self.persist(ctx, record, resolution.provenance, resolution.warning).await {
            Ok(entry) => Ok(entry),
            Err(e) => {
                discard_image(self.images.as_ref(), &key).await;
                Err(e)
            }
        }
    }

    #[instrument(skip(self, fields), fields(user_id = %ctx.user_id, date = %ctx.date))]
    async fn submit_manual(
        &self,
        ctx: &RequestContext,
        fields: ManualFields,
    ) -> Result<StoredEntry, EntryError> {
        let record = parse_manual(fields)?;
        self.persist(ctx, record, Provenance::Manual, None).await
    }

    async fn persist(
        &self,
        ctx: &RequestContext,
        record: NutritionRecord,
        provenance: Provenance,
        warning: Option<String>,
    ) -> Result<StoredEntry, EntryError> {
        let id = self
            .store
            .append(ctx.user_id, ctx.date, &record, provenance)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %ctx.user_id, "append food log failed");
                EntryError::Storage(e)
            })?;

        info!(
            %id,
            user_id = %ctx.user_id,
            date = %ctx.date,
            provenance = provenance.as_str(),
            calories = record.calories,
            "food logged"
        );
        Ok(StoredEntry {
            id,
            date: ctx.date,
            record,
            provenance,
            warning,
        })
    }
}

/// Manual entries are user errors when malformed; there is no fallback.
pub fn parse_manual(fields: ManualFields) -> Result<NutritionRecord, ManualInputError> {
    let food_name = fields.food_name.trim().to_string();
    if food_name.is_empty() {
        return Err(ManualInputError::EmptyName);
    }
    let calories = whole_number("calories", fields.calories.as_ref())?;
    let protein = amount("protein", fields.protein.as_ref())?;
    let carbs = amount("carbs", fields.carbs.as_ref())?;
    let fats = amount("fats", fields.fats.as_ref())?;

    Ok(NutritionRecord {
        food_name,
        calories,
        protein,
        carbs,
        fats,
        vitamins: fields.vitamins,
        minerals: fields.minerals,
        image_reference: None,
    })
}

fn amount(field: &'static str, value: Option<&Value>) -> Result<f64, ManualInputError> {
    let not_numeric = |v: &Value| ManualInputError::NotNumeric {
        field,
        value: v.to_string(),
    };
    let v = match value {
        None | Some(Value::Null) => return Err(ManualInputError::Missing(field)),
        Some(v) => v,
    };
    let n = match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| not_numeric(v))?,
        Value::String(s) if s.trim().is_empty() => return Err(ManualInputError::Missing(field)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| not_numeric(v))?,
        _ => return Err(not_numeric(v)),
    };
    if !n.is_finite() {
        return Err(not_numeric(v));
    }
    if n < 0.0 {
        return Err(ManualInputError::Negative(field));
    }
    Ok(n)
}

fn whole_number(field: &'static str, value: Option<&Value>) -> Result<u32, ManualInputError> {
    let n = amount(field, value)?;
    if n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return Err(ManualInputError::NotInteger(field));
    }
    Ok(n as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::UNKNOWN_FOOD;
    use crate::testing::{FakeStorage, MemoryFoodLogStore, StubVision};
    use serde_json::json;
    use std::time::Duration;
    use time::macros::date;
    use uuid::Uuid;

    const BOWL: &str = r#"{"food_name": "Healthy Lunch Bowl", "calories": 450, "protein": 20.0, "carbs": 25.0, "fats": 30.0, "vitamins": "Vitamin C, Vitamin A", "minerals": "Iron, Potassium"}"#;

    struct Harness {
        pipeline: EntryPipeline,
        store: Arc<MemoryFoodLogStore>,
        storage: Arc<FakeStorage>,
        vision: Arc<StubVision>,
        ctx: RequestContext,
    }

    fn harness(vision: StubVision) -> Harness {
        let vision = Arc::new(vision);
        let store = Arc::new(MemoryFoodLogStore::default());
        let storage = Arc::new(FakeStorage::default());
        let pipeline = EntryPipeline::new(
            VisionExtractor::new(vision.clone(), Duration::from_secs(5)),
            store.clone(),
            storage.clone(),
        );
        Harness {
            pipeline,
            store,
            storage,
            vision,
            ctx: RequestContext::new(Uuid::new_v4(), date!(2024 - 06 - 15)),
        }
    }

    fn manual(calories: Value, protein: Value, carbs: Value, fats: Value) -> EntryInput {
        EntryInput::Manual(ManualFields {
            food_name: "Paneer Wrap".into(),
            calories: Some(calories),
            protein: Some(protein),
            carbs: Some(carbs),
            fats: Some(fats),
            vitamins: "Vitamin B12".into(),
            minerals: "Calcium".into(),
        })
    }

    fn image(mime: &str) -> EntryInput {
        EntryInput::Image(ImageUpload {
            body: Bytes::from_static(b"\xff\xd8\xff\xe0fake-jpeg"),
            mime_type: mime.into(),
        })
    }

    #[tokio::test]
    async fn manual_entry_is_stored_verbatim() {
        let h = harness(StubVision::replying(BOWL));
        let stored = h
            .pipeline
            .submit(&h.ctx, manual(json!(420), json!(22.5), json!(38), json!(16.25)))
            .await
            .unwrap();

        assert_eq!(stored.provenance, Provenance::Manual);
        assert!(stored.warning.is_none());
        let expected = NutritionRecord {
            food_name: "Paneer Wrap".into(),
            calories: 420,
            protein: 22.5,
            carbs: 38.0,
            fats: 16.25,
            vitamins: "Vitamin B12".into(),
            minerals: "Calcium".into(),
            image_reference: None,
        };
        assert_eq!(stored.record, expected);

        let listed = h.store.list(h.ctx.user_id, h.ctx.date).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].record, expected);
        assert_eq!(listed[0].id, stored.id);
        assert_eq!(h.vision.calls(), 0);
    }

    #[test]
    fn manual_text_fields_are_kept_as_typed() {
        let record = parse_manual(ManualFields {
            food_name: "  Idli  ".into(),
            calories: Some(json!(120)),
            protein: Some(json!(4)),
            carbs: Some(json!(24)),
            fats: Some(json!(1)),
            vitamins: " Vitamin C, ".into(),
            minerals: "Iron ".into(),
        })
        .unwrap();
        assert_eq!(record.food_name, "Idli");
        assert_eq!(record.vitamins, " Vitamin C, ");
        assert_eq!(record.minerals, "Iron ");
    }

    #[tokio::test]
    async fn manual_entry_accepts_form_strings() {
        let h = harness(StubVision::replying(BOWL));
        let stored = h
            .pipeline
            .submit(&h.ctx, manual(json!("300"), json!(" 12.5"), json!("40"), json!("0")))
            .await
            .unwrap();
        assert_eq!(stored.record.calories, 300);
        assert_eq!(stored.record.protein, 12.5);
        assert_eq!(stored.record.fats, 0.0);
    }

    #[tokio::test]
    async fn negative_manual_field_is_rejected_and_nothing_stored() {
        let h = harness(StubVision::replying(BOWL));
        for input in [
            manual(json!(-1), json!(1), json!(1), json!(1)),
            manual(json!(100), json!(-0.5), json!(1), json!(1)),
            manual(json!(100), json!(1), json!(-3), json!(1)),
            manual(json!(100), json!(1), json!(1), json!("-2")),
        ] {
            let err = h.pipeline.submit(&h.ctx, input).await.unwrap_err();
            assert!(matches!(
                err,
                EntryError::InvalidManualInput(ManualInputError::Negative(_))
            ));
        }
        assert_eq!(h.store.count(h.ctx.user_id, h.ctx.date), 0);
    }

    #[tokio::test]
    async fn malformed_manual_fields_are_rejected() {
        let h = harness(StubVision::replying(BOWL));

        let err = h
            .pipeline
            .submit(&h.ctx, manual(json!(12.5), json!(1), json!(1), json!(1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EntryError::InvalidManualInput(ManualInputError::NotInteger("calories"))
        ));

        let err = h
            .pipeline
            .submit(&h.ctx, manual(json!(100), json!("lots"), json!(1), json!(1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EntryError::InvalidManualInput(ManualInputError::NotNumeric { field: "protein", .. })
        ));

        let missing = EntryInput::Manual(ManualFields {
            food_name: "Tea".into(),
            calories: Some(json!(5)),
            ..Default::default()
        });
        let err = h.pipeline.submit(&h.ctx, missing).await.unwrap_err();
        assert!(matches!(
            err,
            EntryError::InvalidManualInput(ManualInputError::Missing("protein"))
        ));

        let nameless = EntryInput::Manual(ManualFields {
            food_name: "   ".into(),
            calories: Some(json!(5)),
            protein: Some(json!(0)),
            carbs: Some(json!(0)),
            fats: Some(json!(0)),
            ..Default::default()
        });
        let err = h.pipeline.submit(&h.ctx, nameless).await.unwrap_err();
        assert!(matches!(
            err,
            EntryError::InvalidManualInput(ManualInputError::EmptyName)
        ));

        assert_eq!(h.store.count(h.ctx.user_id, h.ctx.date), 0);
    }

    #[tokio::test]
    async fn extracted_image_entry_is_stored_with_image_key() {
        let h = harness(StubVision::replying(&format!("```json\n{BOWL}\n```")));
        let stored = h.pipeline.submit(&h.ctx, image("image/jpeg")).await.unwrap();

        assert_eq!(stored.provenance, Provenance::Extracted);
        assert!(stored.warning.is_none());
        assert_eq!(stored.record.food_name, "Healthy Lunch Bowl");
        assert_eq!(stored.record.calories, 450);

        let key = stored.record.image_reference.clone().unwrap();
        assert!(key.starts_with(&format!("entries/{}/2024-06-15/", h.ctx.user_id)));
        assert!(key.ends_with(".jpg"));
        assert!(h.storage.contains(&key));
        assert_eq!(h.vision.calls(), 1);
        assert_eq!(h.store.count(h.ctx.user_id, h.ctx.date), 1);
    }

    #[tokio::test]
    async fn unsupported_format_fails_before_remote_call() {
        let h = harness(StubVision::replying(BOWL));
        for mime in ["image/gif", "image/webp", "application/pdf", ""] {
            let err = h.pipeline.submit(&h.ctx, image(mime)).await.unwrap_err();
            assert!(matches!(err, EntryError::UnsupportedFormat(_)));
        }
        assert_eq!(h.vision.calls(), 0);
        assert_eq!(h.store.count(h.ctx.user_id, h.ctx.date), 0);
        assert_eq!(h.storage.len(), 0);
    }

    #[tokio::test]
    async fn unparseable_vision_text_falls_back() {
        let h = harness(StubVision::replying("Looks like a tasty sandwich!"));
        let stored = h.pipeline.submit(&h.ctx, image("image/png")).await.unwrap();

        assert_eq!(stored.provenance, Provenance::Fallback);
        assert_eq!(stored.record.food_name, UNKNOWN_FOOD);
        assert_eq!(stored.record.calories, 0);
        assert_eq!(stored.record.protein, 0.0);
        assert_eq!(stored.record.carbs, 0.0);
        assert_eq!(stored.record.fats, 0.0);
        assert!(stored.warning.is_some());
        assert!(stored.record.image_reference.is_some());

        let listed = h.store.list(h.ctx.user_id, h.ctx.date).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn wrong_shape_and_remote_errors_fall_back() {
        let h = harness(StubVision::replying(r#"{"food_name": "Soup", "calories": 90}"#));
        let stored = h.pipeline.submit(&h.ctx, image("image/png")).await.unwrap();
        assert_eq!(stored.provenance, Provenance::Fallback);

        let h = harness(StubVision::failing("connection reset"));
        let stored = h.pipeline.submit(&h.ctx, image("image/jpeg")).await.unwrap();
        assert_eq!(stored.provenance, Provenance::Fallback);
        assert!(stored.warning.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn store_failure_surfaces_and_cleans_up_image() {
        let h = harness(StubVision::replying(BOWL));
        h.store.fail_appends(true);
        let err = h.pipeline.submit(&h.ctx, image("image/jpeg")).await.unwrap_err();
        assert!(matches!(err, EntryError::Storage(_)));
        assert_eq!(h.storage.len(), 0);
        assert_eq!(h.store.count(h.ctx.user_id, h.ctx.date), 0);
    }

    #[tokio::test]
    async fn image_storage_failure_surfaces_and_nothing_is_logged() {
        let h = harness(StubVision::replying(BOWL));
        h.storage.fail_puts(true);
        let err = h.pipeline.submit(&h.ctx, image("image/jpeg")).await.unwrap_err();
        assert!(matches!(err, EntryError::Storage(_)));
        assert_eq!(h.store.count(h.ctx.user_id, h.ctx.date), 0);
    }
}
