use anyhow::Context;
use bytes::Bytes;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::storage::StorageClient;

pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
}

/// Collision-free key; caller-supplied filenames never reach storage.
pub fn image_key(ctx: &RequestContext, id: Uuid, content_type: &str) -> String {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!("entries/{}/{}/{}.{}", ctx.user_id, ctx.date, id, ext)
}

/// Uploads the photo and returns its opaque storage key.
#[instrument(skip(storage, img), fields(user_id = %ctx.user_id, date = %ctx.date))]
pub async fn store_image(
    storage: &dyn StorageClient,
    ctx: &RequestContext,
    img: UploadItem<'_>,
) -> anyhow::Result<String> {
    let key = image_key(ctx, Uuid::new_v4(), img.content_type);
    storage
        .put_object(&key, img.body, img.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(key)
}

/// Best-effort cleanup of an image whose record never got stored.
pub async fn discard_image(storage: &dyn StorageClient, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        warn!(error = %e, key, "failed to delete orphaned image");
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}
