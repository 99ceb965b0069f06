use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::storage::StorageClient;

/// Logical folder all cover objects live under.
pub const COVER_FOLDER: &str = "library";

/// A stored cover: durable public URL plus the key it was written under.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub url: String,
    pub key: String,
}

/// Decoded inline image payload.
pub struct InlineImage {
    pub body: Bytes,
    pub content_type: String,
}

/// Parse an inline image: either a `data:<mime>;base64,<payload>` URL or a
/// bare base64 string.
pub fn decode_inline_image(raw: &str) -> anyhow::Result<InlineImage> {
    let (content_type, payload) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (mime, b64) = rest.split_once(";base64,").context("malformed data URL")?;
            (mime.to_string(), b64)
        }
        None => ("application/octet-stream".to_string(), raw),
    };
    let bytes = BASE64
        .decode(payload.trim())
        .context("invalid base64 image data")?;
    Ok(InlineImage {
        body: Bytes::from(bytes),
        content_type,
    })
}

/// Upload a cover and return its public URL together with the storage key.
/// The key is recorded next to the URL; it is never re-derived from the URL
/// later.
pub async fn upload_cover(
    storage: &dyn StorageClient,
    raw_image: &str,
) -> anyhow::Result<StoredAsset> {
    let image = decode_inline_image(raw_image)?;
    let ext = ext_from_mime(&image.content_type).unwrap_or("bin");
    let key = format!("{}/{}.{}", COVER_FOLDER, Uuid::new_v4(), ext);
    storage
        .put_object(&key, image.body, &image.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    let url = storage.public_url(&key);
    Ok(StoredAsset { url, key })
}

/// Best-effort removal of a stored cover. Failures are logged and swallowed;
/// the caller's record operation proceeds either way.
pub async fn delete_cover(storage: &dyn StorageClient, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        warn!(error = %e, key, "cover deletion failed; asset left orphaned");
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::async_trait;
    use std::sync::Mutex;

    /// Records puts and deletes; `fail_delete` simulates an unreachable
    /// media service.
    #[derive(Default)]
    struct RecordingStorage {
        puts: Mutex<Vec<(String, String)>>,
        deletes: Mutex<Vec<String>>,
        fail_delete: bool,
    }

    #[async_trait]
    impl StorageClient for RecordingStorage {
        async fn put_object(&self, key: &str, _body: Bytes, ct: &str) -> anyhow::Result<()> {
            self.puts
                .lock()
                .unwrap()
                .push((key.to_string(), ct.to_string()));
            Ok(())
        }

        async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
            if self.fail_delete {
                anyhow::bail!("delete refused");
            }
            self.deletes.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("https://covers.test/{}", key)
        }
    }

    #[test]
    fn decodes_data_url_with_mime() {
        let img = decode_inline_image("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(img.content_type, "image/png");
        assert_eq!(&img.body[..], b"hello");
    }

    #[test]
    fn decodes_bare_base64() {
        let img = decode_inline_image("aGVsbG8=").unwrap();
        assert_eq!(img.content_type, "application/octet-stream");
        assert_eq!(&img.body[..], b"hello");
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(decode_inline_image("data:image/png,no-base64-marker").is_err());
        assert!(decode_inline_image("!!! not base64 !!!").is_err());
    }

    #[test]
    fn ext_from_mime_known_and_unknown() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/pdf"), None);
    }

    #[tokio::test]
    async fn upload_cover_keys_under_library_folder() {
        let storage = RecordingStorage::default();
        let asset = upload_cover(&storage, "data:image/jpeg;base64,aGVsbG8=")
            .await
            .unwrap();

        assert!(asset.key.starts_with("library/"));
        assert!(asset.key.ends_with(".jpg"));
        assert_eq!(asset.url, format!("https://covers.test/{}", asset.key));

        let puts = storage.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, asset.key);
        assert_eq!(puts[0].1, "image/jpeg");
    }

    #[tokio::test]
    async fn upload_cover_falls_back_to_bin_extension() {
        let storage = RecordingStorage::default();
        let asset = upload_cover(&storage, "aGVsbG8=").await.unwrap();
        assert!(asset.key.ends_with(".bin"));
    }

    #[tokio::test]
    async fn delete_cover_is_best_effort() {
        let storage = RecordingStorage {
            fail_delete: true,
            ..Default::default()
        };
        // Must not panic or surface the failure.
        delete_cover(&storage, "library/gone.jpg").await;
        assert!(storage.deletes.lock().unwrap().is_empty());

        let ok = RecordingStorage::default();
        delete_cover(&ok, "library/gone.jpg").await;
        assert_eq!(ok.deletes.lock().unwrap().as_slice(), ["library/gone.jpg"]);
    }
}
