use moca_core::BoxFuture;
use moca_core::api_paths;
use moca_core::models::media::AudioClip;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::HttpStore;
use crate::error::StorageError;

/// Accepts recorded clips and returns where they were stored.
pub trait MediaStore: Send + Sync {
    /// `POST /upload-audio/`. Returns the stored clip's path.
    fn upload_audio<'a>(&'a self, clip: &'a AudioClip) -> BoxFuture<'a, Result<String, StorageError>>;
}

#[derive(Deserialize)]
struct UploadReceipt {
    audio_path: String,
}

impl MediaStore for HttpStore {
    fn upload_audio<'a>(&'a self, clip: &'a AudioClip) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            if clip.is_empty() {
                warn!(file_name = %clip.file_name, "uploading an empty clip");
            }

            let boundary = format!("moca-{}", Uuid::new_v4().simple());
            let body = multipart_body(&boundary, api_paths::AUDIO_FORM_FIELD, clip);
            let content_type = format!("multipart/form-data; boundary={boundary}");
            let url = self.url(api_paths::UPLOAD_AUDIO);
            let agent = self.agent();

            info!(url = %url, bytes = clip.bytes.len(), "uploading audio clip");

            let receipt = tokio::task::spawn_blocking(move || {
                agent
                    .post(url.as_str())
                    .header("Content-Type", content_type.as_str())
                    .send(body.as_slice())?
                    .body_mut()
                    .read_json::<UploadReceipt>()
            })
            .await?
            .map_err(|e| StorageError::from_ureq("upload audio", e))?;

            info!(audio_path = %receipt.audio_path, "audio clip stored");
            Ok(receipt.audio_path)
        })
    }
}

/// Encode a single-file `multipart/form-data` body.
pub fn multipart_body(boundary: &str, field: &str, clip: &AudioClip) -> Vec<u8> {
    let mut body = Vec::with_capacity(clip.bytes.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{}\"\r\n",
            header_safe(&clip.file_name)
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("Content-Type: {}\r\n\r\n", header_safe(&clip.mime_type)).as_bytes(),
    );
    body.extend_from_slice(&clip.bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Drop characters that would end a quoted string or the header line.
fn header_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '"' | '\r' | '\n'))
        .collect()
}
