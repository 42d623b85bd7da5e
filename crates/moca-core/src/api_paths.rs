//! Remote store path conventions.
//!
//! Pure string functions, relative to the configured API base URL. These
//! define the routes the Assessment Store and Media Store expose.

use crate::models::assessment::TestId;

pub const SUBMIT_TEST: &str = "test/";

pub fn test(id: &TestId) -> String {
    format!("test/{id}/")
}

pub const UPLOAD_AUDIO: &str = "upload-audio/";

/// Multipart field name the Media Store reads the clip from.
pub const AUDIO_FORM_FIELD: &str = "audio";
