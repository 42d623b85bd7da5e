use serde::{Deserialize, Serialize};

/// A finalized recording, ready for upload to the Media Store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl AudioClip {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
