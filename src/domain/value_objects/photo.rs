use base64::Engine;
use serde::{Deserialize, Serialize};

/// Photo captured for a task: a base64 data URI plus the original filename.
/// Immutable once attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAttachment {
    data_uri: String,
    file_name: Option<String>,
}

impl PhotoAttachment {
    pub fn new(data_uri: String, file_name: Option<String>) -> Result<Self, String> {
        Self::validate(&data_uri)?;
        let file_name = file_name.filter(|name| !name.trim().is_empty());
        Ok(Self {
            data_uri,
            file_name,
        })
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    fn validate(data_uri: &str) -> Result<(), String> {
        if !data_uri.starts_with("data:") {
            return Err("Photo must be a data URI".to_string());
        }
        let payload = data_uri
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| "Photo data URI must carry a base64 payload".to_string())?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|err| format!("Photo payload is not valid base64: {}", err))?;
        Ok(())
    }
}
