use serde::Deserialize;

use super::error::RemoteServiceError;
use super::wire::TaskPayload;

/// The server wraps every response in `{success, data, message}`. Consuming
/// the flag here keeps transport-shape details out of the sync core.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_data(self) -> Result<T, RemoteServiceError> {
        if !self.success {
            return Err(RemoteServiceError::Rejected(
                self.message
                    .unwrap_or_else(|| "unspecified server error".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| RemoteServiceError::InvalidPayload("missing data field".to_string()))
    }
}

/// Response shape of the bulk-sync endpoint, which reports the server's full
/// list under `serverTasks` instead of `data`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEnvelope {
    pub success: bool,
    pub server_tasks: Option<Vec<TaskPayload>>,
    pub message: Option<String>,
}

impl SyncEnvelope {
    pub fn into_tasks(self) -> Result<Vec<TaskPayload>, RemoteServiceError> {
        if !self.success {
            return Err(RemoteServiceError::Rejected(
                self.message
                    .unwrap_or_else(|| "unspecified server error".to_string()),
            ));
        }
        self.server_tasks.ok_or_else(|| {
            RemoteServiceError::InvalidPayload("missing serverTasks field".to_string())
        })
    }
}
