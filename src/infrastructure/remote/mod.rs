mod envelope;
mod error;
mod http_task_service;
mod wire;

pub use error::RemoteServiceError;
pub use http_task_service::HttpTaskService;
