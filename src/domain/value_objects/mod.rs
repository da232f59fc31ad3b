mod geo_point;
mod photo;
mod task_id;
mod task_title;

pub use geo_point::GeoPoint;
pub use photo::PhotoAttachment;
pub use task_id::TaskId;
pub use task_title::TaskTitle;
