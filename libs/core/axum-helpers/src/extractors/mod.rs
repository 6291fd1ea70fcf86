//! Extractors that render their rejections through [`AppError`](crate::errors::AppError),
//! so malformed input always produces the standard error body.

pub mod json_body;
pub mod query_params;
pub mod uuid_path;

pub use json_body::JsonBody;
pub use query_params::QueryParams;
pub use uuid_path::UuidPath;
