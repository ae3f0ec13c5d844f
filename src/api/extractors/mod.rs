//! Request extractors that turn rejections into `{"error": ...}` responses.

mod json_body;
mod path;
mod query;
mod validated_json;

pub use json_body::ApiJson;
pub use path::ApiPath;
pub use query::ApiQuery;
pub use validated_json::ValidatedJson;
