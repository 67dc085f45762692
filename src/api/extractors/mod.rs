//! Custom request extractors.
//!
//! Both reject with `AppError`, so malformed input gets the usual JSON
//! error body.

mod validated_json;
mod validated_query;

pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
