//! Remote backend adapter.

mod http;

pub use http::{BackendError, HttpBackend};
