pub mod client;
pub mod format;
pub mod resource;

pub use client::ApiClient;
pub use resource::{ListQuery, ListResult, ResourceClient};
