pub mod types;
pub mod utils;
pub mod observability;
pub mod admin_http;
