pub mod auth;
pub mod response;

pub use auth::extract_bearer_token;
pub use response::{respond_no_content, respond_with_error, respond_with_json};
