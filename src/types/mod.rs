mod api_error;
mod status_code;
mod store_error;

pub use api_error::ApiError;
pub use status_code::ApiStatusCode;
pub use store_error::StoreError;
