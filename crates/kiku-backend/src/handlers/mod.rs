pub mod error;
pub mod health;
pub mod v1;

pub use error::ApiError;
