//! Error handling for the gateway

mod error;

pub use error::{ApiError, ErrorDetail, ErrorResponse, Result};
