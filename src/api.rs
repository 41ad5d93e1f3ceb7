//! Typed client for the LocaTour backend
//!
//! Request/response functions for the chat and location endpoints with a
//! single error-normalization layer at the transport boundary.

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use types::*;
