//! FlavoursVerse API adapter
//!
//! Typed access to the remote substitution, flavor, nutrition and NLP endpoints.

pub mod client;
pub mod error;
pub mod mock;

pub use client::{ApiClient, HttpApiClient, HttpApiClientBuilder};
pub use error::{ApiError, ApiResult};
pub use mock::MockApiClient;
