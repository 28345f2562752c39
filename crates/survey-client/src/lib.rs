//! Survey Client - typed access to the survey API
//!
//! Provides:
//! - `SurveyClient` covering every authenticated endpoint
//! - The `TokenProvider` seam for bearer tokens
//! - A single forced-refresh retry when the server reports an expired token

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod error;
pub mod token;

pub use client::SurveyClient;
pub use survey_core::SurveyResults;
pub use error::{ClientError, EXPIRED_TOKEN_CODE};
pub use token::{StaticToken, TokenProvider};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
