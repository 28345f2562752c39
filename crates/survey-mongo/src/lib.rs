//! Survey Mongo - MongoDB store backend
//!
//! Implements `SurveyStore` and `ResponseStore` over the `surveys` and
//! `responses` collections.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod documents;
pub mod store;

pub use store::{MongoStore, RESPONSES_COLLECTION, SURVEYS_COLLECTION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
