//! Survey Core - document model and storage seams
//!
//! The shared vocabulary of the survey service:
//! - Surveys, questions, responses and typed answers
//! - Store traits for the surveys and responses collections
//! - An in-memory store implementing both
//! - The editor draft used to assemble questions before saving
//!
//! # Example
//!
//! ```rust
//! use survey_core::prelude::*;
//!
//! # async fn example() -> Result<(), StoreError> {
//! let store = MemoryStore::new();
//! let owner = UserId::new("alice");
//!
//! let mut draft = SurveyDraft::new();
//! draft.append(Question::new(QuestionType::ShortText, "Your name?")).unwrap();
//!
//! let survey = store.create_survey(&owner, DEFAULT_SURVEY_TITLE, Vec::new()).await?;
//! let saved = store.update_survey(&survey.id, &owner, draft.to_update()).await?;
//! assert_eq!(saved.questions.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod editor;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use editor::{QuestionBuilder, SurveyDraft};
pub use error::{EditorError, StoreError, ValidationError};
pub use memory::MemoryStore;
pub use store::{fetch_owned, ResponseStore, SurveyStore};
pub use types::{
    now, validate_questions, Answer, AnswerValue, Question, QuestionId, QuestionInput,
    QuestionType, Response, ResponseId, Survey, SurveyId, SurveyResults, SurveyUpdate, Timestamp,
    UserId, DEFAULT_SURVEY_TITLE,
};

#[cfg(any(test, feature = "mocks"))]
pub use store::{MockResponseStore, MockSurveyStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with survey-core
    pub use crate::{
        Answer, AnswerValue, MemoryStore, Question, QuestionBuilder, QuestionType, Response,
        ResponseStore, StoreError, Survey, SurveyDraft, SurveyId, SurveyStore, SurveyUpdate,
        UserId, DEFAULT_SURVEY_TITLE,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
