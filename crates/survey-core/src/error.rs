//! Error types for survey-core
//!
//! Provides error handling for:
//! - Store operations (lookup, ownership, backend failures)
//! - Validation of submitted questions and answers
//! - Editor draft manipulation

use crate::types::{QuestionId, ResponseId, SurveyId};

/// Errors returned by survey and response stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Survey does not exist
    #[error("survey not found: {0}")]
    SurveyNotFound(SurveyId),

    /// Survey does not exist or belongs to another user
    #[error("survey not found or unauthorized: {0}")]
    NotFoundOrUnauthorized(SurveyId),

    /// Response does not exist
    #[error("response not found: {0}")]
    ResponseNotFound(ResponseId),

    /// Underlying database failure
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error from any displayable source
    #[inline]
    pub fn backend(source: impl std::fmt::Display) -> Self {
        Self::Backend(source.to_string())
    }

    /// Check if the error means the record is absent to the caller
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SurveyNotFound(_) | Self::NotFoundOrUnauthorized(_) | Self::ResponseNotFound(_)
        )
    }

    /// Collapse plain absence into the ownership-hiding variant
    #[must_use]
    pub fn hide_ownership(self) -> Self {
        match self {
            Self::SurveyNotFound(id) => Self::NotFoundOrUnauthorized(id),
            other => other,
        }
    }
}

/// Errors for client-submitted content
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Question without a type
    #[error("question {index}: type is required")]
    MissingQuestionType { index: usize },

    /// Question without prompt text
    #[error("question {index}: text is required")]
    MissingQuestionText { index: usize },

    /// Two questions in one survey share an id
    #[error("question {index}: duplicate id {id}")]
    DuplicateQuestionId { index: usize, id: QuestionId },

    /// Required request field absent
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Answer references a question the survey does not have
    #[error("answer references unknown question: {0}")]
    UnknownQuestion(QuestionId),
}

/// Errors from editing a draft
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// Drag index outside the question list
    #[error("index {index} out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },

    /// No question with this id in the draft
    #[error("question not found: {0}")]
    QuestionNotFound(QuestionId),

    /// Option index outside the option list
    #[error("option {index} out of range for {len} options")]
    OptionOutOfRange { index: usize, len: usize },

    /// Draft content failed validation
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let id = SurveyId::new();
        let err = StoreError::NotFoundOrUnauthorized(id);
        assert!(err.to_string().contains("not found or unauthorized"));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn store_error_not_found_classification() {
        assert!(StoreError::SurveyNotFound(SurveyId::new()).is_not_found());
        assert!(StoreError::ResponseNotFound(ResponseId::new()).is_not_found());
        assert!(!StoreError::backend("connection reset").is_not_found());
    }

    #[test]
    fn hide_ownership_maps_plain_absence() {
        let id = SurveyId::new();
        let hidden = StoreError::SurveyNotFound(id).hide_ownership();
        assert!(matches!(hidden, StoreError::NotFoundOrUnauthorized(got) if got == id));

        let backend = StoreError::backend("boom").hide_ownership();
        assert!(matches!(backend, StoreError::Backend(_)));
    }

    #[test]
    fn validation_error_names_position() {
        let err = ValidationError::MissingQuestionText { index: 3 };
        assert_eq!(err.to_string(), "question 3: text is required");
    }
}
