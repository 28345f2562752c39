//! Store traits
//!
//! Surveys and responses live in independent collections linked only by
//! identifier. Every operation touches at most one document, so backends
//! only need single-document atomicity. Concurrent updates are
//! last-write-wins.

use crate::error::StoreError;
use crate::types::{Answer, Question, Response, ResponseId, Survey, SurveyId, SurveyUpdate, UserId};
use async_trait::async_trait;

/// Persistence for surveys
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// Persist a new survey owned by `owner`
    async fn create_survey(
        &self,
        owner: &UserId,
        title: &str,
        questions: Vec<Question>,
    ) -> Result<Survey, StoreError>;

    /// Fetch a survey regardless of owner
    ///
    /// # Errors
    /// `StoreError::SurveyNotFound` when absent.
    async fn get_survey(&self, id: &SurveyId) -> Result<Survey, StoreError>;

    /// All surveys of `owner`, newest first by creation time
    async fn list_surveys_by_owner(&self, owner: &UserId) -> Result<Vec<Survey>, StoreError>;

    /// Replace title (when given) and questions of an owned survey
    ///
    /// # Errors
    /// `StoreError::NotFoundOrUnauthorized` when the survey is absent or
    /// belongs to someone else.
    async fn update_survey(
        &self,
        id: &SurveyId,
        owner: &UserId,
        update: SurveyUpdate,
    ) -> Result<Survey, StoreError>;

    /// Delete an owned survey
    ///
    /// # Errors
    /// `StoreError::NotFoundOrUnauthorized` when the survey is absent or
    /// belongs to someone else.
    async fn delete_survey(&self, id: &SurveyId, owner: &UserId) -> Result<(), StoreError>;
}

/// Persistence for submitted responses
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Record one submission
    async fn create_response(
        &self,
        survey_id: &SurveyId,
        respondent: &UserId,
        answers: Vec<Answer>,
    ) -> Result<Response, StoreError>;

    /// Responses to one survey in submission order
    async fn list_responses_by_survey(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Vec<Response>, StoreError>;

    /// Responses by one respondent in submission order
    async fn list_responses_by_respondent(
        &self,
        respondent: &UserId,
    ) -> Result<Vec<Response>, StoreError>;

    /// Delete a response
    ///
    /// # Errors
    /// `StoreError::ResponseNotFound` when absent.
    async fn delete_response(&self, id: &ResponseId) -> Result<(), StoreError>;
}

/// Fetch a survey only if `owner` owns it.
///
/// Absence and foreign ownership are indistinguishable to the caller.
///
/// # Errors
/// `StoreError::NotFoundOrUnauthorized`, or the backend failure.
pub async fn fetch_owned(
    store: &dyn SurveyStore,
    id: &SurveyId,
    owner: &UserId,
) -> Result<Survey, StoreError> {
    let survey = store
        .get_survey(id)
        .await
        .map_err(StoreError::hide_ownership)?;

    if survey.is_owned_by(owner) {
        Ok(survey)
    } else {
        tracing::debug!(survey = %id, caller = %owner, "ownership check failed");
        Err(StoreError::NotFoundOrUnauthorized(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_owned_rejects_foreign_owner() {
        let survey = Survey::new(UserId::new("alice"), "Mine", Vec::new());
        let id = survey.id;

        let mut store = MockSurveyStore::new();
        store
            .expect_get_survey()
            .times(2)
            .returning(move |_| Ok(survey.clone()));

        let owned = fetch_owned(&store, &id, &UserId::new("alice")).await;
        assert!(owned.is_ok());

        let foreign = fetch_owned(&store, &id, &UserId::new("bob")).await;
        assert!(matches!(foreign, Err(StoreError::NotFoundOrUnauthorized(got)) if got == id));
    }

    #[tokio::test]
    async fn fetch_owned_hides_missing_survey() {
        let id = SurveyId::new();

        let mut store = MockSurveyStore::new();
        store
            .expect_get_survey()
            .returning(|id| Err(StoreError::SurveyNotFound(*id)));

        let result = fetch_owned(&store, &id, &UserId::new("alice")).await;
        assert!(matches!(result, Err(StoreError::NotFoundOrUnauthorized(_))));
    }
}
