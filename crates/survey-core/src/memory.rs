//! In-memory document store
//!
//! Implements both store traits on top of `DashMap`. Each entry carries an
//! insertion sequence so listings stay stable when timestamps collide within
//! a millisecond.

use crate::error::StoreError;
use crate::store::{ResponseStore, SurveyStore};
use crate::types::{Answer, Question, Response, ResponseId, Survey, SurveyId, SurveyUpdate, UserId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stored document with its insertion sequence
#[derive(Debug, Clone)]
struct Entry<T> {
    seq: u64,
    doc: T,
}

/// Process-local store for tests and single-node development
#[derive(Debug, Default)]
pub struct MemoryStore {
    surveys: DashMap<SurveyId, Entry<Survey>>,
    responses: DashMap<ResponseId, Entry<Response>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored surveys
    #[inline]
    #[must_use]
    pub fn survey_count(&self) -> usize {
        self.surveys.len()
    }

    /// Number of stored responses
    #[inline]
    #[must_use]
    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    /// Insert an already-built survey, keeping its id and timestamps
    pub fn insert_survey(&self, survey: Survey) {
        let seq = self.next_seq();
        self.surveys.insert(survey.id, Entry { seq, doc: survey });
    }

    /// Insert an already-built response, keeping its id and timestamp
    pub fn insert_response(&self, response: Response) {
        let seq = self.next_seq();
        self.responses.insert(response.id, Entry { seq, doc: response });
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn responses_where(&self, predicate: impl Fn(&Response) -> bool) -> Vec<Response> {
        let mut matching: Vec<Entry<Response>> = self
            .responses
            .iter()
            .filter(|entry| predicate(&entry.value().doc))
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by_key(|e| (e.doc.submitted_at, e.seq));
        matching.into_iter().map(|e| e.doc).collect()
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    async fn create_survey(
        &self,
        owner: &UserId,
        title: &str,
        questions: Vec<Question>,
    ) -> Result<Survey, StoreError> {
        let survey = Survey::new(owner.clone(), title, questions);
        self.insert_survey(survey.clone());

        tracing::debug!(survey = %survey.id, owner = %owner, "survey created");
        Ok(survey)
    }

    async fn get_survey(&self, id: &SurveyId) -> Result<Survey, StoreError> {
        self.surveys
            .get(id)
            .map(|entry| entry.doc.clone())
            .ok_or(StoreError::SurveyNotFound(*id))
    }

    async fn list_surveys_by_owner(&self, owner: &UserId) -> Result<Vec<Survey>, StoreError> {
        let mut owned: Vec<Entry<Survey>> = self
            .surveys
            .iter()
            .filter(|entry| entry.value().doc.is_owned_by(owner))
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first
        owned.sort_by(|a, b| (b.doc.created_at, b.seq).cmp(&(a.doc.created_at, a.seq)));

        Ok(owned.into_iter().map(|e| e.doc).collect())
    }

    async fn update_survey(
        &self,
        id: &SurveyId,
        owner: &UserId,
        update: SurveyUpdate,
    ) -> Result<Survey, StoreError> {
        let mut entry = self
            .surveys
            .get_mut(id)
            .filter(|entry| entry.doc.is_owned_by(owner))
            .ok_or(StoreError::NotFoundOrUnauthorized(*id))?;

        entry.doc.apply(update);
        Ok(entry.doc.clone())
    }

    async fn delete_survey(&self, id: &SurveyId, owner: &UserId) -> Result<(), StoreError> {
        self.surveys
            .remove_if(id, |_, entry| entry.doc.is_owned_by(owner))
            .map(|_| ())
            .ok_or(StoreError::NotFoundOrUnauthorized(*id))
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn create_response(
        &self,
        survey_id: &SurveyId,
        respondent: &UserId,
        answers: Vec<Answer>,
    ) -> Result<Response, StoreError> {
        let response = Response::new(*survey_id, respondent.clone(), answers);
        self.insert_response(response.clone());

        tracing::debug!(response = %response.id, survey = %survey_id, "response recorded");
        Ok(response)
    }

    async fn list_responses_by_survey(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Vec<Response>, StoreError> {
        Ok(self.responses_where(|r| &r.survey_id == survey_id))
    }

    async fn list_responses_by_respondent(
        &self,
        respondent: &UserId,
    ) -> Result<Vec<Response>, StoreError> {
        Ok(self.responses_where(|r| &r.respondent_id == respondent))
    }

    async fn delete_response(&self, id: &ResponseId) -> Result<(), StoreError> {
        self.responses
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::ResponseNotFound(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QuestionType, DEFAULT_SURVEY_TITLE};
    use pretty_assertions::assert_eq;

    fn alice() -> UserId {
        UserId::new("alice")
    }

    fn bob() -> UserId {
        UserId::new("bob")
    }

    #[tokio::test]
    async fn create_returns_fresh_empty_survey() {
        let store = MemoryStore::new();

        let first = store
            .create_survey(&alice(), DEFAULT_SURVEY_TITLE, Vec::new())
            .await
            .unwrap();
        let second = store
            .create_survey(&alice(), DEFAULT_SURVEY_TITLE, Vec::new())
            .await
            .unwrap();

        assert_eq!(first.title, "New Survey");
        assert!(first.questions.is_empty());
        assert_ne!(first.id, second.id);
        assert_eq!(store.survey_count(), 2);
    }

    #[tokio::test]
    async fn get_missing_survey_is_not_found() {
        let store = MemoryStore::new();
        let result = store.get_survey(&SurveyId::new()).await;
        assert!(matches!(result, Err(StoreError::SurveyNotFound(_))));
    }

    #[tokio::test]
    async fn list_by_owner_filters_and_orders_newest_first() {
        let store = MemoryStore::new();

        let older = store.create_survey(&alice(), "older", Vec::new()).await.unwrap();
        let _other = store.create_survey(&bob(), "bob's", Vec::new()).await.unwrap();
        let newer = store.create_survey(&alice(), "newer", Vec::new()).await.unwrap();

        let listed = store.list_surveys_by_owner(&alice()).await.unwrap();
        let ids: Vec<SurveyId> = listed.iter().map(|s| s.id).collect();

        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn update_by_foreign_owner_is_rejected() {
        let store = MemoryStore::new();
        let survey = store.create_survey(&alice(), "Mine", Vec::new()).await.unwrap();

        let update = SurveyUpdate {
            title: Some("Hijacked".to_string()),
            questions: Vec::new(),
        };
        let result = store.update_survey(&survey.id, &bob(), update).await;

        assert!(matches!(result, Err(StoreError::NotFoundOrUnauthorized(_))));
        let unchanged = store.get_survey(&survey.id).await.unwrap();
        assert_eq!(unchanged.title, "Mine");
    }

    #[tokio::test]
    async fn update_round_trips_question_order() {
        let store = MemoryStore::new();
        let survey = store.create_survey(&alice(), "Quiz", Vec::new()).await.unwrap();

        let questions = vec![
            Question::new(QuestionType::SingleChoice, "Color?").with_options(["red", "blue"]),
            Question::new(QuestionType::ShortText, "Name?").required(),
            Question::new(QuestionType::MultiChoice, "Pets?").with_options(["cat", "dog"]),
        ];
        let update = SurveyUpdate {
            title: None,
            questions: questions.clone(),
        };

        store.update_survey(&survey.id, &alice(), update).await.unwrap();
        let reloaded = store.get_survey(&survey.id).await.unwrap();

        assert_eq!(reloaded.title, "Quiz");
        assert_eq!(reloaded.questions, questions);
    }

    #[tokio::test]
    async fn delete_requires_owner() {
        let store = MemoryStore::new();
        let survey = store.create_survey(&alice(), "Mine", Vec::new()).await.unwrap();

        let foreign = store.delete_survey(&survey.id, &bob()).await;
        assert!(matches!(foreign, Err(StoreError::NotFoundOrUnauthorized(_))));

        store.delete_survey(&survey.id, &alice()).await.unwrap();
        assert!(store.get_survey(&survey.id).await.is_err());
    }

    #[tokio::test]
    async fn responses_are_scoped_by_survey_and_respondent() {
        let store = MemoryStore::new();
        let s1 = SurveyId::new();
        let s2 = SurveyId::new();

        let first = store
            .create_response(&s1, &bob(), vec![Answer::new("q1", "yes")])
            .await
            .unwrap();
        let second = store
            .create_response(&s1, &alice(), vec![Answer::new("q1", true)])
            .await
            .unwrap();
        let _elsewhere = store
            .create_response(&s2, &bob(), Vec::new())
            .await
            .unwrap();

        let for_s1 = store.list_responses_by_survey(&s1).await.unwrap();
        assert_eq!(
            for_s1.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );

        let by_bob = store.list_responses_by_respondent(&bob()).await.unwrap();
        assert_eq!(by_bob.len(), 2);
        assert!(by_bob.iter().all(|r| r.respondent_id == bob()));
    }

    #[tokio::test]
    async fn delete_response_removes_once() {
        let store = MemoryStore::new();
        let response = store
            .create_response(&SurveyId::new(), &bob(), Vec::new())
            .await
            .unwrap();

        store.delete_response(&response.id).await.unwrap();
        let again = store.delete_response(&response.id).await;

        assert!(matches!(again, Err(StoreError::ResponseNotFound(_))));
        assert_eq!(store.response_count(), 0);
    }
}
