//! Integration tests against a live MongoDB
//!
//! Skipped unless `SURVEY_TEST_MONGODB_URI` points at a server. Each run uses
//! a fresh database name.

use pretty_assertions::assert_eq;
use survey_core::{
    Answer, Question, QuestionType, ResponseStore, StoreError, SurveyStore, SurveyUpdate, UserId,
    DEFAULT_SURVEY_TITLE,
};
use survey_mongo::MongoStore;

async fn store() -> Option<MongoStore> {
    let uri = std::env::var("SURVEY_TEST_MONGODB_URI").ok()?;
    let db_name = format!("survey_test_{}", ulid::Ulid::new().to_string().to_lowercase());
    Some(MongoStore::connect(&uri, &db_name).await.unwrap())
}

#[tokio::test]
async fn survey_lifecycle() {
    let Some(store) = store().await else {
        return;
    };
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");

    let created = store
        .create_survey(&alice, DEFAULT_SURVEY_TITLE, Vec::new())
        .await
        .unwrap();
    assert!(created.questions.is_empty());

    let questions = vec![
        Question::new(QuestionType::SingleChoice, "Color?").with_options(["red", "blue"]),
        Question::new(QuestionType::ShortText, "Name?").required(),
    ];
    let update = SurveyUpdate {
        title: Some("Quiz".to_string()),
        questions: questions.clone(),
    };

    let foreign = store.update_survey(&created.id, &bob, update.clone()).await;
    assert!(matches!(foreign, Err(StoreError::NotFoundOrUnauthorized(_))));

    store.update_survey(&created.id, &alice, update).await.unwrap();
    let reloaded = store.get_survey(&created.id).await.unwrap();
    assert_eq!(reloaded.title, "Quiz");
    assert_eq!(reloaded.questions, questions);

    let newer = store.create_survey(&alice, "Second", Vec::new()).await.unwrap();
    let listed: Vec<_> = store
        .list_surveys_by_owner(&alice)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(listed, vec![newer.id, created.id]);

    store.delete_survey(&created.id, &alice).await.unwrap();
    assert!(matches!(
        store.get_survey(&created.id).await,
        Err(StoreError::SurveyNotFound(_))
    ));

    store.close().await;
}

#[tokio::test]
async fn responses_are_scoped_by_survey() {
    let Some(store) = store().await else {
        return;
    };
    let alice = UserId::new("alice");
    let s1 = store.create_survey(&alice, "One", Vec::new()).await.unwrap();
    let s2 = store.create_survey(&alice, "Two", Vec::new()).await.unwrap();

    let response = store
        .create_response(&s1.id, &UserId::new("bob"), vec![Answer::new("q1", "yes")])
        .await
        .unwrap();

    let for_s1 = store.list_responses_by_survey(&s1.id).await.unwrap();
    assert_eq!(for_s1, vec![response.clone()]);
    assert!(store.list_responses_by_survey(&s2.id).await.unwrap().is_empty());

    store.delete_response(&response.id).await.unwrap();
    assert!(matches!(
        store.delete_response(&response.id).await,
        Err(StoreError::ResponseNotFound(_))
    ));

    store.close().await;
}
