//! MongoDB store
//!
//! One client, two collections. Every operation is a single-document
//! command, so no sessions or transactions are involved.

use crate::documents::{to_bson_date, ResponseDocument, SurveyDocument};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, to_bson, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use survey_core::{
    now, Answer, Question, Response, ResponseId, ResponseStore, StoreError, Survey, SurveyId,
    SurveyStore, SurveyUpdate, UserId,
};

/// Collection holding survey documents
pub const SURVEYS_COLLECTION: &str = "surveys";

/// Collection holding response documents
pub const RESPONSES_COLLECTION: &str = "responses";

/// Document store backed by MongoDB
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    surveys: Collection<SurveyDocument>,
    responses: Collection<ResponseDocument>,
}

impl MongoStore {
    /// Connect to `uri`, select `db_name` and ensure indexes exist
    ///
    /// # Errors
    /// `StoreError::Backend` if the URI is invalid or the server cannot be
    /// reached.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await.map_err(StoreError::backend)?;
        let db = client.database(db_name);

        let store = Self {
            surveys: db.collection(SURVEYS_COLLECTION),
            responses: db.collection(RESPONSES_COLLECTION),
            client,
        };
        store.ensure_indexes().await?;

        tracing::info!(db = db_name, "connected to MongoDB");
        Ok(store)
    }

    /// Shut down the driver, waiting for in-flight operations
    pub async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB connection closed");
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let by_owner = IndexModel::builder()
            .keys(doc! { "ownerId": 1, "createdAt": -1 })
            .options(IndexOptions::builder().name("owner_created".to_string()).build())
            .build();
        self.surveys
            .create_index(by_owner)
            .await
            .map_err(StoreError::backend)?;

        for field in ["surveyId", "respondentId"] {
            let index = IndexModel::builder().keys(doc! { field: 1 }).build();
            self.responses
                .create_index(index)
                .await
                .map_err(StoreError::backend)?;
        }
        Ok(())
    }

    async fn find_responses(&self, filter: Document) -> Result<Vec<Response>, StoreError> {
        let docs: Vec<ResponseDocument> = self
            .responses
            .find(filter)
            .sort(doc! { "submittedAt": 1, "_id": 1 })
            .await
            .map_err(StoreError::backend)?
            .try_collect()
            .await
            .map_err(StoreError::backend)?;

        docs.into_iter().map(Response::try_from).collect()
    }
}

fn owned_filter(id: &SurveyId, owner: &UserId) -> Document {
    doc! { "_id": id.to_string(), "ownerId": owner.as_str() }
}

#[async_trait]
impl SurveyStore for MongoStore {
    async fn create_survey(
        &self,
        owner: &UserId,
        title: &str,
        questions: Vec<Question>,
    ) -> Result<Survey, StoreError> {
        let survey = Survey::new(owner.clone(), title, questions);
        self.surveys
            .insert_one(SurveyDocument::from(&survey))
            .await
            .map_err(StoreError::backend)?;

        tracing::debug!(survey = %survey.id, owner = %owner, "survey created");
        Ok(survey)
    }

    async fn get_survey(&self, id: &SurveyId) -> Result<Survey, StoreError> {
        self.surveys
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::SurveyNotFound(*id))
            .and_then(Survey::try_from)
    }

    async fn list_surveys_by_owner(&self, owner: &UserId) -> Result<Vec<Survey>, StoreError> {
        // Ids are minted monotonically, so `_id` breaks same-millisecond ties
        let docs: Vec<SurveyDocument> = self
            .surveys
            .find(doc! { "ownerId": owner.as_str() })
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await
            .map_err(StoreError::backend)?
            .try_collect()
            .await
            .map_err(StoreError::backend)?;

        docs.into_iter().map(Survey::try_from).collect()
    }

    async fn update_survey(
        &self,
        id: &SurveyId,
        owner: &UserId,
        update: SurveyUpdate,
    ) -> Result<Survey, StoreError> {
        let questions = to_bson(&update.questions).map_err(StoreError::backend)?;
        let mut set = doc! {
            "questions": questions,
            "updatedAt": to_bson_date(now()),
        };
        if let Some(title) = update.title {
            set.insert("title", title);
        }

        self.surveys
            .find_one_and_update(owned_filter(id, owner), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::NotFoundOrUnauthorized(*id))
            .and_then(Survey::try_from)
    }

    async fn delete_survey(&self, id: &SurveyId, owner: &UserId) -> Result<(), StoreError> {
        let result = self
            .surveys
            .delete_one(owned_filter(id, owner))
            .await
            .map_err(StoreError::backend)?;

        if result.deleted_count == 0 {
            return Err(StoreError::NotFoundOrUnauthorized(*id));
        }
        Ok(())
    }
}

#[async_trait]
impl ResponseStore for MongoStore {
    async fn create_response(
        &self,
        survey_id: &SurveyId,
        respondent: &UserId,
        answers: Vec<Answer>,
    ) -> Result<Response, StoreError> {
        let response = Response::new(*survey_id, respondent.clone(), answers);
        self.responses
            .insert_one(ResponseDocument::from(&response))
            .await
            .map_err(StoreError::backend)?;

        tracing::debug!(response = %response.id, survey = %survey_id, "response recorded");
        Ok(response)
    }

    async fn list_responses_by_survey(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Vec<Response>, StoreError> {
        self.find_responses(doc! { "surveyId": survey_id.to_string() })
            .await
    }

    async fn list_responses_by_respondent(
        &self,
        respondent: &UserId,
    ) -> Result<Vec<Response>, StoreError> {
        self.find_responses(doc! { "respondentId": respondent.as_str() })
            .await
    }

    async fn delete_response(&self, id: &ResponseId) -> Result<(), StoreError> {
        let result = self
            .responses
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(StoreError::backend)?;

        if result.deleted_count == 0 {
            return Err(StoreError::ResponseNotFound(*id));
        }
        Ok(())
    }
}
