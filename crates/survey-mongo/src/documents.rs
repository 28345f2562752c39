//! BSON document shapes
//!
//! Domain types keep chrono timestamps and ULID ids; stored documents use
//! string `_id`s and native BSON dates so the collections stay queryable
//! from any driver.

use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use survey_core::{
    Answer, Question, Response, ResponseId, StoreError, Survey, SurveyId, Timestamp, UserId,
};

/// Stored form of a [`Survey`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SurveyDocument {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    pub(crate) owner_id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) questions: Vec<Question>,
    pub(crate) created_at: BsonDateTime,
    pub(crate) updated_at: BsonDateTime,
}

impl From<&Survey> for SurveyDocument {
    fn from(survey: &Survey) -> Self {
        Self {
            id: survey.id.to_string(),
            owner_id: survey.owner_id.as_str().to_string(),
            title: survey.title.clone(),
            questions: survey.questions.clone(),
            created_at: to_bson_date(survey.created_at),
            updated_at: to_bson_date(survey.updated_at),
        }
    }
}

impl TryFrom<SurveyDocument> for Survey {
    type Error = StoreError;

    fn try_from(doc: SurveyDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: doc.id.parse::<SurveyId>().map_err(StoreError::backend)?,
            owner_id: UserId::new(doc.owner_id),
            title: doc.title,
            questions: doc.questions,
            created_at: from_bson_date(doc.created_at)?,
            updated_at: from_bson_date(doc.updated_at)?,
        })
    }
}

/// Stored form of a [`Response`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponseDocument {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    pub(crate) survey_id: String,
    pub(crate) respondent_id: String,
    #[serde(default)]
    pub(crate) answers: Vec<Answer>,
    pub(crate) submitted_at: BsonDateTime,
}

impl From<&Response> for ResponseDocument {
    fn from(response: &Response) -> Self {
        Self {
            id: response.id.to_string(),
            survey_id: response.survey_id.to_string(),
            respondent_id: response.respondent_id.as_str().to_string(),
            answers: response.answers.clone(),
            submitted_at: to_bson_date(response.submitted_at),
        }
    }
}

impl TryFrom<ResponseDocument> for Response {
    type Error = StoreError;

    fn try_from(doc: ResponseDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: doc.id.parse::<ResponseId>().map_err(StoreError::backend)?,
            survey_id: doc.survey_id.parse::<SurveyId>().map_err(StoreError::backend)?,
            respondent_id: UserId::new(doc.respondent_id),
            answers: doc.answers,
            submitted_at: from_bson_date(doc.submitted_at)?,
        })
    }
}

pub(crate) fn to_bson_date(ts: Timestamp) -> BsonDateTime {
    BsonDateTime::from_millis(ts.timestamp_millis())
}

fn from_bson_date(dt: BsonDateTime) -> Result<Timestamp, StoreError> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
        .ok_or_else(|| StoreError::backend(format!("timestamp out of range: {dt}")))
}
