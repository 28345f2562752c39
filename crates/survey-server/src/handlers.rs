//! Route handlers
//!
//! Each handler authenticates, performs one store operation (two for the
//! ownership-checked reads), and returns JSON.

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use survey_core::{
    fetch_owned, validate_questions, Answer, QuestionInput, Response, Survey, SurveyId,
    SurveyResults, SurveyUpdate, ValidationError, DEFAULT_SURVEY_TITLE,
};

type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Body of `POST /api/surveys` and `PUT /api/surveys/:id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<QuestionInput>>,
}

/// Body of `POST /api/surveys/create`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSurveyBody {
    #[serde(default)]
    pub title: Option<String>,
}

/// Reply of `POST /api/surveys/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSurvey {
    pub survey_id: SurveyId,
}

/// Body of `POST /api/surveys/:id/responses`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitResponseBody {
    #[serde(default)]
    pub answers: Option<Vec<Answer>>,
}

fn non_blank(title: Option<String>) -> Option<String> {
    title.filter(|t| !t.trim().is_empty())
}

// Unparseable ids cannot name a stored survey
fn parse_survey_id(raw: &str) -> Result<SurveyId, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Survey API Server" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_survey(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: JsonBody<SurveyBody>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let questions = validate_questions(body.questions.unwrap_or_default())?;
    let title = non_blank(body.title).unwrap_or_else(|| DEFAULT_SURVEY_TITLE.to_string());

    let survey = state.surveys.create_survey(&user, &title, questions).await?;
    tracing::info!(survey = %survey.id, owner = %user, "survey saved");
    Ok((StatusCode::CREATED, Json(survey)))
}

pub async fn create_empty_survey(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: JsonBody<CreateSurveyBody>,
) -> Result<impl IntoResponse, AppError> {
    // Every field is optional, so a request without a JSON body is empty
    let body = match payload {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateSurveyBody::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let title = non_blank(body.title).unwrap_or_else(|| DEFAULT_SURVEY_TITLE.to_string());

    let survey = state.surveys.create_survey(&user, &title, Vec::new()).await?;
    tracing::info!(survey = %survey.id, owner = %user, "survey created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedSurvey {
            survey_id: survey.id,
        }),
    ))
}

pub async fn list_surveys(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Survey>>, AppError> {
    Ok(Json(state.surveys.list_surveys_by_owner(&user).await?))
}

pub async fn get_survey(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Survey>, AppError> {
    let id = parse_survey_id(&id)?;
    Ok(Json(fetch_owned(state.surveys.as_ref(), &id, &user).await?))
}

pub async fn update_survey(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    payload: JsonBody<SurveyBody>,
) -> Result<Json<Survey>, AppError> {
    let id = parse_survey_id(&id)?;
    let Json(body) = payload?;
    let questions = body
        .questions
        .ok_or(ValidationError::MissingField("questions"))?;

    let update = SurveyUpdate {
        title: non_blank(body.title),
        questions: validate_questions(questions)?,
    };
    let survey = state.surveys.update_survey(&id, &user, update).await?;
    tracing::info!(survey = %id, owner = %user, "survey updated");
    Ok(Json(survey))
}

pub async fn delete_survey(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_survey_id(&id)?;
    state.surveys.delete_survey(&id, &user).await?;
    tracing::info!(survey = %id, owner = %user, "survey deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit_response(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    payload: JsonBody<SubmitResponseBody>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_survey_id(&id)?;
    let Json(body) = payload?;
    let answers = body.answers.ok_or(ValidationError::MissingField("answers"))?;

    let survey = state.surveys.get_survey(&id).await?;
    if let Some(unknown) = answers.iter().find(|a| survey.question(&a.question_id).is_none()) {
        return Err(ValidationError::UnknownQuestion(unknown.question_id.clone()).into());
    }

    let response = state.responses.create_response(&id, &user, answers).await?;
    tracing::info!(survey = %id, response = %response.id, "response submitted");
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn survey_results(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<SurveyResults>, AppError> {
    let id = parse_survey_id(&id)?;
    fetch_owned(state.surveys.as_ref(), &id, &user).await?;

    let responses = state.responses.list_responses_by_survey(&id).await?;
    Ok(Json(SurveyResults {
        survey_id: id,
        responses,
    }))
}

pub async fn my_responses(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Response>>, AppError> {
    Ok(Json(state.responses.list_responses_by_respondent(&user).await?))
}
