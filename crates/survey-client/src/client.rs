//! HTTP client
//!
//! Every authenticated call attaches a bearer token from the
//! [`TokenProvider`]. When the server answers 401 with `id-token-expired`,
//! the client forces a refresh and retries once; a second failure is
//! returned as is.

use crate::error::{ApiErrorBody, ClientError};
use crate::token::TokenProvider;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use survey_core::{
    Answer, Question, Response, Survey, SurveyDraft, SurveyId, SurveyResults, SurveyUpdate,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSurvey {
    survey_id: SurveyId,
}

/// Typed client for the survey API
#[derive(Clone)]
pub struct SurveyClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SurveyClient {
    /// Client for the API at `base_url`, e.g. `http://localhost:5000`
    #[must_use]
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, tokens)
    }

    /// Reuse an existing `reqwest::Client`
    #[must_use]
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`, unauthenticated
    ///
    /// # Errors
    /// Transport failures or a non-success status.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        let body: Value = Self::decode(response).await?;
        Ok(body["status"] == "ok")
    }

    /// Create an empty survey and return its id
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn create_survey(&self, title: Option<&str>) -> Result<SurveyId, ClientError> {
        let created: CreatedSurvey = self
            .call(Method::POST, "/api/surveys/create", Some(json!({ "title": title })))
            .await?;
        Ok(created.survey_id)
    }

    /// Create a survey with questions in one call
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn save_survey(
        &self,
        title: Option<&str>,
        questions: &[Question],
    ) -> Result<Survey, ClientError> {
        let body = json!({ "title": title, "questions": questions });
        self.call(Method::POST, "/api/surveys", Some(body)).await
    }

    /// The caller's surveys, newest first
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn list_surveys(&self) -> Result<Vec<Survey>, ClientError> {
        self.call(Method::GET, "/api/surveys", None).await
    }

    /// # Errors
    /// See [`ClientError`]; absent or foreign surveys are 404.
    pub async fn get_survey(&self, id: &SurveyId) -> Result<Survey, ClientError> {
        self.call(Method::GET, &format!("/api/surveys/{id}"), None)
            .await
    }

    /// # Errors
    /// See [`ClientError`]; absent or foreign surveys are 404.
    pub async fn update_survey(
        &self,
        id: &SurveyId,
        update: &SurveyUpdate,
    ) -> Result<Survey, ClientError> {
        let body = serde_json::to_value(update)?;
        self.call(Method::PUT, &format!("/api/surveys/{id}"), Some(body))
            .await
    }

    /// Save a draft to survey `id` and mark it clean on success
    ///
    /// # Errors
    /// See [`ClientError`]; the draft stays dirty on failure.
    pub async fn save_draft(
        &self,
        id: &SurveyId,
        draft: &mut SurveyDraft,
    ) -> Result<Survey, ClientError> {
        let saved = self.update_survey(id, &draft.to_update()).await?;
        draft.mark_saved();
        Ok(saved)
    }

    /// # Errors
    /// See [`ClientError`]; absent or foreign surveys are 404.
    pub async fn delete_survey(&self, id: &SurveyId) -> Result<(), ClientError> {
        let _: Value = self
            .call(Method::DELETE, &format!("/api/surveys/{id}"), None)
            .await?;
        Ok(())
    }

    /// # Errors
    /// See [`ClientError`]; unknown question ids are 400.
    pub async fn submit_response(
        &self,
        id: &SurveyId,
        answers: &[Answer],
    ) -> Result<Response, ClientError> {
        let body = json!({ "answers": answers });
        self.call(Method::POST, &format!("/api/surveys/{id}/responses"), Some(body))
            .await
    }

    /// # Errors
    /// See [`ClientError`]; only the owner may read results.
    pub async fn results(&self, id: &SurveyId) -> Result<SurveyResults, ClientError> {
        self.call(Method::GET, &format!("/api/surveys/{id}/results"), None)
            .await
    }

    /// Responses submitted by the caller
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn my_responses(&self) -> Result<Vec<Response>, ClientError> {
        self.call(Method::GET, "/api/responses", None).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let token = self.tokens.token(false).await?;
        let response = self.send(method.clone(), path, body.as_ref(), &token).await?;

        match Self::decode(response).await {
            Err(err) if err.is_expired_token() => {
                tracing::debug!(path, "identity token expired, refreshing once");
                let token = self.tokens.token(true).await?;
                let response = self.send(method, path, body.as_ref(), &token).await?;
                Self::decode(response).await
            }
            other => other,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(serde_json::from_value(Value::Null)?);
            }
            return Ok(response.json().await?);
        }

        let code = status.as_u16();
        let body = response.json::<ApiErrorBody>().await.unwrap_or_else(|_| ApiErrorBody {
            error: status.to_string(),
            code: String::new(),
            details: None,
        });
        Err(ClientError::from_body(code, body))
    }
}

impl std::fmt::Debug for SurveyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurveyClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
