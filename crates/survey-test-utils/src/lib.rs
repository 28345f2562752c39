//! Testing utilities for the survey workspace
//!
//! Shared test helpers and fixtures: a throwaway identity provider, sample
//! questions, seeded stores and request builders.

#![allow(missing_docs)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use serde_json::Value;
use std::sync::Arc;
use survey_auth::{generate_signing_key, IdentityClaims, SignedTokenVerifier, TokenIssuer};
use survey_core::{MemoryStore, Question, QuestionType, Survey, UserId};

/// Issuer name shared by test tokens and verifiers
pub const TEST_ISSUER: &str = "survey-tests";

/// Identity provider stand-in: a fresh key pair per instance
pub struct TestIdentity {
    issuer: TokenIssuer,
}

impl TestIdentity {
    pub fn new() -> Self {
        Self {
            issuer: TokenIssuer::new(generate_signing_key()).with_issuer(TEST_ISSUER),
        }
    }

    /// Verifier accepting this identity's tokens
    pub fn verifier(&self) -> Arc<SignedTokenVerifier> {
        Arc::new(
            SignedTokenVerifier::new(self.issuer.verifying_key())
                .with_issuer(TEST_ISSUER)
                .with_leeway(0),
        )
    }

    pub fn token_for(&self, subject: &str) -> String {
        self.issuer.issue(subject).unwrap()
    }

    /// Token that expired an hour ago
    pub fn expired_token_for(&self, subject: &str) -> String {
        let now = survey_auth::unix_now();
        let claims = IdentityClaims {
            sub: subject.to_string(),
            iss: TEST_ISSUER.to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        self.issuer.sign_claims(claims).unwrap()
    }

    /// Validly signed token for `subject` from some other issuer
    pub fn foreign_token_for(subject: &str) -> String {
        TokenIssuer::new(generate_signing_key())
            .with_issuer(TEST_ISSUER)
            .issue(subject)
            .unwrap()
    }
}

impl Default for TestIdentity {
    fn default() -> Self {
        Self::new()
    }
}

pub fn alice() -> UserId {
    UserId::new("alice")
}

pub fn bob() -> UserId {
    UserId::new("bob")
}

/// One question of every kind, in a fixed order
pub fn sample_questions() -> Vec<Question> {
    vec![
        Question::new(QuestionType::SingleChoice, "How did you hear about us?")
            .with_id("q-source")
            .with_options(["Search", "Friend", "Other"])
            .required(),
        Question::new(QuestionType::MultiChoice, "Which features do you use?")
            .with_id("q-features")
            .with_options(["Editor", "Results", "Export"]),
        Question::new(QuestionType::ShortText, "Your name").with_id("q-name"),
        Question::new(QuestionType::LongText, "Anything else?").with_id("q-comments"),
    ]
}

/// Store pre-seeded with one survey owned by `owner`
pub fn seeded_store(owner: &UserId) -> (Arc<MemoryStore>, Survey) {
    let store = Arc::new(MemoryStore::new());
    let survey = Survey::new(owner.clone(), "Customer feedback", sample_questions());
    store.insert_survey(survey.clone());
    (store, survey)
}

/// Build a request, optionally authenticated and with a JSON body
pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
