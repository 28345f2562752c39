//! Core types for the survey service
//!
//! Defines the document model shared by every crate:
//! - Identifier newtypes (ULID-backed for stored documents)
//! - Surveys and their ordered questions
//! - Responses and typed answer values
//! - Wire inputs that are validated into questions

use crate::error::ValidationError;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use ulid::{Generator, Ulid};

/// Title given to surveys created without one
pub const DEFAULT_SURVEY_TITLE: &str = "New Survey";

/// UTC timestamp stored on documents
pub type Timestamp = DateTime<Utc>;

/// Next document id, strictly increasing within the process.
///
/// Ids minted in the same millisecond still sort in creation order, which
/// backends rely on to break `createdAt` ties.
fn next_ulid() -> Ulid {
    static GENERATOR: Mutex<Generator> = Mutex::new(Generator::new());

    let mut generator = GENERATOR.lock().unwrap_or_else(PoisonError::into_inner);
    // Overflow needs 2^80 ids in one millisecond
    generator.generate().unwrap_or_else(|_| Ulid::new())
}

/// Current time truncated to milliseconds.
///
/// Every backend stores millisecond precision, so documents are stamped at
/// that precision up front and compare equal after a round trip.
#[inline]
#[must_use]
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Unique survey identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(pub Ulid);

impl SurveyId {
    /// Generate new survey ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(next_ulid())
    }
}

impl Default for SurveyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SurveyId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// Unique response identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(pub Ulid);

impl ResponseId {
    /// Generate new response ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(next_ulid())
    }
}

impl Default for ResponseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResponseId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// Verified subject identifier issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[inline]
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Question identifier, unique within its survey.
///
/// Editors historically sent numeric ids, so integers are accepted on input
/// and normalized to their decimal string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Generate a fresh question ID
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string().to_lowercase())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// Question kinds offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// Pick exactly one option
    #[serde(rename = "multiple-choice", alias = "single-choice")]
    SingleChoice,
    /// Pick any number of options
    #[serde(rename = "checkbox", alias = "multi-choice")]
    MultiChoice,
    /// One-line free text
    #[serde(rename = "short-text")]
    ShortText,
    /// Multi-line free text
    #[serde(rename = "long-text")]
    LongText,
}

impl QuestionType {
    /// Whether this kind carries an option list
    #[inline]
    #[must_use]
    pub fn uses_options(&self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }

    /// Wire name of this kind
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleChoice => "multiple-choice",
            Self::MultiChoice => "checkbox",
            Self::ShortText => "short-text",
            Self::LongText => "long-text",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single prompt inside a survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl Question {
    /// Create a question with a fresh id and no options
    #[must_use]
    pub fn new(kind: QuestionType, text: impl Into<String>) -> Self {
        Self {
            id: QuestionId::generate(),
            kind,
            text: text.into(),
            options: Vec::new(),
            required: false,
        }
    }

    /// With explicit id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<QuestionId>) -> Self {
        self.id = id.into();
        self
    }

    /// With options. Ignored for text kinds.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.kind.uses_options() {
            self.options = options.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Question as submitted by clients, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[serde(default)]
    pub id: Option<QuestionId>,
    #[serde(rename = "type", default)]
    pub kind: Option<QuestionType>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl QuestionInput {
    /// Validate into a [`Question`].
    ///
    /// Only type and text are required. Missing ids are generated and text
    /// kinds drop their options.
    ///
    /// # Errors
    /// [`ValidationError`] naming the offending question position.
    pub fn into_question(self, index: usize) -> Result<Question, ValidationError> {
        let kind = self
            .kind
            .ok_or(ValidationError::MissingQuestionType { index })?;
        let text = self
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(ValidationError::MissingQuestionText { index })?;

        let options = if kind.uses_options() {
            self.options
        } else {
            Vec::new()
        };

        Ok(Question {
            id: self.id.unwrap_or_else(QuestionId::generate),
            kind,
            text,
            options,
            required: self.required,
        })
    }
}

impl From<Question> for QuestionInput {
    fn from(question: Question) -> Self {
        Self {
            id: Some(question.id),
            kind: Some(question.kind),
            text: Some(question.text),
            options: question.options,
            required: question.required,
        }
    }
}

/// Validate a submitted question list, preserving order
///
/// # Errors
/// The first [`ValidationError`] encountered, including a question id that
/// repeats an earlier one.
pub fn validate_questions(inputs: Vec<QuestionInput>) -> Result<Vec<Question>, ValidationError> {
    let mut seen = HashSet::with_capacity(inputs.len());
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let question = input.into_question(index)?;
            if !seen.insert(question.id.clone()) {
                return Err(ValidationError::DuplicateQuestionId {
                    index,
                    id: question.id,
                });
            }
            Ok(question)
        })
        .collect()
}

/// A named, ordered collection of questions owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: SurveyId,
    pub owner_id: UserId,
    pub title: String,
    pub questions: Vec<Question>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Survey {
    /// Create a new survey stamped with the current time
    #[must_use]
    pub fn new(owner_id: UserId, title: impl Into<String>, questions: Vec<Question>) -> Self {
        let created_at = now();
        Self {
            id: SurveyId::new(),
            owner_id,
            title: title.into(),
            questions,
            created_at,
            updated_at: created_at,
        }
    }

    /// Whether `user` owns this survey
    #[inline]
    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    /// Look up a question by id
    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Apply an owner update in place
    pub fn apply(&mut self, update: SurveyUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        self.questions = update.questions;
        self.updated_at = now();
    }
}

/// Owner-authorized replacement of a survey's editable fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyUpdate {
    /// New title; `None` keeps the current one
    #[serde(default)]
    pub title: Option<String>,
    pub questions: Vec<Question>,
}

/// Answer payload: string, number, boolean, or list of strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Number(f64),
    Text(String),
    Choices(Vec<String>),
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        Self::Choices(value)
    }
}

/// One (question, answer) pair of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: QuestionId,
    pub answer: AnswerValue,
}

impl Answer {
    #[inline]
    #[must_use]
    pub fn new(question_id: impl Into<QuestionId>, answer: impl Into<AnswerValue>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
        }
    }
}

/// One respondent's submitted answers to a survey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: ResponseId,
    pub survey_id: SurveyId,
    pub respondent_id: UserId,
    pub answers: Vec<Answer>,
    pub submitted_at: Timestamp,
}

impl Response {
    /// Create a new response stamped with the current time
    #[must_use]
    pub fn new(survey_id: SurveyId, respondent_id: UserId, answers: Vec<Answer>) -> Self {
        Self {
            id: ResponseId::new(),
            survey_id,
            respondent_id,
            answers,
            submitted_at: now(),
        }
    }
}

/// Every response to one survey, as shown to its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResults {
    pub survey_id: SurveyId,
    pub responses: Vec<Response>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn question_type_wire_names() {
        let kind: QuestionType = serde_json::from_value(json!("checkbox")).unwrap();
        assert_eq!(kind, QuestionType::MultiChoice);

        let kind: QuestionType = serde_json::from_value(json!("single-choice")).unwrap();
        assert_eq!(kind, QuestionType::SingleChoice);

        assert_eq!(
            serde_json::to_value(QuestionType::SingleChoice).unwrap(),
            json!("multiple-choice")
        );
    }

    #[test]
    fn question_id_accepts_numbers() {
        let id: QuestionId = serde_json::from_value(json!(1_700_000_000_123_u64)).unwrap();
        assert_eq!(id.as_str(), "1700000000123");

        let id: QuestionId = serde_json::from_value(json!("q-1")).unwrap();
        assert_eq!(id.as_str(), "q-1");
    }

    #[test]
    fn input_requires_type_and_text() {
        let missing_type = QuestionInput {
            text: Some("Name?".to_string()),
            ..QuestionInput::default()
        };
        assert!(matches!(
            missing_type.into_question(2),
            Err(ValidationError::MissingQuestionType { index: 2 })
        ));

        let blank_text = QuestionInput {
            kind: Some(QuestionType::ShortText),
            text: Some("   ".to_string()),
            ..QuestionInput::default()
        };
        assert!(matches!(
            blank_text.into_question(0),
            Err(ValidationError::MissingQuestionText { index: 0 })
        ));
    }

    #[test]
    fn text_questions_drop_options() {
        let input = QuestionInput {
            id: Some("a".into()),
            kind: Some(QuestionType::LongText),
            text: Some("Tell us more".to_string()),
            options: vec![String::new()],
            required: true,
        };

        let question = input.into_question(0).unwrap();
        assert!(question.options.is_empty());
        assert!(question.required);
        assert_eq!(question.id.as_str(), "a");
    }

    #[test]
    fn missing_question_id_is_generated() {
        let input = QuestionInput {
            kind: Some(QuestionType::SingleChoice),
            text: Some("Pick one".to_string()),
            options: vec!["a".to_string(), "b".to_string()],
            ..QuestionInput::default()
        };

        let question = input.into_question(0).unwrap();
        assert!(!question.id.as_str().is_empty());
        assert_eq!(question.options, vec!["a", "b"]);
    }

    #[test]
    fn repeated_question_id_is_rejected() {
        let input = |kind| QuestionInput {
            id: Some("a".into()),
            kind: Some(kind),
            text: Some("Same id".to_string()),
            ..QuestionInput::default()
        };

        let err = validate_questions(vec![
            input(QuestionType::ShortText),
            input(QuestionType::LongText),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::DuplicateQuestionId {
                index: 1,
                id: "a".into()
            }
        );
    }

    #[test]
    fn answer_values_deserialize_by_shape() {
        let answers: Vec<AnswerValue> =
            serde_json::from_value(json!([true, 4, "blue", ["a", "b"]])).unwrap();

        assert_eq!(
            answers,
            vec![
                AnswerValue::Flag(true),
                AnswerValue::Number(4.0),
                AnswerValue::Text("blue".to_string()),
                AnswerValue::Choices(vec!["a".to_string(), "b".to_string()]),
            ]
        );
    }

    #[test]
    fn survey_serializes_camel_case() {
        let survey = Survey::new(UserId::new("u1"), DEFAULT_SURVEY_TITLE, Vec::new());
        let value = serde_json::to_value(&survey).unwrap();

        assert_eq!(value["ownerId"], json!("u1"));
        assert_eq!(value["title"], json!("New Survey"));
        assert!(value["createdAt"].is_string());
        assert_eq!(value["questions"], json!([]));
    }

    #[test]
    fn survey_apply_keeps_title_when_absent() {
        let mut survey = Survey::new(UserId::new("u1"), "Original", Vec::new());
        survey.apply(SurveyUpdate {
            title: None,
            questions: vec![Question::new(QuestionType::ShortText, "Name?")],
        });

        assert_eq!(survey.title, "Original");
        assert_eq!(survey.questions.len(), 1);
        assert!(survey.updated_at >= survey.created_at);
    }

    #[test]
    fn ids_increase_within_a_millisecond() {
        let ids: Vec<SurveyId> = (0..64).map(|_| SurveyId::new()).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

        let strings: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert!(strings.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn survey_id_parses_from_display() {
        let id = SurveyId::new();
        let parsed: SurveyId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-ulid".parse::<SurveyId>().is_err());
    }
}
