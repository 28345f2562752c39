//! Survey editor draft
//!
//! Purely in-memory editing state: an ordered list of questions manipulated
//! by append, remove-by-id and drag reordering. Nothing is persisted until
//! the caller takes [`SurveyDraft::to_update`] and saves it explicitly.

use crate::error::{EditorError, ValidationError};
use crate::types::{
    Question, QuestionId, QuestionType, Survey, SurveyUpdate, DEFAULT_SURVEY_TITLE,
};

/// Ordered draft of a survey's questions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyDraft {
    title: String,
    questions: Vec<Question>,
    dirty: bool,
}

impl SurveyDraft {
    /// Empty draft with the default title
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: DEFAULT_SURVEY_TITLE.to_string(),
            questions: Vec::new(),
            dirty: false,
        }
    }

    /// Draft seeded from a stored survey
    #[must_use]
    pub fn from_survey(survey: &Survey) -> Self {
        Self {
            title: survey.title.clone(),
            questions: survey.questions.clone(),
            dirty: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Whether there are edits since creation or the last save
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.dirty = true;
    }

    /// Add a question at the end
    ///
    /// # Errors
    /// `ValidationError::DuplicateQuestionId` if the draft already holds a
    /// question with the same id; the draft is left unchanged.
    pub fn append(&mut self, question: Question) -> Result<(), EditorError> {
        if self.position(&question.id).is_some() {
            return Err(ValidationError::DuplicateQuestionId {
                index: self.questions.len(),
                id: question.id,
            }
            .into());
        }
        self.questions.push(question);
        self.dirty = true;
        Ok(())
    }

    /// Remove the question with `id`
    ///
    /// Returns the removed question, or `None` if the draft has no such id.
    pub fn remove(&mut self, id: &QuestionId) -> Option<Question> {
        let index = self.position(id)?;
        self.dirty = true;
        Some(self.questions.remove(index))
    }

    /// Drag the question at `source` so it lands at `destination`.
    ///
    /// # Errors
    /// `EditorError::IndexOutOfRange` if either index is outside the list.
    pub fn reorder(&mut self, source: usize, destination: usize) -> Result<(), EditorError> {
        let len = self.questions.len();
        for index in [source, destination] {
            if index >= len {
                return Err(EditorError::IndexOutOfRange { index, len });
            }
        }

        if source != destination {
            let moved = self.questions.remove(source);
            self.questions.insert(destination, moved);
            self.dirty = true;
        }
        Ok(())
    }

    /// Move the question with `id` to `destination`
    ///
    /// # Errors
    /// `EditorError::QuestionNotFound` or `EditorError::IndexOutOfRange`.
    pub fn move_question(
        &mut self,
        id: &QuestionId,
        destination: usize,
    ) -> Result<(), EditorError> {
        let source = self
            .position(id)
            .ok_or_else(|| EditorError::QuestionNotFound(id.clone()))?;
        self.reorder(source, destination)
    }

    /// Snapshot the draft as an update payload
    #[must_use]
    pub fn to_update(&self) -> SurveyUpdate {
        SurveyUpdate {
            title: Some(self.title.clone()),
            questions: self.questions.clone(),
        }
    }

    /// Record that the current state was saved
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    fn position(&self, id: &QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| &q.id == id)
    }
}

impl Default for SurveyDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Question designer form state
///
/// Starts like the designer form: a single-choice question with one blank
/// option slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBuilder {
    kind: QuestionType,
    text: String,
    options: Vec<String>,
    required: bool,
}

impl QuestionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: QuestionType::SingleChoice,
            text: String::new(),
            options: vec![String::new()],
            required: false,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: QuestionType) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Add an option slot, optionally prefilled
    #[must_use]
    pub fn add_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Replace the option at `index`
    ///
    /// # Errors
    /// `EditorError::OptionOutOfRange` if there is no such slot.
    pub fn set_option(
        mut self,
        index: usize,
        option: impl Into<String>,
    ) -> Result<Self, EditorError> {
        let len = self.options.len();
        let slot = self
            .options
            .get_mut(index)
            .ok_or(EditorError::OptionOutOfRange { index, len })?;
        *slot = option.into();
        Ok(self)
    }

    /// Drop the option at `index`. The last remaining slot cannot be removed.
    ///
    /// # Errors
    /// `EditorError::OptionOutOfRange` if there is no such slot or it is the
    /// only one.
    pub fn remove_option(mut self, index: usize) -> Result<Self, EditorError> {
        let len = self.options.len();
        if index >= len || len == 1 {
            return Err(EditorError::OptionOutOfRange { index, len });
        }
        self.options.remove(index);
        Ok(self)
    }

    /// Finish the form into a question with a fresh id.
    ///
    /// Text kinds discard their option slots.
    ///
    /// # Errors
    /// `ValidationError::MissingQuestionText` when the prompt is blank.
    pub fn build(self) -> Result<Question, EditorError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::MissingQuestionText { index: 0 }.into());
        }

        let question = Question::new(self.kind, self.text).with_options(self.options);
        Ok(if self.required {
            question.required()
        } else {
            question
        })
    }
}

impl Default for QuestionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn question(id: &str) -> Question {
        Question::new(QuestionType::ShortText, format!("Question {id}")).with_id(id)
    }

    fn ids(draft: &SurveyDraft) -> Vec<&str> {
        draft.questions().iter().map(|q| q.id.as_str()).collect()
    }

    fn draft_of(count: usize) -> SurveyDraft {
        let mut draft = SurveyDraft::new();
        for i in 0..count {
            draft.append(question(&i.to_string())).unwrap();
        }
        draft
    }

    #[test]
    fn append_and_remove_by_id() {
        let mut draft = SurveyDraft::new();
        assert!(!draft.is_dirty());

        draft.append(question("a")).unwrap();
        draft.append(question("b")).unwrap();
        draft.append(question("c")).unwrap();

        let removed = draft.remove(&"b".into()).unwrap();
        assert_eq!(removed.id.as_str(), "b");
        assert_eq!(ids(&draft), vec!["a", "c"]);
        assert!(draft.remove(&"missing".into()).is_none());
        assert!(draft.is_dirty());
    }

    #[test]
    fn append_rejects_repeated_id() {
        let mut draft = draft_of(2);
        draft.mark_saved();

        let err = draft.append(question("1")).unwrap_err();

        assert_eq!(
            err,
            EditorError::Invalid(ValidationError::DuplicateQuestionId {
                index: 2,
                id: "1".into()
            })
        );
        assert_eq!(ids(&draft), vec!["0", "1"]);
        assert!(!draft.is_dirty());
    }

    #[test]
    fn reorder_moves_like_drag_and_drop() {
        let mut draft = draft_of(4);

        draft.reorder(0, 2).unwrap();
        assert_eq!(ids(&draft), vec!["1", "2", "0", "3"]);

        draft.reorder(3, 0).unwrap();
        assert_eq!(ids(&draft), vec!["3", "1", "2", "0"]);
    }

    #[test]
    fn reorder_rejects_out_of_range() {
        let mut draft = draft_of(2);
        assert_eq!(
            draft.reorder(0, 2),
            Err(EditorError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(ids(&draft), vec!["0", "1"]);
    }

    #[test]
    fn move_question_by_id() {
        let mut draft = draft_of(3);
        draft.move_question(&"2".into(), 0).unwrap();
        assert_eq!(ids(&draft), vec!["2", "0", "1"]);

        let missing = draft.move_question(&"9".into(), 0);
        assert!(matches!(missing, Err(EditorError::QuestionNotFound(_))));
    }

    #[test]
    fn to_update_and_mark_saved() {
        let mut draft = draft_of(2);
        draft.set_title("Feedback");

        let update = draft.to_update();
        assert_eq!(update.title.as_deref(), Some("Feedback"));
        assert_eq!(update.questions.len(), 2);

        draft.mark_saved();
        assert!(!draft.is_dirty());
    }

    #[test]
    fn builder_keeps_options_for_choice_kinds() {
        let question = QuestionBuilder::new()
            .text("Favourite color?")
            .set_option(0, "red")
            .unwrap()
            .add_option("blue")
            .required(true)
            .build()
            .unwrap();

        assert_eq!(question.kind, QuestionType::SingleChoice);
        assert_eq!(question.options, vec!["red", "blue"]);
        assert!(question.required);
    }

    #[test]
    fn builder_drops_options_for_text_kinds() {
        let question = QuestionBuilder::new()
            .kind(QuestionType::LongText)
            .text("Comments")
            .add_option("ignored")
            .build()
            .unwrap();

        assert!(question.options.is_empty());
    }

    #[test]
    fn builder_keeps_last_option_slot() {
        let result = QuestionBuilder::new().remove_option(0);
        assert_eq!(
            result.err(),
            Some(EditorError::OptionOutOfRange { index: 0, len: 1 })
        );
    }

    #[test]
    fn builder_requires_text() {
        let result = QuestionBuilder::new().text("  ").build();
        assert!(matches!(
            result,
            Err(EditorError::Invalid(ValidationError::MissingQuestionText { .. }))
        ));
    }

    proptest! {
        #[test]
        fn reorder_preserves_questions(
            len in 1usize..12,
            source in 0usize..12,
            destination in 0usize..12,
        ) {
            let source = source % len;
            let destination = destination % len;
            let mut draft = draft_of(len);
            let moved = draft.questions()[source].id.clone();

            draft.reorder(source, destination).unwrap();

            prop_assert_eq!(draft.len(), len);
            prop_assert_eq!(&draft.questions()[destination].id, &moved);

            let mut after: Vec<String> = ids(&draft).into_iter().map(String::from).collect();
            after.sort();
            let mut expected: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            expected.sort();
            prop_assert_eq!(after, expected);
        }
    }
}
