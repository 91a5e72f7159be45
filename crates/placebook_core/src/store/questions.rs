//! Question/answer threads and private inquiries.

use super::fanout::{plan_notifications, WriteEvent};
use super::{RelationalStore, StoreError, StoreResult};
use crate::model::inquiry::{Inquiry, InquiryStatus};
use crate::model::question::{Answer, Question};
use crate::model::{new_entity_id, now_utc, OwnerResponse};
use log::info;

/// Loyalty points granted for each answer.
pub const ANSWER_LOYALTY_POINTS: u32 = 2;

impl RelationalStore {
    /// Posts a question on a place and notifies the place owner.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when the place does not exist.
    pub fn create_question(
        &self,
        place_id: &str,
        user_id: &str,
        text: impl Into<String>,
    ) -> StoreResult<Question> {
        let text = text.into();
        self.write("create_question", |state| {
            let now = now_utc();
            state.place(place_id)?;
            let question = Question {
                id: new_entity_id(),
                place_id: place_id.to_string(),
                user_id: user_id.to_string(),
                question: text,
                answers: Vec::new(),
                created_at: now,
            };
            state.questions.push(question.clone());

            let asker_name = state.display_name(user_id);
            let drafts = plan_notifications(
                &WriteEvent::QuestionCreated {
                    question: &question,
                    place: state.place(place_id)?,
                    asker_name: &asker_name,
                },
                &state.liked_places,
            );
            state.push_notifications(drafts, now);
            info!(
                "event=question_create module=store status=ok question_id={} place_id={}",
                question.id, question.place_id
            );
            Ok(question)
        })
    }

    pub fn get_question(&self, question_id: &str) -> StoreResult<Option<Question>> {
        self.read(|state| state.question(question_id).ok().cloned())
    }

    /// Questions on a place, newest first, answers in posting order.
    pub fn questions_for_place(&self, place_id: &str) -> StoreResult<Vec<Question>> {
        self.read(|state| {
            let mut questions: Vec<Question> = state
                .questions
                .iter()
                .filter(|question| question.place_id == place_id)
                .cloned()
                .collect();
            questions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            questions
        })
    }

    /// Rewrites question text. Author only.
    pub fn update_question(
        &self,
        question_id: &str,
        requester_id: &str,
        text: impl Into<String>,
    ) -> StoreResult<bool> {
        let text = text.into();
        self.write("update_question", |state| {
            let question = state.question_mut(question_id)?;
            if question.user_id != requester_id {
                return Ok(false);
            }
            question.question = text;
            Ok(true)
        })
    }

    /// Deletes a question together with all its answers. Author only.
    pub fn delete_question(&self, question_id: &str, requester_id: &str) -> StoreResult<bool> {
        self.write("delete_question", |state| {
            if state.question(question_id)?.user_id != requester_id {
                return Ok(false);
            }
            state.questions.retain(|question| question.id != question_id);
            Ok(true)
        })
    }

    /// Appends an answer and notifies the question author.
    ///
    /// `is_owner` is set when the answerer manages the place.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when the question or its place is missing.
    pub fn add_answer(
        &self,
        question_id: &str,
        user_id: &str,
        text: impl Into<String>,
    ) -> StoreResult<Answer> {
        let text = text.into();
        self.write("add_answer", |state| {
            let now = now_utc();
            let place_id = state.question(question_id)?.place_id.clone();
            let is_owner = state.place(&place_id)?.is_managed_by(user_id);
            let answer = Answer {
                id: new_entity_id(),
                user_id: user_id.to_string(),
                text,
                is_owner,
                created_at: now,
            };
            state.question_mut(question_id)?.answers.push(answer.clone());
            state.award_points(user_id, ANSWER_LOYALTY_POINTS);

            let answerer_name = state.display_name(user_id);
            let drafts = plan_notifications(
                &WriteEvent::AnswerAdded {
                    question: state.question(question_id)?,
                    answer: &answer,
                    place: state.place(&place_id)?,
                    answerer_name: &answerer_name,
                },
                &state.liked_places,
            );
            state.push_notifications(drafts, now);
            Ok(answer)
        })
    }

    /// Rewrites an answer. Answer author only.
    pub fn update_answer(
        &self,
        question_id: &str,
        answer_id: &str,
        requester_id: &str,
        text: impl Into<String>,
    ) -> StoreResult<bool> {
        let text = text.into();
        self.write("update_answer", |state| {
            let answer = state
                .question_mut(question_id)?
                .answer_mut(answer_id)
                .ok_or_else(|| StoreError::not_found("answer", answer_id))?;
            if answer.user_id != requester_id {
                return Ok(false);
            }
            answer.text = text;
            Ok(true)
        })
    }

    /// Removes an answer. Answer author only.
    pub fn delete_answer(
        &self,
        question_id: &str,
        answer_id: &str,
        requester_id: &str,
    ) -> StoreResult<bool> {
        self.write("delete_answer", |state| {
            let question = state.question_mut(question_id)?;
            let author = question
                .answer(answer_id)
                .map(|answer| answer.user_id.clone())
                .ok_or_else(|| StoreError::not_found("answer", answer_id))?;
            if author != requester_id {
                return Ok(false);
            }
            question.answers.retain(|answer| answer.id != answer_id);
            Ok(true)
        })
    }

    /// Opens a private inquiry to a place's management.
    pub fn create_inquiry(
        &self,
        place_id: &str,
        user_id: &str,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> StoreResult<Inquiry> {
        let subject = subject.into();
        let message = message.into();
        self.write("create_inquiry", |state| {
            state.place(place_id)?;
            let inquiry = Inquiry {
                id: new_entity_id(),
                place_id: place_id.to_string(),
                user_id: user_id.to_string(),
                subject,
                message,
                status: InquiryStatus::Open,
                response: None,
                created_at: now_utc(),
            };
            state.inquiries.push(inquiry.clone());
            Ok(inquiry)
        })
    }

    /// Answers an inquiry. Owner or delegate only.
    pub fn respond_to_inquiry(
        &self,
        inquiry_id: &str,
        responder_id: &str,
        text: impl Into<String>,
    ) -> StoreResult<bool> {
        let text = text.into();
        self.write("respond_to_inquiry", |state| {
            let place_id = state.inquiry(inquiry_id)?.place_id.clone();
            if !state.place(&place_id)?.is_managed_by(responder_id) {
                return Ok(false);
            }
            let inquiry = state.inquiry_mut(inquiry_id)?;
            inquiry.response = Some(OwnerResponse {
                text,
                responded_at: now_utc(),
            });
            inquiry.status = InquiryStatus::Answered;
            Ok(true)
        })
    }

    /// Closes an inquiry. Its author or a place manager may close it.
    pub fn close_inquiry(&self, inquiry_id: &str, requester_id: &str) -> StoreResult<bool> {
        self.write("close_inquiry", |state| {
            let inquiry = state.inquiry(inquiry_id)?;
            let (place_id, author) = (inquiry.place_id.clone(), inquiry.user_id.clone());
            let allowed =
                author == requester_id || state.place(&place_id)?.is_managed_by(requester_id);
            if !allowed {
                return Ok(false);
            }
            state.inquiry_mut(inquiry_id)?.status = InquiryStatus::Closed;
            Ok(true)
        })
    }

    pub fn inquiries_for_place(&self, place_id: &str) -> StoreResult<Vec<Inquiry>> {
        self.read(|state| {
            state
                .inquiries
                .iter()
                .filter(|inquiry| inquiry.place_id == place_id)
                .cloned()
                .collect()
        })
    }

    pub fn inquiries_by_user(&self, user_id: &str) -> StoreResult<Vec<Inquiry>> {
        self.read(|state| {
            state
                .inquiries
                .iter()
                .filter(|inquiry| inquiry.user_id == user_id)
                .cloned()
                .collect()
        })
    }
}
