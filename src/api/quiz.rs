//! Quiz endpoints: daily and new questions, answers, statistics and surah unlocking.
use super::client::{ApiClient, ApiError};
use crate::models::{QuizAnswer, QuizAttempt, QuizQuestion, SurahQuizStats};
use serde_json::json;

/// Questions fetched when no count is given.
pub const DEFAULT_NEW_QUESTIONS: u32 = 5;

pub struct QuizApi<'a> {
    client: &'a ApiClient,
}

impl<'a> QuizApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Quiz statistics for every surah the user memorizes.
    pub fn stats(&self, user_id: &str) -> Result<Vec<SurahQuizStats>, ApiError> {
        self.client.get(&format!("/users/{}/quiz/stats", user_id))
    }

    /// Today's questions for a surah.
    pub fn daily_quiz(&self, user_id: &str, surah_number: u32) -> Result<Vec<QuizQuestion>, ApiError> {
        self.client.get(&format!(
            "/users/{}/quiz/sourate/{}/daily",
            user_id, surah_number
        ))
    }

    /// Questions the user has not answered yet.
    pub fn new_questions(
        &self,
        user_id: &str,
        surah_number: u32,
        count: Option<u32>,
    ) -> Result<Vec<QuizQuestion>, ApiError> {
        self.client.get(&format!(
            "/users/{}/quiz/sourate/{}/new?count={}",
            user_id,
            surah_number,
            count.unwrap_or(DEFAULT_NEW_QUESTIONS)
        ))
    }

    pub fn submit_answer(
        &self,
        user_id: &str,
        question_id: &str,
        selected_answer: &str,
    ) -> Result<QuizAttempt, ApiError> {
        let answer = QuizAnswer {
            question_id: question_id.to_string(),
            selected_answer: selected_answer.to_string(),
        };
        self.client
            .post(&format!("/users/{}/quiz/answer", user_id), &answer)
    }

    /// Makes a surah available for quizzes once it has been read.
    pub fn unlock_surah(&self, user_id: &str, surah_number: u32) -> Result<(), ApiError> {
        self.client.post_unit(
            &format!(
                "/users/{}/memorization/sourate/{}/unlock",
                user_id, surah_number
            ),
            &json!({}),
        )
    }

    pub fn mark_surah_memorized(&self, user_id: &str, surah_number: u32) -> Result<(), ApiError> {
        self.client.post_unit(
            &format!(
                "/users/{}/memorization/sourate/{}/complete",
                user_id, surah_number
            ),
            &json!({}),
        )
    }

    pub fn memorized_surahs(&self, user_id: &str) -> Result<Vec<u32>, ApiError> {
        self.client
            .get(&format!("/users/{}/memorization/sourates", user_id))
    }
}
