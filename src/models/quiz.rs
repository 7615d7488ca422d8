//! Fill-in-the-blank quizzes over memorized surahs.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    #[serde(rename = "sourateNumero")]
    pub surah_number: u32,
    #[serde(rename = "versetNumero")]
    pub verse_number: u32,
    /// Verse text with the missing word blanked out.
    #[serde(rename = "texteWithBlank")]
    pub text_with_blank: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: String,
    pub question_id: String,
    pub selected_answer: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// Body of an answer submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: String,
    pub selected_answer: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahQuizStats {
    #[serde(rename = "sourateNumero")]
    pub surah_number: u32,
    pub total_questions: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub daily_questions_remaining: u32,
}

impl SurahQuizStats {
    /// Share of all questions of the surah answered correctly, 0-100.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.correct_answers) / f64::from(self.total_questions) * 100.0
    }

    pub fn has_daily_questions(&self) -> bool {
        self.daily_questions_remaining > 0
    }

    pub fn has_unanswered_questions(&self) -> bool {
        self.questions_answered < self.total_questions
    }
}

/// Progress through one quiz: the current question, the given answer and the score.
pub struct QuizRound {
    questions: Vec<QuizQuestion>,
    current_index: usize,
    selected_answer: Option<String>,
    score: usize,
    completed: bool,
}

impl QuizRound {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            current_index: 0,
            selected_answer: None,
            score: 0,
            completed: false,
        }
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.completed {
            return None;
        }
        self.questions.get(self.current_index)
    }

    /// Answers the current question.
    ///
    /// Only the first answer counts; returns None when the question was already
    /// answered or the round is over.
    pub fn answer(&mut self, option: &str) -> Option<bool> {
        if self.selected_answer.is_some() {
            return None;
        }
        let correct = self.current_question()?.is_correct(option);
        self.selected_answer = Some(option.to_string());
        if correct {
            self.score += 1;
        }
        Some(correct)
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    pub fn advance(&mut self) {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        } else {
            self.completed = true;
        }
        self.selected_answer = None;
    }

    /// Starts over with the same questions.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.selected_answer = None;
        self.score = 0;
        self.completed = false;
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_completed(&self) -> bool {
        self.completed || self.questions.is_empty()
    }
}
