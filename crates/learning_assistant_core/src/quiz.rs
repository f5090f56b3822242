//! crates/learning_assistant_core/src/quiz.rs
//!
//! The quiz attempt state machine: answers are recorded one question at a
//! time until submission freezes the attempt and fixes its score.

use crate::domain::{QuizQuestion, OPTIONS_PER_QUESTION};

pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 20;
pub const DEFAULT_QUESTIONS: usize = 5;

/// Clamps a requested question count into the supported range.
pub fn clamp_question_count(count: usize) -> usize {
    count.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("Please enter a topic")]
    EmptyTopic,
    #[error("Please answer all questions before submit ({unanswered} left)")]
    Incomplete { unanswered: usize },
    #[error("No option {option} for question {question}")]
    InvalidSelection { question: usize, option: usize },
    #[error("No quiz loaded")]
    NotLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    InProgress,
    Submitted,
}

#[derive(Debug, Clone)]
pub struct QuizAttempt {
    topic: String,
    questions: Vec<QuizQuestion>,
    selected: Vec<Option<usize>>,
    submitted: bool,
    score: usize,
}

impl QuizAttempt {
    pub fn new(topic: impl Into<String>, questions: Vec<QuizQuestion>) -> Self {
        let selected = vec![None; questions.len()];
        Self {
            topic: topic.into(),
            questions,
            selected,
            submitted: false,
            score: 0,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn selected(&self) -> &[Option<usize>] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn phase(&self) -> QuizPhase {
        if self.submitted {
            QuizPhase::Submitted
        } else {
            QuizPhase::InProgress
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn unanswered(&self) -> usize {
        self.selected.iter().filter(|answer| answer.is_none()).count()
    }

    pub fn can_submit(&self) -> bool {
        !self.questions.is_empty() && self.unanswered() == 0
    }

    /// Records (or overwrites) the answer to one question.
    ///
    /// Returns `Ok(false)` without touching anything once the attempt is submitted.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<bool, QuizError> {
        if self.submitted {
            return Ok(false);
        }
        if question >= self.questions.len() || option >= OPTIONS_PER_QUESTION {
            return Err(QuizError::InvalidSelection { question, option });
        }
        self.selected[question] = Some(option);
        Ok(true)
    }

    /// Clears every answer of an attempt that has not been submitted yet.
    pub fn reset_answers(&mut self) {
        if self.submitted {
            return;
        }
        self.selected.iter_mut().for_each(|answer| *answer = None);
        self.score = 0;
    }

    /// Freezes the attempt and computes the score. A submitted attempt keeps
    /// the score it was frozen with.
    pub fn submit(&mut self) -> Result<usize, QuizError> {
        if self.submitted {
            return Ok(self.score);
        }
        if !self.can_submit() {
            return Err(QuizError::Incomplete {
                unanswered: self.unanswered(),
            });
        }
        self.score = self
            .questions
            .iter()
            .zip(&self.selected)
            .filter(|(question, answer)| **answer == Some(question.correct_answer_index))
            .count();
        self.submitted = true;
        Ok(self.score)
    }

    /// Rounded percentage of correct answers.
    pub fn percentage(&self) -> u32 {
        if self.questions.is_empty() {
            return 0;
        }
        ((self.score as f64 / self.questions.len() as f64) * 100.0).round() as u32
    }

    /// The letter of the correct option, revealed only after submission.
    pub fn correct_letter(&self, question: usize) -> Option<char> {
        if !self.submitted {
            return None;
        }
        self.questions
            .get(question)
            .and_then(|q| ['A', 'B', 'C', 'D'].get(q.correct_answer_index).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> QuizQuestion {
        QuizQuestion {
            prompt: "q".into(),
            options: ["a", "b", "c", "d"].map(String::from),
            correct_answer_index: correct,
        }
    }

    fn attempt() -> QuizAttempt {
        QuizAttempt::new("Topic", vec![question(0), question(1), question(2)])
    }

    #[test]
    fn counts_are_clamped() {
        assert_eq!(clamp_question_count(0), 1);
        assert_eq!(clamp_question_count(7), 7);
        assert_eq!(clamp_question_count(99), 20);
    }

    #[test]
    fn submit_requires_every_answer() {
        let mut quiz = attempt();
        quiz.select_answer(0, 0).unwrap();
        assert_eq!(quiz.submit(), Err(QuizError::Incomplete { unanswered: 2 }));
        assert_eq!(quiz.phase(), QuizPhase::InProgress);
    }

    #[test]
    fn score_counts_matching_indices() {
        let mut quiz = attempt();
        quiz.select_answer(0, 0).unwrap();
        quiz.select_answer(1, 3).unwrap();
        quiz.select_answer(2, 2).unwrap();
        assert_eq!(quiz.submit(), Ok(2));
        assert_eq!(quiz.percentage(), 67);
        assert_eq!(quiz.correct_letter(1), Some('B'));
    }

    #[test]
    fn last_selection_wins_and_submit_freezes() {
        let mut quiz = attempt();
        quiz.select_answer(0, 3).unwrap();
        quiz.select_answer(0, 0).unwrap();
        quiz.select_answer(1, 1).unwrap();
        quiz.select_answer(2, 1).unwrap();
        assert_eq!(quiz.selected()[0], Some(0));
        assert_eq!(quiz.submit(), Ok(2));

        assert_eq!(quiz.select_answer(2, 2), Ok(false));
        assert_eq!(quiz.selected()[2], Some(1));
        assert_eq!(quiz.submit(), Ok(2));
        assert_eq!(quiz.phase(), QuizPhase::Submitted);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut quiz = attempt();
        assert_eq!(
            quiz.select_answer(3, 0),
            Err(QuizError::InvalidSelection { question: 3, option: 0 })
        );
        assert_eq!(
            quiz.select_answer(0, 4),
            Err(QuizError::InvalidSelection { question: 0, option: 4 })
        );
    }

    #[test]
    fn reset_clears_answers_before_submit_only() {
        let mut quiz = attempt();
        quiz.select_answer(0, 1).unwrap();
        quiz.reset_answers();
        assert_eq!(quiz.unanswered(), 3);
        assert_eq!(quiz.correct_letter(0), None);
    }

    #[test]
    fn empty_quiz_cannot_be_submitted() {
        let mut quiz = QuizAttempt::new("Topic", Vec::new());
        assert!(quiz.submit().is_err());
        assert_eq!(quiz.percentage(), 0);
    }
}
