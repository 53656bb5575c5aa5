//! Grading engine.
//!
//! Compares a user's selected option texts against a validated question set.
//! Grading is a pure function: the same questions and answers always produce
//! the same [`Score`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ValidQuestion;

/// Selected option text keyed by position in the gradable question set.
pub type Answers = BTreeMap<usize, String>;

/// Per-question grading outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub index: usize,
    pub is_correct: bool,
    pub correct_option_text: String,
    /// What the user picked, if anything.
    #[serde(default)]
    pub selected: Option<String>,
}

/// The result of grading a whole quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct_count: usize,
    pub total: usize,
    pub per_question: Vec<QuestionOutcome>,
}

impl Score {
    /// Fraction of questions answered correctly, 0.0 for an empty quiz.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct_count as f64 / self.total as f64
        }
    }

    /// Number of questions the user left blank.
    pub fn unanswered(&self) -> usize {
        self.per_question
            .iter()
            .filter(|o| o.selected.is_none())
            .count()
    }
}

/// Grade `answers` against `questions`.
///
/// The correct option is resolved to its text and compared by value, so if a
/// question repeats the correct text among its options, selecting any copy
/// counts as correct. A missing answer counts as incorrect.
pub fn grade(questions: &[ValidQuestion], answers: &Answers) -> Score {
    let per_question: Vec<QuestionOutcome> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let correct = question.correct_option();
            let selected = answers.get(&index).cloned();
            QuestionOutcome {
                index,
                is_correct: selected.as_deref() == Some(correct),
                correct_option_text: correct.to_string(),
                selected,
            }
        })
        .collect();

    Score {
        correct_count: per_question.iter().filter(|o| o.is_correct).count(),
        total: questions.len(),
        per_question,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str, options: [&str; 4], correct_answer: usize) -> ValidQuestion {
        ValidQuestion {
            question: text.into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer,
            explanation: None,
        }
    }

    fn arithmetic() -> Vec<ValidQuestion> {
        vec![q("2+2?", ["3", "4", "5", "6"], 1)]
    }

    #[test]
    fn correct_answer_scores() {
        let answers = Answers::from([(0, "4".to_string())]);
        let score = grade(&arithmetic(), &answers);
        assert_eq!(score.correct_count, 1);
        assert_eq!(score.total, 1);
        assert!(score.per_question[0].is_correct);
        assert_eq!(score.per_question[0].correct_option_text, "4");
    }

    #[test]
    fn missing_answer_is_incorrect_not_error() {
        let score = grade(&arithmetic(), &Answers::new());
        assert_eq!(score.correct_count, 0);
        assert_eq!(score.total, 1);
        assert_eq!(score.unanswered(), 1);
        assert_eq!(score.per_question[0].selected, None);
    }

    #[test]
    fn wrong_answer_reports_correct_text() {
        let answers = Answers::from([(0, "5".to_string())]);
        let score = grade(&arithmetic(), &answers);
        assert!(!score.per_question[0].is_correct);
        assert_eq!(score.per_question[0].selected.as_deref(), Some("5"));
        assert_eq!(score.per_question[0].correct_option_text, "4");
    }

    #[test]
    fn grading_is_idempotent() {
        let questions = vec![
            q("2+2?", ["3", "4", "5", "6"], 1),
            q("Largest planet?", ["Mars", "Venus", "Jupiter", "Earth"], 2),
            q("H2O is?", ["Salt", "Water", "Air", "Fire"], 1),
        ];
        let answers = Answers::from([(0, "4".to_string()), (2, "Air".to_string())]);

        let first = grade(&questions, &answers);
        let second = grade(&questions, &answers);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.correct_count, 1);
        assert_eq!(first.total, 3);
    }

    #[test]
    fn duplicate_option_text_matches_by_value() {
        let questions = vec![q("Pick yes", ["yes", "no", "yes", "maybe"], 0)];
        let answers = Answers::from([(0, "yes".to_string())]);
        assert_eq!(grade(&questions, &answers).correct_count, 1);
    }

    #[test]
    fn answers_beyond_question_count_are_ignored() {
        let answers = Answers::from([(0, "4".to_string()), (5, "anything".to_string())]);
        let score = grade(&arithmetic(), &answers);
        assert_eq!(score.total, 1);
        assert_eq!(score.per_question.len(), 1);
    }

    #[test]
    fn empty_quiz_fraction_is_zero() {
        let score = grade(&[], &Answers::new());
        assert_eq!(score.total, 0);
        assert_eq!(score.fraction(), 0.0);
    }

    #[test]
    fn fraction_of_correct_answers() {
        let questions = vec![
            q("a", ["1", "2", "3", "4"], 0),
            q("b", ["1", "2", "3", "4"], 1),
        ];
        let answers = Answers::from([(0, "1".to_string()), (1, "3".to_string())]);
        assert!((grade(&questions, &answers).fraction() - 0.5).abs() < f64::EPSILON);
    }
}
