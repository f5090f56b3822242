//! crates/learning_assistant_core/src/fallback.rs
//!
//! Deterministic, network-free substitutes for the "explain" and "generate
//! test" operations. The shapes match what the backend produces so callers
//! cannot tell the difference.

use crate::domain::{ExplanationSection, QuizQuestion, OPTIONS_PER_QUESTION};
use rand::Rng;

/// Offline explanation: always the same four sections, filled in with the topic.
pub fn local_explanation(topic: &str) -> Vec<ExplanationSection> {
    let topic = topic.trim();
    vec![
        ExplanationSection::new(
            "Core Concept",
            format!("{topic} in simple words: a short overview in two or three lines."),
        ),
        ExplanationSection::new(
            "Key Points",
            format!(
                "• Definition of {topic}\n• Important terms and formulas\n• Typical exam use\n• Common mistakes"
            ),
        ),
        ExplanationSection::new("Example", format!("A daily-life example related to {topic}.")),
        ExplanationSection::new(
            "Mnemonic",
            "S.M.A.R.T → Summary, Meaning, Applications, Risks, Trick",
        ),
    ]
}

/// Offline quiz of `count` questions. The correct option is drawn from `rng`,
/// so the quiz only exercises the flow; it does not test real knowledge.
pub fn local_quiz<R: Rng + ?Sized>(topic: &str, count: usize, rng: &mut R) -> Vec<QuizQuestion> {
    let topic = topic.trim();
    (1..=count)
        .map(|number| QuizQuestion {
            prompt: format!("({number}) {topic}: choose the correct statement."),
            options: ["A", "B", "C", "D"].map(|letter| format!("Option {letter} about {topic}")),
            correct_answer_index: rng.gen_range(0..OPTIONS_PER_QUESTION),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn explanation_has_the_four_fixed_sections() {
        let sections = local_explanation("  Gravity ");
        let headings: Vec<_> = sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, ["Core Concept", "Key Points", "Example", "Mnemonic"]);
        assert!(sections[0].content.starts_with("Gravity in simple words"));
        assert!(sections[1].content.contains("Definition of Gravity"));
    }

    #[test]
    fn quiz_has_requested_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let quiz = local_quiz("Photosynthesis", 5, &mut rng);
        assert_eq!(quiz.len(), 5);
        for (i, question) in quiz.iter().enumerate() {
            assert_eq!(
                question.prompt,
                format!("({}) Photosynthesis: choose the correct statement.", i + 1)
            );
            assert_eq!(question.options[2], "Option C about Photosynthesis");
            assert!(question.correct_answer_index < OPTIONS_PER_QUESTION);
        }
    }

    #[test]
    fn same_seed_gives_same_quiz() {
        let first = local_quiz("Atoms", 20, &mut StdRng::seed_from_u64(42));
        let second = local_quiz("Atoms", 20, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }
}
