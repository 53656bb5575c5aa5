//! Prompt construction for summaries, quizzes, coding exercises, and images.

use serde::{Deserialize, Serialize};

use crate::model::Difficulty;

/// A system + user prompt pair ready to send to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// Whether the reply must be a JSON object.
    pub json_mode: bool,
}

/// Options for multiple-choice quiz generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuizOptions {
    pub num_questions: u32,
    pub difficulty: Difficulty,
    pub include_explanations: bool,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            num_questions: 10,
            difficulty: Difficulty::Medium,
            include_explanations: false,
        }
    }
}

/// Options for coding-exercise generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodingOptions {
    pub num_questions: u32,
    pub difficulty: Difficulty,
    pub include_explanations: bool,
}

impl Default for CodingOptions {
    fn default() -> Self {
        Self {
            num_questions: 5,
            difficulty: Difficulty::Medium,
            include_explanations: true,
        }
    }
}

const SUMMARY_SYSTEM: &str = "You are a professional summarization assistant. Produce a structured summary of the given document as a JSON object with the requested keys.";

const QUIZ_SYSTEM: &str =
    "You are an expert quiz generator. Create multiple-choice questions based on the provided content.";

const CODING_SYSTEM: &str =
    "You are an expert programming instructor. Create Python coding exercises based on the provided content.";

const OCR_INSTRUCTIONS: &str = "Convert the provided image into Markdown format. Include all content from the page, such as headers, footers, subtexts, images (with alt text if possible), tables, and any other elements.

Requirements:

- Output Only Markdown: Return solely the Markdown content without any additional explanations or comments.
- No Delimiters: Do not use code fences or delimiters like ```markdown.
- Complete Content: Do not omit any part of the page, including headers, footers, and subtext.";

/// Prompt for a structured document summary.
pub fn summary_prompt(content: &str) -> Prompt {
    let user = format!(
        "Analyze this content and return a JSON object with the following keys:\n\
         - `summary`: A concise summary (150-200 words)\n\
         - `key_skills`: List of key skills required\n\
         - `difficulty`: Estimated difficulty (Easy, Medium, or Hard)\n\
         - `estimated_time`: Estimated time in minutes to comprehend\n\n\
         Content to analyze:\n{content}"
    );
    Prompt {
        system: SUMMARY_SYSTEM.to_string(),
        user,
        json_mode: true,
    }
}

/// Prompt for a multiple-choice quiz.
pub fn quiz_prompt(content: &str, options: &QuizOptions) -> Prompt {
    let explanation_key = if options.include_explanations {
        "- 'explanation': Detailed explanation of why this answer is correct\n"
    } else {
        ""
    };
    let user = format!(
        "Generate {n} {level}-level multiple-choice questions based on this content:\n\n\
         Content: {content}\n\n\
         Return a JSON object with a 'questions' array. Each question object must have these exact keys:\n\
         - 'question': The question text\n\
         - 'options': Array of 4 answer choices\n\
         - 'correct_answer': Index of the correct option (0-3)\n\
         {explanation_key}\n\
         Example format:\n\
         {{\n  \"questions\": [\n    {{\n      \"question\": \"What is the main purpose of...\",\n      \
         \"options\": [\"First option\", \"Second option\", \"Third option\", \"Fourth option\"],\n      \
         \"correct_answer\": 2{example_explanation}\n    }}\n  ]\n}}",
        n = options.num_questions,
        level = options.difficulty.to_string().to_lowercase(),
        example_explanation = if options.include_explanations {
            ",\n      \"explanation\": \"The third option is correct because...\""
        } else {
            ""
        },
    );
    Prompt {
        system: QUIZ_SYSTEM.to_string(),
        user,
        json_mode: true,
    }
}

/// Prompt for Python coding exercises.
pub fn coding_prompt(content: &str, options: &CodingOptions) -> Prompt {
    let explanation_key = if options.include_explanations {
        "- 'explanation': Detailed explanation of how the solution works\n"
    } else {
        ""
    };
    let user = format!(
        "Generate {n} {level}-level Python coding questions based on this content:\n\n\
         Content: {content}\n\n\
         Return a JSON object with a 'questions' array. Each question object must have these exact keys:\n\
         - 'question': A clear description of the coding problem\n\
         - 'starter_code': A Python code template for the student to start with\n\
         - 'solution': The complete working Python solution\n\
         - 'test_cases': Array of test cases, each with an 'input' and an expected 'output'\n\
         {explanation_key}\n\
         Example format:\n\
         {{\n  \"questions\": [\n    {{\n      \"question\": \"Write a function that...\",\n      \
         \"starter_code\": \"def solution(n):\\n    # Your code here\\n    pass\",\n      \
         \"solution\": \"def solution(n):\\n    return n * 2\",\n      \
         \"test_cases\": [{{\"input\": \"5\", \"output\": \"10\"}}, {{\"input\": \"0\", \"output\": \"0\"}}]\n    }}\n  ]\n}}",
        n = options.num_questions,
        level = options.difficulty.to_string().to_lowercase(),
    );
    Prompt {
        system: CODING_SYSTEM.to_string(),
        user,
        json_mode: true,
    }
}

/// Instruction for transcribing an image to Markdown.
pub fn ocr_prompt() -> String {
    OCR_INSTRUCTIONS.to_string()
}

/// Instruction for answering a question about an image.
///
/// Returns `None` for a blank question.
pub fn image_question_prompt(question: &str) -> Option<String> {
    let question = question.trim();
    if question.is_empty() {
        return None;
    }
    Some(format!(
        "You are an assistant that can answer questions about the content of an image.\n\n\
         Question: {question}\n\n\
         Please provide a clear and concise answer based solely on the content of the provided image."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_requests_all_keys() {
        let p = summary_prompt("Rust ownership rules");
        assert!(p.json_mode);
        for key in ["summary", "key_skills", "difficulty", "estimated_time"] {
            assert!(p.user.contains(key), "missing {key}");
        }
        assert!(p.user.ends_with("Rust ownership rules"));
    }

    #[test]
    fn quiz_prompt_reflects_options() {
        let opts = QuizOptions {
            num_questions: 3,
            difficulty: Difficulty::Hard,
            include_explanations: false,
        };
        let p = quiz_prompt("content", &opts);
        assert!(p.user.starts_with("Generate 3 hard-level"));
        assert!(p.user.contains("'correct_answer'"));
        assert!(!p.user.contains("explanation"));
    }

    #[test]
    fn quiz_prompt_with_explanations() {
        let opts = QuizOptions {
            include_explanations: true,
            ..Default::default()
        };
        let p = quiz_prompt("content", &opts);
        assert!(p.user.starts_with("Generate 10 medium-level"));
        assert!(p.user.contains("'explanation'"));
        assert!(p.user.contains("\"explanation\": \"The third option"));
    }

    #[test]
    fn coding_prompt_defaults() {
        let p = coding_prompt("loops", &CodingOptions::default());
        assert!(p.user.starts_with("Generate 5 medium-level Python"));
        assert!(p.user.contains("'test_cases'"));
        assert!(p.user.contains("'explanation'"));
    }

    #[test]
    fn image_question_rejects_blank() {
        assert!(image_question_prompt("   ").is_none());
        let p = image_question_prompt("What is the title?").unwrap();
        assert!(p.contains("Question: What is the title?"));
    }

    #[test]
    fn ocr_prompt_asks_for_markdown() {
        assert!(ocr_prompt().starts_with("Convert the provided image into Markdown"));
    }
}
