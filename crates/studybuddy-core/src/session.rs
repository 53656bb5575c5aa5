//! Study session orchestrator.
//!
//! Runs each generation request as one call chain: prompt → provider →
//! normalize → validate. The session owns its configuration and reply cache;
//! taking `&mut self` keeps exactly one request in flight.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{CacheKey, GenerationCache, GenerationKind};
use crate::diagnostics::DiagnosticReporter;
use crate::document::Document;
use crate::grading::{grade, Answers, Score};
use crate::model::{CodingQuestion, ValidQuestion};
use crate::normalize::{normalize, RawResponse};
use crate::prompt::{coding_prompt, quiz_prompt, summary_prompt, CodingOptions, Prompt, QuizOptions};
use crate::summary::{normalize_summary, SummaryRecord};
use crate::traits::{CompletionRequest, ModelProvider};
use crate::validate::{validate_all, validate_all_coding, RejectedRecord};

/// Explicit per-session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Max tokens per reply.
    pub max_tokens: u32,
    /// Whether explanations are displayed after grading.
    pub show_explanations: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            show_explanations: true,
        }
    }
}

/// A generated multiple-choice quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Name of the source document.
    pub document: String,
    pub options: QuizOptions,
    /// Gradable questions; answers are keyed by position in this list.
    pub questions: Vec<ValidQuestion>,
    /// Records excluded by validation, kept for read-only display.
    #[serde(skip_deserializing)]
    pub rejected: Vec<RejectedRecord>,
}

impl Quiz {
    pub fn grade(&self, answers: &Answers) -> Score {
        grade(&self.questions, answers)
    }
}

/// A generated set of coding exercises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingSet {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub document: String,
    pub exercises: Vec<CodingQuestion>,
    #[serde(skip_deserializing)]
    pub rejected: Vec<RejectedRecord>,
}

/// One user's study session.
pub struct StudySession {
    provider: Arc<dyn ModelProvider>,
    config: SessionConfig,
    cache: GenerationCache,
}

impl StudySession {
    pub fn new(provider: Arc<dyn ModelProvider>, config: SessionConfig) -> Self {
        Self {
            provider,
            config,
            cache: GenerationCache::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cache(&self) -> &GenerationCache {
        &self.cache
    }

    /// Forget every cached reply, e.g. when a new set of documents is loaded.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Forget cached replies for one document.
    pub fn forget_document(&mut self, document: &Document) -> usize {
        self.cache.invalidate_document(document.fingerprint())
    }

    /// Summarize a document.
    pub async fn summarize(&mut self, document: &Document) -> Result<SummaryRecord> {
        let key = CacheKey::new(document.fingerprint(), GenerationKind::Summary);
        let reply = self.reply(&key, summary_prompt(&document.content)).await?;

        let summary = normalize_summary(RawResponse::Text(reply.clone()))
            .with_context(|| format!("unusable summary for {}", document.name))?;
        self.cache.insert(key, reply);
        Ok(summary)
    }

    /// Generate and validate a multiple-choice quiz.
    ///
    /// Unparseable replies and invalid records are reported to `reporter` and
    /// leave the quiz with fewer (possibly zero) questions.
    pub async fn generate_quiz(
        &mut self,
        document: &Document,
        options: &QuizOptions,
        reporter: &dyn DiagnosticReporter,
    ) -> Result<Quiz> {
        let key = CacheKey::new(document.fingerprint(), options.into());
        let reply = self
            .reply(&key, quiz_prompt(&document.content, options))
            .await?;

        let records = normalize(RawResponse::Text(reply.clone()), reporter);
        let set = validate_all(records, reporter);
        if !set.valid.is_empty() {
            self.cache.insert(key, reply);
        }

        tracing::info!(
            "{}: {} gradable questions, {} rejected",
            document.name,
            set.valid.len(),
            set.rejected.len()
        );

        Ok(Quiz {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            document: document.name.clone(),
            options: *options,
            questions: set.valid,
            rejected: set.rejected,
        })
    }

    /// Generate and validate coding exercises.
    pub async fn generate_coding_questions(
        &mut self,
        document: &Document,
        options: &CodingOptions,
        reporter: &dyn DiagnosticReporter,
    ) -> Result<CodingSet> {
        let key = CacheKey::new(document.fingerprint(), options.into());
        let reply = self
            .reply(&key, coding_prompt(&document.content, options))
            .await?;

        let records = normalize(RawResponse::Text(reply.clone()), reporter);
        let (exercises, rejected) = validate_all_coding(records, reporter);
        if !exercises.is_empty() {
            self.cache.insert(key, reply);
        }

        Ok(CodingSet {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            document: document.name.clone(),
            exercises,
            rejected,
        })
    }

    /// Cached reply for `key`, or one fresh provider call. Provider errors
    /// propagate unchanged; nothing is retried.
    async fn reply(&self, key: &CacheKey, prompt: Prompt) -> Result<String> {
        if let Some(hit) = self.cache.get(key) {
            tracing::debug!("cache hit for {:?}", key.kind);
            return Ok(hit.to_string());
        }
        tracing::debug!("cache miss for {:?}", key.kind);

        let request = CompletionRequest {
            model: self.config.model.clone(),
            system_prompt: prompt.system,
            prompt: prompt.user,
            json_mode: prompt.json_mode,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self.provider.complete(&request).await?;
        tracing::debug!(
            "{} replied in {}ms ({} tokens)",
            response.model,
            response.latency_ms,
            response.token_usage.total_tokens
        );
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingReporter, NoopReporter};
    use crate::error::ProviderError;
    use crate::traits::{CompletionResponse, ModelInfo, TokenUsage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        reply: Result<String, ()>,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicU32::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            match &self.reply {
                Ok(content) => Ok(CompletionResponse {
                    content: content.clone(),
                    model: request.model.clone(),
                    token_usage: TokenUsage::default(),
                    latency_ms: 0,
                }),
                Err(()) => Err(ProviderError::Timeout(120).into()),
            }
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    const QUIZ_REPLY: &str = r#"{"questions": [
        {"question": "2+2?", "options": ["3", "4", "5", "6"], "correct_answer": 1},
        {"question": "", "options": ["a", "b", "c", "d"], "correct_answer": 0}
    ]}"#;

    fn doc() -> Document {
        Document::new("math.txt", "Addition of small integers.")
    }

    #[tokio::test]
    async fn quiz_keeps_valid_and_reports_rejected() {
        let provider = ScriptedProvider::replying(QUIZ_REPLY);
        let mut session = StudySession::new(provider.clone(), SessionConfig::default());
        let reporter = CollectingReporter::new();

        let quiz = session
            .generate_quiz(&doc(), &QuizOptions::default(), &reporter)
            .await
            .unwrap();

        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.rejected.len(), 1);
        assert_eq!(reporter.len(), 1);

        let score = quiz.grade(&Answers::from([(0, "4".to_string())]));
        assert_eq!((score.correct_count, score.total), (1, 1));
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let provider = ScriptedProvider::replying(QUIZ_REPLY);
        let mut session = StudySession::new(provider.clone(), SessionConfig::default());

        for _ in 0..2 {
            session
                .generate_quiz(&doc(), &QuizOptions::default(), &NoopReporter)
                .await
                .unwrap();
        }
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);

        assert_eq!(session.forget_document(&doc()), 1);
        session
            .generate_quiz(&doc(), &QuizOptions::default(), &NoopReporter)
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn unparseable_reply_is_not_cached() {
        let provider = ScriptedProvider::replying("Sorry, I can't help with that.");
        let mut session = StudySession::new(provider.clone(), SessionConfig::default());
        let reporter = CollectingReporter::new();

        let quiz = session
            .generate_quiz(&doc(), &QuizOptions::default(), &reporter)
            .await
            .unwrap();
        assert!(quiz.questions.is_empty());
        assert_eq!(reporter.parse_errors(), 1);
        assert!(session.cache().is_empty());
    }

    #[tokio::test]
    async fn provider_error_propagates_without_retry() {
        let provider = ScriptedProvider::failing();
        let mut session = StudySession::new(provider.clone(), SessionConfig::default());

        let err = session.summarize(&doc()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::Timeout(120))
        ));
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn summary_defaults_difficulty() {
        let provider = ScriptedProvider::replying(
            r#"{"summary": "Integers.", "key_skills": ["adding"], "estimated_time": 10}"#,
        );
        let mut session = StudySession::new(provider, SessionConfig::default());

        let summary = session.summarize(&doc()).await.unwrap();
        assert_eq!(summary.difficulty, crate::model::Difficulty::Medium);
        assert_eq!(session.cache().len(), 1);
    }

    #[tokio::test]
    async fn coding_questions_are_validated() {
        let provider = ScriptedProvider::replying(
            r#"{"questions": [{"question": "Double n", "test_cases": [{"input": "2", "output": "4"}]}, {"solution": "x"}]}"#,
        );
        let mut session = StudySession::new(provider, SessionConfig::default());

        let set = session
            .generate_coding_questions(&doc(), &CodingOptions::default(), &NoopReporter)
            .await
            .unwrap();
        assert_eq!(set.exercises.len(), 1);
        assert_eq!(set.rejected.len(), 1);
    }

    #[tokio::test]
    async fn reset_clears_cache() {
        let provider = ScriptedProvider::replying(QUIZ_REPLY);
        let mut session = StudySession::new(provider, SessionConfig::default());
        session
            .generate_quiz(&doc(), &QuizOptions::default(), &NoopReporter)
            .await
            .unwrap();
        assert!(!session.cache().is_empty());
        session.reset();
        assert!(session.cache().is_empty());
    }

    #[tokio::test]
    async fn saved_quiz_round_trips_and_rejects_tampering() {
        let provider = ScriptedProvider::replying(QUIZ_REPLY);
        let mut session = StudySession::new(provider, SessionConfig::default());
        let quiz = session
            .generate_quiz(&doc(), &QuizOptions::default(), &NoopReporter)
            .await
            .unwrap();

        let saved = serde_json::to_value(&quiz).unwrap();
        let loaded: Quiz = serde_json::from_value(saved.clone()).unwrap();
        assert_eq!(loaded.questions, quiz.questions);
        assert!(loaded.rejected.is_empty());

        let mut tampered = saved;
        tampered["questions"][0]["options"] = serde_json::json!(["3", "4"]);
        tampered["questions"][0]["correct_answer"] = serde_json::json!(7);
        assert!(serde_json::from_value::<Quiz>(tampered).is_err());
    }
}
