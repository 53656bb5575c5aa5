//! Caller-owned cache of provider replies.
//!
//! Entries are keyed by what determines the reply: the document content hash,
//! the kind of generation, and its options. A new document has a new hash, so
//! stale entries are never served; `invalidate_document` and `clear` drop
//! them explicitly.

use std::collections::HashMap;

use crate::model::Difficulty;
use crate::prompt::{CodingOptions, QuizOptions};

/// What was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationKind {
    Summary,
    Quiz {
        num_questions: u32,
        difficulty: Difficulty,
        include_explanations: bool,
    },
    Coding {
        num_questions: u32,
        difficulty: Difficulty,
        include_explanations: bool,
    },
}

impl From<&QuizOptions> for GenerationKind {
    fn from(o: &QuizOptions) -> Self {
        GenerationKind::Quiz {
            num_questions: o.num_questions,
            difficulty: o.difficulty,
            include_explanations: o.include_explanations,
        }
    }
}

impl From<&CodingOptions> for GenerationKind {
    fn from(o: &CodingOptions) -> Self {
        GenerationKind::Coding {
            num_questions: o.num_questions,
            difficulty: o.difficulty,
            include_explanations: o.include_explanations,
        }
    }
}

/// Cache key: document hash plus generation kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub document: String,
    pub kind: GenerationKind,
}

impl CacheKey {
    pub fn new(document_fingerprint: &str, kind: GenerationKind) -> Self {
        Self {
            document: document_fingerprint.to_string(),
            kind,
        }
    }
}

/// Raw reply text keyed by [`CacheKey`].
#[derive(Debug, Default)]
pub struct GenerationCache {
    entries: HashMap<CacheKey, String>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: CacheKey, reply: String) {
        self.entries.insert(key, reply);
    }

    /// Drop every entry generated from the given document. Returns how many
    /// entries were removed.
    pub fn invalidate_document(&mut self, document_fingerprint: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.document != document_fingerprint);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_part_of_the_key() {
        let mut cache = GenerationCache::new();
        let easy = QuizOptions {
            difficulty: Difficulty::Easy,
            ..Default::default()
        };
        let hard = QuizOptions {
            difficulty: Difficulty::Hard,
            ..Default::default()
        };
        cache.insert(CacheKey::new("doc", (&easy).into()), "easy quiz".into());

        assert_eq!(cache.get(&CacheKey::new("doc", (&easy).into())), Some("easy quiz"));
        assert_eq!(cache.get(&CacheKey::new("doc", (&hard).into())), None);
        assert_eq!(cache.get(&CacheKey::new("other", (&easy).into())), None);
    }

    #[test]
    fn quiz_and_coding_with_same_options_do_not_collide() {
        let mut cache = GenerationCache::new();
        let quiz = QuizOptions::default();
        let coding = CodingOptions {
            num_questions: quiz.num_questions,
            difficulty: quiz.difficulty,
            include_explanations: quiz.include_explanations,
        };
        cache.insert(CacheKey::new("doc", (&quiz).into()), "quiz".into());
        assert!(cache.get(&CacheKey::new("doc", (&coding).into())).is_none());
    }

    #[test]
    fn invalidate_document_drops_only_that_document() {
        let mut cache = GenerationCache::new();
        cache.insert(CacheKey::new("a", GenerationKind::Summary), "sa".into());
        cache.insert(
            CacheKey::new("a", (&QuizOptions::default()).into()),
            "qa".into(),
        );
        cache.insert(CacheKey::new("b", GenerationKind::Summary), "sb".into());

        assert_eq!(cache.invalidate_document("a"), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&CacheKey::new("b", GenerationKind::Summary)), Some("sb"));

        cache.clear();
        assert!(cache.is_empty());
    }
}
