//! Content detection domain — classify clipboard text and suggest actions.
//!
//! Public API:
//!   - PatternLibrary  — ordered content-type matchers (heuristics.rs)
//!   - ActionTable     — type → ranked actions (actions.rs)
//!   - ContentDetector — scores, normalizes, picks a winner
//!
//! Detection is a pure function of the input text and the tables handed to
//! the detector; there is no global state, so substitute tables can be
//! injected for tests.

pub mod actions;
pub mod heuristics;

pub use actions::ActionTable;

use crate::error::DetectError;
use crate::types::{ContentType, DetectionResult};

/// A content-type matcher: raw, non-negative score for a text.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    pub content_type: ContentType,
    pub score: fn(&str) -> f64,
}

/// Ordered matcher set. Declaration order is the tie-break priority.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    matchers: Vec<Matcher>,
}

impl PatternLibrary {
    pub fn new(matchers: Vec<Matcher>) -> Self {
        Self { matchers }
    }

    /// Built-in matchers, most specific first.
    pub fn builtin() -> Self {
        use heuristics::*;
        let m = |content_type: ContentType, score: fn(&str) -> f64| Matcher { content_type, score };
        Self::new(vec![
            m(ContentType::GitDiff, score_git_diff),
            m(ContentType::Url, score_url),
            m(ContentType::Email, score_email),
            m(ContentType::Json, score_json),
            m(ContentType::Code, score_code),
            m(ContentType::Sql, score_sql),
            m(ContentType::Log, score_log),
            m(ContentType::Markdown, score_markdown),
            m(ContentType::Tabular, score_tabular),
        ])
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Scoring constants shared by every matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Normalization: `confidence = score / (score + baseline)`.
    pub baseline: f64,
    /// A winner must strictly exceed this normalized score.
    pub min_confidence: f64,
    /// Confidence reported for the plain-text fallback.
    pub plain_text_confidence: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            baseline: 1.0,
            min_confidence: 0.5,
            plain_text_confidence: 0.4,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentDetector {
    patterns: PatternLibrary,
    actions: ActionTable,
    config: DetectorConfig,
}

impl ContentDetector {
    pub fn new(patterns: PatternLibrary, actions: ActionTable) -> Self {
        Self {
            patterns,
            actions,
            config: DetectorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    fn normalize(&self, raw: f64) -> f64 {
        if !raw.is_finite() || raw <= 0.0 {
            return 0.0;
        }
        (raw / (raw + self.config.baseline)).clamp(0.0, 1.0)
    }

    /// Classify text and rank the actions that make sense for it.
    ///
    /// Fails with `EmptyInput` on blank/whitespace-only text rather than
    /// silently returning a degenerate result.
    pub fn detect(&self, text: &str) -> Result<DetectionResult, DetectError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DetectError::EmptyInput);
        }

        let (content_type, confidence) = if !trimmed.chars().any(char::is_alphanumeric) {
            (ContentType::Unknown, 0.0)
        } else {
            let mut best: Option<(ContentType, f64)> = None;
            for matcher in self.patterns.matchers() {
                let confidence = self.normalize((matcher.score)(trimmed));
                log::trace!("[DETECT] {} → {:.3}", matcher.content_type, confidence);
                // Strictly greater: earlier matchers win ties
                if best.map_or(true, |(_, c)| confidence > c) {
                    best = Some((matcher.content_type, confidence));
                }
            }
            match best {
                Some((t, c)) if c > self.config.min_confidence => (t, c),
                _ => (ContentType::PlainText, self.config.plain_text_confidence),
            }
        };

        let language = match content_type {
            ContentType::Code => heuristics::detect_code_language(trimmed).map(str::to_string),
            _ => None,
        };
        let suggested_actions = self.actions.suggestions(content_type, language.as_deref());

        log::debug!(
            "[DETECT] type={}, confidence={:.2}, actions={}",
            content_type,
            confidence,
            suggested_actions.len()
        );

        Ok(DetectionResult {
            content_type,
            confidence,
            suggested_actions,
            language,
            line_count: trimmed.lines().count(),
            word_count: trimmed.split_whitespace().count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionKind;

    fn detector() -> ContentDetector {
        ContentDetector::default()
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(detector().detect(""), Err(DetectError::EmptyInput));
        assert_eq!(detector().detect("  \n\t "), Err(DetectError::EmptyInput));
    }

    #[test]
    fn python_snippet_is_code() {
        let result = detector().detect("def add(a,b):\n  retrun a+b").unwrap();
        assert_eq!(result.content_type, ContentType::Code);
        assert!(result.confidence >= 0.6);
        assert_eq!(result.language.as_deref(), Some("python"));
        assert!(result.suggested_actions.contains(&ActionKind::FIX_TYPOS));
        assert_eq!(result.line_count, 2);
    }

    #[test]
    fn reference_inputs_classify_as_expected() {
        let cases = [
            ("def hello():\n    print('world')", ContentType::Code),
            ("const x = 42;", ContentType::Code),
            ("diff --git a/file.py b/file.py", ContentType::GitDiff),
            ("https://example.com", ContentType::Url),
            (r#"{"name": "John"}"#, ContentType::Json),
            ("SELECT * FROM users WHERE id = 1", ContentType::Sql),
            ("# Header\n\nSome **bold** text", ContentType::Markdown),
            ("user@example.com", ContentType::Email),
            ("Just plain text here", ContentType::PlainText),
        ];
        for (text, expected) in cases {
            let result = detector().detect(text).unwrap();
            assert_eq!(result.content_type, expected, "input: {:?}", text);
        }
    }

    #[test]
    fn sentences_starting_with_sql_verbs_stay_plain_text() {
        for sentence in [
            "Select the best option from the menu, then continue.",
            "Delete the old files from the shared drive, please.",
            "Create a table of contents for the report, with links.",
            "Update the table with new values, set the flag, and create a report.",
        ] {
            let result = detector().detect(sentence).unwrap();
            assert_eq!(result.content_type, ContentType::PlainText, "input: {:?}", sentence);
            assert!(!result.suggested_actions.contains(&ActionKind::FORMAT_SQL));
        }
    }

    #[test]
    fn one_line_shell_commands_are_code() {
        for command in ["export PATH=$HOME/bin:$PATH", "git commit -m \"fix\""] {
            let result = detector().detect(command).unwrap();
            assert_eq!(result.content_type, ContentType::Code, "input: {:?}", command);
            assert_eq!(result.language.as_deref(), Some("shell"));
        }
    }

    #[test]
    fn plain_text_fallback_uses_fixed_confidence() {
        let result = detector().detect("Just plain text here").unwrap();
        assert_eq!(result.confidence, 0.4);
        assert_eq!(result.word_count, 4);
        assert!(result.language.is_none());
    }

    #[test]
    fn symbols_only_is_unknown() {
        let result = detector().detect("--- *** ---").unwrap();
        assert_eq!(result.content_type, ContentType::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert!(!result.suggested_actions.is_empty());
    }

    #[test]
    fn ties_go_to_the_first_declared_matcher() {
        fn two(_: &str) -> f64 {
            2.0
        }
        let patterns = PatternLibrary::new(vec![
            Matcher { content_type: ContentType::Markdown, score: two },
            Matcher { content_type: ContentType::Tabular, score: two },
        ]);
        let detector = ContentDetector::new(patterns, ActionTable::builtin());
        let result = detector.detect("anything").unwrap();
        assert_eq!(result.content_type, ContentType::Markdown);
        assert!((result.confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn substitute_tables_are_honored() {
        fn always(_: &str) -> f64 {
            9.0
        }
        let patterns = PatternLibrary::new(vec![Matcher { content_type: ContentType::Log, score: always }]);
        let actions = ActionTable::new(vec![ActionKind::EXPLAIN]);
        let result = ContentDetector::new(patterns, actions).detect("x").unwrap();
        assert_eq!(result.content_type, ContentType::Log);
        assert_eq!(result.suggested_actions, vec![ActionKind::EXPLAIN]);
    }

    #[test]
    fn detection_is_deterministic() {
        let text = "2024-01-01 10:00:00 WARN disk almost full\n2024-01-01 10:00:05 ERROR disk full";
        let a = detector().detect(text).unwrap();
        let b = detector().detect(text).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.content_type, ContentType::Log);
    }
}
