//! Static content-type → suggested-actions table.
//!
//! Ordered most relevant first. Language-specific rows (for code) replace
//! the per-type row. Generic actions are appended to every list so no
//! content type ever ends up without suggestions.

use std::collections::HashMap;

use crate::types::{ActionKind, ContentType};

#[derive(Debug, Clone)]
pub struct ActionTable {
    by_type: HashMap<ContentType, Vec<ActionKind>>,
    by_language: HashMap<String, Vec<ActionKind>>,
    generic: Vec<ActionKind>,
}

impl ActionTable {
    /// An empty table that only suggests the given generic actions.
    pub fn new(generic: Vec<ActionKind>) -> Self {
        Self {
            by_type: HashMap::new(),
            by_language: HashMap::new(),
            generic,
        }
    }

    pub fn with_type(mut self, content_type: ContentType, actions: Vec<ActionKind>) -> Self {
        self.by_type.insert(content_type, actions);
        self
    }

    pub fn with_language(mut self, language: &str, actions: Vec<ActionKind>) -> Self {
        self.by_language.insert(language.to_lowercase(), actions);
        self
    }

    /// The built-in table shipped with the app.
    pub fn builtin() -> Self {
        use ContentType as T;
        type A = ActionKind;

        Self::new(vec![A::SUMMARIZE, A::FIX_TYPOS])
            .with_type(
                T::Code,
                vec![A::FIX_TYPOS, A::EXPLAIN_CODE, A::ADD_DOCSTRING, A::GENERATE_TESTS, A::FORMAT],
            )
            .with_type(T::GitDiff, vec![A::GENERATE_COMMIT, A::SUMMARIZE_CHANGES, A::EXPLAIN])
            .with_type(T::Url, vec![A::SUMMARIZE_PAGE, A::EXTRACT_LINKS, A::EXPLAIN])
            .with_type(T::Email, vec![A::FIX_GRAMMAR, A::SUMMARIZE, A::TRANSLATE, A::EXTRACT_DATA])
            .with_type(
                T::Json,
                vec![A::FORMAT_JSON, A::VALIDATE_JSON, A::EXTRACT_DATA, A::EXPLAIN],
            )
            .with_type(T::Sql, vec![A::FORMAT_SQL, A::EXPLAIN_QUERY, A::EXPLAIN])
            .with_type(
                T::Markdown,
                vec![A::SUMMARIZE, A::EXTRACT_HEADINGS, A::CONVERT_TO_HTML, A::FIX_GRAMMAR],
            )
            .with_type(T::Tabular, vec![A::EXTRACT_DATA, A::SUMMARIZE, A::EXPLAIN])
            .with_type(T::Log, vec![A::EXPLAIN_ERROR, A::SUMMARIZE, A::EXTRACT_DATA])
            .with_type(
                T::PlainText,
                vec![A::FIX_GRAMMAR, A::TRANSLATE, A::SUMMARIZE, A::EXTRACT_KEYWORDS, A::CONVERT_CASE],
            )
            .with_type(T::Unknown, vec![A::EXPLAIN])
            .with_language(
                "python",
                vec![A::FIX_TYPOS, A::ADD_DOCSTRING, A::GENERATE_TESTS, A::EXPLAIN_CODE],
            )
            .with_language(
                "javascript",
                vec![A::FIX_TYPOS, A::ADD_JSDOC, A::CONVERT_TO_TYPESCRIPT, A::EXPLAIN_CODE],
            )
    }

    /// Ranked, deduplicated suggestions for a detected type.
    pub fn suggestions(&self, content_type: ContentType, language: Option<&str>) -> Vec<ActionKind> {
        let specific = language
            .and_then(|lang| self.by_language.get(&lang.to_lowercase()))
            .or_else(|| self.by_type.get(&content_type));

        let mut ranked: Vec<ActionKind> = Vec::new();
        for action in specific.into_iter().flatten().chain(self.generic.iter()) {
            if !ranked.contains(action) {
                ranked.push(action.clone());
            }
        }
        ranked
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_type_has_suggestions() {
        let table = ActionTable::builtin();
        for t in ContentType::ALL {
            let actions = table.suggestions(t, None);
            assert!(actions.len() >= 3, "{} has only {:?}", t, actions);
            assert!(actions.contains(&ActionKind::SUMMARIZE));
            assert!(actions.contains(&ActionKind::FIX_TYPOS));
        }
    }

    #[test]
    fn generic_actions_are_not_duplicated() {
        let table = ActionTable::builtin();
        let actions = table.suggestions(ContentType::Code, None);
        assert_eq!(actions[0], ActionKind::FIX_TYPOS);
        assert_eq!(actions.iter().filter(|a| **a == ActionKind::FIX_TYPOS).count(), 1);
        assert_eq!(actions.last(), Some(&ActionKind::SUMMARIZE));
    }

    #[test]
    fn language_row_overrides_type_row() {
        let table = ActionTable::builtin();
        let js = table.suggestions(ContentType::Code, Some("JavaScript"));
        assert!(js.contains(&ActionKind::CONVERT_TO_TYPESCRIPT));
        let rust = table.suggestions(ContentType::Code, Some("rust"));
        assert_eq!(rust, table.suggestions(ContentType::Code, None));
    }

    #[test]
    fn empty_table_falls_back_to_generic() {
        let table = ActionTable::new(vec![ActionKind::SUMMARIZE]);
        assert_eq!(table.suggestions(ContentType::Json, None), vec![ActionKind::SUMMARIZE]);
    }
}
