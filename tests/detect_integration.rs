//! Integration tests for detection + prompt resolution over a corpus of
//! realistic clipboard snippets.

use clipboard_ai_lib::prompts::PromptManager;
use clipboard_ai_lib::{ContentDetector, ContentType, Params};

const SNIPPETS: &[(&str, ContentType)] = &[
    (
        "import os\n\nclass Loader:\n    def __init__(self, path):\n        self.path = path\n",
        ContentType::Code,
    ),
    (
        "const total = items.reduce((sum, x) => sum + x.price, 0);\nconsole.log(total);",
        ContentType::Code,
    ),
    (
        "diff --git a/src/app.py b/src/app.py\nindex 3b18e51..a9c0f2d 100644\n--- a/src/app.py\n+++ b/src/app.py\n@@ -1,3 +1,4 @@\n+import sys\n import os",
        ContentType::GitDiff,
    ),
    ("https://docs.rs/tokio/latest/tokio/time/fn.timeout.html", ContentType::Url),
    (
        "Hi Maria,\n\nThanks for sending the draft over. I left a few comments on section two.\n\nBest regards,\nTom",
        ContentType::Email,
    ),
    (r#"[{"id": 1, "tags": ["a", "b"]}, {"id": 2, "tags": []}]"#, ContentType::Json),
    (
        "SELECT u.name, COUNT(o.id) FROM users u JOIN orders o ON o.user_id = u.id GROUP BY u.name;",
        ContentType::Sql,
    ),
    (
        "# Release notes\n\n- Faster startup\n- New **history** view\n\nSee [the docs](https://example.com).",
        ContentType::Markdown,
    ),
    ("name\tage\tcity\nAda\t36\tLondon\nLinus\t54\tPortland", ContentType::Tabular),
    (
        "2024-05-01 12:00:01 INFO server started\n2024-05-01 12:00:07 WARN slow request\n2024-05-01 12:01:00 ERROR upstream timeout",
        ContentType::Log,
    ),
    (
        "Traceback (most recent call last):\n  File \"app.py\", line 42, in main\n    import pandas\nModuleNotFoundError: No module named 'pandas'",
        ContentType::Log,
    ),
    ("Remember to pick up milk and call the dentist tomorrow", ContentType::PlainText),
];

#[test]
fn snippets_classify_as_expected() {
    let detector = ContentDetector::default();
    for (text, expected) in SNIPPETS {
        let result = detector.detect(text).unwrap();
        assert_eq!(result.content_type, *expected, "input: {:?}", text);
    }
}

#[test]
fn every_result_is_well_formed() {
    let detector = ContentDetector::default();
    for (text, _) in SNIPPETS {
        let result = detector.detect(text).unwrap();
        assert!((0.0..=1.0).contains(&result.confidence), "{:?}", text);
        assert!(!result.suggested_actions.is_empty());
        let mut seen = result.suggested_actions.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), result.suggested_actions.len(), "duplicates for {:?}", text);
        assert_eq!(result.language.is_some(), result.content_type == ContentType::Code);
    }
}

#[test]
fn detection_is_deterministic() {
    let detector = ContentDetector::default();
    for (text, _) in SNIPPETS {
        assert_eq!(detector.detect(text).unwrap(), detector.detect(text).unwrap());
    }
}

#[test]
fn every_suggested_action_resolves_with_required_params() {
    let detector = ContentDetector::default();
    let prompts = PromptManager::builtin();
    for (text, _) in SNIPPETS {
        let detection = detector.detect(text).unwrap();
        for action in &detection.suggested_actions {
            let template = prompts
                .catalog()
                .lookup(detection.content_type, action)
                .unwrap_or_else(|| panic!("no template for {} / {}", detection.content_type, action));
            let params: Params = template
                .required_params()
                .map(|name| (name.to_string(), "value".to_string()))
                .collect();
            let rendered = prompts
                .resolve(detection.content_type, action, &params, text)
                .unwrap();
            assert!(!rendered.system_instructions.is_empty());
            assert_eq!(rendered.content, *text);
        }
    }
}

#[test]
fn every_catalog_entry_resolves_for_every_type() {
    let prompts = PromptManager::builtin();
    for content_type in ContentType::ALL {
        for action in prompts.available_actions(content_type) {
            let template = prompts.catalog().lookup(content_type, &action).unwrap();
            let params: Params = template
                .required_params()
                .map(|name| (name.to_string(), "x".to_string()))
                .collect();
            assert!(prompts.resolve(content_type, &action, &params, "text").is_ok());
        }
    }
}

#[test]
fn javascript_gets_language_specific_actions() {
    let result = ContentDetector::default()
        .detect("function greet(name) {\n  console.log(`hi ${name}`);\n}")
        .unwrap();
    assert_eq!(result.content_type, ContentType::Code);
    assert_eq!(result.language.as_deref(), Some("javascript"));
    assert!(result
        .suggested_actions
        .iter()
        .any(|a| a.as_str() == "convert_to_typescript"));
}
