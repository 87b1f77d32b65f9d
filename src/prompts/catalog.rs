//! Per-(content type, action) instruction templates.
//!
//! Each template is the system instruction sent to the AI service. The
//! clipboard content itself travels separately and is never templated.
//!
//! Templates scoped to a content type take precedence over wildcard
//! templates (`content_type: None`) for the same action. The catalog can be
//! exported to / merged from a JSON file so users can tune instructions
//! without rebuilding.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::render;
use crate::types::{ActionKind, ContentType};

/// A named slot in an instruction template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    pub name: String,
    /// Used when the caller does not supply the parameter. `None` = required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    /// `None` is the wildcard: applies to any content type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    pub action: ActionKind,
    pub instruction: String,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

impl PromptTemplate {
    pub fn new(content_type: Option<ContentType>, action: ActionKind, instruction: &str) -> Self {
        Self {
            content_type,
            action,
            instruction: instruction.to_string(),
            params: Vec::new(),
        }
    }

    pub fn required(mut self, name: &str) -> Self {
        self.params.push(ParamSpec { name: name.to_string(), default: None });
        self
    }

    pub fn optional(mut self, name: &str, default: &str) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            default: Some(default.to_string()),
        });
        self
    }

    /// Parameters without a default, in declaration order.
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|p| p.default.is_none())
            .map(|p| p.name.as_str())
    }

    /// Every placeholder in the instruction must be a declared parameter.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for name in render::placeholders(&self.instruction) {
            if !self.params.iter().any(|p| p.name == name) {
                return Err(CatalogError::UndeclaredPlaceholder {
                    action: self.action.clone(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("template for '{action}' uses undeclared placeholder '{{{name}}}'")]
    UndeclaredPlaceholder { action: ActionKind, name: String },
    #[error("invalid prompt catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to access prompt file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

type TemplateKey = (Option<ContentType>, ActionKind);

/// On-disk shape of an exported catalog.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    templates: Vec<PromptTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptCatalog {
    templates: BTreeMap<TemplateKey, PromptTemplate>,
}

impl PromptCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template. Returns the template it replaced.
    pub fn insert(&mut self, template: PromptTemplate) -> Result<Option<PromptTemplate>, CatalogError> {
        template.validate()?;
        let key = (template.content_type, template.action.clone());
        Ok(self.templates.insert(key, template))
    }

    /// Exact (content type, action) entry, no wildcard fallback.
    pub fn get(&self, content_type: Option<ContentType>, action: &ActionKind) -> Option<&PromptTemplate> {
        self.templates.get(&(content_type, action.clone()))
    }

    /// The applicable template: specific entry first, then the wildcard.
    pub fn lookup(&self, content_type: ContentType, action: &ActionKind) -> Option<&PromptTemplate> {
        self.get(Some(content_type), action).or_else(|| self.get(None, action))
    }

    /// Every action with at least one template.
    pub fn actions(&self) -> BTreeSet<ActionKind> {
        self.templates.keys().map(|(_, action)| action.clone()).collect()
    }

    pub fn templates(&self) -> impl Iterator<Item = &PromptTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Replace the instruction text of a template, keeping its parameters.
    /// A new template is created when none exists yet; every placeholder in
    /// it becomes a required parameter.
    pub fn set_instruction(
        &mut self,
        content_type: Option<ContentType>,
        action: ActionKind,
        instruction: &str,
    ) -> Result<(), CatalogError> {
        let template = match self.get(content_type, &action) {
            Some(existing) => PromptTemplate {
                instruction: instruction.to_string(),
                ..existing.clone()
            },
            None => render::placeholders(instruction)
                .into_iter()
                .fold(PromptTemplate::new(content_type, action, instruction), |t, name| {
                    t.required(name)
                }),
        };
        self.insert(template)?;
        Ok(())
    }

    /// Overlay another catalog; its entries win.
    pub fn merge(&mut self, other: PromptCatalog) {
        self.templates.extend(other.templates);
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for template in file.templates {
            catalog.insert(template)?;
        }
        Ok(catalog)
    }

    pub fn to_json_string(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            templates: self.templates.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&raw)?;
        log::info!("[PROMPT] Loaded {} templates from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let io_err = |source| CatalogError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_json_string()?).map_err(io_err)?;
        log::info!("[PROMPT] Exported {} templates to {}", self.len(), path.display());
        Ok(())
    }

    /// The built-in catalog shipped with the app.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for template in builtin_templates() {
            let key = (template.content_type, template.action.clone());
            catalog.templates.insert(key, template);
        }
        catalog
    }
}

// ── Built-in templates ─────────────────────────────────────────────

fn builtin_templates() -> Vec<PromptTemplate> {
    use ContentType as T;
    type A = ActionKind;
    let any = |action: ActionKind, instruction: &str| PromptTemplate::new(None, action, instruction);
    let only = |t: ContentType, action: ActionKind, instruction: &str| {
        PromptTemplate::new(Some(t), action, instruction)
    };

    vec![
        // ── Text ──
        any(A::FIX_TYPOS, PROMPT_FIX_TYPOS),
        any(A::FIX_GRAMMAR, PROMPT_FIX_GRAMMAR),
        any(A::SUMMARIZE, PROMPT_SUMMARIZE).optional("target_length", "50 words"),
        any(A::TRANSLATE, PROMPT_TRANSLATE).optional("target_language", "English"),
        any(A::EXPLAIN, PROMPT_EXPLAIN),
        any(A::EXTRACT_DATA, PROMPT_EXTRACT_DATA).optional("output_format", "CSV"),
        any(A::EXTRACT_KEYWORDS, PROMPT_EXTRACT_KEYWORDS),
        any(A::FORMAT, PROMPT_FORMAT),
        any(A::CONVERT_CASE, PROMPT_CONVERT_CASE).required("target_case"),
        // ── Web / documents ──
        any(A::SUMMARIZE_PAGE, PROMPT_SUMMARIZE_PAGE),
        any(A::EXTRACT_LINKS, PROMPT_EXTRACT_LINKS),
        any(A::EXTRACT_HEADINGS, PROMPT_EXTRACT_HEADINGS),
        any(A::CONVERT_TO_HTML, PROMPT_CONVERT_TO_HTML),
        // ── Code ──
        only(T::Code, A::FIX_TYPOS, PROMPT_CODE_FIX_TYPOS),
        only(T::Code, A::FORMAT, PROMPT_CODE_FORMAT),
        only(T::Code, A::SUMMARIZE, PROMPT_CODE_SUMMARIZE).optional("target_length", "50 words"),
        any(A::EXPLAIN_CODE, PROMPT_EXPLAIN_CODE),
        only(T::Code, A::EXPLAIN, PROMPT_EXPLAIN_CODE),
        any(A::ADD_DOCSTRING, PROMPT_ADD_DOCSTRING).optional("docstring_style", "Google"),
        any(A::ADD_JSDOC, PROMPT_ADD_JSDOC),
        any(A::GENERATE_TESTS, PROMPT_GENERATE_TESTS)
            .optional("test_framework", "the idiomatic test framework for the language"),
        any(A::CONVERT_TO_TYPESCRIPT, PROMPT_CONVERT_TO_TYPESCRIPT),
        // ── Git ──
        any(A::GENERATE_COMMIT, PROMPT_GENERATE_COMMIT),
        any(A::SUMMARIZE_CHANGES, PROMPT_SUMMARIZE_CHANGES),
        only(T::GitDiff, A::SUMMARIZE, PROMPT_SUMMARIZE_CHANGES),
        // ── Structured data ──
        any(A::FORMAT_JSON, PROMPT_FORMAT_JSON),
        only(T::Json, A::FORMAT, PROMPT_FORMAT_JSON),
        any(A::VALIDATE_JSON, PROMPT_VALIDATE_JSON),
        only(T::Json, A::EXTRACT_DATA, PROMPT_JSON_EXTRACT_VALUES),
        only(T::Tabular, A::EXTRACT_DATA, PROMPT_TABLE_EXTRACT).optional("output_format", "CSV"),
        any(A::FORMAT_SQL, PROMPT_FORMAT_SQL),
        only(T::Sql, A::FORMAT, PROMPT_FORMAT_SQL),
        any(A::EXPLAIN_QUERY, PROMPT_EXPLAIN_QUERY),
        only(T::Sql, A::EXPLAIN, PROMPT_EXPLAIN_QUERY),
        // ── Logs ──
        any(A::EXPLAIN_ERROR, PROMPT_EXPLAIN_ERROR),
        only(T::Log, A::EXPLAIN, PROMPT_EXPLAIN_ERROR),
        only(T::Log, A::SUMMARIZE, PROMPT_LOG_SUMMARIZE).optional("target_length", "50 words"),
    ]
}

const PROMPT_FIX_TYPOS: &str = "You are a careful proofreader.
Correct spelling mistakes and obvious typos only.
Do not change meaning, tone, wording choices, or formatting.
Return only the corrected text.";

const PROMPT_FIX_GRAMMAR: &str = "You are a grammar correction specialist.
Fix grammar, spelling, and punctuation errors.
Keep the original tone and style; only rewrite a sentence when grammar requires it.
Return only the corrected text.";

const PROMPT_SUMMARIZE: &str = "You are a summarization expert.
Summarize the text while preserving the key information.
Target length: {target_length}.
Focus on main ideas and important details, in clear and simple language.
Return only the summary.";

const PROMPT_TRANSLATE: &str = "You are a professional translator.
Translate the text to {target_language}.
Preserve tone and meaning, and use natural, fluent phrasing.
Return only the translation.";

const PROMPT_EXPLAIN: &str = "You explain content clearly and concisely.
Cover what this content is, its key information, and any important context.
Keep it to 3-5 sentences. Be helpful, not verbose.";

const PROMPT_EXTRACT_DATA: &str = "You extract structured data from unstructured text.
Identify entities, values, and records present in the text.
Return them as {output_format}, with a header row or keys where applicable.
Do not invent values that are not in the text.";

const PROMPT_EXTRACT_KEYWORDS: &str = "You are a keyword extraction specialist.
Extract the 5-10 most important keywords or phrases, most important first.
Return them as a comma-separated list. Skip common filler words.";

const PROMPT_FORMAT: &str = "You reformat content for readability.
Fix spacing, line breaks, and indentation; keep every word and value unchanged.
Return only the reformatted content.";

const PROMPT_CONVERT_CASE: &str = "You convert text between letter cases.
Convert the text to {target_case}.
Change nothing except letter case and word separators.
Return only the converted text.";

const PROMPT_SUMMARIZE_PAGE: &str = "You summarize web pages.
The content is a link or page text. Describe the main topic and purpose,
list 3-5 key points as bullets, and name the target audience if evident.
If only a URL is given, explain what the address most likely points to.";

const PROMPT_EXTRACT_LINKS: &str = "You extract links.
List every URL in the content as a numbered list, without duplicates.
Add a few words of context for each link when the content provides it.";

const PROMPT_EXTRACT_HEADINGS: &str = "You extract document structure.
List the headings of this Markdown document as an indented outline
that preserves heading levels. Return only the outline.";

const PROMPT_CONVERT_TO_HTML: &str = "You convert Markdown to HTML.
Produce semantic HTML5 for the document body only (no <html> or <head>).
Return only the HTML.";

const PROMPT_CODE_FIX_TYPOS: &str = "You are a strict code typo fixer.
Only correct spelling or syntax mistakes.
Do not change logic, structure, formatting, or identifiers that are spelled consistently.
Do not add comments or explanations.
Return only the corrected code.";

const PROMPT_CODE_FORMAT: &str = "You format source code.
Apply the conventional style of the code's language (indentation, spacing, line breaks).
Do not change behavior or identifiers.
Return only the formatted code.";

const PROMPT_CODE_SUMMARIZE: &str = "You summarize source code for a developer.
Describe what the code does and its main inputs and outputs.
Target length: {target_length}.";

const PROMPT_EXPLAIN_CODE: &str = "You are a patient code instructor.
Explain the code in simple terms: its overall purpose, how it works step by step,
and the key concepts it uses. Use an analogy when it helps. Be concise but thorough.";

const PROMPT_ADD_DOCSTRING: &str = "You are a documentation expert.
Add clear, concise documentation comments in {docstring_style} style:
a one-line description, parameters, and return value.
Do not modify the code logic.
Return the complete code with documentation added.";

const PROMPT_ADD_JSDOC: &str = "You are a JavaScript documentation expert.
Add JSDoc comments with @description, @param, and @returns tags.
Do not modify the code logic.
Return the complete code with JSDoc added.";

const PROMPT_GENERATE_TESTS: &str = "You are a testing expert.
Write unit tests for the code using {test_framework}.
Cover the happy path, edge cases, and error conditions, with clear test names.
Return complete, runnable test code only.";

const PROMPT_CONVERT_TO_TYPESCRIPT: &str = "You convert JavaScript to TypeScript.
Add type annotations for parameters, return values, and variables where helpful.
Keep the logic identical.
Return only valid TypeScript code.";

const PROMPT_GENERATE_COMMIT: &str = "You write Git commit messages following Conventional Commits.
Use one of: feat, fix, docs, refactor, test, chore, style.
Format: <type>: <description>, imperative mood, under 72 characters.
Add a body only when the change is complex.
Return only the commit message.";

const PROMPT_SUMMARIZE_CHANGES: &str = "You are a code review assistant.
Summarize this diff in plain English as 3-5 bullet points:
what changed (files, functions), why it matters, and any potential concerns.";

const PROMPT_FORMAT_JSON: &str = "You format JSON.
Indent with 2 spaces and keep valid JSON syntax.
Do not modify keys or values.
Return only the formatted JSON.";

const PROMPT_VALIDATE_JSON: &str = "You validate JSON.
If the content is valid JSON, reply exactly: Valid JSON
Otherwise explain each error and where it occurs, and show a corrected version.";

const PROMPT_JSON_EXTRACT_VALUES: &str = "You extract values from JSON.
List every leaf value with its full key path (e.g. user.address.city = Paris),
one per line, in document order.";

const PROMPT_TABLE_EXTRACT: &str = "You extract tabular data.
Detect column headers and data rows, then return the table as {output_format}.
Quote fields that contain the delimiter. Return only the table.";

const PROMPT_FORMAT_SQL: &str = "You format SQL.
Uppercase keywords, break clauses onto their own lines, and indent consistently.
Do not change the query's meaning.
Return only the formatted SQL.";

const PROMPT_EXPLAIN_QUERY: &str = "You are a SQL expert.
Explain in plain English what the query does: which data it reads or modifies,
which tables are involved, and what joins and filters apply.";

const PROMPT_EXPLAIN_ERROR: &str = "You explain errors, stack traces, and log output.
State what the error means in plain English, why it likely occurred,
and the most common fix. A developer is reading this; keep it to 3-5 sentences.";

const PROMPT_LOG_SUMMARIZE: &str = "You summarize log output.
Report the time span covered, notable errors and warnings with counts,
and the most likely root cause if one stands out.
Target length: {target_length}.";
