//! Content structure heuristics for clipboard text.
//!
//! Each matcher is a pure function from text to a raw, non-negative score.
//! Scores are additive counts of independent indicators (weighted where an
//! indicator is decisive on its own), so `ContentDetector` can normalize
//! them all with one formula and compare them directly.
//!
//! Matchers receive text that is already trimmed and known to be non-empty.

use regex::Regex;
use std::sync::OnceLock;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("static regex pattern"))
        }
    };
}

fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.trim().is_empty()).collect()
}

// ── Git diff ────────────────────────────────────────────────────────

static_regex!(diff_header, r"(?m)^diff --git ");
static_regex!(diff_index, r"(?m)^index [0-9a-f]+\.\.[0-9a-f]+");
static_regex!(diff_old_file, r"(?m)^--- (a/|/dev/null)");
static_regex!(diff_new_file, r"(?m)^\+\+\+ (b/|/dev/null)");
static_regex!(diff_hunk, r"(?m)^@@ -\d+(,\d+)? \+\d+(,\d+)? @@");

/// Unified diff markers. Each one is specific enough to count double.
pub fn score_git_diff(text: &str) -> f64 {
    let markers = [diff_header(), diff_index(), diff_old_file(), diff_new_file(), diff_hunk()];
    let hits = markers.iter().filter(|re| re.is_match(text)).count();
    hits as f64 * 2.0
}

// ── URL ─────────────────────────────────────────────────────────────

static_regex!(url_line, r"^(?:(?:https?|ftp)://\S+|www\.\S+\.\S+)$");

/// Scheme prefix on every line (a single link, or a list of links).
pub fn score_url(text: &str) -> f64 {
    let lines = non_empty_lines(text);
    let url_lines = lines.iter().filter(|l| url_line().is_match(l.trim())).count();
    if url_lines == 0 {
        0.0
    } else if url_lines == lines.len() {
        4.0
    } else if url_lines * 2 > lines.len() {
        2.0
    } else {
        0.0
    }
}

// ── Email ───────────────────────────────────────────────────────────

static_regex!(email_address, r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$");
static_regex!(email_address_anywhere, r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}");
static_regex!(email_header, r"(?mi)^(from|to|cc|bcc|subject|date|reply-to):[ \t]*\S");
static_regex!(email_greeting, r"(?mi)^(dear|hi|hello|hey)\b[^\n]{0,40},[ \t]*$");
static_regex!(
    email_signoff,
    r"(?mi)^(best|regards|best regards|kind regards|warm regards|sincerely|thanks|thank you|cheers)[,!.]?[ \t]*$"
);

/// A bare address, or a message shaped like an email (headers, greeting, sign-off).
pub fn score_email(text: &str) -> f64 {
    if !text.contains('\n') && email_address().is_match(text) {
        return 4.0;
    }

    let headers = email_header().find_iter(text).count().min(4) as f64;
    let greeting = if email_greeting().is_match(text) { 1.0 } else { 0.0 };
    let signoff = if email_signoff().is_match(text) { 1.0 } else { 0.0 };
    let letter = headers + greeting + signoff;

    // An address alone in a longer text is weak evidence
    if letter > 0.0 && email_address_anywhere().is_match(text) {
        letter + 0.5
    } else {
        letter
    }
}

// ── JSON ────────────────────────────────────────────────────────────

static_regex!(json_key, r#""[^"\n]+"\s*:"#);

/// Parses as a JSON object/array, or at least looks like a broken one.
pub fn score_json(text: &str) -> f64 {
    if !(text.starts_with('{') || text.starts_with('[')) {
        return 0.0;
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) if value.is_object() || value.is_array() => 6.0,
        _ => {
            if json_key().find_iter(text).count() >= 2 {
                1.5
            } else {
                0.0
            }
        }
    }
}

// ── Source code ─────────────────────────────────────────────────────

/// Indicator pattern and its weight. Weight 2 marks indicators that settle
/// the language on their own.
type Indicator = (&'static str, usize);

const PYTHON: &[Indicator] = &[
    (r"(?m)^\s*def\s+\w+\s*\(", 1),
    (r"(?m)^\s*class\s+\w+", 1),
    (r"(?m)^\s*import\s+\w+", 1),
    (r"(?m)^\s*from\s+[\w.]+\s+import\b", 1),
    (r"(?m)^\s*(def|class|if|elif|else|for|while|with|try|except|finally)\b[^\n]*:\s*$", 1),
    (r"\bself\.\w+", 1),
    (r"\bprint\(", 1),
];

const JAVASCRIPT: &[Indicator] = &[
    (r"\bfunction\s*\w*\s*\(", 1),
    (r"\b(const|let|var)\s+\w+\s*=", 1),
    (r"=>", 1),
    (r"console\.\w+\(", 1),
    (r#"(?m)^\s*(import|export)\b[^\n]*\bfrom\s+['"]"#, 1),
    (r"\b(document|window)\.\w+", 1),
];

const RUST: &[Indicator] = &[
    (r"\bfn\s+\w+\s*[<(]", 1),
    (r"\blet\s+mut\b", 1),
    (r"(?m)^\s*impl\b[^\n]*\{", 1),
    (r"(?m)^\s*use\s+\w+(::\w+)+", 1),
    (r"\bpub\s+(fn|struct|enum|mod|trait)\b", 1),
    (r"#\[\w+", 1),
];

const SHELL: &[Indicator] = &[
    (r"(?m)^#!/", 2),
    (r"(?m)^\s*\$\s+\w+", 2),
    (r"(?m)^\s*(sudo|apt-get|apt|brew|npm|pip|pip3|cargo|git|docker|kubectl)\s+\w+", 1),
    (r"\|\s*(grep|awk|sed|xargs|sort|head|tail)\b", 1),
    (r"(?m)^\s*(export|echo|cd|chmod)\s+\S", 1),
];

struct LanguageFamily {
    name: &'static str,
    indicators: Vec<(Regex, usize)>,
}

/// Language families in tie-break order.
fn language_families() -> &'static [LanguageFamily] {
    static FAMILIES: OnceLock<Vec<LanguageFamily>> = OnceLock::new();
    FAMILIES.get_or_init(|| {
        [("python", PYTHON), ("javascript", JAVASCRIPT), ("rust", RUST), ("shell", SHELL)]
            .into_iter()
            .map(|(name, indicators)| LanguageFamily {
                name,
                indicators: indicators
                    .iter()
                    .map(|(p, weight)| (Regex::new(p).expect("static regex pattern"), *weight))
                    .collect(),
            })
            .collect()
    })
}

/// Highest-scoring language family and its weighted indicator count.
fn best_language(text: &str) -> Option<(&'static str, usize)> {
    let mut best: Option<(&'static str, usize)> = None;
    for family in language_families() {
        let hits: usize = family
            .indicators
            .iter()
            .filter(|(re, _)| re.is_match(text))
            .map(|(_, weight)| weight)
            .sum();
        if hits > 0 && best.map_or(true, |(_, b)| hits > b) {
            best = Some((family.name, hits));
        }
    }
    best
}

static_regex!(
    shell_command,
    r"^\s*(\$\s+)?(sudo|apt-get|apt|brew|npm|npx|pip|pip3|cargo|git|docker|kubectl|export|echo|cd|chmod|curl|wget|mkdir|rm|cp|mv|ls|cat)\s+\S"
);
static_regex!(shell_syntax, r#"\s--?[A-Za-z]|=|\$\w|\$\{|/|\||&&|"[^"]*"|'[^']*'"#);

/// Every line is a command invocation carrying shell syntax (flags,
/// assignments, variables, paths, pipes or quoting).
fn is_command_line(lines: &[&str]) -> bool {
    !lines.is_empty()
        && lines
            .iter()
            .all(|l| shell_command().is_match(l) && shell_syntax().is_match(l))
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// A block opener (`:` or `{` at line end) followed by a deeper-indented line.
fn has_indented_block(lines: &[&str]) -> bool {
    lines.windows(2).any(|pair| {
        let opener = pair[0].trim_end();
        (opener.ends_with(':') || opener.ends_with('{')) && indent_of(pair[1]) > indent_of(pair[0])
    })
}

/// At least 30% of lines end like statements or brackets.
fn has_statement_endings(lines: &[&str]) -> bool {
    let ending = lines
        .iter()
        .filter(|l| {
            let trimmed = l.trim_end();
            [';', '{', '}', ')', ']'].iter().any(|c| trimmed.ends_with(*c))
        })
        .count();
    ending > 0 && ending * 10 >= lines.len() * 3
}

/// Keyword density of the best language family plus structural signals
/// (indentation under block openers, statement terminators, command lines).
pub fn score_code(text: &str) -> f64 {
    let lines = non_empty_lines(text);
    let language = best_language(text).map_or(0, |(_, hits)| hits);
    let mut structure = 0;
    if has_indented_block(&lines) {
        structure += 1;
    }
    if has_statement_endings(&lines) {
        structure += 1;
    }
    if is_command_line(&lines) {
        structure += 1;
    }
    // Structure alone (e.g. prose ending in a parenthesis) is not code
    if language == 0 {
        return 0.0;
    }
    (language + structure) as f64
}

/// Which programming language a code snippet is most likely written in.
pub fn detect_code_language(text: &str) -> Option<&'static str> {
    best_language(text).map(|(name, _)| name)
}

// ── SQL ─────────────────────────────────────────────────────────────

static_regex!(
    sql_keyword,
    r"(?i)\b(select|from|where|insert|into|update|set|delete|create|table|drop|alter|join|group\s+by|order\s+by|values|having|limit)\b"
);
static_regex!(sql_uppercase_start, r"^\s*(SELECT|INSERT|UPDATE|DELETE|CREATE|DROP|ALTER|WITH)\b");
static_regex!(sql_select, r"(?is)^\s*select\s+.+?\s+from\s+[\w.`\x22\[\]]+");
static_regex!(sql_select_list, r"(?i)^\s*select\s+(distinct\s+)?[\w.]+(\s*,\s*[\w.]+)+\s+from\b");
static_regex!(
    sql_statement_shape,
    r"(?ix)^\s*(
        insert\s+into\s+[\w.]+\s*(\(|values\b|select\b)
      | update\s+[\w.]+\s+set\s+[\w.]+\s*=
      | delete\s+from\s+[\w.]+\s*(where\b|;|$)
      | create\s+(table|(unique\s+)?index|view|database|schema)\s+(if\s+not\s+exists\s+)?[\w.]+\s*(\(|on\b|as\b|;|$)
      | drop\s+(table|index|view|database|schema)\s+(if\s+exists\s+)?[\w.]+
      | alter\s+table\s+[\w.]+\s+(add|drop|alter|rename|modify)\b
      | with\s+\w+\s+as\s*\(
    )"
);

/// `select ... from <table>` backed by query punctuation, an uppercase
/// keyword or a column list. Commas alone prove nothing.
fn is_select_query(text: &str, uppercase: bool) -> bool {
    sql_select().is_match(text)
        && (uppercase
            || sql_select_list().is_match(text)
            || text.chars().any(|c| matches!(c, '*' | ';' | '=' | '(')))
}

/// A recognizable statement shape up front plus a count of distinct SQL
/// keywords. Sentences that start with "Select" or "Update" but lack the
/// statement's grammar score zero.
pub fn score_sql(text: &str) -> f64 {
    let uppercase = sql_uppercase_start().is_match(text);
    if !is_select_query(text, uppercase) && !sql_statement_shape().is_match(text) {
        return 0.0;
    }
    let mut keywords: Vec<String> = sql_keyword()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    keywords.sort();
    keywords.dedup();
    if keywords.len() < 2 {
        return 0.0;
    }
    keywords.len() as f64 + if uppercase { 1.0 } else { 0.0 }
}

// ── Logs and stack traces ───────────────────────────────────────────

static_regex!(log_timestamp, r"^\[?\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}");
static_regex!(log_syslog, r"^[A-Z][a-z]{2}\s+\d{1,2} \d{2}:\d{2}:\d{2}");
static_regex!(log_level, r"\b(TRACE|DEBUG|INFO|WARN|WARNING|ERROR|FATAL|CRITICAL)\b");
static_regex!(
    trace_marker,
    r"(?m)^\s*(Traceback \(most recent call last\)|at [\w$.<>]+\(.*\)$|[\w.]+(Error|Exception):|thread '.*' panicked at|error\[E\d+\])"
);

/// Timestamp-prefixed lines, level markers, and stack-trace frames.
pub fn score_log(text: &str) -> f64 {
    let lines = non_empty_lines(text);
    let stamped = lines
        .iter()
        .filter(|l| {
            let trimmed = l.trim_start();
            log_timestamp().is_match(trimmed) || log_syslog().is_match(trimmed)
        })
        .count();

    let mut score = 0.0;
    if stamped > 0 {
        let ratio = stamped as f64 / lines.len() as f64;
        score += if ratio >= 0.5 { 4.0 * ratio } else { 2.0 * ratio };
        if log_level().is_match(text) {
            score += 1.0;
        }
    }
    let frames = trace_marker().find_iter(text).count().min(3);
    score + frames as f64 * 1.5
}

// ── Markdown ────────────────────────────────────────────────────────

static_regex!(md_heading, r"(?m)^#{1,6}\s+\S");
static_regex!(md_link, r"\[[^\]\n]+\]\([^)\n]+\)");
static_regex!(md_emphasis, r"\*\*[^*\n]+\*\*|__[^_\n]+__");
static_regex!(md_list, r"(?m)^\s*([-*+]|\d+\.)\s+\S");
static_regex!(md_fence, r"(?m)^\s*```");
static_regex!(md_quote, r"(?m)^>\s");

/// Line-start markers and inline markup. One marker alone is not enough
/// to beat plain text.
pub fn score_markdown(text: &str) -> f64 {
    let markers = [md_heading(), md_link(), md_emphasis(), md_list(), md_fence(), md_quote()];
    markers.iter().filter(|re| re.is_match(text)).count() as f64
}

// ── Tabular data ────────────────────────────────────────────────────

/// Positions where a run of 2+ spaces starts (column gaps, not indentation).
fn column_gaps(line: &str) -> Vec<usize> {
    let mut gaps = Vec::new();
    let bytes = line.as_bytes();
    let start = indent_of(line);
    let mut i = start;
    while i + 1 < bytes.len() {
        if bytes[i] == b' ' && bytes[i + 1] == b' ' {
            gaps.push(i);
            while i < bytes.len() && bytes[i] == b' ' {
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    gaps
}

/// Consistent delimiters (tabs, pipes, commas) or aligned whitespace columns.
pub fn score_tabular(text: &str) -> f64 {
    let lines = non_empty_lines(text);
    let total = lines.len();
    if total < 2 {
        return 0.0;
    }

    let tab_lines = lines.iter().filter(|l| l.contains('\t')).count();
    let pipe_lines = lines.iter().filter(|l| l.matches('|').count() >= 2).count();
    if tab_lines * 2 > total || pipe_lines * 2 > total {
        return 3.0;
    }

    // CSV: every line has the same number of commas
    let commas: Vec<usize> = lines.iter().map(|l| l.matches(',').count()).collect();
    let first = commas[0];
    if first >= 1 && commas.iter().all(|c| *c == first) && (first >= 2 || total >= 3) {
        return 2.5;
    }

    // Aligned whitespace columns need a few rows to be convincing
    if total >= 3 {
        let gaps: Vec<Vec<usize>> = lines.iter().map(|l| column_gaps(l)).collect();
        let header = &gaps[0];
        if !header.is_empty() {
            let aligned = gaps[1..]
                .iter()
                .filter(|row| {
                    row.iter()
                        .any(|p| header.iter().any(|h| (*p as i64 - *h as i64).unsigned_abs() <= 2))
                })
                .count();
            if aligned * 2 >= total {
                return 2.0;
            }
        }
    }

    0.0
}
