//! Command-line adapter. Reads text from `--file` or stdin, prints JSON.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::detect::ContentDetector;
use crate::history::file_store::default_history_path;
use crate::history::{HistoryError, HistoryStore, JsonFileHistoryStore, UsageStats};
use crate::llm::{self, Provider};
use crate::pipeline::ActionDispatcher;
use crate::prompts::{CatalogError, PromptManager};
use crate::settings::{Settings, SettingsError};
use crate::types::{ActionKind, ContentType, Params};

#[derive(Debug, Parser)]
#[command(
    name = "clipboard-ai",
    version,
    about = "Classify clipboard text and transform it with an AI action"
)]
pub struct Cli {
    /// History file (defaults to the platform data dir)
    #[arg(long, global = true, env = "CLIPBOARD_AI_HISTORY")]
    pub history: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify text and list suggested actions
    Detect {
        /// Read text from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Run an action on text
    Run {
        /// Action id (e.g. fix_typos, summarize, translate)
        action: String,
        /// Template parameter, repeatable (e.g. -p target_language=French)
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Skip detection and treat the text as this content type
        #[arg(long)]
        content_type: Option<ContentType>,
        /// Read text from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List recent history, most recent first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Only entries for this action
        #[arg(long)]
        action: Option<String>,
    },
    /// Show one history entry in full
    Show { id: u64 },
    /// Delete one history entry
    Delete { id: u64 },
    /// Delete all history
    Clear,
    /// Usage statistics
    Stats,
    /// List actions known to the prompt catalog
    Actions {
        /// Only actions applicable to this content type
        #[arg(long)]
        content_type: Option<ContentType>,
    },
    /// List supported AI providers
    Providers,
    /// Write the active prompt catalog to a JSON file
    ExportPrompts { path: PathBuf },
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Prompts(#[from] CatalogError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("input text is empty")]
    EmptyInput,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(text)
}

/// `stats` output: stored usage plus a spend estimate for the active provider.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    #[serde(flatten)]
    usage: UsageStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimated_cost_usd: Option<f64>,
}

impl StatsReport {
    fn new(usage: UsageStats, provider: Option<Provider>) -> Self {
        let estimated_cost_usd = provider.map(|p| usage.estimated_cost_usd(p));
        Self { usage, provider, estimated_cost_usd }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Execute a parsed command. Returns `false` when a dispatched action
/// failed (the outcome is still printed).
pub async fn run(cli: Cli) -> Result<bool, CliError> {
    run_with(cli, Settings::from_env).await
}

/// Settings are loaded only by the commands that read them, so a bad
/// variable never blocks `detect`, `providers` or the history commands.
async fn run_with(
    cli: Cli,
    load_settings: impl Fn() -> Result<Settings, SettingsError>,
) -> Result<bool, CliError> {
    let history_override = cli.history;
    let settings = || -> Result<Settings, SettingsError> {
        let mut settings = load_settings()?;
        if let Some(path) = &history_override {
            settings.history_path = path.clone();
        }
        Ok(settings)
    };
    // clap already folds CLIPBOARD_AI_HISTORY into `--history`
    let history_path = history_override.clone().unwrap_or_else(default_history_path);
    let open_history = || JsonFileHistoryStore::open(&history_path);

    match cli.command {
        Command::Detect { file } => {
            let text = read_input(file.as_deref())?;
            let detection = ContentDetector::default()
                .detect(&text)
                .map_err(|_| CliError::EmptyInput)?;
            print_json(&detection)?;
        }
        Command::Run {
            action,
            params,
            content_type,
            file,
        } => {
            let settings = settings()?;
            let text = read_input(file.as_deref())?;
            let params: Params = params.into_iter().collect();
            let history: Arc<dyn HistoryStore> = Arc::new(JsonFileHistoryStore::open(&settings.history_path)?);
            let client = llm::client_for(settings.client_config()?);
            let dispatcher = ActionDispatcher::new(
                ContentDetector::default(),
                PromptManager::new(settings.prompt_catalog()?),
                client,
                history,
            )
            .with_timeout(settings.timeout);

            let detection = match content_type {
                Some(t) => {
                    let mut d = dispatcher.detect(&text).map_err(|_| CliError::EmptyInput)?;
                    d.content_type = t;
                    Some(d)
                }
                None => None,
            };
            let outcome = dispatcher
                .dispatch(&text, &ActionKind::new(&action), &params, detection.as_ref())
                .await;
            print_json(&outcome)?;
            return Ok(outcome.success);
        }
        Command::History { limit, action } => {
            let store = open_history()?;
            let records = match action {
                Some(a) => store.list_by_action(&ActionKind::new(a), limit),
                None => store.list_recent(limit),
            };
            print_json(&records)?;
        }
        Command::Show { id } => print_json(&open_history()?.get(id)?)?,
        Command::Delete { id } => {
            open_history()?.delete(id)?;
            print_json(&serde_json::json!({ "deleted": id }))?;
        }
        Command::Clear => {
            let removed = open_history()?.clear()?;
            print_json(&serde_json::json!({ "cleared": removed }))?;
        }
        Command::Stats => {
            let usage = open_history()?.stats();
            let provider = match settings().and_then(|s| s.resolve_provider()) {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("[SETTINGS] No cost estimate: {}", e);
                    None
                }
            };
            print_json(&StatsReport::new(usage, provider))?;
        }
        Command::Actions { content_type } => {
            let prompts = PromptManager::new(settings()?.prompt_catalog()?);
            let actions: Vec<ActionKind> = match content_type {
                Some(t) => prompts.available_actions(t).into_iter().collect(),
                None => prompts.catalog().actions().into_iter().collect(),
            };
            print_json(&actions)?;
        }
        Command::Providers => print_json(&llm::all_providers())?,
        Command::ExportPrompts { path } => {
            let catalog = settings()?.prompt_catalog()?;
            catalog.save(&path)?;
            print_json(&serde_json::json!({ "exported": catalog.len(), "path": path }))?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn bad_temperature() -> Result<Settings, SettingsError> {
        Err(SettingsError::InvalidValue {
            key: "CLIPBOARD_AI_TEMPERATURE",
            value: "hot".into(),
            reason: "not a number".into(),
        })
    }

    #[tokio::test]
    async fn commands_without_settings_ignore_bad_settings() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.txt");
        std::fs::write(&input, "Just plain text here").unwrap();
        let history = dir.path().join("history.json");
        let history_arg = history.to_str().unwrap();

        for args in [
            vec!["clipboard-ai", "detect", "--file", input.to_str().unwrap()],
            vec!["clipboard-ai", "providers"],
            vec!["clipboard-ai", "--history", history_arg, "history"],
            vec!["clipboard-ai", "--history", history_arg, "stats"],
        ] {
            let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
            assert!(run_with(cli, bad_temperature).await.unwrap(), "{:?}", args);
        }
    }

    #[tokio::test]
    async fn commands_needing_settings_report_bad_settings() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["clipboard-ai", "actions"]).unwrap();
        let err = run_with(cli, bad_temperature).await.unwrap_err();
        assert!(matches!(err, CliError::Settings(SettingsError::InvalidValue { .. })));

        let input = dir.path().join("input.txt");
        std::fs::write(&input, "teh text").unwrap();
        let cli = Cli::try_parse_from(["clipboard-ai", "run", "fix_typos", "--file", input.to_str().unwrap()])
            .unwrap();
        assert!(matches!(run_with(cli, bad_temperature).await, Err(CliError::Settings(_))));
    }

    #[test]
    fn stats_report_includes_cost_for_known_provider() {
        let usage = UsageStats { total_count: 2, total_tokens: 2_000_000, ..Default::default() };
        let json = serde_json::to_value(StatsReport::new(usage.clone(), Some(Provider::OpenAi))).unwrap();
        assert_eq!(json["totalTokens"], 2_000_000);
        assert_eq!(json["provider"], "openai");
        assert!((json["estimatedCostUsd"].as_f64().unwrap() - 0.75).abs() < 1e-12);

        let json = serde_json::to_value(StatsReport::new(usage, None)).unwrap();
        assert!(json.get("estimatedCostUsd").is_none());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn params_parse_key_value() {
        assert_eq!(
            parse_param("target_language=Brazilian Portuguese").unwrap(),
            ("target_language".to_string(), "Brazilian Portuguese".to_string())
        );
        assert_eq!(parse_param("expr=a=b").unwrap().1, "a=b");
        assert!(parse_param("no-equals").is_err());
        assert!(parse_param("=value").is_err());
    }

    #[test]
    fn run_command_parses_repeated_params() {
        let cli = Cli::try_parse_from([
            "clipboard-ai",
            "run",
            "translate",
            "-p",
            "target_language=French",
            "--param",
            "tone=formal",
            "--content-type",
            "plain_text",
        ])
        .unwrap();
        match cli.command {
            Command::Run { action, params, content_type, .. } => {
                assert_eq!(action, "translate");
                assert_eq!(params.len(), 2);
                assert_eq!(content_type, Some(ContentType::PlainText));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
