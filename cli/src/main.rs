//! CLI entrypoint for the judge
//!
//! Wires together all layers using dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use judge_application::{
    ExecutionParams, NoProgress, ProgressNotifier, RunJudgeInput, RunJudgeUseCase, StatusBoard,
    Synthesizer,
};
use judge_domain::{PromptTemplate, Question, Worker};
use judge_infrastructure::{
    CliAgentRunner, CliSynthesizer, ConfigLoader, ExecutableResolver, FileConfig,
    MIN_SESSION_SIZE, SessionStore, extract_context, parse_session,
};
use judge_presentation::{Cli, ConsoleFormatter, ConsoleProgress, DisplayOptions, LiveMonitor};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Workers probed in order when none are configured
const AUTO_DETECT_WORKERS: [&str; 2] = ["zai", "minimax"];
const FALLBACK_WORKER: &str = "claude";
const MAX_LISTED_SESSIONS: usize = 20;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };

    let project = match &cli.project {
        Some(p) => p.clone(),
        None => std::env::current_dir()?,
    };

    let bin_dir = cli
        .bin_dir
        .clone()
        .or_else(|| config.bin_dir.clone())
        .unwrap_or_else(ExecutableResolver::default_bin_dir);
    let resolver = ExecutableResolver::new(bin_dir);

    let Some(store) = SessionStore::new() else {
        bail!("Could not determine the home directory");
    };

    if cli.list {
        list_sessions(&store, &project);
        return Ok(());
    }
    if cli.clean || cli.clean_all {
        clean_sessions(&store, &project, cli.clean_all)?;
        return Ok(());
    }

    let workers = select_workers(&cli, &config, &resolver)?;
    let synthesizer_name = select_synthesizer(&cli, &config, &resolver, &workers);

    // Pick the session to analyze
    let session = match &cli.session {
        Some(prefix) => match store.find(&project, prefix) {
            Some(s) => s,
            None => bail!("Session not found: {}", prefix),
        },
        None => match store.latest(&project) {
            Some(s) => s,
            None => bail!(
                "No sessions found for: {}\nMake sure you're in a directory where you've used your coding agent.",
                project.display()
            ),
        },
    };

    let messages = parse_session(&session.path)?;
    if messages.is_empty() {
        bail!("Session has no messages.");
    }
    let context = extract_context(&messages);

    // Workers spawn their own sessions as a side effect; snapshot what
    // exists now so the new ones can be removed afterwards
    let existing_sessions = store.session_ids(&project);

    let question = Question::new(cli.question_text());
    let prompt = PromptTemplate::investigation(&question, &context);

    let timeout = Duration::from_secs(cli.timeout.unwrap_or(config.timeout_secs));
    let live = (cli.live || config.live) && !cli.json;
    let params = ExecutionParams::default()
        .with_timeout(timeout)
        .sequential(cli.sequential || config.sequential)
        .live(live);

    if !cli.json {
        println!();
        println!(
            "{}",
            format!("Analyzing session {}...", session.short_id()).dimmed()
        );
        println!(
            "{}",
            format!(
                "Workers: {} | Synthesis: {}",
                workers
                    .iter()
                    .map(|w| w.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                synthesizer_name
            )
            .dimmed()
        );
        println!(
            "{}",
            format!("Context: {} messages", messages.len()).dimmed()
        );
        println!();
    }

    info!("Dispatching {} workers", workers.len());

    // === Dependency injection ===
    let mut runner = CliAgentRunner::new(resolver.clone());
    let mut monitor = None;
    if live {
        let worker_names: Vec<&str> = workers.iter().map(|w| w.name.as_str()).collect();
        let board = Arc::new(StatusBoard::new(&worker_names));
        runner = runner.with_live_board(board.clone());
        monitor = Some(LiveMonitor::start(board));
    }

    let use_case = RunJudgeUseCase::new(Arc::new(runner));
    let input = RunJudgeInput::new(workers, prompt).with_params(params);

    let progress: Box<dyn ProgressNotifier> = if cli.json || live {
        Box::new(NoProgress)
    } else {
        Box::new(ConsoleProgress)
    };
    let report = use_case.execute_with_progress(input, progress.as_ref()).await?;

    if let Some(monitor) = monitor {
        monitor.stop().await;
    }

    // Synthesis pass, unless suppressed
    let mut synthesis = None;
    if !cli.no_synthesis && !cli.json {
        let synth = CliSynthesizer::new(resolver.clone(), &synthesizer_name);
        if synth.is_available() {
            println!(
                "{}",
                format!("Running synthesis via {}...", synthesizer_name).cyan()
            );
            synthesis = synth
                .synthesize(&question, &report.verdicts, &report.consensus)
                .await;
            if synthesis.is_none() {
                println!(
                    "{}",
                    "Warning: synthesis failed, falling back to basic summary".yellow()
                );
            }
        } else {
            println!(
                "{}",
                format!("Warning: synthesizer '{}' not found", synthesizer_name).yellow()
            );
        }
    }

    if cli.json {
        println!("{}", ConsoleFormatter::format_json(&report));
    } else {
        let options = DisplayOptions {
            verbose: cli.verbose,
            debug: cli.debug,
        };
        println!(
            "{}",
            ConsoleFormatter::format(&report, &question, synthesis.as_deref(), &options)
        );

        let deleted = store.remove_new_sessions(&project, &existing_sessions, &session.id);
        if deleted > 0 {
            println!(
                "{}",
                format!("Cleaned up {} judge session(s).", deleted).dimmed()
            );
        }
    }

    Ok(())
}

/// Resolve the worker set: explicit flags, then config, then auto-detection.
/// Named entries are `NAME` or `NAME=EXECUTABLE` aliases.
fn select_workers(
    cli: &Cli,
    config: &FileConfig,
    resolver: &ExecutableResolver,
) -> Result<Vec<Worker>> {
    let named: Vec<String> = match cli.worker_list() {
        Some(list) => list,
        None if !config.workers.is_empty() => config.workers.clone(),
        None => Vec::new(),
    };

    if !named.is_empty() {
        let mut workers = Vec::with_capacity(named.len());
        for entry in &named {
            let worker: Worker = entry.parse()?;
            if !resolver.is_available(&worker.executable) {
                bail!("Worker '{}' not found", worker.executable);
            }
            workers.push(worker);
        }
        return Ok(workers);
    }

    let detected: Vec<Worker> = AUTO_DETECT_WORKERS
        .iter()
        .copied()
        .filter(|name| resolver.is_available(name))
        .map(Worker::new)
        .collect();
    if !detected.is_empty() {
        return Ok(detected);
    }

    if resolver.is_available(FALLBACK_WORKER) {
        return Ok(vec![Worker::new(FALLBACK_WORKER)]);
    }

    bail!(
        "No workers found. Install one of: {}, or {}",
        AUTO_DETECT_WORKERS.join(", "),
        FALLBACK_WORKER
    );
}

/// "auto" resolves to the fallback agent when present, else the first worker
fn select_synthesizer(
    cli: &Cli,
    config: &FileConfig,
    resolver: &ExecutableResolver,
    workers: &[Worker],
) -> String {
    let requested = cli
        .synthesizer
        .clone()
        .unwrap_or_else(|| config.synthesizer.clone());
    if requested != "auto" {
        return requested;
    }
    if resolver.is_available(FALLBACK_WORKER) {
        return FALLBACK_WORKER.to_string();
    }
    workers
        .first()
        .map(|w| w.executable.clone())
        .unwrap_or_else(|| FALLBACK_WORKER.to_string())
}

fn list_sessions(store: &SessionStore, project: &Path) {
    let sessions = store.list(project, MIN_SESSION_SIZE);
    if sessions.is_empty() {
        println!("No sessions found for: {}", project.display());
        return;
    }

    println!("\nSessions for {}:\n", project.display());
    for session in sessions.iter().take(MAX_LISTED_SESSIONS) {
        println!(
            "  {}...  {}  ({:.1} KB)",
            session.short_id(),
            session.modified.format("%Y-%m-%d %H:%M"),
            session.size as f64 / 1024.0
        );
    }
    if sessions.len() > MAX_LISTED_SESSIONS {
        println!("  ... and {} more", sessions.len() - MAX_LISTED_SESSIONS);
    }
    println!();
}

fn clean_sessions(store: &SessionStore, project: &Path, skip_confirm: bool) -> Result<()> {
    let (small, large) = store.partition_by_size(project);
    if small.is_empty() && large.is_empty() {
        println!("No sessions found for: {}", project.display());
        return Ok(());
    }

    if !large.is_empty() {
        println!("\n{}\n", "Real work sessions (KEPT):".bold());
        for session in &large {
            println!(
                "  {} {}...  {}  ({:.1} KB)",
                "✓".green(),
                session.short_id(),
                session.modified.format("%Y-%m-%d %H:%M"),
                session.size as f64 / 1024.0
            );
        }
    }

    if small.is_empty() {
        println!("\n{}", "No small sessions to clean up.".green());
        return Ok(());
    }

    println!("\n{}\n", "Small sessions (to delete):".bold());
    let total_size: u64 = small.iter().map(|s| s.size).sum();
    for session in &small {
        println!(
            "  {} {}...  {}  ({:.1} KB)",
            "✗".red(),
            session.short_id(),
            session.modified.format("%Y-%m-%d %H:%M"),
            session.size as f64 / 1024.0
        );
    }
    println!(
        "\n  {}\n",
        format!(
            "Total: {} small sessions, {:.1} KB",
            small.len(),
            total_size as f64 / 1024.0
        )
        .bold()
    );

    if !skip_confirm {
        print!("Delete {} small sessions? [y/N]: ", small.len());
        use std::io::Write;
        std::io::stdout().flush()?;
        let mut response = String::new();
        std::io::stdin().read_line(&mut response)?;
        if !matches!(response.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let mut deleted = 0;
    for session in &small {
        match store.delete(session) {
            Ok(()) => deleted += 1,
            Err(e) => println!(
                "{}",
                format!("Failed to delete {}: {}", session.short_id(), e).red()
            ),
        }
    }
    println!(
        "{}",
        format!(
            "Deleted {} small sessions. Real work sessions preserved.",
            deleted
        )
        .green()
    );

    Ok(())
}
