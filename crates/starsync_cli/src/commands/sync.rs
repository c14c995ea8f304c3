//! The `sync` command: preview the plan, run the pass, print the outcome.

use std::sync::Arc;

use console::{Term, style};
use starsync::github::GitHubClient;
use starsync::platform::FetchError;
use starsync::summarize::{OpenAiConfig, OpenAiSummarizer};
use starsync::sync::{
    RunOutcome, RunReport, SyncError, SyncPlan, SyncPolicy, SyncProgress, emit, plan, reconcile,
};
use starsync::{DbStore, RecordIndex, db};

use crate::SyncArgs;
use crate::config::Config;
use crate::progress::ProgressReporter;

/// How many identities to list per preview section.
const PREVIEW_LIMIT: usize = 20;

/// How many failures to list in the final summary.
const FAILURE_LIMIT: usize = 10;

/// Merge command-line flags over configuration.
pub(crate) fn build_policy(args: &SyncArgs, config: &Config) -> SyncPolicy {
    SyncPolicy {
        force_resummarize: args.force_resummarize,
        dry_run: args.dry_run,
        limit: args.limit,
        no_archive: args.no_archive || !config.sync.archive,
        include_empty_summary: args.include_empty_summary,
        concurrency: args.concurrency.unwrap_or(config.sync.concurrency).max(1),
        target_language: config.llm.language.clone(),
    }
}

fn section(title: &str, identities: Vec<&str>) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", title, identities.len())];
    for identity in identities.iter().take(PREVIEW_LIMIT) {
        lines.push(format!("  - {}", identity));
    }
    if identities.len() > PREVIEW_LIMIT {
        lines.push(format!("  ... and {} more", identities.len() - PREVIEW_LIMIT));
    }
    lines
}

/// Describe the plan before anything happens.
pub(crate) fn preview_lines(plan: &SyncPlan, policy: &SyncPolicy) -> Vec<String> {
    let mut lines = Vec::new();

    lines.extend(section(
        "Skip (already up to date)",
        plan.unchanged.iter().map(String::as_str).collect(),
    ));
    lines.extend(section(
        "Resummarize",
        plan.to_resummarize
            .iter()
            .map(|(source, _)| source.full_name.as_str())
            .collect(),
    ));
    lines.extend(section(
        "Refresh",
        plan.to_refresh_only
            .iter()
            .map(|(source, _)| source.full_name.as_str())
            .collect(),
    ));
    lines.extend(section(
        "New",
        plan.to_create.iter().map(|s| s.full_name.as_str()).collect(),
    ));

    let unstarred = if policy.no_archive {
        "Unstarred (kept, archiving disabled)"
    } else {
        "Unstarred (will be archived)"
    };
    lines.extend(section(
        unstarred,
        plan.to_archive.iter().map(|s| s.full_name.as_str()).collect(),
    ));

    lines
}

/// Describe a finished pass.
pub(crate) fn summary_lines(report: &RunReport) -> Vec<String> {
    let headline = match (report.dry_run, report.outcome()) {
        (_, RunOutcome::NothingToDo) => "Nothing to do".to_string(),
        (true, _) => "Dry run complete, nothing was written".to_string(),
        (false, RunOutcome::Completed) => "Sync complete".to_string(),
        (false, RunOutcome::CompletedWithFailures(n)) => {
            format!("Sync completed with {} failures", n)
        }
    };

    let verb = if report.dry_run { "would be " } else { "" };
    let mut lines = vec![
        headline,
        format!("  Created:       {}{}", verb, report.created),
        format!(
            "  Updated:       {}{} ({} resummarized, {} refreshed, {} unarchived)",
            verb, report.updated, report.resummarized, report.refreshed, report.unarchived
        ),
        format!("  Archived:      {}{}", verb, report.archived),
        format!("  Unchanged:     {}", report.skipped_unchanged),
    ];

    if report.archive_suppressed > 0 {
        lines.push(format!(
            "  Not archived:  {} (archiving disabled)",
            report.archive_suppressed
        ));
    }
    if !report.dry_run {
        lines.push(format!(
            "  Summaries:     {} new, {} empty, {} failed",
            report.summarized, report.empty_summaries, report.summarize_failed
        ));
    }

    if !report.failures.is_empty() {
        lines.push("Failures:".to_string());
        for failure in report.failures.iter().take(FAILURE_LIMIT) {
            lines.push(format!(
                "  - {} [{}]: {}",
                failure.identity, failure.stage, failure.reason
            ));
        }
        if report.failures.len() > FAILURE_LIMIT {
            lines.push(format!(
                "  ... and {} more",
                report.failures.len() - FAILURE_LIMIT
            ));
        }
    }

    lines
}

/// Close the progress display and hand back a pass-aborting error.
fn abort(err: SyncError, reporter: &ProgressReporter) -> SyncError {
    reporter.finish();
    tracing::error!(error = %err, "Sync aborted");
    err
}

pub(crate) async fn handle_sync(
    args: SyncArgs,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = config.github.token.clone().ok_or(
        "No GitHub token configured. Set STARSYNC_GITHUB_TOKEN (or GITHUB_TOKEN) or add [github] token to the config file.",
    )?;
    let api_key = config.llm.key.clone().ok_or(
        "No summarizer API key configured. Set STARSYNC_LLM_KEY (or OPENAI_API_KEY) or add [llm] key to the config file.",
    )?;

    let policy = build_policy(&args, config);
    let user = args.user.clone().or_else(|| config.github.user.clone());
    let is_tty = Term::stdout().is_term();

    let store = DbStore::new(db::connect_and_migrate(database_url).await?);
    let client = GitHubClient::new(&token)?;
    let summarizer = OpenAiSummarizer::new(
        OpenAiConfig::new(api_key)
            .with_base_url(config.llm.url.clone())
            .with_model(config.llm.model.clone()),
    )?;

    tracing::info!(
        user = user.as_deref().unwrap_or("<authenticated>"),
        model = summarizer.model(),
        concurrency = policy.concurrency,
        dry_run = policy.dry_run,
        "Starting sync"
    );

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let on_progress = Some(&callback);

    emit(
        on_progress,
        SyncProgress::FetchingSnapshot { user: user.clone() },
    );
    let snapshot = client
        .list_starred(user.as_deref(), on_progress)
        .await
        .map_err(|e| abort(SyncError::Fetch(FetchError::from(e)), &reporter))?;
    emit(
        on_progress,
        SyncProgress::FetchComplete {
            total: snapshot.len(),
        },
    );

    let existing = store
        .load_records()
        .await
        .map_err(|e| abort(SyncError::Index(e), &reporter))?;
    emit(
        on_progress,
        SyncProgress::RecordsLoaded {
            total: existing.len(),
        },
    );

    let preview = plan(&snapshot, &existing, &policy)
        .map_err(|e| abort(SyncError::Index(e), &reporter))?;
    if is_tty {
        println!();
        for line in preview_lines(&preview, &policy) {
            println!("{}", line);
        }
        println!();
    }

    let report = reconcile(
        &snapshot,
        &existing,
        &policy,
        &client,
        &summarizer,
        &store,
        on_progress,
    )
    .await
    .map_err(|e| abort(e, &reporter))?;
    reporter.finish();

    if is_tty {
        println!();
        for (i, line) in summary_lines(&report).into_iter().enumerate() {
            if i == 0 {
                println!("{}", style(line).bold());
            } else {
                println!("{}", line);
            }
        }
    } else {
        tracing::info!(
            outcome = ?report.outcome(),
            created = report.created,
            updated = report.updated,
            archived = report.archived,
            failures = report.failures.len(),
            "Sync finished"
        );
        for failure in &report.failures {
            tracing::warn!(
                repo = %failure.identity,
                stage = %failure.stage,
                reason = %failure.reason,
                "Item failed"
            );
        }
    }

    Ok(())
}
