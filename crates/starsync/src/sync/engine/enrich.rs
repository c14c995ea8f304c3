use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::item::SourceItem;
use crate::platform::{StarSource, short_error_message};
use crate::summarize::{SummaryRequest, Summarizer, compose_text};

use super::super::progress::{ProgressCallback, SyncProgress, emit};
use super::super::types::EnrichOutcome;

/// Outcome of one enrichment task, plus a README warning to surface.
struct TaskResult {
    outcome: EnrichOutcome,
    readme_warning: Option<String>,
}

/// Summarize items concurrently.
///
/// At most `concurrency` items hold a permit at once; the permit covers the
/// README fetch and the summarizer call and is released when the task ends,
/// including by panic. A failing item never affects the others.
pub(super) async fn enrich_items<S, M>(
    source: &S,
    summarizer: &M,
    items: Vec<SourceItem>,
    concurrency: usize,
    target_language: &str,
    on_progress: Option<&ProgressCallback>,
) -> HashMap<String, EnrichOutcome>
where
    S: StarSource + Clone + 'static,
    M: Summarizer + Clone + 'static,
{
    let mut outcomes = HashMap::with_capacity(items.len());

    if items.is_empty() {
        return outcomes;
    }

    let concurrency = std::cmp::max(1, std::cmp::min(concurrency, items.len()));
    let semaphore = Arc::new(Semaphore::new(concurrency));

    emit(
        on_progress,
        SyncProgress::Summarizing {
            count: items.len(),
            concurrency,
        },
    );

    let mut handles = Vec::with_capacity(items.len());

    for item in items {
        let source = source.clone();
        let summarizer = summarizer.clone();
        let semaphore = Arc::clone(&semaphore);
        let target_language = target_language.to_string();
        let identity = item.full_name.clone();

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    return TaskResult {
                        outcome: EnrichOutcome::Failed("Semaphore closed unexpectedly".to_string()),
                        readme_warning: None,
                    };
                }
            };

            let (readme, readme_warning) = match source.fetch_readme(&item).await {
                Ok(readme) => (readme, None),
                Err(e) => {
                    let msg = short_error_message(&e);
                    tracing::warn!(identity = %item.full_name, error = %msg, "README fetch failed, summarizing without it");
                    (None, Some(msg))
                }
            };

            let request = SummaryRequest {
                identity: item.full_name.clone(),
                text: compose_text(&item, readme.as_deref()),
                target_language,
            };

            let outcome = match summarizer.summarize(&request).await {
                Ok(summary) if summary.trim().is_empty() => EnrichOutcome::Empty,
                Ok(summary) => EnrichOutcome::Summary(summary.trim().to_string()),
                Err(e) => EnrichOutcome::Failed(short_error_message(&e)),
            };

            TaskResult {
                outcome,
                readme_warning,
            }
        });

        handles.push((identity, handle));
    }

    let (mut summarized, mut empty, mut errors) = (0, 0, 0);

    for (identity, handle) in handles {
        let outcome = match handle.await {
            Ok(result) => {
                if let Some(warning) = result.readme_warning {
                    emit(
                        on_progress,
                        SyncProgress::Warning {
                            message: format!("README unavailable for {}: {}", identity, warning),
                        },
                    );
                }
                result.outcome
            }
            Err(e) => EnrichOutcome::Failed(format!("Task panic: {}", e)),
        };

        match &outcome {
            EnrichOutcome::Summary(_) => {
                summarized += 1;
                tracing::debug!(identity = %identity, "Summarized");
                emit(
                    on_progress,
                    SyncProgress::Summarized {
                        identity: identity.clone(),
                        empty: false,
                    },
                );
            }
            EnrichOutcome::Empty => {
                empty += 1;
                tracing::info!(identity = %identity, "Summarizer returned an empty summary");
                emit(
                    on_progress,
                    SyncProgress::Summarized {
                        identity: identity.clone(),
                        empty: true,
                    },
                );
            }
            EnrichOutcome::Failed(error) => {
                errors += 1;
                tracing::warn!(identity = %identity, error = %error, "Summarization failed");
                emit(
                    on_progress,
                    SyncProgress::SummarizeError {
                        identity: identity.clone(),
                        error: error.clone(),
                    },
                );
            }
        }

        outcomes.insert(identity, outcome);
    }

    emit(
        on_progress,
        SyncProgress::SummarizingComplete {
            summarized,
            empty,
            errors,
        },
    );

    outcomes
}
