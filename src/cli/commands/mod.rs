//! CLI subcommand implementations.

pub mod event;
pub mod form;
pub mod server;

use serde::Serialize;

use crate::cli::{OutputSink, Result};
use crate::sync::{ItemFailure, SyncOutcome};
use crate::workspace::NO_WORKSPACE_MESSAGE;

/// Serializable view of a flow outcome for `--json` output.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum OutcomeReport<'a> {
    NoWorkspace,
    Cancelled,
    Completed {
        succeeded: &'a [String],
        failed: &'a [ItemFailure],
    },
}

/// Print a flow outcome, as text or JSON.
async fn report(
    outcome: &SyncOutcome,
    verb: &str,
    output: &OutputSink,
    json: bool,
) -> Result<()> {
    if json {
        let view = match outcome {
            SyncOutcome::NoWorkspace => OutcomeReport::NoWorkspace,
            SyncOutcome::Cancelled => OutcomeReport::Cancelled,
            SyncOutcome::Completed(summary) => OutcomeReport::Completed {
                succeeded: &summary.succeeded,
                failed: &summary.failed,
            },
        };
        output.write_json(&view).await?;
        return Ok(());
    }

    match outcome {
        SyncOutcome::NoWorkspace => {
            output.write_str(NO_WORKSPACE_MESSAGE).await?;
        }
        SyncOutcome::Cancelled => {
            output.write_str("Cancelled.").await?;
        }
        SyncOutcome::Completed(summary) => {
            let mut lines = Vec::new();
            for name in &summary.succeeded {
                lines.push(format!("{} {}", verb, name));
            }
            for failure in &summary.failed {
                lines.push(format!("Failed {}: {}", failure.name, failure.message));
            }
            if lines.is_empty() {
                lines.push("Nothing to do.".to_string());
            }
            output.write_str(&lines.join("\n")).await?;
        }
    }
    Ok(())
}
