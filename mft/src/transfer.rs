use common::progress::{BatchProgress, BatchStatus};
use remote::{MftService, RpcError};
use remote::protocol::TransferState;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::request::TransferPlan;

/// How a submitted batch is watched
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Pause between two polling passes
    pub interval: std::time::Duration,
    pub show_progress: bool,
    pub progress_type: common::ProgressType,
    /// Minimum delay between text progress updates
    pub text_delay: std::time::Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: std::time::Duration::from_secs(1),
            show_progress: false,
            progress_type: common::ProgressType::Auto,
            text_delay: std::time::Duration::from_secs(10),
        }
    }
}

/// Outcome counts of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub total_volume: u64,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processed {} files. Completed {}, Failed {}.",
            self.completed + self.failed,
            self.completed,
            self.failed
        )
    }
}

fn confirmation_prompt(plan: &TransferPlan) -> String {
    format!(
        "Total number of {} files to be transferred. Total volume is {} ({} bytes). Do you want to start the transfer?",
        plan.len(),
        bytesize::ByteSize(plan.total_volume),
        plan.total_volume
    )
}

/// Confirms, submits and then polls `plan` until every unit is completed or failed.
///
/// Nothing reaches the backend unless the user agreed. Each pass asks for the state of every
/// unit, one request at a time, and sleeps `settings.interval` between passes. Cancelling
/// `cancel` stops polling, requests cancellation of every unit still running and fails with
/// [`Error::Interrupted`]. A backend handing back a different number of transfer ids than
/// units submitted is an error.
#[instrument(skip_all, fields(units = plan.len(), total_volume = plan.total_volume))]
pub async fn submit_and_track(
    service: &dyn MftService,
    prompter: &dyn Prompter,
    plan: TransferPlan,
    settings: &PollSettings,
    cancel: &CancellationToken,
) -> Result<Summary> {
    let total_volume = plan.total_volume;
    if plan.is_empty() {
        tracing::info!("nothing to transfer");
        return Ok(Summary {
            total_volume,
            ..Default::default()
        });
    }
    if !prompter.confirm(&confirmation_prompt(&plan), true)? || cancel.is_cancelled() {
        return Err(Error::Declined);
    }
    let total = plan.len();
    let transfer_ids = service.submit_batch_transfer(plan.request).await?;
    if transfer_ids.len() != total {
        return Err(RpcError::TransferCountMismatch {
            submitted: total,
            returned: transfer_ids.len(),
        }
        .into());
    }
    tracing::info!("submitted {total} transfers");
    let mut progress = if settings.show_progress {
        BatchProgress::new(settings.progress_type, total as u64, settings.text_delay)
    } else {
        BatchProgress::hidden()
    };
    let mut failure_reported = vec![false; total];
    loop {
        let mut summary = Summary {
            total,
            total_volume,
            ..Default::default()
        };
        let mut unfinished = Vec::new();
        for (idx, transfer_id) in transfer_ids.iter().enumerate() {
            let reply = service.get_transfer_state(transfer_id).await?;
            tracing::trace!("transfer {transfer_id}: {} ({:.0}%)", reply.state, reply.percentage * 100.0);
            match reply.state {
                TransferState::Completed => summary.completed += 1,
                TransferState::Failed => {
                    summary.failed += 1;
                    if !failure_reported[idx] {
                        failure_reported[idx] = true;
                        tracing::warn!(
                            "transfer {transfer_id} failed: {}",
                            reply.description.as_deref().unwrap_or("no reason given")
                        );
                    }
                }
                TransferState::Pending | TransferState::InProgress => {
                    unfinished.push(transfer_id.as_str());
                }
            }
        }
        progress.update(&BatchStatus {
            total: total as u64,
            completed: summary.completed as u64,
            failed: summary.failed as u64,
        });
        if summary.completed + summary.failed == total {
            progress.finish();
            return Ok(summary);
        }
        tokio::select! {
            _ = cancel.cancelled() => {
                progress.finish();
                tracing::info!("interrupted, cancelling {} unfinished transfers", unfinished.len());
                for transfer_id in unfinished {
                    if let Err(error) = service.cancel_transfer(transfer_id).await {
                        tracing::warn!("failed to cancel transfer {transfer_id}: {error}");
                    }
                }
                return Err(Error::Interrupted(summary));
            }
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}
