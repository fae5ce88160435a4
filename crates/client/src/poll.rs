use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use stylecast_core::error::{Error, Result};

use crate::api::{RemoteStatus, StatusResponse, TryOnApi, UNKNOWN_API_ERROR};
use crate::job::{Job, PollSchedule};

/// Shared poll loop for every job spawned by one action. Each tick polls
/// all non-terminal jobs concurrently; per-job state is only applied
/// after the whole tick resolves. Runs until every job is terminal or
/// the wall-clock ceiling force-fails the stragglers.
pub async fn poll_jobs(api: &dyn TryOnApi, jobs: &mut [Job], schedule: &PollSchedule) {
    let started = tokio::time::Instant::now();
    let mut tick: u32 = 0;

    loop {
        if jobs.iter().all(Job::is_terminal) {
            return;
        }
        if started.elapsed() >= schedule.max_wall {
            let message = schedule.timeout_message();
            for job in jobs.iter_mut().filter(|j| !j.is_terminal()) {
                warn!(job_id = ?job.id, "Job timed out");
                job.fail(message.clone());
            }
            return;
        }

        tick += 1;
        sleep(schedule.interval_for(tick)).await;

        let pending: Vec<(usize, String)> = jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| !job.is_terminal())
            .filter_map(|(i, job)| job.id.clone().map(|id| (i, id)))
            .collect();
        let polls = pending.into_iter().map(|(i, id)| async move {
            (i, api.status(&id).await)
        });

        for (i, outcome) in join_all(polls).await {
            match outcome {
                Ok(response) => apply_status(&mut jobs[i], response),
                // Transport-level failures don't count against the job;
                // the next tick retries.
                Err(e) => debug!(error = %e, "Status poll failed, retrying next tick"),
            }
        }
    }
}

fn apply_status(job: &mut Job, response: StatusResponse) {
    match response.status {
        RemoteStatus::Completed => {
            match response.output.unwrap_or_default().into_iter().next() {
                Some(first) => {
                    info!(job_id = ?job.id, "Job completed");
                    job.succeed(first);
                }
                None => job.fail("API returned no output".to_string()),
            }
        }
        RemoteStatus::Failed | RemoteStatus::Error => {
            let message = response
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string());
            warn!(job_id = ?job.id, error = %message, "Job failed remotely");
            job.fail(message);
        }
        RemoteStatus::Processing | RemoteStatus::Pending => {}
    }
}

/// Reduce a finished job set to the action's outcome: every successful
/// result in input order. Partial failure is still overall success; only
/// when nothing succeeded does the action fail, quoting the first
/// recorded per-job error.
pub fn collect_outcome(jobs: &[Job]) -> Result<Vec<String>> {
    let mut ordered: Vec<&Job> = jobs.iter().collect();
    ordered.sort_by_key(|job| job.input_index);

    let outputs: Vec<String> = ordered
        .iter()
        .filter_map(|job| job.result.clone())
        .collect();
    if outputs.is_empty() {
        let first_error = ordered
            .iter()
            .filter_map(|job| job.error.clone())
            .next()
            .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string());
        return Err(Error::Api(first_error));
    }
    Ok(outputs)
}
