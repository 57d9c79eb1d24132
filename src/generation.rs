//! Try-on job lifecycle.
//!
//! A job moves `Submitted → Polling → {Completed, Failed, TimedOut,
//! Cancelled}`. The decision logic lives in [`JobTracker`], which sees only
//! status responses and knows nothing about timers or HTTP; the async driver
//! below owns the schedule (1 s progress tick, status check every 2 s, at
//! most [`MAX_STATUS_CHECKS`] checks) and reports through a channel.
//!
//! The job parameters and status URL are checkpointed to localStorage right
//! after submission and cleared on every terminal transition, so a reload
//! mid-job resumes polling instead of losing the result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_channel::mpsc::UnboundedSender;

use crate::api::generation::GenerateRequest;
use crate::api::ApiClient;
use crate::models::{GenerationRecord, PendingGeneration, StatusResponse};
use crate::platform::{self, AbortHandle};
use crate::progress::{self, SyntheticProgress};
use crate::storage;

pub const PROGRESS_TICK_MS: u32 = 1_000;
/// Status checks happen on every second progress tick.
pub const TICKS_PER_POLL: u32 = 2;
/// Poll ceiling; exceeding it surfaces a timeout (about four minutes).
pub const MAX_STATUS_CHECKS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Submitted,
    Polling,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

/// What the driver should do after one status check.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    Continue,
    Completed { image_url: String },
    Failed(String),
    TimedOut,
}

/// Pure poll-loop state machine. Feed it status responses (or transient
/// errors) and follow the returned [`PollStep`].
#[derive(Debug)]
pub struct JobTracker {
    phase: JobPhase,
    checks: u32,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTracker {
    pub fn new() -> Self {
        Self {
            phase: JobPhase::Submitted,
            checks: 0,
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    /// Number of status checks performed so far.
    pub fn checks(&self) -> u32 {
        self.checks
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.phase, JobPhase::Submitted | JobPhase::Polling)
    }

    /// Classify one status response.
    pub fn record_status(&mut self, status: &StatusResponse) -> PollStep {
        debug_assert!(!self.is_terminal());
        self.checks += 1;
        self.phase = JobPhase::Polling;

        if status.is_completed() {
            self.phase = JobPhase::Completed;
            return PollStep::Completed {
                image_url: status.image_url.clone().unwrap_or_default(),
            };
        }
        if status.is_failed() {
            self.phase = JobPhase::Failed;
            return PollStep::Failed(
                status
                    .error
                    .clone()
                    .unwrap_or_else(|| "generation failed".to_string()),
            );
        }
        self.bound_check()
    }

    /// A fetch/HTTP failure counts as an attempt but keeps polling.
    pub fn record_transient_error(&mut self) -> PollStep {
        debug_assert!(!self.is_terminal());
        self.checks += 1;
        self.phase = JobPhase::Polling;
        self.bound_check()
    }

    pub fn cancel(&mut self) {
        if !self.is_terminal() {
            self.phase = JobPhase::Cancelled;
        }
    }

    fn bound_check(&mut self) -> PollStep {
        if self.checks >= MAX_STATUS_CHECKS {
            self.phase = JobPhase::TimedOut;
            PollStep::TimedOut
        } else {
            PollStep::Continue
        }
    }
}

// ── async driver ─────────────────────────────────────────────────

/// Progress and outcome messages delivered to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Progress(f32),
    Finished(JobOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed { image_url: String },
    Failed(String),
    TimedOut,
    Cancelled,
}

/// Held by the UI while a job runs. Cancelling aborts the in-flight request
/// and stops the loop; the server-side job is left to finish on its own.
#[derive(Clone)]
pub struct JobHandle {
    cancelled: Arc<AtomicBool>,
    abort: AbortHandle,
}

impl JobHandle {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            abort: AbortHandle::new(),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.abort.abort();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Submit a new job and start polling it.
pub fn start_job(
    api: ApiClient,
    request: GenerateRequest,
    events: UnboundedSender<JobEvent>,
    ctx: egui::Context,
) -> JobHandle {
    let handle = JobHandle::new();
    let task_handle = handle.clone();

    platform::execute(async move {
        let submitted = api
            .submit_generation(&request, Some(&task_handle.abort))
            .await;
        let status_url = match submitted {
            Ok(response) => response.status_url,
            Err(e) => {
                let outcome = if task_handle.is_cancelled() {
                    JobOutcome::Cancelled
                } else {
                    JobOutcome::Failed(e.to_string())
                };
                finish(&events, &ctx, outcome);
                return;
            }
        };

        let pending = PendingGeneration {
            person_image: request.person_image.clone(),
            garment_image: request.garment_image.clone(),
            description: request.description.clone(),
            category_hint: request.category_hint,
            status_url: status_url.clone(),
        };
        storage::save_pending_generation(&pending);

        poll_until_done(api, pending, task_handle, events, ctx).await;
    });

    handle
}

/// Resume a checkpointed job (called at startup when a reload interrupted
/// one). Skips submission and goes straight back to polling.
pub fn resume_job(
    api: ApiClient,
    pending: PendingGeneration,
    events: UnboundedSender<JobEvent>,
    ctx: egui::Context,
) -> JobHandle {
    let handle = JobHandle::new();
    let task_handle = handle.clone();
    log::info!("resuming pending generation at {}", pending.status_url);

    platform::execute(async move {
        poll_until_done(api, pending, task_handle, events, ctx).await;
    });

    handle
}

async fn poll_until_done(
    api: ApiClient,
    pending: PendingGeneration,
    handle: JobHandle,
    events: UnboundedSender<JobEvent>,
    ctx: egui::Context,
) {
    let mut tracker = JobTracker::new();
    let mut progress = SyntheticProgress::new();
    let mut ticks: u32 = 0;

    loop {
        if handle.is_cancelled() {
            tracker.cancel();
            finish(&events, &ctx, JobOutcome::Cancelled);
            return;
        }

        platform::sleep_ms(PROGRESS_TICK_MS).await;
        let _ = events.unbounded_send(JobEvent::Progress(progress.tick(progress::rand_unit())));
        ctx.request_repaint();

        ticks += 1;
        if ticks % TICKS_PER_POLL != 0 {
            continue;
        }

        let step = match api
            .generation_status(&pending.status_url, Some(&handle.abort))
            .await
        {
            Ok(status) => tracker.record_status(&status),
            Err(_) if handle.is_cancelled() => {
                tracker.cancel();
                finish(&events, &ctx, JobOutcome::Cancelled);
                return;
            }
            Err(e) => {
                log::warn!("status check failed, retrying: {e}");
                tracker.record_transient_error()
            }
        };

        match step {
            PollStep::Continue => {}
            PollStep::Completed { image_url } => {
                let _ = events.unbounded_send(JobEvent::Progress(progress.complete()));
                record_history(&api, &pending, &image_url);
                finish(&events, &ctx, JobOutcome::Completed { image_url });
                return;
            }
            PollStep::Failed(message) => {
                finish(&events, &ctx, JobOutcome::Failed(message));
                return;
            }
            PollStep::TimedOut => {
                finish(&events, &ctx, JobOutcome::TimedOut);
                return;
            }
        }
    }
}

/// Terminal bookkeeping shared by every exit path: drop the checkpoint,
/// deliver the outcome, wake the UI.
fn finish(events: &UnboundedSender<JobEvent>, ctx: &egui::Context, outcome: JobOutcome) {
    storage::clear_pending_generation();
    let _ = events.unbounded_send(JobEvent::Finished(outcome));
    ctx.request_repaint();
}

/// Fire-and-forget history write; a failure is logged and otherwise ignored.
fn record_history(api: &ApiClient, pending: &PendingGeneration, image_url: &str) {
    let api = api.clone();
    let record = GenerationRecord {
        id: uuid::Uuid::new_v4().to_string(),
        garment_image: pending.garment_image.clone(),
        result_url: image_url.to_string(),
        description: pending.description.clone(),
        created_at: chrono::Utc::now(),
    };
    platform::execute(async move {
        if let Err(e) = api.append_history(&record).await {
            log::error!("could not save generation to history: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> StatusResponse {
        StatusResponse {
            status: "IN_PROGRESS".into(),
            ..Default::default()
        }
    }

    fn completed(url: &str) -> StatusResponse {
        StatusResponse {
            status: "COMPLETED".into(),
            image_url: Some(url.into()),
            error: None,
        }
    }

    #[test]
    fn resolves_after_exactly_n_plus_one_checks() {
        let n = 7;
        let mut tracker = JobTracker::new();
        for _ in 0..n {
            assert_eq!(tracker.record_status(&running()), PollStep::Continue);
        }
        let step = tracker.record_status(&completed("https://cdn.example/out.jpg"));
        assert_eq!(
            step,
            PollStep::Completed {
                image_url: "https://cdn.example/out.jpg".into()
            }
        );
        assert_eq!(tracker.checks(), n + 1);
        assert_eq!(tracker.phase(), JobPhase::Completed);
        assert!(tracker.is_terminal());
    }

    #[test]
    fn never_terminal_status_times_out_at_the_ceiling() {
        let mut tracker = JobTracker::new();
        for i in 1..MAX_STATUS_CHECKS {
            assert_eq!(tracker.record_status(&running()), PollStep::Continue, "check {i}");
        }
        assert_eq!(tracker.record_status(&running()), PollStep::TimedOut);
        assert_eq!(tracker.checks(), MAX_STATUS_CHECKS);
        assert_eq!(tracker.phase(), JobPhase::TimedOut);
    }

    #[test]
    fn failed_status_surfaces_the_server_error() {
        let mut tracker = JobTracker::new();
        let step = tracker.record_status(&StatusResponse {
            status: "FAILED".into(),
            image_url: None,
            error: Some("nsfw content detected".into()),
        });
        assert_eq!(step, PollStep::Failed("nsfw content detected".into()));
    }

    #[test]
    fn failed_status_without_message_gets_a_generic_one() {
        let mut tracker = JobTracker::new();
        let step = tracker.record_status(&StatusResponse {
            status: "FAILED".into(),
            ..Default::default()
        });
        assert_eq!(step, PollStep::Failed("generation failed".into()));
    }

    #[test]
    fn transient_errors_retry_but_count_toward_the_ceiling() {
        let mut tracker = JobTracker::new();
        assert_eq!(tracker.record_transient_error(), PollStep::Continue);
        assert_eq!(tracker.record_status(&running()), PollStep::Continue);
        assert_eq!(tracker.checks(), 2);

        // errors alone can exhaust the ceiling too
        let mut tracker = JobTracker::new();
        for _ in 1..MAX_STATUS_CHECKS {
            assert_eq!(tracker.record_transient_error(), PollStep::Continue);
        }
        assert_eq!(tracker.record_transient_error(), PollStep::TimedOut);
    }

    #[test]
    fn cancel_is_terminal_and_sticky() {
        let mut tracker = JobTracker::new();
        tracker.record_status(&running());
        tracker.cancel();
        assert_eq!(tracker.phase(), JobPhase::Cancelled);
        assert!(tracker.is_terminal());

        // cancelling an already-finished job does not rewrite its phase
        let mut done = JobTracker::new();
        done.record_status(&completed("u"));
        done.cancel();
        assert_eq!(done.phase(), JobPhase::Completed);
    }
}
