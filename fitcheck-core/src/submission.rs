use crate::progress::progress_ticker;
use crate::state::SubmissionEvent;
use fitcheck_client::{Assessor, AssessmentRequest, error::Result as AssessResult};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Pause between the bar reaching 100% and the response being revealed.
pub const REVEAL_DELAY: Duration = Duration::from_millis(500);

pub type EventSender = mpsc::UnboundedSender<SubmissionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SubmissionEvent>;

/// Create a channel pair for one view and its submissions
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Run `request` to completion while simulating progress, reporting through
/// `events`. The progress timer stops as soon as the request settles.
///
/// If the receiving side has gone away the submission is abandoned: the
/// pending request is dropped and nothing further is sent.
pub async fn drive_submission<F>(request: F, events: EventSender)
where
    F: Future<Output = AssessResult<String>>,
{
    let mut ticker = progress_ticker();
    tokio::pin!(request);

    let outcome = loop {
        tokio::select! {
            biased;
            outcome = &mut request => break outcome,
            _ = ticker.tick() => {
                if events.send(SubmissionEvent::Tick).is_err() {
                    debug!("View closed, abandoning submission");
                    return;
                }
            }
        }
    };

    match outcome {
        Ok(body) => {
            if events.send(SubmissionEvent::Resolved).is_err() {
                debug!("View closed before the response could be shown");
                return;
            }
            tokio::time::sleep(REVEAL_DELAY).await;
            if events.send(SubmissionEvent::Revealed(body)).is_err() {
                debug!("View closed before the response could be shown");
            }
        }
        Err(e) => {
            error!("Assessment request failed: {}", e);
            let _ = events.send(SubmissionEvent::Failed);
        }
    }
}

/// Spawn a submission of `request` through `assessor` on the current runtime.
pub fn spawn_submission(
    assessor: Assessor,
    request: AssessmentRequest,
    events: EventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move { drive_submission(assessor.assess(&request), events).await })
}
