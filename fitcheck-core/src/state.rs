use crate::normalize::ensure_https;
use crate::progress::Progress;
use fitcheck_client::AssessmentRequest;

/// Shown in place of the assessment whenever a submission fails.
pub const ERROR_RESPONSE_HTML: &str =
    "<p>An error occurred while processing your request. Please try again. </p>";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Complete(String),
    Failed(String),
}

/// Messages from a running submission to the view that owns the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// The progress timer fired
    Tick,
    /// The webhook answered successfully; the body follows after a delay
    Resolved,
    /// Reveal the response body
    Revealed(String),
    /// Transport or status failure
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    InFlight,
    MissingFundLink,
    MissingCompanyLink,
}

impl SubmitRejected {
    pub fn message(self) -> &'static str {
        match self {
            SubmitRejected::InFlight => "An assessment is already in progress",
            SubmitRejected::MissingFundLink => "Please fill in the investment fund website",
            SubmitRejected::MissingCompanyLink => "Please fill in the company website",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub fund_link: String,
    pub company_link: String,
    request: RequestState,
    progress: Progress,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links(fund_link: impl Into<String>, company_link: impl Into<String>) -> Self {
        Self {
            fund_link: fund_link.into(),
            company_link: company_link.into(),
            ..Self::default()
        }
    }

    pub fn request(&self) -> &RequestState {
        &self.request
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.request, RequestState::InFlight)
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// The body to display, once a submission has settled.
    pub fn response_body(&self) -> Option<&str> {
        match &self.request {
            RequestState::Complete(body) | RequestState::Failed(body) => Some(body),
            RequestState::Idle | RequestState::InFlight => None,
        }
    }

    /// Start a submission: clears the previous response, resets progress and
    /// returns the request to send with both links normalized.
    pub fn begin_submit(&mut self) -> Result<AssessmentRequest, SubmitRejected> {
        if self.is_in_flight() {
            return Err(SubmitRejected::InFlight);
        }
        if self.fund_link.is_empty() {
            return Err(SubmitRejected::MissingFundLink);
        }
        if self.company_link.is_empty() {
            return Err(SubmitRejected::MissingCompanyLink);
        }

        self.request = RequestState::InFlight;
        self.progress.reset();

        Ok(AssessmentRequest::new(
            ensure_https(&self.fund_link),
            ensure_https(&self.company_link),
        ))
    }

    /// Apply one event from the running submission. Events arriving when no
    /// submission is in flight are stale and ignored.
    pub fn apply(&mut self, event: SubmissionEvent) {
        if !self.is_in_flight() {
            return;
        }

        match event {
            SubmissionEvent::Tick => self.progress.tick(),
            SubmissionEvent::Resolved => self.progress.complete(),
            SubmissionEvent::Revealed(body) => self.request = RequestState::Complete(body),
            SubmissionEvent::Failed => {
                self.request = RequestState::Failed(ERROR_RESPONSE_HTML.to_string())
            }
        }
    }
}
