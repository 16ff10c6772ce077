use crate::error::{AssessError, Result};
use crate::request::AssessmentRequest;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Automation webhook that performs the analysis and answers with HTML.
pub const DEFAULT_WEBHOOK_URL: &str = "https://hook.eu2.make.com/qx7ojxurkd67v7hxdj1tekfhqu9q6t2b";

#[derive(Debug, Clone)]
pub struct Assessor {
    client: Client,
    endpoint: Url,
}

impl Assessor {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_WEBHOOK_URL)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Self::build(endpoint, None)
    }

    /// Same as [`Assessor::with_endpoint`] but gives up after `timeout_secs`.
    /// Without it the transport defaults apply.
    pub fn with_timeout(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        Self::build(endpoint, Some(Duration::from_secs(timeout_secs)))
    }

    fn build(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AssessError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

        let mut builder = Client::builder()
            .user_agent("Fitcheck/0.1 (https://github.com/trapdoorsec/fitcheck)")
            .redirect(reqwest::redirect::Policy::limited(5));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// POST the two links and return the response body as text.
    /// Any non-2xx status is an error.
    pub async fn assess(&self, request: &AssessmentRequest) -> Result<String> {
        info!(
            "Submitting assessment for fund {} and company {}",
            request.fund_link, request.company_link
        );
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Webhook {} answered {}", self.endpoint, status);
            return Err(AssessError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(
            "Received {} bytes in {:?} from {}",
            body.len(),
            start.elapsed(),
            self.endpoint
        );

        Ok(body)
    }
}
