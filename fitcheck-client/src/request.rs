use serde::{Deserialize, Serialize};

/// JSON body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    pub fund_link: String,
    pub company_link: String,
}

impl AssessmentRequest {
    pub fn new(fund_link: impl Into<String>, company_link: impl Into<String>) -> Self {
        Self {
            fund_link: fund_link.into(),
            company_link: company_link.into(),
        }
    }
}
