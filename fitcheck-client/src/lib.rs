pub mod assessor;
pub mod error;
pub mod request;

pub use assessor::{Assessor, DEFAULT_WEBHOOK_URL};
pub use error::AssessError;
pub use request::AssessmentRequest;
