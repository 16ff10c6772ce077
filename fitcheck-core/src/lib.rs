use colored::Colorize;

pub mod normalize;
pub mod progress;
pub mod render;
pub mod state;
pub mod submission;

pub use normalize::ensure_https;
pub use progress::Progress;
pub use render::format_response;
pub use state::{ERROR_RESPONSE_HTML, FormState, RequestState, SubmissionEvent, SubmitRejected};
pub use submission::{drive_submission, spawn_submission};

/// Print the banner to stderr, keeping stdout free for assessment markup
pub fn print_banner() {
    let banner = r#"
    ┌─────────────────────────────────────────────┐
    │   ╔═╗╦╔╦╗╔═╗╦ ╦╔═╗╔═╗╦╔═                    │
    │   ╠╣ ║ ║ ║  ╠═╣║╣ ║  ╠╩╗                    │
    │   ╚  ╩ ╩ ╚═╝╩ ╩╚═╝╚═╝╩ ╩                    │
    │   Investment Fit Assessment Tool            │
    └─────────────────────────────────────────────┘
    "#;
    eprintln!("{}", banner.bright_blue());
}
