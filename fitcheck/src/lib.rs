pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{report_assessment, resolve_output_path, run_assessment, save_assessment};
