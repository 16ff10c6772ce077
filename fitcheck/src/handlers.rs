use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use fitcheck_client::{AssessError, Assessor};
use fitcheck_core::submission::create_event_channel;
use fitcheck_core::{
    ERROR_RESPONSE_HTML, FormState, RequestState, SubmitRejected, format_response,
    spawn_submission,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{Level, info};

/// Expand `~` in a user-supplied output path
pub fn resolve_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn save_assessment(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn build_assessor(args: &ArgMatches) -> Result<Assessor, AssessError> {
    let endpoint = args
        .get_one::<String>("endpoint")
        .map(String::as_str)
        .unwrap_or(fitcheck_client::DEFAULT_WEBHOOK_URL);

    match args.get_one::<u64>("timeout") {
        Some(timeout) => Assessor::with_timeout(endpoint, *timeout),
        None => Assessor::with_endpoint(endpoint),
    }
}

/// Submit the form's links and wait for the submission to settle, reporting
/// each displayed percentage to `on_progress`.
pub async fn run_assessment(
    assessor: Assessor,
    mut form: FormState,
    mut on_progress: impl FnMut(u8),
) -> Result<FormState, SubmitRejected> {
    let request = form.begin_submit()?;
    let (tx, mut rx) = create_event_channel();
    let handle = spawn_submission(assessor, request, tx);

    while form.is_in_flight() {
        let Some(event) = rx.recv().await else {
            break;
        };
        form.apply(event);
        on_progress(form.progress().percent());
    }

    // The task has already sent its last event; this only reaps it
    let _ = handle.await;
    Ok(form)
}

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

/// Log level for `assess`: warnings only, unless `--verbose` asks for more.
/// INFO lines would otherwise be drawn through the progress bar.
pub fn log_level(sub_matches: &ArgMatches) -> Level {
    if sub_matches.get_flag("verbose") {
        Level::INFO
    } else {
        Level::WARN
    }
}

pub async fn handle_assess(sub_matches: &ArgMatches) -> Result<()> {
    // Initialize tracing for logging
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level(sub_matches))
        .try_init();

    report_assessment(sub_matches, &mut std::io::stdout()).await
}

/// Run `assess` and write the resulting markup to `out`, or to `--output`
/// when given. Everything else (headings, progress, confirmations) goes to
/// stderr so `out` carries nothing but HTML.
pub async fn report_assessment(sub_matches: &ArgMatches, out: &mut impl Write) -> Result<()> {
    let fund_link = sub_matches
        .get_one::<String>("fund")
        .context("--fund is required")?;
    let company_link = sub_matches
        .get_one::<String>("company")
        .context("--company is required")?;
    let output = sub_matches
        .get_one::<String>("output")
        .map(|raw| resolve_output_path(raw));

    let assessor = build_assessor(sub_matches)?;

    print_divider();
    eprintln!("{}", "  INVESTMENT FIT ASSESSMENT".bright_white().bold());
    print_divider();
    eprintln!("{} Fund:     {}", "→".blue(), fund_link.bright_white());
    eprintln!("{} Company:  {}", "→".blue(), company_link.bright_white());
    eprintln!("{} Endpoint: {}", "→".blue(), assessor.endpoint().bright_white());
    eprintln!();

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("=> "),
    );
    pb.set_message("Processing...");

    let form = FormState::with_links(fund_link.as_str(), company_link.as_str());
    let pb_clone = pb.clone();
    let form = run_assessment(assessor, form, move |percent| {
        pb_clone.set_position(u64::from(percent));
    })
    .await
    .map_err(|rejected| anyhow!(rejected.message()))?;

    match form.request() {
        RequestState::Complete(body) => {
            pb.finish_with_message("done");
            let markup = format_response(body);

            if let Some(path) = output {
                info!("Writing assessment to {}", path.display());
                save_assessment(&markup, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!(
                    "{} Assessment saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            } else {
                writeln!(out, "{}", markup)?;
            }
            Ok(())
        }
        RequestState::Failed(body) => {
            pb.abandon_with_message("failed");
            writeln!(out, "{}", body)?;
            Err(anyhow!("Assessment failed"))
        }
        RequestState::Idle | RequestState::InFlight => {
            pb.abandon_with_message("failed");
            writeln!(out, "{}", ERROR_RESPONSE_HTML)?;
            Err(anyhow!("Assessment ended without a response"))
        }
    }
}

pub async fn handle_ui(sub_matches: &ArgMatches) -> Result<()> {
    let assessor = build_assessor(sub_matches)?;

    // The form blocks on terminal input; submissions still run on the runtime
    tokio::task::spawn_blocking(move || fitcheck_tui::run(assessor)).await??;
    Ok(())
}
