use clap::{arg, command};
use fitcheck_client::DEFAULT_WEBHOOK_URL;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn endpoint_arg() -> clap::Arg {
    arg!(--"endpoint" <URL>)
        .required(false)
        .help("Webhook that performs the assessment")
        .default_value(DEFAULT_WEBHOOK_URL)
}

fn timeout_arg() -> clap::Arg {
    arg!(--"timeout" <SECONDS>)
        .required(false)
        .help("Give up on the webhook after this many seconds (default: no limit)")
        .value_parser(clap::value_parser!(u64))
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("fitcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("fitcheck")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("assess")
                .about(
                    "Assess whether a company fits an investment fund's mandate and print the \
                resulting HTML.",
                )
                .arg(
                    arg!(-f --"fund" <URL>)
                        .required(true)
                        .help("The investment fund's website (https:// is added if missing)"),
                )
                .arg(
                    arg!(-c --"company" <URL>)
                        .required(true)
                        .help("The company's website (https:// is added if missing)"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the assessment HTML to a file (default: print to screen)"),
                )
                .arg(
                    arg!(-v --"verbose" "Log request details to stderr")
                        .required(false),
                )
                .arg(endpoint_arg())
                .arg(timeout_arg()),
        )
        .subcommand(
            command!("ui")
                .about("Open the interactive assessment form")
                .arg(endpoint_arg())
                .arg(timeout_arg()),
        )
}
