use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use env_logger::Env;

use http_perf::check::{self, CHECK_NAME, CheckResult, Status};
use http_perf::config::{Cli, load_config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env file is fine; CHECK_* variables may come from anywhere.
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let result = match Cli::try_parse() {
        Ok(cli) => match load_config(&cli) {
            Ok(config) => check::execute(&config).await,
            Err(err) => CheckResult::configuration_error("error loading configuration", &err),
        },
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => argument_error(&err),
    };

    println!("{}", result.output);
    ExitCode::from(result.status.exit_code())
}

fn argument_error(err: &clap::Error) -> CheckResult {
    let rendered = err.to_string();
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ");
    log::debug!("{rendered}");

    CheckResult {
        status: Status::Warning,
        output: format!("{CHECK_NAME} {}: error parsing arguments: {message}", Status::Warning),
    }
}
