//! A terminal chat with the concierge.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::process::ExitCode;
use std::time::Duration;

use concierge::SessionBuilder;
use concierge::config::AppConfig;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};

const BAR_CHAR: &str = "▎";
const SESSION_ID: &str = "cli";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(err) = dotenvy::dotenv() {
        // A missing `.env` is fine, the environment may be set already.
        if !err.not_found() {
            eprintln!("failed to load .env: {err}");
            return ExitCode::FAILURE;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    debug!("starting with {config:?}");

    let sessions = SessionBuilder::from_config(&config).build();
    let session = sessions.session(SESSION_ID);

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let mut stdin = io::BufReader::new(io::stdin());
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut stdin).await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");
        progress_bar.enable_steady_tick(Duration::from_millis(100));

        let reply = session.send_message(line).await;

        // Finish the progress bar before printing anything else.
        progress_bar.finish_and_clear();
        println!("{}🤖 {}", BAR_CHAR.bright_cyan(), reply.bright_white());
    }

    ExitCode::SUCCESS
}

async fn read_line<R>(reader: &mut R) -> Option<String>
where
    R: AsyncBufReadExt + Unpin,
{
    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(err) => {
            error!("error reading input: {err}");
            None
        }
    }
}
