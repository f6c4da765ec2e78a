//! quill CLI - renders a streamed model answer to a structured document.
//!
//! The parsing core reparses the whole buffer on every update, so update
//! throttling lives here at the call site: live snapshots are written to
//! the output file at most once per configured interval, plus once when
//! the stream ends.

pub mod event;
pub mod session;

mod cli_args;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::debug;

use quill_config::Config;
use quill_render::{html, HtmlPresenter};

pub use cli_args::Cli;

use event::parse_sse_line;
use session::StreamSession;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli);

    let config = load_config_with_cli_overrides(&cli)?;
    let presenter = HtmlPresenter::new().with_theme(&config.render.theme);

    let mut session = StreamSession::new();
    let mut lines = open_input(&cli).await?;

    let throttle = Duration::from_millis(config.stream.throttle_ms);
    let mut last_snapshot: Option<Instant> = None;

    while let Some(line) = lines.next_line().await? {
        if config.stream.events {
            if let Some(evt) = parse_sse_line(&line) {
                session.apply(evt);
            }
        } else {
            session.push_line(&line);
        }

        if let Some(output) = &cli.output {
            if last_snapshot.map_or(true, |at| at.elapsed() >= throttle) {
                write_output(output, &render_output(&cli, &config, &presenter, &session))?;
                last_snapshot = Some(Instant::now());
            }
        }
        if session.is_done() {
            break;
        }
    }
    debug!(buffer_len = session.buffer().len(), "stream ended");

    let rendered = render_output(&cli, &config, &presenter, &session);
    match &cli.output {
        Some(output) => write_output(output, &rendered)?,
        None => print!("{rendered}"),
    }
    Ok(())
}

// --- Helper functions ---

fn initialize_logging(cli: &Cli) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("quill_core={level}").parse().unwrap())
        .add_directive(format!("quill_render={level}").parse().unwrap())
        .add_directive(format!("quill_cli={level}").parse().unwrap());

    // Logs go to stderr; stdout carries the rendered document.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config_with_cli_overrides(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.events {
        config.stream.events = true;
    }
    if cli.standalone {
        config.render.standalone = true;
    }
    if let Some(theme) = &cli.theme {
        config.render.theme = theme.clone();
    }
    Ok(config)
}

async fn open_input(cli: &Cli) -> Result<Lines<BufReader<Box<dyn AsyncRead + Unpin + Send>>>> {
    let reader: Box<dyn AsyncRead + Unpin + Send> = match &cli.input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open input: {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };
    Ok(BufReader::new(reader).lines())
}

fn render_output(
    cli: &Cli,
    config: &Config,
    presenter: &HtmlPresenter,
    session: &StreamSession,
) -> String {
    if cli.json {
        return session.to_json();
    }
    let body = session.render_html(presenter);
    if config.render.standalone {
        html::standalone_page(&config.render.title, &body)
    } else {
        body
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("failed to write output: {}", path.display()))
}
