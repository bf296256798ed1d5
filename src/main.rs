use std::io::{IsTerminal, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use crate::form::{FormController, FormState, Phase};
use crate::llm::{GeminiClient, LLMConfig, Provider};

mod form;
mod llm;

/// Ask a question to a selectable LLM provider and print the answer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Provider to ask
    #[arg(short, long, value_enum, default_value_t = Provider::Gemini)]
    provider: Provider,

    /// Question to submit once; without it an interactive prompt is started
    #[arg(short, long)]
    question: Option<String>,

    /// Gemini API base URL
    #[arg(long, default_value = llm::config::DEFAULT_API_URL)]
    api_url: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model
    #[arg(long, default_value = llm::config::DEFAULT_MODEL)]
    model: String,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    setup_logging(&args.log_level)?;

    let llm_config = setup_llm_config(&args);
    let controller = FormController::new(GeminiClient::new(llm_config), args.provider);

    match &args.question {
        Some(question) => run_once(&controller, question).await,
        None => run_interactive(&controller).await.map(|_| ExitCode::SUCCESS),
    }
}

fn setup_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .with_level(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    Ok(())
}

fn setup_llm_config(args: &Args) -> LLMConfig {
    LLMConfig::new(
        args.api_url.clone(),
        args.api_key.clone().filter(|key| !key.is_empty()),
        args.model.clone(),
    )
}

async fn run_once(controller: &FormController, question: &str) -> Result<ExitCode> {
    controller.set_question(question);
    let state = submit_with_indicator(controller).await;
    render(&state)?;
    debug!(
        "cycle settled: {} response chars, error: {:?}",
        state.response().len(),
        state.error_message()
    );

    if state.error_message().is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn run_interactive(controller: &FormController) -> Result<()> {
    println!("\x1b[1mUniversal LLM Platform\x1b[0m");
    println!("Type a question, /provider <gemini|gpt|claude> to switch, /providers to list, /quit to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n[{}] > ", controller.state().provider().label());
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        let line = line.trim_end();

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit" | "/exit", _) => break,
            ("/providers", _) => {
                let current = controller.state().provider();
                for provider in Provider::ALL {
                    let marker = if provider == current { "*" } else { " " };
                    println!("{} {:<7} {}", marker, provider.id(), provider.label());
                }
            }
            ("/provider", name) => match name.parse::<Provider>() {
                Ok(provider) => controller.select_provider(provider),
                Err(e) => println!("\x1b[1;31m{}\x1b[0m", e),
            },
            _ => {
                controller.set_question(line);
                let state = submit_with_indicator(controller).await;
                render(&state)?;
            }
        }
    }

    debug!("interactive session finished");
    Ok(())
}

/// Drives a submission while drawing a spinner on stderr for as long as the form is loading.
async fn submit_with_indicator(controller: &FormController) -> FormState {
    const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

    let rx = controller.subscribe();
    let draw = std::io::stderr().is_terminal();
    let mut ticker = tokio::time::interval(Duration::from_millis(120));
    let mut frame = 0;
    let mut drawn = false;

    let submit = controller.submit();
    tokio::pin!(submit);

    let state = loop {
        tokio::select! {
            state = &mut submit => break state,
            _ = ticker.tick() => {
                let current = rx.borrow().clone();
                if draw && current.is_loading() {
                    eprint!("\r{} Asking {}...", FRAMES[frame % FRAMES.len()], current.provider());
                    frame += 1;
                    drawn = true;
                }
            }
        }
    };

    if drawn {
        eprint!("\r\x1b[2K");
    }
    state
}

fn render(state: &FormState) -> Result<()> {
    let mut out = std::io::stdout().lock();

    match state.phase() {
        Phase::Failed(message) => {
            writeln!(out, "\x1b[1;31mError!\x1b[0m {}", message).context("Failed to write error")?
        }
        Phase::Answered(text) => writeln!(out, "\x1b[1;35mResponse:\x1b[0m\n{}", text)
            .context("Failed to write response")?,
        Phase::Idle | Phase::Submitting => {}
    }

    Ok(())
}
