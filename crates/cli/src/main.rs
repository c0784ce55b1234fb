mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use runtime::{McpInvoker, OllamaBackend, Orchestrator, Session, ToolPolicy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use error::Result;

const CONFIG_FILE: &str = "nimbus.toml";

/// Utterances replayed by `nimbus test`.
const SAMPLE_UTTERANCES: &[&str] = &[
    "What's the weather in London today?",
    "What's 13 + 13?",
    "Will it rain in Paris?",
    "How's it in Tokyo?",
    "Who wrote Hamlet?",
    "Is it cold in Reykjavik?",
    "Do I need an umbrella in Seattle?",
    "Tell me a joke about cats",
];

type ChatSession = Session<OllamaBackend, McpInvoker>;

#[derive(Parser)]
#[command(name = "nimbus")]
#[command(about = "A weather-aware chat assistant for local models", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Replay the sample utterances and print each answer
    Test {
        /// Tool policy for every utterance (on, off, auto)
        #[arg(default_value = "auto")]
        policy: ToolPolicy,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?.with_overrides(|key| std::env::var(key).ok());

    match cli.command {
        Some(Commands::Chat) | None => cmd_chat(&config).await,
        Some(Commands::Test { policy }) => cmd_test(&config, policy).await,
    }
}

fn build_session(config: &Config) -> Result<ChatSession> {
    let backend = OllamaBackend::builder()
        .base_url(&config.backend.base_url)
        .timeout(Duration::from_secs(config.backend.timeout_secs))
        .build()?;
    let invoker = McpInvoker::new(config.tools.server()).with_timeout(config.tools.timeout());

    tracing::info!(%backend, model = %config.backend.model, "session ready");
    let orchestrator = Orchestrator::new(backend, invoker, &config.backend.model)
        .with_backend_timeout(Duration::from_secs(config.backend.timeout_secs));
    Ok(Session::new(orchestrator))
}

async fn cmd_chat(config: &Config) -> Result<()> {
    println!("nimbus v{}", env!("CARGO_PKG_VERSION"));

    let mut session = build_session(config)?;
    let mut policy = config.tools.policy;

    println!("Model: {}", config.backend.model);
    println!("Tools: {policy}");
    println!("Type 'tools on|off|auto' to switch, 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        match Input::parse(&line) {
            Input::Empty => continue,
            Input::Exit => break,
            Input::ShowPolicy => println!("Tools: {policy} (use 'tools on|off|auto')\n"),
            Input::SetPolicy(Ok(next)) => {
                policy = next;
                println!("Tools: {policy}\n");
            }
            Input::SetPolicy(Err(e)) => eprintln!("{e}\n"),
            Input::Turn(text) => {
                let answer = session.chat(text, policy).await;
                println!("\n{}\n", answer.text());
            }
        }
    }

    println!("\nBye.");
    Ok(())
}

async fn cmd_test(config: &Config, policy: ToolPolicy) -> Result<()> {
    let mut session = build_session(config)?;
    println!("Tools: {policy}\n");

    for utterance in SAMPLE_UTTERANCES {
        let answer = session.chat(utterance, policy).await;
        println!("> {utterance}\n{}\n", answer.text());
    }

    Ok(())
}

/// One line of REPL input.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Empty,
    Exit,
    ShowPolicy,
    SetPolicy(std::result::Result<ToolPolicy, String>),
    Turn(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let input = line.trim();
        if input.is_empty() {
            return Self::Empty;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            return Self::Exit;
        }
        if input.eq_ignore_ascii_case("tools") {
            return Self::ShowPolicy;
        }
        match input.split_once(char::is_whitespace) {
            Some((command, mode)) if command.eq_ignore_ascii_case("tools") => {
                Self::SetPolicy(mode.parse())
            }
            _ => Self::Turn(input),
        }
    }
}
