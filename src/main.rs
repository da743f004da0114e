use anyhow::Context;
use clap::{Parser, Subcommand};
use probaho::logging::init_logging;
use probaho::summarizer::SUMMARY_FAILED_MESSAGE;
use probaho::{Config, GeminiClient, GenerateOptions, MentorSession, NoteSummarizer};
use std::io::{self, BufRead, Read, Write};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, Level};

#[derive(Parser, Debug)]
#[command(name = "probaho")]
#[command(about = "SSC/HSC study mentor and note summarizer backed by Gemini")]
struct Args {
    /// Path to an optional YAML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Overrides the configured model
    #[arg(short, long)]
    model: Option<String>,

    #[arg(long)]
    timeout_ms: Option<u64>,

    /// trace, debug, info, warn, error
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[arg(long)]
    log_file: Option<String>,

    /// socks and http proxy, example: socks5://192.168.0.2:10080
    #[arg(long)]
    proxy: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a single question without history
    Ask { prompt: Vec<String> },
    /// Chat with the mentor until EOF or "exit"
    Chat,
    /// Summarize notes from a file, or stdin when no file is given
    Summarize { file: Option<String> },
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::default(),
    };
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    Ok(config.with_env_api_key())
}

fn build_http_client(proxy: Option<&str>) -> anyhow::Result<reqwest::Client> {
    let client_builder = reqwest::Client::builder();
    let client_builder = if let Some(proxy) = proxy {
        client_builder.proxy(reqwest::Proxy::all(proxy).context("Failed to create proxy")?)
    } else {
        client_builder
    };
    client_builder.build().context("Failed to build HTTP client")
}

async fn run_chat(client: GeminiClient) -> anyhow::Result<()> {
    let mut session = MentorSession::new(client);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    if let Some(greeting) = session.messages().first() {
        writeln!(stdout, "AI: {}\n", greeting.content)?;
    }

    loop {
        write!(stdout, "Me: ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim_end_matches(['\r', '\n']);
        if input.trim() == "exit" {
            break;
        }
        if let Some(reply) = session.send(input).await {
            writeln!(stdout, "AI: {}\n", reply)?;
        }
    }

    info!("Chat ended after {} messages", session.messages().len());
    Ok(())
}

async fn run_summarize(client: GeminiClient, file: Option<&str>) -> anyhow::Result<()> {
    let notes = match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    match NoteSummarizer::new(client).summarize(&notes).await {
        Ok(Some(summary)) => {
            println!("{}\n", summary.title);
            println!("Brief Summary\n{}\n", summary.summary);
            println!("Key Points");
            for (i, point) in summary.key_points.iter().enumerate() {
                println!("{}. {}", i + 1, point);
            }
            if let Some(definitions) = summary.definitions.filter(|d| !d.is_empty()) {
                println!("\nDefinitions");
                for def in definitions {
                    println!("- {}: {}", def.term, def.definition);
                }
            }
        }
        Ok(None) => println!("Nothing to summarize."),
        Err(e) => {
            error!("Summarize failed: {}", e);
            return Err(anyhow::Error::new(e).context(SUMMARY_FAILED_MESSAGE));
        }
    }
    Ok(())
}

/// Fails the process on any generation error so scripts can tell.
async fn run_ask(client: &GeminiClient, prompt: &[String]) -> anyhow::Result<String> {
    client
        .generate(&prompt.join(" "), &[], &GenerateOptions::default())
        .await
        .inspect_err(|e| error!("Ask failed: {}", e))
        .context("Ask failed")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = Level::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using WARN level.", args.log_level);
        Level::WARN
    });
    init_logging(log_level, args.log_file.as_deref());

    let config = load_config(&args)?;
    let http_client = Arc::new(build_http_client(args.proxy.as_deref())?);
    let client = GeminiClient::new(http_client, config)?;
    info!("Using model {}", client.config().model);

    match args.command {
        Command::Ask { prompt } => println!("{}", run_ask(&client, &prompt).await?),
        Command::Chat => run_chat(client).await?,
        Command::Summarize { file } => run_summarize(client, file.as_deref()).await?,
    }
    Ok(())
}
