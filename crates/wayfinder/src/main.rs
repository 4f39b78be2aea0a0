//! A terminal chat with the travel assistant.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::sync::LazyLock;
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use regex::Regex;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;
use wayfinder::SessionBuilder;
use wayfinder::chat::{Applied, ChatMessage, Transcript};
use wayfinder_openai_model::{OpenAIConfigBuilder, OpenAIProvider};

const BAR_CHAR: &str = "▎";

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(api_key) = ["HF_TOKEN", "HUGGING_FACE_TOKEN"]
        .into_iter()
        .find_map(|name| env::var(name).ok())
    else {
        eprintln!("HF_TOKEN environment variable is not set");
        return;
    };

    let mut config = OpenAIConfigBuilder::with_api_key(api_key);
    if let Ok(base_url) = env::var("WAYFINDER_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    if let Ok(model) = env::var("WAYFINDER_MODEL") {
        config = config.with_model(model);
    }
    let model_provider = OpenAIProvider::new(config.build());
    info!("using model {}", model_provider.config().model());

    let session = SessionBuilder::with_model_provider(model_provider)
        .with_system_prompt(include_str!("./system_prompt.md"))
        .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    println!(
        "{}Ask me anything about travelling in the USA. Type {} to start over.",
        BAR_CHAR.bright_cyan(),
        "/reset".bold()
    );

    let mut transcript = Transcript::new();
    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/reset" {
            session.reset();
            transcript.clear();
            println!("{}🧹 Memory cleared.\n", BAR_CHAR.bright_cyan());
            continue;
        }

        let mut stream = session.send_message(line);
        let mut progress_bar = None;

        loop {
            // Create a new progress bar if it has been finished.
            progress_bar
                .get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar.set_message("🧭 Planning...");
                    progress_bar
                })
                .inc(1);

            let sleep = sleep(Duration::from_millis(100));
            let message = select! {
                message = stream.next() => {
                    let Some(message) = message else {
                        break;
                    };
                    message
                },
                _ = sleep => {
                    continue;
                }
            };

            // Finish the progress bar before printing anything else.
            if let Some(progress_bar) = progress_bar.take() {
                progress_bar.finish_and_clear();
            }

            match transcript.apply(message) {
                Applied::Appended { index } => {
                    let nested = transcript.parent_of(index).is_some();
                    if let Some(message) = transcript.get(index) {
                        print_message(message, nested);
                    }
                }
                Applied::Updated { index } => {
                    if let Some(title) =
                        transcript.get(index).and_then(ChatMessage::title)
                    {
                        let bar = BAR_CHAR.bright_green();
                        println!("{bar}✅ {}", title.dimmed());
                    }
                }
            }
        }

        if let Some(progress_bar) = progress_bar {
            progress_bar.finish_and_clear();
        }
        println!();
    }
}

fn print_message(message: &ChatMessage, nested: bool) {
    let indent = if nested { "    " } else { "" };
    let bar = if nested {
        BAR_CHAR.bright_black().to_string()
    } else {
        BAR_CHAR.bright_cyan().to_string()
    };

    if let Some(title) = message.title() {
        println!("{indent}{bar}{}", title.bright_yellow().bold());
    }
    let content = HTML_TAG.replace_all(&message.content, "");
    for line in content.trim_end().lines() {
        if message.title().is_some() {
            println!("{indent}{bar}{}", line.dimmed());
        } else {
            println!("{indent}{bar}{}", line.bright_white());
        }
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
