use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use sceneweaver_agent::{AgentConfig, TurnController};
use sceneweaver_core::Notice;
use sceneweaver_providers::load_engine;
use sceneweaver_world::World;

#[derive(Parser)]
#[command(name = "sceneweaver")]
#[command(about = "Chat with an agent that controls a live world")]
#[command(version)]
struct Cli {
    /// Model identifier to load.
    #[arg(short, long, default_value = "qwen2.5-coder:7b")]
    model: String,

    /// Base URL of the inference server.
    #[arg(long)]
    base_url: Option<String>,

    /// Sampling temperature.
    #[arg(short, long, default_value_t = 0.7)]
    temperature: f32,

    /// Override the system preamble.
    #[arg(long)]
    system_prompt: Option<String>,
}

fn print_notice(notice: &Notice) {
    match notice {
        Notice::Assistant { text } => println!("assistant> {text}"),
        Notice::ToolExecuting { name, arguments } => {
            println!("   [tool] executing {name} with args: {arguments}")
        }
        Notice::ToolResult { text } => println!("   [tool] {text}"),
        Notice::Error { text } => println!("   [error] {text}"),
    }
}

fn print_help() {
    println!("Commands: /tools  /reset  /model <id>  /temp <value>  /quit");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AgentConfig {
        model: cli.model.clone(),
        temperature: cli.temperature,
        ..AgentConfig::default()
    };
    if let Some(prompt) = cli.system_prompt {
        config.system_prompt = prompt;
    }

    let world = World::new();
    let engine = load_engine(&config.model, cli.base_url.as_deref());
    let mut controller = TurnController::new(engine, world, config).await?;

    info!(model = %cli.model, "Sceneweaver ready");
    println!(
        "Hello! I'm ready to play. I'm currently running the {} model.",
        cli.model
    );
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_once(' ').unwrap_or((input, "")) {
            ("/quit", _) | ("/exit", _) => break,
            ("/help", _) => print_help(),
            ("/tools", _) => {
                let registry = controller.registry();
                for name in registry.read().await.list() {
                    println!("- {name}");
                }
            }
            ("/reset", _) => {
                let engine = load_engine(&controller.config().model, cli.base_url.as_deref());
                controller.reset(engine).await?;
                println!("Session reset.");
            }
            ("/model", id) if !id.is_empty() => {
                let engine = load_engine(id, cli.base_url.as_deref());
                controller.reset(engine).await?;
                controller.set_model(id);
                println!("Switched to model {id}; session reset.");
            }
            ("/temp", value) if !value.is_empty() => match value.parse::<f32>() {
                Ok(t) => {
                    controller.set_temperature(t);
                    println!("Temperature set to {t:.1}.");
                }
                Err(_) => println!("   [error] '{value}' is not a valid temperature"),
            },
            _ => {
                for notice in controller.user_turn(input).await {
                    print_notice(&notice);
                }
            }
        }
    }

    Ok(())
}
