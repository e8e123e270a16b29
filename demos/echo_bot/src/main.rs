//! Echo Bot Example
//!
//! Demonstrates the courier dispatcher with Axum-style handler functions.
//!
//! - `/start`, `/help`, `/ping` and `/echo <text>` are published to the
//!   command menu and answered through the `String` reply shortcut
//! - every message is logged by the `message` callback
//! - inline keyboard presses are acknowledged by the `callback_query` callback
//!
//! # Usage
//!
//! ```bash
//! COURIER_BOT__TOKEN=123:abc cargo run --package echo-bot
//! cargo run --package echo-bot -- --config courier.toml --profile dev
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use courier::prelude::*;
use courier::runtime::ConfigLoader;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "echo-bot", about = "Echoes text back to its sender")]
struct Args {
    /// Configuration file (defaults to courier.toml in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `dev` loads courier.dev.toml first
    #[arg(short, long)]
    profile: Option<String>,

    /// Bot token; overrides the configured one
    #[arg(short, long, env = "ECHO_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Force an update mode regardless of configuration
    #[arg(long, value_parser = ["poll", "webhook"])]
    mode: Option<String>,
}

// ============================================================================
// Handler Functions
// ============================================================================

async fn start_handler(msg: Message) -> String {
    let name = msg
        .from
        .as_ref()
        .map(|u| u.first_name.as_str())
        .unwrap_or("there");
    format!("Hello, {name}! Send /help to see what I can do.")
}

async fn help_handler() -> String {
    "/echo <text> - Echo text\n\
     /ping        - Pong!\n\
     /help        - This help"
        .to_string()
}

async fn ping_handler() -> String {
    "Pong!".to_string()
}

/// Replies with the command arguments; an empty reply is not sent.
async fn echo_handler(cmd: Command) -> String {
    cmd.args
}

async fn logging_handler(msg: Message) {
    let sender = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");
    info!(
        chat_id = msg.chat_id(),
        message_id = msg.message_id,
        sender = %sender,
        text = msg.text_or_caption().unwrap_or_default(),
        "Received message"
    );
}

async fn callback_handler(query: CallbackQuery, bot: Bot) {
    let text = query.data.as_deref().unwrap_or("(no data)");
    let answer = AnswerCallbackQuery::new(query.id.clone()).text(format!("You pressed {text}"));

    if let Err(e) = bot.answer_callback_query(&answer).await {
        error!(error = %e, "Failed to answer callback query");
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new().with_current_dir();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    if let Some(profile) = &args.profile {
        loader = loader.profile(profile);
    }
    let mut config = loader.load()?;

    if let Some(token) = args.token {
        config.bot.token = token;
    }
    match args.mode.as_deref() {
        Some("webhook") => config.updates.mode = UpdateMode::Webhook,
        Some("poll") => config.updates.mode = UpdateMode::Poll,
        _ => {}
    }

    let runtime = CourierRuntime::from_config(&config)?;

    let me = runtime.bot().get_me().await?;
    info!(id = me.id, username = ?me.username, "Authorized");

    let mut dispatcher = runtime.dispatcher();
    dispatcher
        .on_message(logging_handler)
        .on_callback_query(callback_handler);

    dispatcher
        .command("start", "Say hello", start_handler)
        .await?
        .command("help", "List commands", help_handler)
        .await?
        .command("ping", "Check that the bot is alive", ping_handler)
        .await?
        .command("echo", "Repeat the given text", echo_handler)
        .await?;

    runtime.run(dispatcher).await?;

    Ok(())
}
