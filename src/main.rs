//! CMO Agent - Entry Point
//!
//! Interactive chat loop over stdin driving the dispatcher. The visible
//! reply always comes from the Small Mind; delegated work runs in the
//! background and lands in the interaction log.

use std::sync::Arc;

use cmo_agent::{
    BigMind, ClaudeClient, Config, Dispatcher, GroqClient, InteractionLogger, SmallMind,
    ToolInvoker,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("CMO Agent v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: cmo-agent");
        println!();
        println!("Environment variables:");
        println!("  GROQ_API_KEY                  Small Mind generation (required)");
        println!("  ANTHROPIC_API_KEY             Big Mind generation (required)");
        println!("  TELEGRAM_BOT_TOKEN            Send_Message tool");
        println!("  TELEGRAM_CHAT_ID              Send_Message tool");
        println!("  META_AD_ACCOUNT_ID            Post_Video_Ad / Campaign_Insight tools");
        println!("  META_ACCESS_TOKEN             Post_Video_Ad / Campaign_Insight tools");
        println!("  FAL_KEY                       Create_Ad_from_Image tool");
        println!("  CMO_LOG_PATH                  Interaction log file (default: interactions.log)");
        println!("  CMO_VIDEO_POLL_ATTEMPTS       Video poll budget (default: 30)");
        println!("  CMO_VIDEO_POLL_INTERVAL_SECS  Video poll interval (default: 10)");
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    info!("CMO Agent v{}", env!("CARGO_PKG_VERSION"));

    let groq = Arc::new(GroqClient::new(&config.groq_api_key));
    let claude = Arc::new(ClaudeClient::new(&config.anthropic_api_key));
    let invoker = Arc::new(ToolInvoker::from_config(&config, claude.clone()));
    let logger = Arc::new(InteractionLogger::new(&config.log_path));

    let dispatcher = Dispatcher::new(
        Arc::new(SmallMind::new(groq)),
        Arc::new(BigMind::new(claude, invoker)),
        logger,
    );

    println!("AI Chief Marketing Officer - type a message, or 'exit' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut pending = Vec::new();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "exit" || message == "quit" {
            break;
        }

        let outcome = dispatcher.handle_message(message, None).await;
        println!("{}", outcome.reply);
        if let Some(handle) = outcome.background {
            pending.push(handle);
        }
        pending.retain(|h| !h.is_finished());
    }

    if !pending.is_empty() {
        info!("Waiting for {} background task(s) to finish", pending.len());
        for handle in pending {
            let _ = handle.await;
        }
    }

    Ok(())
}
