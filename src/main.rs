//! Console for playing against Andy by typing
//!
//! Each line goes through the command classifier and then `fulfill`, exactly
//! as a transcribed utterance would. The board is carried between turns the
//! same way a client would carry it.

use andy::config::StoreKind;
use andy::intent::{CommandClassifier, IntentClassifier};
use andy::AndyConfig;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "andy", about = "Play chess against Andy from the terminal")]
struct Args {
    /// Settings file (defaults to settings.json in the config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resume an existing session instead of starting a new one
    #[arg(long)]
    session: Option<String>,

    /// Andy answers each of your moves
    #[arg(long)]
    andy_replies: bool,

    /// Keep the session in memory only
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = AndyConfig::load(args.config.as_deref());
    config.andy_replies |= args.andy_replies;
    if args.ephemeral {
        config.store.kind = StoreKind::Memory;
    }

    let fulfiller = config.build_fulfiller();
    let classifier = CommandClassifier::new();
    let session_id = args
        .session
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    println!("Session {} (recommender: {})", session_id, fulfiller.recommender_name());
    println!("Say hello, pick a side, then type moves like 'e2 e4' or 'knight to f3'. 'quit' exits.");

    let mut board = String::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "board" => {
                println!("{}", if board.is_empty() { "(starting position)" } else { board.as_str() });
                continue;
            }
            _ => {}
        }

        let classification = classifier.classify(line).await;
        let reply = fulfiller
            .fulfill(
                &session_id,
                &board,
                &classification.intent_id,
                classification.params,
            )
            .await
            .context("fulfillment failed")?;

        println!(
            "Andy: {}  [{} {}]",
            reply.response_text,
            reply.fulfillment_info.intent_name,
            if reply.fulfillment_info.success { "ok" } else { "failed" }
        );
        board = reply.board_str;
    }
    Ok(())
}
