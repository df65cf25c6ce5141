//! Terminal chat surface for the advisory client.
//!
//! A thin consumer of [`ChatSession`]: reads lines from stdin, prints new
//! transcript entries after each action. Plain lines are sent as text;
//! `:image <path>` stages an image, `:record` / `:stop` drive the
//! recorder, `:quit` exits.
//!
//! All tracing output goes to stderr so stdout stays a clean conversation
//! view.

use krishi_chat::{ChatSession, ClientConfig, ImageAttachment, Origin};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = ClientConfig::default_path();
    let config = ClientConfig::load(&config_path)?;
    tracing::info!("backend: {}", config.backend.base_url);

    let mut session = ChatSession::new(&config)?;
    let mut printed = 0usize;

    println!("🌱 KrishiMitra chat — :image <path>, :record, :stop, :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        match trimmed {
            ":quit" | ":exit" => break,
            ":record" => {
                if let Err(e) = session.start_recording() {
                    eprintln!("cannot record: {e}");
                } else {
                    println!("(recording — :stop to send)");
                }
            }
            ":stop" => {
                session.finish_recording().await;
            }
            _ if trimmed.starts_with(":image ") => {
                let path = trimmed.trim_start_matches(":image ").trim();
                match ImageAttachment::from_path(Path::new(path)) {
                    Ok(image) => {
                        println!("(staged {})", image.file_name);
                        session.stage_image(image);
                    }
                    Err(e) => eprintln!("cannot stage image: {e}"),
                }
            }
            _ => {
                session.set_input(line);
                session.send().await;
            }
        }

        for msg in &session.transcript().messages()[printed..] {
            let prefix = match msg.origin {
                Origin::Human => "👨‍🌾",
                Origin::Agent => "🤖",
            };
            println!("{prefix} {}", msg.content);
        }
        printed = session.transcript().len();
    }

    println!("👋 Goodbye!");
    Ok(())
}
