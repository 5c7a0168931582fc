use anyhow::Result;
use ferrumwire::Connection;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (INFO level, overridable through RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Server address from the first argument, Redis default otherwise
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:6379".to_string());

    info!("Connecting to {}", addr);
    let mut conn = Connection::connect(&addr).await?;
    info!("Connected");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}> ", addr);
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }

        let args: Vec<&str> = line.split_whitespace().collect();
        conn.send_command(&args).await?;

        match conn.read_reply().await? {
            Some(reply) => println!("{}", reply),
            None => {
                error!("Server closed the connection");
                break;
            }
        }
    }

    Ok(())
}
