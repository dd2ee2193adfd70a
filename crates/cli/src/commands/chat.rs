//! `switchyard chat`: single message or a line-by-line stdin conversation.

use std::io::Write;

use switchyard_agent::Orchestrator;
use switchyard_config::AppConfig;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    config: &AppConfig,
    message: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = super::orchestrator(config);
    orchestrator.initialize().await?;

    if let Some(msg) = message {
        respond(&orchestrator, &msg, json).await?;
        orchestrator.dispose().await;
        return Ok(());
    }

    if !json {
        println!();
        println!("  Switchyard chat (memory: {})", orchestrator.memory().backend_name());
        println!("  Type your message and press Enter. 'exit' or Ctrl+D to quit.");
        println!();
        prompt()?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        if !line.is_empty() {
            if let Err(e) = respond(&orchestrator, line, json).await {
                eprintln!("  [Error] {e}");
            }
        }
        if !json {
            prompt()?;
        }
    }

    orchestrator.dispose().await;
    if !json {
        println!();
        println!("  Goodbye!");
    }
    Ok(())
}

async fn respond(
    orchestrator: &Orchestrator,
    message: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = orchestrator.process_message(message).await?;
    if json {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        println!();
        print!("{}", super::render(&result));
        println!();
    }
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
