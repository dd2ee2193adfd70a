//! `switchyard demo`: runs the canonical scenarios against a fresh pipeline.

use switchyard_config::AppConfig;

const SCENARIOS: &[(&str, &str)] = &[
    ("Memory access", "What did we discuss about deployment last week?"),
    ("Knowledge retrieval", "How does the authentication flow work?"),
    ("Multi-tool", "Remember what we said about the database schema documentation?"),
    ("Clarification", "fix"),
    ("Conversation", "Hello, how are you?"),
];

pub async fn run(config: &AppConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = super::orchestrator(config);
    orchestrator.initialize().await?;

    let mut results = Vec::with_capacity(SCENARIOS.len());
    for (i, (title, message)) in SCENARIOS.iter().enumerate() {
        let result = orchestrator.process_message(message).await?;
        if json {
            results.push(serde_json::json!({
                "scenario": title,
                "message": message,
                "result": result,
            }));
        } else {
            println!();
            println!("━━ {}. {title} ━━", i + 1);
            println!("  You > {message}");
            print!("{}", super::render(&result));
        }
    }

    let history = orchestrator.session_history().await.len();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "scenarios": results,
                "sessionHistory": history,
            }))?
        );
    } else {
        println!();
        println!("Session history: {history} messages");
    }

    orchestrator.dispose().await;
    Ok(())
}
