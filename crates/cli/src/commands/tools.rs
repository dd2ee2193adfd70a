//! `switchyard tools`: lists the registered tools.

use switchyard_config::AppConfig;

pub async fn run(config: &AppConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tools = super::orchestrator(config).available_tools().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    println!("🔧 Available tools ({}):", tools.len());
    for tool in &tools {
        println!();
        println!("  {}", tool.name);
        println!("    {}", tool.description);
    }
    Ok(())
}
