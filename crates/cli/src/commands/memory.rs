//! `switchyard memory`: long-term memory management.

use switchyard_config::AppConfig;
use switchyard_memory::MemoryStore;

pub async fn search(
    config: &AppConfig,
    query: &str,
    limit: Option<usize>,
    days: Option<u32>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = MemoryStore::from_config(&config.memory);
    let hits = store.search_memory(query, limit, days).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    println!("🔍 Searching {} memory for: \"{query}\"", store.backend_name());
    println!();
    if hits.is_empty() {
        println!("  No memories found.");
        return Ok(());
    }
    for (i, hit) in hits.iter().enumerate() {
        println!(
            "  {:>2}. [{:.2}] {} {}",
            i + 1,
            hit.relevance,
            hit.entry.timestamp.format("%Y-%m-%d"),
            hit.entry.summary
        );
        println!("      id: {}", hit.entry.id);
        if !hit.entry.topics.is_empty() {
            println!("      topics: {}", hit.entry.topics.join(", "));
        }
    }
    Ok(())
}

pub async fn recent(
    config: &AppConfig,
    count: usize,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = MemoryStore::from_config(&config.memory);
    let entries = store.recent_memories(count).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "🧠 {} of {} stored conversations",
        entries.len(),
        store.memory_count().await?
    );
    for entry in &entries {
        println!();
        println!("  [{}] {}", entry.timestamp.format("%Y-%m-%d %H:%M"), entry.id);
        println!("    User:      {}", entry.user_message);
        println!("    Assistant: {}", first_line(&entry.assistant_response));
    }
    Ok(())
}

pub async fn forget(config: &AppConfig, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = MemoryStore::from_config(&config.memory);
    if store.forget(id).await? {
        println!("🗑️  Forgot {id}");
    } else {
        println!("  No memory with id {id}");
    }
    Ok(())
}

pub async fn clear(config: &AppConfig, confirm: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm {
        println!("⚠️  This will delete ALL memories in '{}'.", config.memory.namespace);
        println!("   Run with --confirm to proceed:");
        println!("   switchyard memory clear --confirm");
        return Ok(());
    }

    let store = MemoryStore::from_config(&config.memory);
    let count = store.memory_count().await?;
    store.forget_all().await?;
    println!("✅ Cleared {count} memories.");
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
