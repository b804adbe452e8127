//! Read-side commands: wallet timeline and knowledge search.

use ainon_memory::{SemanticIndex, TimelineStore};
use ainon_types::action::ActorId;
use ainon_types::store::{KnowledgeStore, MemoryStore};
use anyhow::Result;

use crate::config::RecorderSettings;

/// Print a wallet's recent timeline, oldest first.
pub async fn cmd_timeline(settings: &RecorderSettings, wallet: &str, limit: usize) -> Result<()> {
    let conn = ainon_memory::open_store(&settings.db_path())?;
    let store = TimelineStore::new(conn);

    let actor = ActorId::from(wallet);
    let messages = store.timeline(&actor, limit).await?;
    if messages.is_empty() {
        println!("no memory recorded for {wallet}");
        return Ok(());
    }

    for entry in messages {
        println!(
            "{:>4}  {}  {}",
            entry.seq,
            entry.message.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.message.content
        );
    }
    Ok(())
}

/// Print knowledge documents matching the query, newest first.
pub async fn cmd_search(settings: &RecorderSettings, query: &str, limit: usize) -> Result<()> {
    let conn = ainon_memory::open_store(&settings.db_path())?;
    let index = SemanticIndex::new(conn);

    let hits = index.search(query, limit).await?;
    if hits.is_empty() {
        println!("no documents match '{query}'");
        return Ok(());
    }

    for doc in hits {
        println!("{}  {}", doc.record_id, doc.content);
    }
    Ok(())
}
