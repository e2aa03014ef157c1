//! List command - show stored memories.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum memories to show
    #[arg(short, long, default_value = "50")]
    pub limit: usize,
}

/// Run the list command.
pub fn run(args: ListArgs, ctx: &Context) -> Result<()> {
    let store = super::open_store(ctx)?;

    if ctx.json_output {
        let entries: Vec<serde_json::Value> = store
            .ids()
            .take(args.limit)
            .map(|id| {
                serde_json::json!({
                    "id": id.as_u64(),
                    "text": store.text(id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if store.is_empty() {
        println!("No memories stored yet. Add some with `reverie add`.");
        return Ok(());
    }

    let dim = Style::new().dim();
    for id in store.ids().take(args.limit) {
        println!(
            "{} {}",
            dim.apply_to(format!("[{id}]")),
            store.text(id).unwrap_or("<missing>")
        );
    }
    if store.len() > args.limit {
        println!("{}", dim.apply_to(format!("… and {} more", store.len() - args.limit)));
    }
    Ok(())
}
