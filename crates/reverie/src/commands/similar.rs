//! Similar command - similarity search over stored memories.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the similar command.
#[derive(Args, Debug)]
pub struct SimilarArgs {
    /// Query text
    pub query: String,

    /// Minimum similarity score to report
    #[arg(short, long, default_value = "0.5")]
    pub threshold: f32,
}

/// Run the similar command.
pub fn run(args: SimilarArgs, ctx: &Context) -> Result<()> {
    let store = super::open_store(ctx)?;
    let matches = store.find_similar(&args.query, args.threshold)?;

    if ctx.json_output {
        let entries: Vec<serde_json::Value> = matches
            .iter()
            .map(|(id, score)| {
                serde_json::json!({
                    "id": id.as_u64(),
                    "score": score,
                    "text": store.text(*id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No memories scored ≥ {} for that query.", args.threshold);
        return Ok(());
    }

    let dim = Style::new().dim();
    for (id, score) in &matches {
        println!(
            "{:.3} {} {}",
            score,
            dim.apply_to(format!("[{id}]")),
            store.text(*id).unwrap_or("<missing>")
        );
    }
    Ok(())
}
