//! Add command - store new memories.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the add command.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Memory texts to store (one id assigned per text)
    #[arg(required = true)]
    pub texts: Vec<String>,
}

/// Run the add command.
pub fn run(args: AddArgs, ctx: &Context) -> Result<()> {
    let mut store = super::open_store(ctx)?;

    let mut added = Vec::with_capacity(args.texts.len());
    for text in &args.texts {
        let id = store.add(text.clone())?;
        added.push(id);
    }
    super::save_store(ctx, &store)?;

    if ctx.json_output {
        let ids: Vec<u64> = added.iter().map(|id| id.as_u64()).collect();
        println!("{}", serde_json::to_string(&ids)?);
    } else {
        let green = Style::new().green();
        for (id, text) in added.iter().zip(&args.texts) {
            println!("{} [{}] {}", green.apply_to("✓"), id, text);
        }
    }
    Ok(())
}
