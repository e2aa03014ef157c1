//! Generate command - run the full memories-to-MIDI pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::Style;
use rand::SeedableRng;
use rand::rngs::StdRng;

use reverie_memory::MemoryId;
use reverie_melody::{MidiGenerator, PcaProjector, SmfEncoder, WalkStrategy};

use super::Context;

/// Arguments for the generate command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Trajectory length (number of walk steps)
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Walk strategy
    #[arg(long)]
    pub strategy: Option<String>,

    /// Output MIDI path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Memory id to start the walk from
    #[arg(long)]
    pub start: Option<u64>,

    /// Seed for the random walk (omit for a fresh walk each run)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Run the generate command.
pub fn run(args: GenerateArgs, ctx: &Context) -> Result<()> {
    let store = super::open_store(ctx)?;
    let generation = &ctx.config.generation;

    let length = args.length.unwrap_or(generation.length);
    let output = args.output.clone().unwrap_or_else(|| generation.output.clone());
    let strategy: WalkStrategy = args
        .strategy
        .as_deref()
        .unwrap_or(&generation.strategy)
        .parse()?;
    let start = args.start.map(MemoryId::from_raw);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let generator = MidiGenerator::new(&store, PcaProjector, SmfEncoder::new(generation.tempo));
    let report = generator.generate(&output, length, strategy, start, &mut rng)?;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({
                "trajectory": report.trajectory.iter().map(|id| id.as_u64()).collect::<Vec<_>>(),
                "notes": report.notes,
                "output": report.output,
            })
        );
        return Ok(());
    }

    let green = Style::new().green();
    let dim = Style::new().dim();

    if ctx.verbose {
        for id in &report.trajectory {
            println!(
                "{} {}",
                dim.apply_to(format!("[{id}]")),
                store.text(*id).unwrap_or("<missing>")
            );
        }
    }
    println!(
        "{} {} steps → {} notes → {}",
        green.apply_to("✓"),
        report.trajectory.len(),
        report.notes.len(),
        report.output.display()
    );
    Ok(())
}
