//! Headless murmuration runner
//!
//! Seeds a small swarm, injects probes on a fixed cadence and reports swarm
//! health while the simulation runs.

use clap::Parser;
use murmuration_core::{Simulation, SimulationConfig, TransformationWriter, Vec2};
use murmuration_events::MemberKind;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Names given to the first members, the first one joining as a gateway
const FOUNDING_MEMBERS: [&str; 5] = ["raven", "sparrow", "falcon", "owl", "hummingbird"];

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "murmuration")]
#[command(about = "A headless murmuration swarm simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Number of members to seed
    #[arg(long, default_value_t = 5)]
    members: usize,

    /// Kind of every member after the first, which always joins as a gateway
    #[arg(long, default_value = "standard")]
    kind: MemberKind,

    /// TOML configuration file (defaults to murmuration.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Inject a targeted probe every N ticks (0 disables probes)
    #[arg(long, default_value_t = 90)]
    probe_interval: u64,

    /// Print swarm health every N ticks
    #[arg(long, default_value_t = 100)]
    report_interval: u64,

    /// Stream transformation records to this JSONL file
    #[arg(long)]
    transformations_out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmuration=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::load_or_default(),
    };

    println!("Murmuration");
    println!("===========");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", args.ticks);
    println!("Members: {}", args.members);
    println!("Probe interval: {}", args.probe_interval);
    println!();

    let (width, height) = (config.world.width, config.world.height);
    let mut sim = Simulation::new(config, args.seed)?;

    for i in 0..args.members {
        let id = FOUNDING_MEMBERS
            .get(i)
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("node_{}", i + 1));
        let kind = if i == 0 { MemberKind::Gateway } else { args.kind };
        sim.add_member(&id, kind)?;
    }
    println!("Seeded {} members", sim.health().total_members);

    let mut writer = match &args.transformations_out {
        Some(path) => Some(TransformationWriter::create(path)?),
        None => None,
    };

    // Probe placement gets its own stream so the engine's sequence is unaffected
    let mut probe_rng = SmallRng::seed_from_u64(args.seed.wrapping_add(1));

    for tick in 1..=args.ticks {
        if args.probe_interval > 0 && tick % args.probe_interval == 0 {
            let position = Vec2::new(
                probe_rng.gen_range(0.0..width),
                probe_rng.gen_range(0.0..height),
            );
            if let Err(e) = sim.inject_targeted_probe(position) {
                tracing::warn!("Could not inject probe at tick {}: {}", tick, e);
            }
        }

        sim.tick();

        if let Some(writer) = writer.as_mut() {
            writer.export_new(&sim)?;
        }

        if args.report_interval > 0 && tick % args.report_interval == 0 {
            println!("[Tick {:>5}] {}", tick, sim.health());
        }
    }

    println!();
    println!("Simulation complete. Ran {} ticks.", args.ticks);
    println!("{}", sim.health());
    for art in sim.transformation_art(5) {
        println!("  tick {:>5}  {:<12} {:<12} {}", art.tick, art.node, art.art.to_string(), art.state);
    }
    if let Some(writer) = writer {
        println!("Exported {} transformation records.", writer.exported());
        writer.finish()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_argument() {
        let args = Args::try_parse_from(["murmuration", "--kind", "gateway"]).unwrap();
        assert_eq!(args.kind, MemberKind::Gateway);

        let args = Args::try_parse_from(["murmuration"]).unwrap();
        assert_eq!(args.kind, MemberKind::Standard);

        assert!(Args::try_parse_from(["murmuration", "--kind", "relay"]).is_err());
    }
}
