//! Oblivious storage simulator CLI.
//!
//! This binary provides a single entry point for all simulation modes. It
//! performs:
//! 1. **Single-engine run:** Drive one baseline or staged engine with a
//!    synthetic workload and print its statistics.
//! 2. **Hierarchy run:** Derive the recursive position-map chain, drive it
//!    top-down, and print per-level plus merged statistics.
//! 3. **Plan inspection:** Print the derived hierarchy plan without running.

use clap::{Parser, Subcommand, ValueEnum};
use std::{fs, process};

use oramsim_core::config::{Config, Variant, WorkloadKind};
use oramsim_core::sim::{RunSummary, run_engine, run_hierarchy};
use oramsim_core::{BaselineEngine, Hierarchy, OramEngine, StagedEngine};

#[derive(Parser, Debug)]
#[command(
    name = "oramsim",
    version,
    about = "Oblivious RAM storage engine simulator",
    long_about = "Simulate Path ORAM / PCD-ORAM engines and their hierarchical \
composition.\n\nConfiguration comes from a JSON file (see \
oramsim_core::config::Config) with flag overrides on top.\n\nExamples:\n  \
oramsim run --variant staged --accesses 100000\n  oramsim run --hierarchy \
--data-size 8388608 --seed 7\n  oramsim plan --data-size 8388608"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a workload against a single engine or a hierarchy.
    Run {
        /// JSON configuration file; defaults apply when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Engine variant override.
        #[arg(long)]
        variant: Option<VariantArg>,

        /// Compose a recursive hierarchy instead of a single engine.
        #[arg(long)]
        hierarchy: bool,

        /// Working-set size override in bytes.
        #[arg(long)]
        data_size: Option<u64>,

        /// Request count override.
        #[arg(long)]
        accesses: Option<u64>,

        /// Workload kind override.
        #[arg(long)]
        workload: Option<WorkloadArg>,

        /// RNG seed for both the engine and the workload.
        #[arg(long)]
        seed: Option<u64>,

        /// Raise log verbosity to DEBUG.
        #[arg(long)]
        debug: bool,
    },

    /// Print the derived hierarchy plan without running a workload.
    Plan {
        /// JSON configuration file; defaults apply when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Working-set size override in bytes.
        #[arg(long)]
        data_size: Option<u64>,
    },
}

/// Engine variant flag.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    /// Classical Path ORAM.
    Baseline,
    /// PCD-ORAM with staged eviction.
    Staged,
}

/// Workload kind flag.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WorkloadArg {
    /// Sequential distinct writes.
    Sequential,
    /// Uniform mix after a warm-up pass.
    Uniform,
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            variant,
            hierarchy,
            data_size,
            accesses,
            workload,
            seed,
            debug,
        } => {
            let mut cfg = load_config(config.as_deref());
            if let Some(v) = variant {
                cfg.engine.variant = match v {
                    VariantArg::Baseline => Variant::Baseline,
                    VariantArg::Staged => Variant::Staged,
                };
            }
            if let Some(bytes) = data_size {
                cfg.engine.data_set_size = bytes;
            }
            if let Some(n) = accesses {
                cfg.workload.accesses = n;
            }
            if let Some(kind) = workload {
                cfg.workload.kind = match kind {
                    WorkloadArg::Sequential => WorkloadKind::Sequential,
                    WorkloadArg::Uniform => WorkloadKind::Uniform,
                };
            }
            if let Some(seed) = seed {
                cfg.engine.seed = Some(seed);
                cfg.workload.seed = Some(seed);
            }
            cfg.engine.debug |= debug;
            init_tracing(cfg.engine.debug);
            cmd_run(&cfg, hierarchy);
        }
        Commands::Plan { config, data_size } => {
            let mut cfg = load_config(config.as_deref());
            if let Some(bytes) = data_size {
                cfg.engine.data_set_size = bytes;
            }
            init_tracing(cfg.engine.debug);
            cmd_plan(&cfg);
        }
    }
}

/// Reads and parses the JSON configuration, or returns the defaults.
fn load_config(path: Option<&str>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config {path}: {e}");
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing config {path}: {e}");
        process::exit(1);
    })
}

/// Installs the fmt subscriber; `RUST_LOG` overrides the default level.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Runs the configured workload and prints the statistics report.
fn cmd_run(cfg: &Config, hierarchy: bool) {
    println!(
        "Configuration: variant={:?} data_set={} B block={} B Z={} stash={} threshold={}",
        cfg.engine.variant,
        cfg.engine.data_set_size,
        cfg.engine.block_size,
        cfg.engine.blocks_per_bucket,
        cfg.engine.stash_capacity,
        cfg.engine.fill_threshold,
    );
    println!(
        "Workload: {:?}, {} accesses, read fraction {:.2}",
        cfg.workload.kind, cfg.workload.accesses, cfg.workload.read_fraction
    );
    println!();

    if hierarchy {
        match cfg.engine.variant {
            Variant::Baseline => run_hierarchy_variant::<BaselineEngine>(cfg),
            Variant::Staged => run_hierarchy_variant::<StagedEngine>(cfg),
        }
    } else {
        match cfg.engine.variant {
            Variant::Baseline => run_engine_variant::<BaselineEngine>(cfg),
            Variant::Staged => run_engine_variant::<StagedEngine>(cfg),
        }
    }
}

/// Drives one engine of type `E` and prints its report.
fn run_engine_variant<E: OramEngine>(cfg: &Config) {
    let mut engine = E::from_config(&cfg.engine, &cfg.latency).unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        process::exit(1);
    });
    let summary = run_engine(&mut engine, &cfg.workload);
    print_summary(&summary);
    engine.stats().print("engine");
}

/// Derives a hierarchy of engines of type `E`, drives it, and prints
/// per-level plus merged reports.
fn run_hierarchy_variant<E: OramEngine>(cfg: &Config) {
    let mut hierarchy =
        Hierarchy::<E>::new(cfg.engine.data_set_size, &cfg.hierarchy, &cfg.engine, &cfg.latency)
            .unwrap_or_else(|e| {
                eprintln!("Configuration error: {e}");
                process::exit(1);
            });
    print_plan(&hierarchy);

    let summary = run_hierarchy(&mut hierarchy, &cfg.workload);
    print_summary(&summary);
    for level in 0..hierarchy.depth() {
        hierarchy.level_stats(level).print(&format!("level {level}"));
    }
    hierarchy.merged_stats().print("all levels");
}

/// Prints the derived hierarchy plan.
fn cmd_plan(cfg: &Config) {
    // The staged engine is only built to validate per-level parameters; the
    // plan itself is variant-independent.
    let hierarchy = Hierarchy::<StagedEngine>::new(
        cfg.engine.data_set_size,
        &cfg.hierarchy,
        &cfg.engine,
        &cfg.latency,
    )
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        process::exit(1);
    });
    print_plan(&hierarchy);
}

/// Prints one line per hierarchy level plus the on-chip residue.
fn print_plan<E: OramEngine>(hierarchy: &Hierarchy<E>) {
    println!("Hierarchy: {} level(s)", hierarchy.depth());
    for (i, level) in hierarchy.plan().levels.iter().enumerate() {
        let g = &level.geometry;
        println!(
            "  level {i}: data {} B, {} levels, {} buckets, {} leaves, scale {}",
            level.data_size, g.level_count, g.bucket_count, g.leaf_count, level.scale_factor
        );
    }
    println!(
        "  on-chip position map: {} B",
        hierarchy.plan().on_chip_map_bytes
    );
    println!();
}

/// Prints the run totals.
fn print_summary(summary: &RunSummary) {
    println!(
        "Run complete: {} requests, {} slots of request traffic, {} slots of background traffic",
        summary.requests, summary.traffic, summary.background_traffic
    );
}
