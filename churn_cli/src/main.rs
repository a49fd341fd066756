use churn_core::config::{ChurnConfig, ConfigOutputMode};
use churn_core::driver::{EmissionFilter, IterationDriver, RunPlan};
use churn_core::engine::MutationEngine;
use churn_core::session::{FuzzSession, OutputMode};

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(short, long, value_parser)]
    config_file: Option<PathBuf>,
    /// PRNG seed; defaults to a time-derived value when not set anywhere
    #[clap(short, long)]
    seed: Option<i64>,
    /// Mutate the input buffer in place instead of a separate output buffer
    #[clap(long)]
    in_place: bool,
    /// Zero in on the given 1-based iteration; 0 emits every iteration
    #[clap(short = 'i', long)]
    target_iteration: Option<u64>,
    /// Number of mutate calls to run
    #[clap(short = 'n', long)]
    iterations: Option<u64>,
    /// Report per-iteration seed/iteration/byte-count metadata on stderr
    #[clap(short, long)]
    verbose: bool,
    /// Input arguments; joined with single spaces to form the input bytes
    #[clap(required = true)]
    input: Vec<String>,
}

fn time_derived_seed() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}

fn build_engine() -> impl MutationEngine {
    #[cfg(feature = "libradamsa")]
    {
        churn_core::engine::libradamsa::LibRadamsaEngine::new()
    }
    #[cfg(not(feature = "libradamsa"))]
    {
        churn_core::engine::ByteNudgeEngine::new()
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let mut config = match &cli.config_file {
        Some(config_path) => ChurnConfig::load_from_file(config_path)?,
        None => {
            let default_config_path = PathBuf::from("churn.toml");
            if default_config_path.exists() {
                ChurnConfig::load_from_file(&default_config_path)?
            } else {
                ChurnConfig::default()
            }
        }
    };

    let session_settings = config.session.get_or_insert_with(Default::default);
    if let Some(seed) = cli.seed {
        session_settings.seed = Some(seed);
    }
    if cli.in_place {
        session_settings.output_mode = ConfigOutputMode::InPlace;
    }

    let run_settings = config.run.get_or_insert_with(Default::default);
    if let Some(iterations) = cli.iterations {
        run_settings.iterations = iterations;
    }
    if let Some(target) = cli.target_iteration {
        run_settings.target_iteration = target;
    }
    if cli.verbose {
        run_settings.verbose = true;
    }

    let seed = session_settings.seed.unwrap_or_else(time_derived_seed);
    let mode = match session_settings.output_mode {
        ConfigOutputMode::SeparateBuffer => OutputMode::SeparateBuffer,
        ConfigOutputMode::InPlace => OutputMode::InPlace,
    };
    let filter = match run_settings.target_iteration {
        0 => EmissionFilter::All,
        target => EmissionFilter::Only(target),
    };
    let plan = RunPlan {
        iterations: run_settings.iterations,
        filter,
        output_capacity: run_settings.output_capacity,
    };
    // Bad plans are fatal here, before any session exists; nothing inside a
    // run aborts it.
    plan.validate()?;
    let verbose = run_settings.verbose;

    let input = cli.input.join(" ").into_bytes();

    let mut session = FuzzSession::new(build_engine(), seed, mode);
    let driver = IterationDriver::new(plan);

    let mut stdout = std::io::stdout();
    for emission in driver.run(&mut session, &input) {
        if verbose {
            eprintln!(
                "--> seed {}, iteration {}, {} bytes:",
                emission.seed,
                emission.iteration,
                emission.data.len()
            );
        }
        stdout.write_all(&emission.data)?;
        stdout.write_all(b"\n")?;
    }

    Ok(())
}
