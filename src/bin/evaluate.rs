//! Evaluate a predictor against one or more traces.

use clap::{ Parser, ValueEnum };
use log::{ error, info };

use plbp::*;
use plbp::sim;
use plbp::stats::TraceStats;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Piecewise,
    Gshare,
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Binary trace files
    traces: Vec<String>,

    /// JSON predictor configuration (overrides --predictor)
    #[arg(short, long)]
    config: Option<String>,

    /// Predictor to use with its default configuration
    #[arg(short, long, value_enum, default_value = "piecewise")]
    predictor: Kind,

    /// Number of records used only for training
    #[arg(short, long, default_value = "0")]
    warmup: usize,

    /// Also evaluate a synthetic trace with this many records
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed for the synthetic trace
    #[arg(long, default_value = "0")]
    seed: u64,
}

fn report(name: &str, stat: &TraceStats) {
    println!("[*] {}", name);
    println!("  Global hit rate: {}/{} ({:.2}% correct) ({} misses, {:.2} MPKB)",
        stat.global_hits(),
        stat.global_brns(),
        stat.hit_rate() * 100.0,
        stat.global_miss(),
        stat.mpkb(),
    );
    println!("  Unique branches: {}", stat.num_unique_branches());
    println!("  Low hit-rate branches:");
    for (pc, data) in stat.get_low_rate_branches(100, 4) {
        println!("    {:016x} {:8}/{:8} {:.4}",
            pc, data.hits, data.occ, data.hit_rate()
        );
    }
}

fn evaluate(cfg: PredictorConfig, name: &str, records: &[BranchRecord],
    warmup: usize) -> anyhow::Result<()>
{
    let mut predictor = cfg.build()?;
    let stat = sim::run_with_warmup(predictor.as_mut(), records, warmup)?;
    report(name, &stat);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let cfg = match &args.config {
        Some(path) => PredictorConfig::from_file(path)?,
        None => match args.predictor {
            Kind::Piecewise => PredictorConfig::Piecewise(PiecewiseConfig::default()),
            Kind::Gshare => PredictorConfig::Gshare(GshareConfig::default()),
        },
    };
    info!("using {:?} ({} bits)", cfg, cfg.storage_bits());

    if args.traces.is_empty() && args.synthetic.is_none() {
        println!("usage: evaluate [--config FILE] [--synthetic N] <trace files>");
        return Ok(());
    }

    if let Some(len) = args.synthetic {
        let records = SyntheticTrace::mixed(32, args.seed).generate(len);
        evaluate(cfg, &format!("synthetic (seed {})", args.seed), &records,
            args.warmup)?;
    }

    for trace in BinaryTraceSet::new_from_slice(&args.traces) {
        match trace {
            Ok(trace) => {
                evaluate(cfg, trace.name(), trace.as_slice(), args.warmup)?;
            },
            Err(e) => error!("skipping trace: {}", e),
        }
    }
    Ok(())
}
