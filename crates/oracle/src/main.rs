//! Computes the reference outputs of a tribit listing.
//!
//! Usage: `tribit-oracle <LISTING> [--max-steps N] [--max-cycles N] [--register-bits N] [--verify]`

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use tribit_oracle::config::{DEFAULT_MAX_CYCLES, DEFAULT_MAX_STEPS, DEFAULT_REGISTER_BITS};
use tribit_oracle::{format_outputs, init_logging, Listing, ModelDevice, Oracle, OracleConfig};

#[derive(Parser, Debug)]
#[command(name = "tribit-oracle")]
#[command(about = "Compute the expected output stream of a tribit program")]
struct Args {
    /// Path to the listing holding the initial registers and the program
    listing: PathBuf,

    /// Instructions the reference interpreter may execute before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: u64,

    /// Clock cycles a device may take to halt
    #[arg(long, default_value_t = DEFAULT_MAX_CYCLES)]
    max_cycles: u64,

    /// Width of the device registers
    #[arg(long, default_value_t = DEFAULT_REGISTER_BITS)]
    register_bits: u32,

    /// Also check the software device model against the reference
    #[arg(long)]
    verify: bool,
}

impl Args {
    fn config(&self) -> OracleConfig {
        OracleConfig {
            max_steps: self.max_steps,
            max_cycles: self.max_cycles,
            register_bits: self.register_bits,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();
    let listing = Listing::from_path(&args.listing)?;
    info!(
        a = listing.a,
        b = listing.b,
        c = listing.c,
        words = listing.program.len(),
        "parsed {}",
        args.listing.display()
    );

    let oracle = Oracle::new(args.config());
    let outcome = oracle.expected(&listing)?;
    println!("{}", format_outputs(&outcome.outputs));

    if args.verify {
        let mut device = ModelDevice::new(listing.program.len(), args.register_bits);
        let report = oracle.check(&listing, &mut device)?;
        info!(
            cycles = report.cycles,
            steps = report.steps,
            "model device verified"
        );
    }

    Ok(())
}
