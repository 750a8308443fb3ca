use anyhow::Result;
use clap::{Parser, Subcommand};
use powledger_core::{
    chain::Chain,
    constants::{DEFAULT_DIFFICULTY, DEMO_DIFFICULTIES, DEMO_TRANSACTIONS},
    digest_hex, Miner, MiningReport,
};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "powledger")]
#[command(about = "Proof-of-work mining simulator for the in-memory ledger")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Args, Debug, Clone)]
struct MinerArgs {
    /// Search nonces on all cores
    #[arg(long)]
    parallel: bool,
    /// Give up on a block after this many attempts
    #[arg(long)]
    max_attempts: Option<u64>,
}

impl MinerArgs {
    fn miner(&self, difficulty: u32) -> Miner {
        let miner = Miner::new(difficulty).parallel(self.parallel);
        match self.max_attempts {
            Some(max) => miner.with_max_attempts(max),
            None => miner,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine the two-block demo chain once per difficulty and time it
    Simulate {
        /// Difficulty to simulate; repeat for several runs
        #[arg(long = "difficulty", short)]
        difficulties: Vec<u32>,
        #[command(flatten)]
        miner: MinerArgs,
        /// Print a JSON summary instead of narration
        #[arg(long)]
        json: bool,
    },
    /// Mine a chain from the given payloads and print it as JSON
    Mine {
        /// Transaction payload; one block per occurrence
        #[arg(long = "tx", required = true)]
        transactions: Vec<String>,
        #[arg(long, short, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: u32,
        #[command(flatten)]
        miner: MinerArgs,
    },
    /// Print the SHA-256 digest of TEXT
    Hash { text: String },
    /// Mine the demo chain and check every block and link
    VerifyDemo {
        #[arg(long, short, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: u32,
    },
}

#[derive(Serialize)]
struct SimulationSummary {
    difficulty: u32,
    elapsed: Duration,
    blocks: Vec<MiningReport>,
}

fn simulate(difficulty: u32, args: &MinerArgs, narrate: bool) -> Result<SimulationSummary> {
    let miner = args.miner(difficulty);
    let mut chain = Chain::new();
    let mut blocks = Vec::with_capacity(DEMO_TRANSACTIONS.len());

    if narrate {
        println!("=== Simulating Difficulty {difficulty} ===");
    }
    let started = Instant::now();
    for tx in DEMO_TRANSACTIONS {
        if narrate {
            println!("Mining block {}...", chain.next_index());
        }
        let report = chain.append_block_with(tx, &miner)?;
        if narrate {
            println!("Block {} mined! Hash: {}\n", report.index, report.hash);
        }
        blocks.push(report);
    }
    let elapsed = started.elapsed();
    if narrate {
        println!(
            "Time taken with difficulty {difficulty}: {:.2} seconds\n",
            elapsed.as_secs_f64()
        );
    }
    info!(difficulty, ?elapsed, "simulation finished");

    Ok(SimulationSummary {
        difficulty,
        elapsed,
        blocks,
    })
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Simulate {
            difficulties,
            miner,
            json,
        } => {
            let difficulties = if difficulties.is_empty() {
                DEMO_DIFFICULTIES.to_vec()
            } else {
                difficulties
            };
            let mut summaries = Vec::with_capacity(difficulties.len());
            for difficulty in difficulties {
                summaries.push(simulate(difficulty, &miner, !json)?);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            }
        }
        Command::Mine {
            transactions,
            difficulty,
            miner,
        } => {
            let miner = miner.miner(difficulty);
            let mut chain = Chain::new();
            for tx in transactions {
                chain.append_block_with(tx, &miner)?;
            }
            println!("{}", chain.to_json_pretty()?);
        }
        Command::Hash { text } => {
            println!("{}", digest_hex(text.as_bytes()));
        }
        Command::VerifyDemo { difficulty } => {
            let mut chain = Chain::new();
            for tx in DEMO_TRANSACTIONS {
                chain.append_block(tx, difficulty)?;
            }
            chain.verify(difficulty)?;
            println!(
                "chain of {} blocks verified at difficulty {difficulty}",
                chain.len()
            );
        }
    }
    Ok(())
}
