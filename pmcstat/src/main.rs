mod list;
mod run;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pmcstat", about = "Measure hardware performance counters around a workload")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every counter definition and whether this CPU supports it
    List,
    /// Run the built-in workload under the configured counters
    Run {
        /// Number of measurement threads
        #[arg(short, long, default_value_t = 1)]
        threads: usize,
        /// Repetitions of the workload per thread
        #[arg(short, long, default_value_t = 8)]
        repetitions: usize,
        /// Counter ids to set up (see `pmcstat list`)
        #[arg(short, long, value_delimiter = ',')]
        counters: Vec<u16>,
        /// Clock-only run without touching any performance counter
        #[arg(long)]
        no_pmc: bool,
        /// Extra ratio column as NUM:DEN[:FACTOR]; column 0 is the clock,
        /// column 1 the first counter
        #[arg(long)]
        ratio: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    match args.command {
        Commands::List => list::run(),
        Commands::Run {
            threads,
            repetitions,
            counters,
            no_pmc,
            ratio,
        } => run::run(threads, repetitions, counters, no_pmc, ratio),
    }
}
