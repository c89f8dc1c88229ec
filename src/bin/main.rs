use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ls8::loader;
use ls8::vm::{Config, Exit, Vm};

#[derive(Parser, Debug)]
#[command(name = "ls8")]
#[command(about = "Run an LS-8 object file")]
struct Cli {
  /// Path to a `.ls8` object file
  program: Option<PathBuf>,

  /// Give up after this many instructions instead of running until halted
  #[arg(long)]
  max_cycles: Option<u64>,

  /// Log the machine state before every instruction
  #[arg(long)]
  trace: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  // operator facing errors go straight to stderr, tracing is for diagnostics

  let default_filter = if cli.trace { "ls8=trace" } else { "ls8=warn" };
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let chunk = match loader::load_args(cli.program) {
    Ok(chunk) => chunk,
    Err(e) => {
      eprintln!("error: {e}");
      return ExitCode::from(1);
    }
  };

  let mut vm = Vm::with_config(Config {
    max_cycles: cli.max_cycles,
  });
  if let Err(e) = vm.load(&chunk) {
    eprintln!("error: {e}");
    return ExitCode::from(1);
  }

  match vm.run() {
    Ok(Exit::Halted) => ExitCode::SUCCESS,
    Ok(Exit::CycleLimit(cycles)) => {
      eprintln!("error: no halt after {cycles} cycles");
      ExitCode::from(3)
    }
    Err(e) => {
      debug!(pc = vm.pc(), cycles = vm.cycles(), "runtime fault");
      eprintln!("error: {e}");
      ExitCode::from(2)
    }
  }
}
