use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::{error, info};

use hkpool::{Builder, ByteReader, Result, SharedQueueThreadPool};

const DEFAULT_TASKS: u32 = 10;

#[derive(Parser)]
#[command(name = "hkpool-demo", version, about = "Runs a batch of tasks on a worker pool")]
struct Cli {
    /// Number of worker threads [default: number of CPUs]
    #[arg(long, value_name = "N")]
    threads: Option<u32>,

    /// Number of tasks to submit
    #[arg(long, default_value_t = DEFAULT_TASKS, value_name = "N")]
    tasks: u32,

    /// File whose leading signature is checked on the pool
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut builder = Builder::new();
    if let Some(threads) = cli.threads {
        builder = builder.threads(threads);
    }
    let pool = builder.build()?;

    info!("hkpool-demo {}", env!("CARGO_PKG_VERSION"));
    info!("Running {} tasks on {} threads", cli.tasks, pool.threads());

    let handles = (0..cli.tasks)
        .map(|i| {
            pool.submit(move || {
                info!("task {i} running");
                i
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for handle in handles {
        match handle.join() {
            Ok(value) => println!("{value}"),
            Err(e) => error!("{e}"),
        }
    }

    if let Some(path) = cli.file {
        check_signature(&pool, path)?;
    }

    Ok(())
}

fn check_signature(pool: &SharedQueueThreadPool, path: PathBuf) -> Result<()> {
    let handle = pool.submit_fallible(move || -> Result<bool> {
        ByteReader::open(&path)?.is_signature_next()
    })?;

    if handle.join()? {
        println!("signature: ok");
    } else {
        println!("signature: mismatch");
    }
    Ok(())
}
