// src/main.rs

use audition_runner::config::EnvSnapshot;
use audition_runner::config::env::{ENV_DEBUG, ENV_LOG};
use audition_runner::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("audition-runner error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    let env = EnvSnapshot::from_process();
    logging::init_logging(
        args.log_level,
        env.get(ENV_LOG),
        args.debug || env.flag(ENV_DEBUG),
    )?;
    run(args, env).await
}
