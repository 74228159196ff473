// src/main.rs

use vcf_batch::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("vcf-batch error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<bool> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
