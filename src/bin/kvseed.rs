use kvseed::{
    cli::{self, KvseedCommand},
    config,
};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    // Install global collector configured based on KVSEED_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(config::env::LOG_DIRECTIVE)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_thread_ids(true)
        .init();
}

fn main() {
    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .on_thread_start(|| tracing::trace!("thread start"))
        .on_thread_stop(|| tracing::trace!("thread stop"))
        .enable_io()
        .enable_time()
        .build();

    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("build runtime: {}", err);
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        run().await;
    })
}

async fn run() {
    if let Err(err) = run_inner().await {
        tracing::error!("{}", err);
        let code = if err.is_unreachable() { 2 } else { 1 };
        std::process::exit(code);
    };
}

async fn run_inner() -> kvseed::Result<()> {
    let KvseedCommand { global, command } = cli::parse();

    match command {
        cli::Command::Seed(seed) => seed.run(global).await.map(|_| ()),
        cli::Command::Probe(probe) => probe.run(global).await,
    }
}
