#[macro_use]
extern crate tracing;

use std::path::PathBuf;

use structopt::StructOpt;
use tokio::runtime::Builder;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[derive(Debug, StructOpt)]
struct Opts {
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u32,
    #[structopt(short, long = "config")]
    config_path: Option<PathBuf>,
    #[structopt(long)]
    dump_config: bool,
}

async fn run(opts: Opts) -> color_eyre::eyre::Result<()> {
    // Load configuration
    let config = {
        if let Some(config_path) = opts.config_path.as_deref() {
            glowstat::models::Config::load_file(config_path).await?
        } else {
            let config = glowstat::models::Config::default();
            config.validate()?;
            config
        }
    };

    // Dump configuration if this was asked
    if opts.dump_config {
        print!("{}", config.to_string()?);
        return Ok(());
    }

    let instance = glowstat::instance::Instance::new(config).await?;
    let token = CancellationToken::new();

    let handle = tokio::spawn(instance.run(token.clone()));

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("exiting");
            token.cancel();
        }
        // The instance stops on its own on device errors
        _ = token.cancelled() => {}
    }

    let result = handle.await?;

    if let Err(error) = &result {
        error!(error = %error, "instance error");
    }

    Ok(result?)
}

fn install_tracing(opts: &Opts) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fmt_layer = fmt::layer();

    let filter_layer = EnvFilter::try_from_env("GLOWSTAT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match opts.verbose {
            0 => "glowstat=warn,glowstatd=warn",
            1 => "glowstat=info,glowstatd=info",
            2 => "glowstat=debug,glowstatd=debug",
            _ => "glowstat=trace,glowstatd=trace",
        })
    });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
}

#[paw::main]
fn main(opts: Opts) -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    install_tracing(&opts)?;

    // Create tokio runtime
    let thd_count = match num_cpus::get() {
        1 => 2,
        other => other.min(4),
    };

    let rt = Builder::new_multi_thread()
        .worker_threads(thd_count)
        .enable_all()
        .build()?;
    rt.block_on(run(opts))
}
