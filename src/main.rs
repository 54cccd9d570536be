use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};

use ami_cleanup::app;
use ami_cleanup::aws::AwsCli;
use ami_cleanup::collector;
use ami_cleanup::config::Config;
use ami_cleanup::dispatcher::Dispatcher;
use ami_cleanup::error::AppError;
use ami_cleanup::lineage;
use ami_cleanup::logging;
use ami_cleanup::provider::ImageProvider;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let _guard = logging::init(&config.log_file)?;
    tracing::info!(
        regions = config.regions.len(),
        filter = %config.name_filter,
        canonical = %config.canonical_region,
        "starting"
    );

    let provider: Arc<dyn ImageProvider> = Arc::new(AwsCli::locate(&config.aws_cli)?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()?;

    println!("Fetching AMIs across regions...");
    let inventory = runtime.block_on(collector::collect(provider.as_ref(), &config));
    for failure in &inventory.failures {
        println!("Warning: Failed to fetch AMIs in {}: {}", failure.region, failure.error);
    }
    if inventory.all_regions_failed() {
        return Err(AppError::CollectionFailed(inventory.regions_queried));
    }
    if inventory.records.is_empty() {
        println!("No AMIs found matching '{}'", config.name_filter);
        return Ok(());
    }

    let forest = lineage::resolve(inventory.records, &config.canonical_region);
    tracing::info!(
        trees = forest.trees().len(),
        orphans = forest.orphans().count(),
        "lineage resolved"
    );

    let should_quit = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM, SIGHUP] {
        signal_hook::flag::register(signal, Arc::clone(&should_quit))?;
    }
    install_panic_hook();

    let dispatcher = Dispatcher::new(provider, runtime.handle().clone());
    app::run(forest, dispatcher, should_quit)?;

    runtime.shutdown_timeout(Duration::from_secs(1));
    tracing::info!("exit");
    Ok(())
}

/// Leave the alternate screen before the default hook prints the panic.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        app::restore_terminal();
        default_hook(info);
    }));
}
