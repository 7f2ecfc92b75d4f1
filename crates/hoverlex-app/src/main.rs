use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use hoverlex_core::AppState;

mod cli;
mod controller;
mod io;
mod logging;
mod platform;
mod profile;
mod ui;

#[cfg(test)]
mod tests;

use self::cli::Cli;
use self::controller::AppController;
use self::io::ProfileWatch;
use self::platform::Platform;
use self::profile::ProfileStore;

const PROFILE_POLL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing(cli.log_json);

    let store = match &cli.profiles_dir {
        Some(dir) => ProfileStore::new(dir),
        None => ProfileStore::new(ProfileStore::default_dir()?),
    };
    store.init()?;

    if let Some(name) = &cli.new_profile {
        let path = store.add_from_main(name)?;
        println!("{}", path.display());
        return Ok(());
    }

    let mut config = store.load(&cli.profile)?;
    config.apply_env();
    let overrides = cli.overrides();
    overrides.apply(&mut config);

    tracing::info!(
        "Hold {} to look up words, {} -> {} via {} ({})",
        config.hotkey.binding.title(),
        config.lookup.source_language,
        config.lookup.target_language,
        config.translator.engine,
        if config.lookup.continuous { "continuous" } else { "static" }
    );

    if let Some(hint) = config.translator.credentials_hint() {
        tracing::warn!("{hint}");
    }

    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state.clone());
    let platform = Platform::detect(controller.events());
    let watch = ProfileWatch {
        path: store.resolve(&cli.profile),
        overrides,
        period: PROFILE_POLL,
    };
    let mut tasks = controller.spawn_tasks(platform, Some(watch)).await?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => tracing::info!("Shutdown requested"),
            Err(e) => tracing::error!("Failed to listen for ctrl+c: {e}"),
        },
        Some(result) = tasks.join_next() => match result {
            Ok(Ok(())) => tracing::warn!("A task exited early"),
            Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
            Err(e) => tracing::error!("Task panicked: {e}"),
        },
    }

    controller.shutdown();
    let drained = tokio::time::timeout(Duration::from_secs(2), async {
        while tasks.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        tracing::warn!("Some tasks did not stop in time");
    }

    tracing::info!("Lookups: {}", state.stats.counts());
    Ok(())
}
