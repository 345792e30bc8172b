//! Inject command runner.

use anyhow::Context;
use injector_core::{InjectedIds, InjectionConfig};
use injector_mysql::{Capabilities, Executor, InjectArgs, MySqlExecutor, Orchestrator, Session};

use crate::logging::mask_connection_password;

/// Load the configuration, connect to MySQL and run the requested mode.
pub async fn run_inject(args: InjectArgs) -> anyhow::Result<()> {
    let config = if args.purge_only {
        InjectionConfig::default()
    } else {
        InjectionConfig::from_file(&args.config)
            .with_context(|| format!("Failed to load configuration from {:?}", args.config))?
    };

    if args.dry_run {
        log_plan(&args, &config)?;
        return Ok(());
    }

    tracing::info!(
        "Connecting to {}",
        mask_connection_password(&args.mysql_connection_string)
    );
    let mut executor = MySqlExecutor::connect(&args.mysql_connection_string)
        .await
        .context("Failed to connect to MySQL")?;

    let result = execute(&mut executor, &args, &config).await;

    if let Err(e) = executor.disconnect().await {
        tracing::warn!("Failed to disconnect from MySQL: {}", e);
    }
    result.map(|_| ())
}

/// Purge and/or inject through an already connected executor.
///
/// Returns the identifiers produced by the run, or `None` when only a purge
/// was requested.
pub async fn execute(
    executor: &mut dyn Executor,
    args: &InjectArgs,
    config: &InjectionConfig,
) -> anyhow::Result<Option<InjectedIds>> {
    let orchestrator = Orchestrator::with_defaults()?;

    let capabilities = Capabilities::detect(executor)
        .await
        .context("Failed to detect installed modules")?;
    tracing::info!("Installed modules: {}", capabilities);

    let mut session = Session::new(executor, args.batch_size, args.seed);

    if args.purge || args.purge_only {
        tracing::info!("Purging previously injected data");
        orchestrator
            .purge(&mut session, &capabilities)
            .await
            .context("Purge failed")?;
        if args.purge_only {
            tracing::info!("Purge completed");
            return Ok(None);
        }
    }

    tracing::info!(
        "Injecting configuration from {:?} (batch size {}, seed {})",
        args.config,
        args.batch_size,
        args.seed.map_or_else(|| "random".to_string(), |seed| seed.to_string())
    );
    let injected = orchestrator
        .inject(&mut session, config, &capabilities)
        .await
        .context("Injection failed")?;

    let total: usize = injected.iter().map(|(_, ids)| ids.len()).sum();
    tracing::info!(
        "Injection completed: {} rows across {} kinds",
        total,
        injected.iter().count()
    );

    Ok(Some(injected))
}

fn log_plan(args: &InjectArgs, config: &InjectionConfig) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::with_defaults()?;

    tracing::info!(
        "[DRY-RUN] Connection: {}",
        mask_connection_password(&args.mysql_connection_string)
    );
    if args.purge || args.purge_only {
        tracing::info!("[DRY-RUN] Would purge every injected table in reverse order");
    }
    if args.purge_only {
        return Ok(());
    }

    for step in orchestrator.plan(&Capabilities::all()) {
        let count = config.count(step.kind);
        match step.capability {
            Some(capability) => tracing::info!(
                "[DRY-RUN] {:>3} {}: {} rows (requires {})",
                step.priority,
                step.kind,
                count,
                capability
            ),
            None => tracing::info!(
                "[DRY-RUN] {:>3} {}: {} rows",
                step.priority,
                step.kind,
                count
            ),
        }
    }
    tracing::info!("[DRY-RUN] Configuration validated successfully");
    Ok(())
}
