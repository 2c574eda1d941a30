use clap::Parser;
use sentiwatch_cli::cli::{Cli, Commands};
use sentiwatch_cli::config::AppConfig;
use sentiwatch_cli::session::{run_analyze, run_watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            model,
            debounce_ms,
            discard_stale,
            verbose,
        } => {
            init_logging(verbose);

            let mut config = AppConfig::load(&model)?;
            config.apply_watcher_args(debounce_ms, discard_stale);

            tracing::info!(
                model = %config.model.model_ref(),
                source = ?config.model.source,
                debounce_ms = config.watcher.debounce_ms,
                "Starting editor"
            );

            run_watch(config).await?;
        }

        Commands::Analyze {
            text,
            model,
            verbose,
        } => {
            init_logging(verbose);

            let config = AppConfig::load(&model)?;
            run_analyze(config, &text).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "sentiwatch_cli=debug,sentiwatch_editor=debug,sentiwatch_classifiers=debug"
    } else {
        "sentiwatch_cli=info,sentiwatch_editor=info,sentiwatch_classifiers=info"
    };

    // Logs go to stderr so rendered results own stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
