//! mops CLI - Main entry point

use clap::Parser;
use mops_cli::{
    commands, Cli, Commands, ConfigCommand, ConfigSource, JobCommand, ServiceConfig, StatusCommand,
};
use mops_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let Some(command) = cli.command.as_ref() else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("mops-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli, command).await {
        error!(error = %e, transient = e.is_transient(), "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn load_config(cli: &Cli) -> mops_cli::Result<ServiceConfig> {
    let source = ConfigSource::resolve(cli.config.as_deref(), cli.config_blob.as_deref())?;
    ServiceConfig::load(&source).await
}

async fn execute_command(cli: &Cli, command: &Commands) -> mops_cli::Result<()> {
    match command {
        Commands::Status { command } => {
            let config = load_config(cli).await?;
            match command {
                StatusCommand::Publish {
                    asset_id,
                    state,
                    complete,
                    digest,
                    digest_file,
                    refresh,
                } => {
                    commands::status::publish(
                        &config,
                        asset_id,
                        state,
                        *complete,
                        digest.clone(),
                        digest_file.as_deref(),
                        *refresh,
                    )
                    .await
                },
                StatusCommand::Last { asset_id } => commands::status::last(&config, asset_id).await,
                StatusCommand::List => commands::status::list(&config).await,
            }
        },

        Commands::Job { command } => {
            let config = load_config(cli).await?;
            match command {
                JobCommand::Submit {
                    customer,
                    cloud,
                    region,
                    id,
                    extra,
                } => {
                    commands::job::submit(&config, customer, cloud, region, id, extra.as_deref())
                        .await
                },
                JobCommand::Status { id } => commands::job::status(&config, id).await,
                JobCommand::Cancel { id } => commands::job::cancel(&config, id).await,
                JobCommand::Retry { id } => commands::job::retry(&config, id).await,
                JobCommand::Logs { id } => commands::job::logs(&config, id).await,
            }
        },

        Commands::Config { command } => match command {
            ConfigCommand::Encode { path } => commands::config::encode(path).await,
            ConfigCommand::Decode { blob } => {
                commands::config::decode(blob.as_deref().or(cli.config_blob.as_deref())).await
            },
            ConfigCommand::Validate => {
                let config = load_config(cli).await?;
                commands::config::validate(&config)
            },
            ConfigCommand::Upload {
                path,
                location,
                force,
            } => commands::config::upload(path, location, *force).await,
        },
    }
}
