use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use module_creator_cli::action_logger::ActionLogger;
use module_creator_cli::commands::create_cmd::{create_module, handle_create_command, CreateArgs};
use module_creator_cli::outputs::{module_outputs, write_outputs, GITHUB_OUTPUT_ENV};
use module_creator_core::{Logger, TracingLogger};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Create a Terraform module repository from the module templates
#[derive(Parser)]
#[command(name = "create-module")]
#[command(version, about = "Create a Terraform module repository from a template", long_about = None)]
struct Cli {
    #[command(flatten)]
    args: CreateArgs,
}

#[tokio::main]
async fn main() {
    // Initialize logging. stdout is reserved for workflow commands and outputs.
    tracing_subscriber::registry()
        .with(fmt::layer().pretty().with_writer(io::stderr))
        .with(EnvFilter::from_env("MODULE_CREATOR_LOG"))
        .init();

    let cli = Cli::parse();

    let in_workflow = env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true");
    let logger: Arc<dyn Logger> = if in_workflow {
        Arc::new(ActionLogger::stdout())
    } else {
        Arc::new(TracingLogger)
    };

    let result = handle_create_command(&cli.args, |inputs| {
        create_module(inputs, logger.clone())
    })
    .await;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            error!("Error: {e}");
            logger.error(&e.to_string(), &[]);
            std::process::exit(1);
        }
    };

    let output_file = env::var_os(GITHUB_OUTPUT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    if let Err(e) = write_outputs(
        &module_outputs(&result),
        output_file.as_deref(),
        &mut io::stdout(),
    ) {
        error!("Error: {e}");
        logger.error(&e.to_string(), &[]);
        std::process::exit(1);
    }
}
