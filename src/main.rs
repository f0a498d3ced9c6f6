use anyhow::Context;
use clap::Parser;
use console::{style, Term};
use dotenv::dotenv;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use foundry_analyst::config::{validate_agent_name, Settings};
use foundry_analyst::data::{self, DataFileError, SalesData, DEFAULT_DATA_FILE};
use foundry_analyst::pipeline::{self, AnalysisRequest};
use foundry_analyst::platform::{
    DefaultCredential, FoundryPlatform, ProjectClient, ProjectClientConfig,
};
use foundry_analyst::prompt_template;
use foundry_analyst::report::Reporter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file with Month,Sales,Expenses,Profit columns
    #[arg(short, long, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Name to register the agent under (overrides AZURE_AI_AGENT_NAME)
    #[arg(short, long, value_parser = parse_agent_name)]
    agent_name: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_agent_name(name: &str) -> Result<String, String> {
    validate_agent_name(name)
        .map(|()| name.to_string())
        .map_err(|e| e.to_string())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "foundry_analyst=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenv().ok();
    init_tracing(cli.verbose);

    let _ = cliclack::intro(style(" foundry-analyst ").on_cyan().black());

    let mut settings = match Settings::new() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!("{}", err);
            let _ = cliclack::log::error(err.to_string());
            let _ = cliclack::outro(
                "Set AZURE_AI_PROJECT_ENDPOINT and AZURE_AI_MODEL_DEPLOYMENT_NAME (a .env file works too).",
            );
            return ExitCode::from(1);
        }
    };
    if let Some(agent_name) = cli.agent_name {
        settings.agent_name = agent_name;
    }
    let _ = cliclack::log::info(format!(
        "Project: {}\nModel deployment: {}",
        settings.project_endpoint, settings.model_deployment_name
    ));

    let sales = match data::load_csv(&cli.data_file) {
        Ok(sales) => sales,
        Err(err @ DataFileError::NotFound(_)) => {
            tracing::error!("{}", err);
            let _ = cliclack::log::error(format!("{}", err));
            let _ = cliclack::outro(format!(
                "Create {} or pass --data-file <PATH>.",
                cli.data_file.display()
            ));
            return ExitCode::from(1);
        }
        Err(err) => {
            tracing::error!("{}", err);
            let _ = cliclack::log::error(format!("{}", err));
            let _ = cliclack::outro("The data file must be readable UTF-8 text.");
            return ExitCode::from(1);
        }
    };
    let _ = cliclack::log::success(format!(
        "Loaded {} ({} rows)",
        sales.path.display(),
        sales.row_count
    ));

    let (request, platform) = match prepare(&settings, &sales) {
        Ok(prepared) => prepared,
        Err(err) => {
            tracing::error!("{:?}", err);
            let _ = cliclack::log::error(format!("{:#}", err));
            let _ = cliclack::outro("Done.");
            return ExitCode::SUCCESS;
        }
    };

    let stdout = Term::stdout();
    let reporter = Reporter::new().with_markdown(stdout.is_term());
    let mut out = io::stdout().lock();
    let outcome = pipeline::run(&platform, &request, &reporter, &mut out).await;
    drop(out);

    let _ = if outcome.succeeded() {
        cliclack::outro(style("Analysis complete").green())
    } else {
        cliclack::outro(style("Analysis failed; remote resources were cleaned up").red())
    };
    ExitCode::SUCCESS
}

/// Render the prompt and build the platform client for one run.
fn prepare(
    settings: &Settings,
    sales: &SalesData,
) -> anyhow::Result<(AnalysisRequest, FoundryPlatform)> {
    let prompt =
        prompt_template::analysis_prompt(sales).context("Failed to render analysis prompt")?;

    let project = ProjectClient::new(
        ProjectClientConfig {
            endpoint: settings.project_endpoint.clone(),
            api_version: settings.api_version.clone(),
        },
        DefaultCredential::from_env(),
    )
    .context("Failed to create project client")?;

    let request = AnalysisRequest {
        agent_name: settings.agent_name.clone(),
        model: settings.model_deployment_name.clone(),
        instructions: prompt_template::agent_instructions(),
        prompt,
    };
    Ok((request, FoundryPlatform::new(project)))
}
