//! Handlers for the API-facing commands.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use labval_api::{AppState, Server};
use labval_client::LabvalClient;
use labval_core::scraper::ScraperRequest;
use labval_core::{Algorithm, AlgorithmDefinition, PatientRecord, Workflow, WorkflowDefinition};
use labval_store::{Store, create_storage_backend};
use labval_workflows::{
    ExecutionLog, ExecutionRequest, ExecutionStatus, ExecutionTarget, LogLevel,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cli::{
    AlgorithmAction, CatalogArgs, RunArgs, ScraperArgs, ServeArgs, TemplateAction, WorkflowAction,
};
use crate::config::LabvalConfig;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

// ============================================================================
// Server
// ============================================================================

/// Opens the configured store and serves the API until Ctrl-C.
pub async fn serve(config: &LabvalConfig, args: ServeArgs) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let backend = create_storage_backend(&config.storage).await?;
    let state = AppState::new(Store::new(backend), config.execution.clone());
    Server::new(server_config, state).serve().await?;
    Ok(())
}

/// Prints the server health.
pub async fn health(client: &LabvalClient) -> Result<()> {
    let health = client.check_health().await?;
    println!(
        "{} (store: {}, version: {}, up {}s, at {})",
        health.status, health.store, health.version, health.uptime_seconds, health.timestamp
    );
    Ok(())
}

// ============================================================================
// Algorithms, workflows and templates
// ============================================================================

/// Runs an `algorithms` subcommand.
pub async fn algorithms(client: &LabvalClient, action: AlgorithmAction) -> Result<()> {
    match action {
        AlgorithmAction::List => {
            print!("{}", render_algorithms(&client.get_algorithms().await?));
        }
        AlgorithmAction::Show { id } => {
            print_json(&client.get_algorithm(&id).await?)?;
        }
        AlgorithmAction::Delete { id } => {
            client.delete_algorithm(&id).await?;
            println!("Deleted algorithm {id}");
        }
        AlgorithmAction::Duplicate { id, name } => {
            let copy = client.duplicate_algorithm(&id, name.as_deref()).await?;
            println!("Created {} {}", copy.id, copy.name());
        }
        AlgorithmAction::Import { file, id } => {
            let definition: AlgorithmDefinition = read_json(&file)?;
            let saved = client.save_algorithm(id.as_ref(), &definition).await?;
            let verb = if id.is_some() { "Updated" } else { "Created" };
            println!("{verb} {} {}", saved.id, saved.name());
        }
    }
    Ok(())
}

/// Runs a `workflows` subcommand.
pub async fn workflows(client: &LabvalClient, action: WorkflowAction) -> Result<()> {
    match action {
        WorkflowAction::List => {
            print!("{}", render_workflows(&client.get_workflows().await?));
        }
        WorkflowAction::Show { id } => {
            print_json(&client.get_workflow(&id).await?)?;
        }
        WorkflowAction::Create { name, algorithms } => {
            let definition = WorkflowDefinition::new(name, algorithms);
            let workflow = client.save_workflow(None, &definition).await?;
            println!("Created {} {}", workflow.id, workflow.name());
        }
        WorkflowAction::Delete { id } => {
            client.delete_workflow(&id).await?;
            println!("Deleted workflow {id}");
        }
    }
    Ok(())
}

/// Runs a `templates` subcommand.
pub async fn templates(client: &LabvalClient, action: TemplateAction) -> Result<()> {
    match action {
        TemplateAction::List => {
            for template in client.templates().await? {
                println!(
                    "{:<14} {:<24} {} parameters",
                    template.key, template.name, template.parameter_count
                );
            }
        }
        TemplateAction::Show { key } => {
            let template = client.template(&key).await?;
            println!("{}", template.name);
            for parameter in &template.parameters {
                println!("  {}", parameter.display_label());
                for sub in &parameter.sub_parameters {
                    let rule = sub
                        .config
                        .as_ref()
                        .map(|c| c.summary())
                        .unwrap_or_else(|| "no rule".to_string());
                    println!("    {:<16} {rule}", sub.param);
                }
            }
        }
        TemplateAction::Instantiate {
            key,
            name,
            description,
        } => {
            let algorithm = client
                .instantiate_template(&key, name.as_deref(), description.as_deref())
                .await?;
            println!("Created {} {}", algorithm.id, algorithm.name());
        }
    }
    Ok(())
}

/// Prints parameter definitions.
pub async fn catalog(client: &LabvalClient, args: CatalogArgs) -> Result<()> {
    let definitions = client.parameter_definitions(args.filter()).await?;
    print!("{}", render_catalog(&definitions));
    Ok(())
}

// ============================================================================
// Executions
// ============================================================================

/// Starts an execution, waits for it and prints its log.
///
/// Returns the final status; the caller decides the exit code from its
/// outcome.
pub async fn run(client: &LabvalClient, args: RunArgs) -> Result<ExecutionStatus> {
    let target = match (args.algorithm, args.workflow) {
        (Some(id), _) => ExecutionTarget::Algorithm(id),
        (None, Some(id)) => ExecutionTarget::Workflow(id),
        (None, None) => return Err(Error::usage("either --algorithm or --workflow is required")),
    };
    let patient: PatientRecord = read_json(&args.record)?;

    let mut request = ExecutionRequest::new(target, patient).with_analysis_type(args.analysis_type);
    if args.simulate {
        request = request.simulated(args.seed);
    }
    if let Some(today) = args.today {
        request = request.on(today);
    }

    let accepted = client.start_execution(&request).await?;
    tracing::info!(execution_id = %accepted.execution_id, %target, "Execution started");

    let status = client
        .wait_for_execution(
            &accepted.execution_id,
            POLL_INTERVAL,
            Duration::from_secs(args.timeout),
        )
        .await?;
    print!("{}", render_logs(&status.logs));
    println!("{}", status.status);
    Ok(status)
}

// ============================================================================
// Scraper
// ============================================================================

/// Prints a generated scraper script.
pub async fn scraper(client: &LabvalClient, args: ScraperArgs) -> Result<()> {
    let request = ScraperRequest {
        target_url: args.url,
        mappings: args.mappings,
    };
    println!("{}", client.scraper_preview(&request).await?);
    Ok(())
}

// ============================================================================
// Rendering
// ============================================================================

/// One line per algorithm: id, name, parameter count and action.
pub fn render_algorithms(algorithms: &[Algorithm]) -> String {
    if algorithms.is_empty() {
        return "No algorithms\n".to_string();
    }
    let mut out = String::new();
    for algorithm in algorithms {
        let _ = writeln!(
            out,
            "{}  {:<32} {:>3} parameters  {}",
            algorithm.id,
            algorithm.name(),
            algorithm.definition.parameters.len(),
            algorithm.definition.action.label()
        );
    }
    out
}

/// One line per workflow: id, name and algorithm count.
pub fn render_workflows(workflows: &[Workflow]) -> String {
    if workflows.is_empty() {
        return "No workflows\n".to_string();
    }
    let mut out = String::new();
    for workflow in workflows {
        let _ = writeln!(
            out,
            "{}  {:<32} {:>3} algorithms",
            workflow.id,
            workflow.name(),
            workflow.definition.algorithm_order.len()
        );
    }
    out
}

/// Parameter definitions grouped by category.
pub fn render_catalog(definitions: &[Value]) -> String {
    let field = |d: &Value, key: &str| d.get(key).and_then(Value::as_str).unwrap_or("").to_string();
    let mut out = String::new();
    let mut category = String::new();
    for definition in definitions {
        let current = field(definition, "category");
        if current != category {
            let _ = writeln!(out, "{current}");
            category = current;
        }
        let _ = writeln!(
            out,
            "  {:<24} {:<28} {}",
            field(definition, "name"),
            field(definition, "label"),
            field(definition, "type")
        );
    }
    out
}

/// Execution log lines with a level marker.
pub fn render_logs(logs: &[ExecutionLog]) -> String {
    let mut out = String::new();
    for log in logs {
        let marker = match log.level {
            LogLevel::Info => " ",
            LogLevel::Success => "+",
            LogLevel::Warning => "!",
            LogLevel::Error => "x",
        };
        let _ = writeln!(
            out,
            "{} {marker} {}",
            log.timestamp.format("%H:%M:%S"),
            log.message
        );
    }
    out
}

// ============================================================================
// Helpers
// ============================================================================

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(labval_core::Error::from)?;
    println!("{text}");
    Ok(())
}

/// Builds the client for `--url` or the configured base URL.
pub fn client(config: &LabvalConfig, url: Option<&str>) -> Result<LabvalClient> {
    let mut client_config = config.client.clone();
    if let Some(url) = url {
        client_config.base_url = url.to_string();
    }
    tracing::debug!(base_url = %client_config.base_url, "Using API server");
    Ok(LabvalClient::new(&client_config)?)
}
