//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use labval_core::DocumentId;
use labval_core::scraper::Mapping;
use labval_workflows::AnalysisType;
use std::path::PathBuf;

/// labval - laboratory result validation
#[derive(Parser, Debug)]
#[command(name = "labval")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "LABVAL_CONFIG")]
    pub config: Option<String>,

    /// API server URL (overrides `client.base_url`)
    #[arg(long, env = "LABVAL_URL")]
    pub url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the API server
    Serve(ServeArgs),

    /// Check that the API server is up
    Health,

    /// Manage algorithms
    #[command(subcommand)]
    Algorithms(AlgorithmAction),

    /// Manage workflows
    #[command(subcommand)]
    Workflows(WorkflowAction),

    /// Browse and instantiate algorithm templates
    #[command(subcommand)]
    Templates(TemplateAction),

    /// List parameter definitions
    Catalog(CatalogArgs),

    /// Run an algorithm or workflow for a patient record
    Run(RunArgs),

    /// Generate a scraper script
    Scraper(ScraperArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigAction),
}

/// Options of `labval serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// `labval algorithms` subcommands.
#[derive(Subcommand, Debug)]
pub enum AlgorithmAction {
    /// List algorithms
    #[command(alias = "ls")]
    List,

    /// Print an algorithm as JSON
    Show {
        /// Algorithm id
        id: DocumentId,
    },

    /// Delete an algorithm
    Delete {
        /// Algorithm id
        id: DocumentId,
    },

    /// Copy an algorithm
    Duplicate {
        /// Algorithm id
        id: DocumentId,

        /// Name of the copy (default: "<name> (Copy)")
        #[arg(long)]
        name: Option<String>,
    },

    /// Create an algorithm from a JSON definition file
    Import {
        /// Definition file
        file: PathBuf,

        /// Replace this algorithm instead of creating one
        #[arg(long)]
        id: Option<DocumentId>,
    },
}

/// `labval workflows` subcommands.
#[derive(Subcommand, Debug)]
pub enum WorkflowAction {
    /// List workflows
    #[command(alias = "ls")]
    List,

    /// Print a workflow as JSON
    Show {
        /// Workflow id
        id: DocumentId,
    },

    /// Create a workflow
    Create {
        /// Workflow name
        #[arg(long)]
        name: String,

        /// Algorithm ids, in execution order
        #[arg(short, long = "algorithm", required = true)]
        algorithms: Vec<DocumentId>,
    },

    /// Delete a workflow
    Delete {
        /// Workflow id
        id: DocumentId,
    },
}

/// `labval templates` subcommands.
#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// List templates
    #[command(alias = "ls")]
    List,

    /// Print the parameters of a template
    Show {
        /// Template key (blood, urine, biochemistry, hematology)
        key: String,
    },

    /// Create an algorithm from a template
    Instantiate {
        /// Template key
        key: String,

        /// Algorithm name (default: the template name)
        #[arg(long)]
        name: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },
}

/// Options of `labval catalog`.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only patient-level parameters
    #[arg(long, conflicts_with = "specific")]
    pub global: bool,

    /// Only test-specific parameters
    #[arg(long)]
    pub specific: bool,
}

impl CatalogArgs {
    /// The `global` query filter.
    pub fn filter(&self) -> Option<bool> {
        match (self.global, self.specific) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Options of `labval run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Algorithm to run
    #[arg(long, conflicts_with = "workflow", required_unless_present = "workflow")]
    pub algorithm: Option<DocumentId>,

    /// Workflow to run
    #[arg(long)]
    pub workflow: Option<DocumentId>,

    /// Patient record (JSON)
    #[arg(short, long)]
    pub record: PathBuf,

    /// Draw results at random instead of evaluating the record
    #[arg(long)]
    pub simulate: bool,

    /// Seed for reproducible simulations
    #[arg(long, requires = "simulate")]
    pub seed: Option<u64>,

    /// Kind of analysis
    #[arg(long, value_parser = parse_analysis_type, default_value = "blood")]
    pub analysis_type: AnalysisType,

    /// Reference date for date rules (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<chrono::NaiveDate>,

    /// Seconds to wait for the execution to finish
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,
}

/// Options of `labval scraper`.
#[derive(Args, Debug)]
pub struct ScraperArgs {
    /// Page to scrape
    #[arg(long)]
    pub url: String,

    /// Parameter to CSS selector mapping, as `param=selector`
    #[arg(short, long = "map", value_parser = parse_mapping)]
    pub mappings: Vec<Mapping>,
}

/// `labval config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,

    /// Get a value by dotted key (e.g. `server.port`)
    Get {
        /// Dotted key
        key: String,
    },

    /// Set a value by dotted key
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },

    /// Write a default config file
    Init {
        /// Target file (default: the resolved config path)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration as environment variables
    Export {
        /// Print `--env KEY=value` arguments for `docker run`
        #[arg(long = "env")]
        docker_env: bool,
    },
}

/// Parses `param=selector`.
pub fn parse_mapping(s: &str) -> Result<Mapping, String> {
    match s.split_once('=') {
        Some((param, selector)) if !param.trim().is_empty() && !selector.trim().is_empty() => {
            Ok(Mapping::new(param.trim(), selector.trim()))
        }
        _ => Err(format!("expected param=selector, got '{s}'")),
    }
}

/// Parses an analysis type name.
pub fn parse_analysis_type(s: &str) -> Result<AnalysisType, String> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|_| format!("unknown analysis type '{s}'"))
}
