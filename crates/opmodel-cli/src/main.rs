use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::debug;
use serde_json::{Value, json};

use opmodel_core::config::{self, CONFIG_FILE_NAME, OpmodelConfig};
use opmodel_core::ir::grouping::{GroupBy, group_operations};
use opmodel_core::ir::{IrOperation, IrParameter, IrSpec};
use opmodel_core::parse;
use opmodel_core::transform::{self, TransformOptions};

#[derive(Parser)]
#[command(
    name = "opmodel",
    about = "Build operation models from Swagger 2.0 / OpenAPI 3.x documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and transform a document, reporting failures
    Validate {
        /// Path to the spec file (YAML or JSON); defaults to the config `input`
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the operation models of a document
    Inspect {
        /// Path to the spec file (YAML or JSON); defaults to the config `input`
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,

        /// How operations are grouped in the output
        #[arg(long, default_value = "service")]
        group_by: InspectGroupBy,
    },

    /// Initialize a new opmodel configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum InspectGroupBy {
    Service,
    Operation,
    Route,
}

impl From<InspectGroupBy> for GroupBy {
    fn from(value: InspectGroupBy) -> Self {
        match value {
            InspectGroupBy::Service => GroupBy::Service,
            InspectGroupBy::Operation => GroupBy::Operation,
            InspectGroupBy::Route => GroupBy::Route,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect {
            input,
            format,
            group_by,
        } => cmd_inspect(input, format, group_by.into()),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "opmodel", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the project config from the current directory, or defaults.
fn load_project_config() -> Result<OpmodelConfig> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    let loaded = config::load_config(&config_path)?;
    if loaded.is_some() {
        debug!("loaded {}", config_path.display());
    }
    Ok(loaded.unwrap_or_default())
}

fn load_spec(input: Option<PathBuf>, cfg: &OpmodelConfig) -> Result<IrSpec> {
    let path = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let options = TransformOptions::from_config(cfg);
    transform::load(&path, &options).with_context(|| format!("failed to load {}", path.display()))
}

fn cmd_validate(input: Option<PathBuf>) -> Result<()> {
    let cfg = load_project_config()?;
    let path = input.unwrap_or_else(|| PathBuf::from(&cfg.input));

    let parsed = parse::from_path(&path)?;
    eprintln!(
        "Valid {} {} document: {}",
        if parsed.is_swagger2() { "Swagger" } else { "OpenAPI" },
        parsed.version(),
        parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());

    let options = TransformOptions::from_config(&cfg);
    let ir = transform::transform_with_options(&parsed, &options)?;
    eprintln!("  Operations: {}", ir.operations.len());
    eprintln!("  Services: {}", ir.modules.len());

    if ir.failures.is_empty() {
        eprintln!("Validation successful.");
    } else {
        eprintln!("  Skipped: {}", ir.failures.len());
        for failure in &ir.failures {
            eprintln!("    {failure}");
        }
        eprintln!("Validation finished with skipped operations.");
    }
    Ok(())
}

fn cmd_inspect(input: Option<PathBuf>, format: InspectFormat, group_by: GroupBy) -> Result<()> {
    let cfg = load_project_config()?;
    let ir = load_spec(input, &cfg)?;

    let summary = build_inspect_summary(&ir, group_by);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(ir: &IrSpec, group_by: GroupBy) -> Value {
    let groups: Vec<Value> = group_operations(ir, group_by)
        .iter()
        .map(|group| {
            let operations: Vec<Value> = group
                .operation_indices
                .iter()
                .filter_map(|&i| ir.operations.get(i))
                .map(operation_summary)
                .collect();
            json!({
                "name": group.name.pascal_case,
                "operations": operations,
            })
        })
        .collect();

    json!({
        "info": {
            "title": ir.info.title,
            "version": ir.info.version,
        },
        "servers": ir.servers.iter().map(|s| &s.url).collect::<Vec<_>>(),
        "groups": groups,
        "failures": ir.failures.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
    })
}

fn operation_summary(op: &IrOperation) -> Value {
    let params = |list: Vec<&IrParameter>| -> Vec<Value> {
        list.into_iter().map(parameter_summary).collect()
    };

    json!({
        "name": op.name.camel_case,
        "service": op.service.pascal_case,
        "method": op.method.as_str(),
        "path": op.path,
        "deprecated": op.deprecated,
        "summary": op.summary,
        "parameters": {
            "path": params(op.parameters.path()),
            "query": params(op.parameters.query()),
            "form": params(op.parameters.form()),
            "header": params(op.parameters.header()),
            "cookie": params(op.parameters.cookie()),
            "body": op.parameters.body().map(parameter_summary),
        },
        "results": op.results.iter().map(|r| json!({
            "status": r.status.to_string(),
            "type": r.result_type.label(),
            "media_type": r.media_type,
        })).collect::<Vec<_>>(),
        "errors": op.errors.iter().map(|e| json!({
            "status": e.status.to_string(),
            "description": e.description,
        })).collect::<Vec<_>>(),
        "response_header": op.response_header,
        "dependencies": op.dependencies,
    })
}

fn parameter_summary(param: &IrParameter) -> Value {
    json!({
        "name": param.name.camel_case,
        "original_name": param.original_name,
        "type": param.param_type.label(),
        "required": param.required,
        "default": param.default,
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
