use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde_json::Value;

use adminbridge::codec::flat::flatten;
use adminbridge::{
    AdapterConfig, AdapterError, CoercionPolicy, Entity, MemoryRepository, ModelCatalog,
    ParameterCodec, Resource, ResourceSchema,
};

/// AdminBridge - inspect how ORM models map onto admin panel resources
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Adapter configuration YAML; environment variables are used when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reject malformed numbers, JSON and array indices instead of defaulting
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ModelArgs {
    /// Model catalog YAML file
    #[arg(long)]
    catalog: PathBuf,

    /// Entity model name within the catalog
    #[arg(long)]
    model: String,
}

#[derive(Subcommand)]
enum Command {
    /// Print the property schema of a model
    Schema {
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Decode flat parameters (JSON object, `-` for stdin) into attributes
    Decode {
        #[command(flatten)]
        model: ModelArgs,
        input: PathBuf,
    },
    /// Encode an entity (JSON object, `-` for stdin) into flat parameters
    Encode {
        #[command(flatten)]
        model: ModelArgs,
        input: PathBuf,
    },
    /// Run a create against in-memory rows and print the persisted attributes
    Create {
        #[command(flatten)]
        model: ModelArgs,
        input: PathBuf,

        /// Existing rows (JSON array of entities) to check constraints against
        #[arg(long)]
        rows: Option<PathBuf>,

        /// Columns holding unique values
        #[arg(long = "unique")]
        unique: Vec<String>,
    },
}

fn load_config(cli: &Cli) -> Result<AdapterConfig> {
    let mut config = match &cli.config {
        Some(path) => AdapterConfig::from_yaml_file(path)?,
        None => AdapterConfig::from_env()?,
    };
    if cli.strict {
        config.coercion_policy = CoercionPolicy::Strict;
    }
    Ok(config)
}

fn read_json(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn read_object(path: &Path) -> Result<serde_json::Map<String, Value>> {
    match read_json(path)? {
        Value::Object(map) => Ok(map),
        other => bail!("{} must hold a JSON object, found {}", path.display(), other),
    }
}

fn load_model(args: &ModelArgs) -> Result<adminbridge::schema::EntityMetadata> {
    let catalog = ModelCatalog::from_yaml_file(&args.catalog)?;
    let metadata = catalog.model(&args.model)?.clone();
    info!("Loaded model '{}' from {}", metadata.name, args.catalog.display());
    Ok(metadata)
}

fn print(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logger - defaults to WARN level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Schema { model } => {
            let schema = ResourceSchema::from_metadata(&load_model(model)?);
            print(&schema.properties().collect::<Vec<_>>())
        }
        Command::Decode { model, input } => {
            let schema = ResourceSchema::from_metadata(&load_model(model)?);
            let params = flatten(&Value::Object(read_object(input)?));
            let codec = ParameterCodec::new(&schema, config.codec_options());
            print(&codec.decode(&params)?)
        }
        Command::Encode { model, input } => {
            let schema = ResourceSchema::from_metadata(&load_model(model)?);
            let entity = Entity::new(read_object(input)?);
            let codec = ParameterCodec::new(&schema, config.codec_options());
            print(&codec.encode(&entity))
        }
        Command::Create {
            model,
            input,
            rows,
            unique,
        } => {
            let mut repository = MemoryRepository::new(load_model(model)?);
            for column in unique {
                repository = repository.with_unique(column.clone());
            }
            if let Some(rows) = rows {
                let Value::Array(items) = read_json(rows)? else {
                    bail!("{} must hold a JSON array", rows.display());
                };
                repository = repository.with_rows(items.into_iter().filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                }));
            }

            let resource = Resource::new(repository, config)?;
            let params = flatten(&Value::Object(read_object(input)?));
            match resource.create(&params).await {
                Ok(attributes) => print(&attributes),
                Err(AdapterError::Validation(errors)) => {
                    print(&errors)?;
                    std::process::exit(2);
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}
