use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::debug;
use serde_json::{Value, json};

use dtogen_core::config::{self, CONFIG_FILE_NAME, PojoSettings};
use dtogen_core::model::{
    AdditionalProperties, Constraints, Discriminator, Nullability, ObjectPojo, Pojo, PojoMember,
    Type,
};
use dtogen_core::parse::loader::SpecificationSet;
use dtogen_core::transform::{MapResult, map_specification_set};

#[derive(Parser)]
#[command(name = "dtogen", about = "OpenAPI 3.x schema to pojo resolver", version)]
struct Cli {
    /// Settings file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and resolve an OpenAPI spec, reporting counts and warnings
    Validate {
        /// Path to the OpenAPI spec file (YAML or JSON); defaults to `input` from the settings
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the resolved pojo set
    Inspect {
        /// Path to the OpenAPI spec file; defaults to `input` from the settings
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Write a default settings file
    Init {
        /// Overwrite an existing file
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

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { input } => cmd_validate(&cli.config, input),

        Commands::Inspect { input, format } => cmd_inspect(&cli.config, input, format),

        Commands::Init { force } => cmd_init(&cli.config, force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "dtogen", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_settings(path: &Path) -> Result<PojoSettings> {
    let settings = config::load_config(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    if settings.is_none() {
        debug!("{} not found, using default settings", path.display());
    }
    Ok(settings.unwrap_or_default())
}

fn load_spec(path: &Path) -> Result<SpecificationSet> {
    let set = SpecificationSet::load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    debug!(
        "loaded {} with {} referenced documents",
        path.display(),
        set.external.len()
    );
    Ok(set)
}

fn resolve(config_path: &Path, input: Option<PathBuf>) -> Result<(SpecificationSet, MapResult)> {
    let settings = load_settings(config_path)?;
    let input = input.unwrap_or_else(|| PathBuf::from(&settings.input));
    let set = load_spec(&input)?;
    let result = map_specification_set(&set, &settings)
        .with_context(|| format!("failed to resolve schemas of {}", input.display()))?;
    Ok((set, result))
}

fn cmd_validate(config_path: &Path, input: Option<PathBuf>) -> Result<()> {
    let (set, result) = resolve(config_path, input)?;
    let spec = &set.main;

    eprintln!("Valid OpenAPI {} spec: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Documents: {}", set.external.len() + 1);
    eprintln!("  Schemas: {}", set.schema_count());
    eprintln!("  Pojos: {}", result.pojos.len());

    if !result.warnings.is_empty() {
        eprintln!("  Warnings: {}", result.warnings.len());
        for warning in &result.warnings {
            eprintln!("    - {warning}");
        }
    }

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(config_path: &Path, input: Option<PathBuf>, format: InspectFormat) -> Result<()> {
    let (set, result) = resolve(config_path, input)?;

    let summary = build_inspect_summary(&set, &result);

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

fn build_inspect_summary(set: &SpecificationSet, result: &MapResult) -> Value {
    json!({
        "info": {
            "title": set.main.info.title,
            "version": set.main.info.version,
        },
        "documents": set.external.keys().collect::<Vec<_>>(),
        "pojos": result.pojos.iter().map(pojo_summary).collect::<Vec<_>>(),
        "warnings": result.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

fn pojo_summary(pojo: &Pojo) -> Value {
    let mut summary = json!({
        "name": pojo.name().to_string(),
        "kind": pojo.kind(),
    });
    if let Some(description) = pojo.description() {
        summary["description"] = json!(description);
    }
    match pojo {
        Pojo::Object(object) => {
            if let Value::Object(fields) = object_summary(object) {
                for (key, value) in fields {
                    summary[key] = value;
                }
            }
        }
        Pojo::Array(array) => summary["value"] = member_summary(&array.value),
        Pojo::Enum(e) => {
            summary["values"] = e
                .members
                .iter()
                .map(|m| json!({ "value": m.value, "description": m.description }))
                .collect();
        }
        Pojo::Composed(composed) => {
            summary[composed.composition.kind().to_string()] = composition_summary(
                composed.composition.pojos(),
                composed.composition.discriminator(),
            );
        }
        Pojo::FreeForm(free) => summary["constraints"] = constraints_summary(&free.constraints),
        Pojo::Alias(alias) => {
            summary["type"] = type_summary(&alias.alias_type);
            summary["nullable"] = json!(alias.nullability == Nullability::Nullable);
        }
    }
    summary
}

fn object_summary(object: &ObjectPojo) -> Value {
    let additional_properties = match &object.additional_properties {
        AdditionalProperties::NotAllowed => Value::Bool(false),
        AdditionalProperties::Allowed(ty) => type_summary(ty),
    };
    let mut summary = json!({
        "members": object.members.iter().map(member_summary).collect::<Vec<_>>(),
        "additional_properties": additional_properties,
    });
    if !object.required_additional_properties.is_empty() {
        summary["required_additional_properties"] = object
            .required_additional_properties
            .iter()
            .map(|n| json!(n.as_str()))
            .collect();
    }
    if !object.constraints.is_empty() {
        summary["constraints"] = constraints_summary(&object.constraints);
    }
    if let Some(all_of) = &object.all_of {
        summary["allOf"] = composition_summary(&all_of.pojos, None);
    }
    if let Some(one_of) = &object.one_of {
        summary["oneOf"] = composition_summary(&one_of.pojos, one_of.discriminator.as_ref());
    }
    if let Some(any_of) = &object.any_of {
        summary["anyOf"] = composition_summary(&any_of.pojos, any_of.discriminator.as_ref());
    }
    summary
}

fn member_summary(member: &PojoMember) -> Value {
    json!({
        "name": member.name.as_str(),
        "type": type_summary(&member.member_type),
        "state": format!("{:?}", member.state()),
        "description": member.description,
    })
}

fn type_summary(ty: &Type) -> Value {
    if ty.constraints.is_empty() {
        json!(ty.to_string())
    } else {
        json!(format!("{} [{}]", ty, ty.constraints.labels().join(" ")))
    }
}

fn constraints_summary(constraints: &Constraints) -> Value {
    json!(constraints.labels())
}

fn composition_summary(pojos: &[ObjectPojo], discriminator: Option<&Discriminator>) -> Value {
    let mut summary = json!({
        "pojos": pojos.iter().map(|p| p.name.to_string()).collect::<Vec<_>>(),
    });
    if let Some(discriminator) = discriminator {
        let mapping: serde_json::Map<String, Value> = discriminator
            .mappings
            .iter()
            .map(|m| (m.value.clone(), json!(m.pojo_name.to_string())))
            .collect();
        summary["discriminator"] = json!({
            "property": discriminator.property_name.as_str(),
            "mapping": mapping,
        });
    }
    summary
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
