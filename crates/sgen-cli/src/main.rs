use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use sgen_core::config::{self, CONFIG_FILE_NAME};
use sgen_core::spec::{self, FileDocLoader};
use sgen_core::{CodeGenerator, CodegenApp, Document, GenOpts, GeneratedFile};
use sgen_go_server::{GoLanguageOpts, GoServerGenerator};

#[derive(Parser)]
#[command(name = "sgen", about = "Swagger 2.0 server code generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Go server from a Swagger 2.0 spec
    Generate(GenerateArgs),

    /// Validate a Swagger 2.0 spec
    Validate {
        /// Path to the spec file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,
    },

    /// Inspect the application model built from a spec
    Inspect {
        /// Path to the spec file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new sgen configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Path to the spec file (YAML or JSON)
    #[arg(short, long)]
    spec: Option<PathBuf>,

    /// Directory the generated tree is written to
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Application name, defaults to the spec title
    #[arg(short = 'A', long)]
    name: Option<String>,

    /// Go module path used in imports
    #[arg(long)]
    module: Option<String>,

    /// Only generate operations with this tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Only generate the operation with this id (repeatable)
    #[arg(short = 'O', long = "operation")]
    operations: Vec<String>,

    /// Type of the authenticated principal
    #[arg(short = 'P', long)]
    principal: Option<String>,

    /// Don't embed the spec in the generated server
    #[arg(long)]
    exclude_spec: bool,

    /// Also generate cmd/<name>-server/main.go
    #[arg(long)]
    include_main: bool,

    /// Don't generate model files
    #[arg(long)]
    skip_models: bool,

    /// Skip structural validation of the spec
    #[arg(long)]
    skip_validation: bool,

    /// Print the application model as JSON instead of generating
    #[arg(long)]
    dump_data: bool,
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
        Commands::Generate(args) => cmd_generate(args),

        Commands::Validate { spec } => cmd_validate(spec),

        Commands::Inspect { spec, format } => cmd_inspect(spec, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "sgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<GenOpts>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Apply command-line flags on top of the config file options.
fn merge_args(mut opts: GenOpts, args: GenerateArgs) -> GenOpts {
    if let Some(spec) = args.spec {
        opts.spec = spec.display().to_string();
    }
    if let Some(target) = args.target {
        opts.target = target.display().to_string();
    }
    if args.name.is_some() {
        opts.name = args.name;
    }
    if args.module.is_some() {
        opts.module_path = args.module;
    }
    if args.principal.is_some() {
        opts.principal = args.principal;
    }
    if !args.tags.is_empty() {
        opts.tags = args.tags;
    }
    if !args.operations.is_empty() {
        opts.operations = args.operations;
    }
    opts.exclude_spec |= args.exclude_spec;
    opts.include_main |= args.include_main;
    opts.dump_data |= args.dump_data;
    if args.skip_models {
        opts.include_model = false;
    }
    if args.skip_validation {
        opts.validate_spec = false;
    }
    opts.ensure_defaults();
    opts
}

fn load_spec(path: &Path) -> Result<Document> {
    spec::load(path).with_context(|| format!("failed to load spec {}", path.display()))
}

fn build(doc: &Document, opts: &GenOpts, path: &Path) -> Result<CodegenApp> {
    sgen_core::build_app(doc, opts, &GoLanguageOpts)
        .with_context(|| format!("failed to build application model for {}", path.display()))
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

/// Try to run gofmt over the generated tree.
fn try_run_gofmt(target: &Path) {
    match Command::new("gofmt")
        .args(["-w", "."])
        .current_dir(target)
        .output()
    {
        Ok(result) if result.status.success() => {
            eprintln!("  formatted with gofmt");
        }
        Ok(result) => {
            log::debug!("gofmt stderr: {}", String::from_utf8_lossy(&result.stderr));
            eprintln!(
                "  warning: gofmt had issues (non-zero exit), output may need manual formatting"
            );
        }
        Err(_) => {
            eprintln!(
                "  note: gofmt not found, run `gofmt -w .` in {} to format",
                target.display()
            );
        }
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let opts = merge_args(cfg, args);

    let spec_path = PathBuf::from(&opts.spec);
    let doc = load_spec(&spec_path)?;
    let app = build(&doc, &opts, &spec_path)?;

    if opts.dump_data {
        println!("{}", serde_json::to_string_pretty(&app)?);
        return Ok(());
    }

    let target = PathBuf::from(&opts.target);
    eprintln!("Generating {} → {}", app.name.original, target.display());

    let registry = sgen_go_server::registry();
    let files = GoServerGenerator::new()
        .generate(&app, &registry)
        .map_err(|e| anyhow::anyhow!(e))?;

    fs::create_dir_all(&target)
        .with_context(|| format!("failed to create target directory {}", target.display()))?;
    write_files(&target, &files)?;

    try_run_gofmt(&target);

    eprintln!(
        "Generated {} files for {} operation(s) in {}",
        files.len(),
        app.operations.len(),
        target.display()
    );
    Ok(())
}

fn cmd_validate(path: PathBuf) -> Result<()> {
    let doc = load_spec(&path)?;
    spec::validate(&doc).with_context(|| format!("{} is not a valid spec", path.display()))?;

    let swagger = doc.spec();
    eprintln!("Valid Swagger {} spec: {}", doc.version(), swagger.info.title);
    eprintln!("  Version: {}", swagger.info.version);
    eprintln!("  Paths: {}", swagger.paths.len());
    eprintln!("  Operations: {}", doc.analysis().operation_count());
    eprintln!("  Definitions: {}", doc.analysis().definitions().len());

    // Every reference, local or external, must resolve without cycles.
    let loader = FileDocLoader::new();
    doc.expanded(Some(&loader))
        .with_context(|| format!("failed to expand references in {}", path.display()))?;
    eprintln!("  References: resolved");

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(path: PathBuf, format: InspectFormat) -> Result<()> {
    let opts = GenOpts {
        validate_spec: false,
        exclude_spec: true,
        ..GenOpts::default()
    };
    let doc = load_spec(&path)?;
    let app = build(&doc, &opts, &path)?;

    let summary = build_inspect_summary(&app);

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

fn build_inspect_summary(app: &CodegenApp) -> serde_json::Value {
    let operations: Vec<serde_json::Value> = app
        .operations
        .iter()
        .map(|op| {
            serde_json::json!({
                "id": op.id,
                "handler": op.qualified_name,
                "method": op.method,
                "path": op.path,
                "package": op.package,
                "tags": op.tags,
                "authenticated": op.authenticated,
            })
        })
        .collect();

    let models: Vec<serde_json::Value> = app
        .models
        .iter()
        .map(|m| {
            serde_json::json!({
                "name": m.name,
                "kind": m.kind,
            })
        })
        .collect();

    let media = |entries: &[sgen_core::codegen::MediaTypeEntry]| -> Vec<serde_json::Value> {
        entries
            .iter()
            .map(|e| serde_json::json!({ "name": e.name, "media_types": e.media_types }))
            .collect()
    };

    serde_json::json!({
        "info": {
            "title": app.info.title,
            "version": app.info.version,
        },
        "name": app.name.original,
        "base_path": app.base_path,
        "operations": operations,
        "groups": app.operation_groups.iter().map(|g| &g.name).collect::<Vec<_>>(),
        "consumers": media(&app.consumers),
        "producers": media(&app.producers),
        "security": app.security_schemes.iter().map(|s| &s.name).collect::<Vec<_>>(),
        "models": models,
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
