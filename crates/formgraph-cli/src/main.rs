//! formgraph CLI
//!
//! File-reading shell around the form core:
//! - Resolving the field paths a schema declares
//! - Printing the extraction/deletion statement for one instance
//! - Diffing two instance snapshots into an update statement
//! - Merging an extension schema into its base form

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use formgraph_forms::{
    build_query, compute_delta, describe_fields, merge_schemas, resolve_paths_detailed,
    DeltaOutcome, FormsConfig, PathMap, QueryMode, QueryRoot, RootKind,
};
use formgraph_rdf::{parse_document, GraphStore, RdfFormat, Term, Variable};

#[derive(Parser)]
#[command(name = "formgraph")]
#[command(
    author,
    version,
    about = "formgraph: RDF form schemas, instance queries and snapshot deltas"
)]
struct Cli {
    /// Input format (turtle, ntriples, rdfxml); inferred from the file extension otherwise
    #[arg(long, global = true)]
    format: Option<RdfFormat>,

    /// JSON config file (target graph, merge graph, prefixes)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every field path a schema declares.
    ///
    /// Fields with malformed paths are reported on stderr and left out.
    Paths {
        schema: PathBuf,
        /// Resolve generator prototype predicates instead of fields
        #[arg(long)]
        generators: bool,
    },

    /// List declared fields with label, display type, order and group.
    Fields { schema: PathBuf },

    /// Print the statement extracting (or deleting) one instance.
    Query {
        schema: PathBuf,
        /// Instance IRI, or `?name` for every instance of the type
        #[arg(long)]
        root: String,
        /// Target type of the instance
        #[arg(long = "type")]
        target_type: String,
        /// Emit the deletion statement instead of the extraction one
        #[arg(long)]
        delete: bool,
        /// Evaluate against this instance data and print the matched triples
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Diff two instance snapshots into an update statement.
    Delta { old: PathBuf, new: PathBuf },

    /// Merge an extension schema into the base form it extends.
    Merge {
        base: PathBuf,
        extension: PathBuf,
        /// IRI of the extension form
        #[arg(long)]
        uri: String,
        /// Write the merged schema here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ============================================================================
// Input helpers
// ============================================================================

fn format_for(path: &Path, flag: Option<RdfFormat>) -> RdfFormat {
    flag.or_else(|| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(RdfFormat::from_extension)
    })
    .unwrap_or(RdfFormat::Turtle)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_store(path: &Path, flag: Option<RdfFormat>) -> Result<GraphStore> {
    let text = read_text(path)?;
    parse_document(&text, format_for(path, flag))
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn load_config(path: Option<&PathBuf>) -> Result<FormsConfig> {
    match path {
        Some(path) => FormsConfig::from_json_str(&read_text(path)?)
            .with_context(|| format!("invalid config {}", path.display())),
        None => Ok(FormsConfig::default()),
    }
}

fn parse_iri(value: &str, what: &str) -> Result<Term> {
    let value = value.trim().trim_start_matches('<').trim_end_matches('>');
    if value.is_empty() || value.contains(char::is_whitespace) {
        return Err(anyhow!("{what} must be an IRI, got {value:?}"));
    }
    Ok(Term::iri(value))
}

fn parse_root(value: &str) -> Result<QueryRoot> {
    match value.strip_prefix('?') {
        Some(name) if !name.is_empty() => Ok(QueryRoot::Var(Variable::new(name))),
        Some(_) => Err(anyhow!("--root variable needs a name")),
        None => Ok(QueryRoot::Iri(parse_iri(value, "--root")?)),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_paths(cli: &Cli, schema: &Path, generators: bool) -> Result<()> {
    let store = read_store(schema, cli.format)?;
    let kind = if generators {
        RootKind::Generator
    } else {
        RootKind::Field
    };
    let resolution = resolve_paths_detailed(&store, kind)?;

    for (key, defect) in &resolution.malformed {
        eprintln!("{} {key}: {defect}", "skipped".yellow().bold());
    }
    if cli.json {
        let rows: Vec<serde_json::Value> = resolution
            .chains
            .iter()
            .map(|(key, chain)| {
                serde_json::json!({
                    "field": key,
                    "path": chain.to_string(),
                    "steps": chain,
                })
            })
            .collect();
        return print_json(&rows);
    }
    for (key, chain) in &resolution.chains {
        println!("{key}\t{chain}");
    }
    Ok(())
}

fn cmd_fields(cli: &Cli, schema: &Path) -> Result<()> {
    let store = read_store(schema, cli.format)?;
    let fields = describe_fields(&store)?;
    if cli.json {
        return print_json(&fields);
    }
    for field in &fields {
        let order = field.order.map(|o| o.to_string()).unwrap_or_else(|| "-".to_string());
        let path = field
            .path
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "(malformed)".to_string());
        println!(
            "{order}\t{}\t{}\t{path}",
            field.uri,
            field.label.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn cmd_query(
    cli: &Cli,
    schema: &Path,
    root: &str,
    target_type: &str,
    delete: bool,
    data: Option<&PathBuf>,
) -> Result<()> {
    let store = read_store(schema, cli.format)?;
    let chains: PathMap = resolve_paths_detailed(&store, RootKind::Field)?.chains;
    let mode = if delete {
        QueryMode::Delete
    } else {
        QueryMode::Extract
    };
    let query = build_query(
        &chains,
        parse_root(root)?,
        &parse_iri(target_type, "--type")?,
        mode,
    );

    let Some(data) = data else {
        print!("{}", query.to_sparql());
        return Ok(());
    };
    let instance = read_store(data, cli.format)?;
    let matched: GraphStore = query.matched(&instance).into_iter().collect();
    if cli.json {
        let triples: Vec<_> = matched.triples().collect();
        return print_json(&triples);
    }
    print!("{}", matched.to_ntriples());
    eprintln!("{} {} triples matched", "ok".green().bold(), matched.len());
    Ok(())
}

fn cmd_delta(cli: &Cli, config: &FormsConfig, old: &Path, new: &Path) -> Result<()> {
    let format = format_for(old, cli.format);
    let outcome = compute_delta(&read_text(old)?, &read_text(new)?, format, &config.target_graph())?;
    if cli.json {
        return print_json(&outcome);
    }
    match outcome {
        DeltaOutcome::NoOp => eprintln!("{} snapshots are equal, nothing to write", "ok".green().bold()),
        DeltaOutcome::Update { delta, statement } => {
            println!("{statement}");
            eprintln!(
                "{} removed={} added={}",
                "ok".green().bold(),
                delta.removed.len(),
                delta.added.len()
            );
        }
    }
    Ok(())
}

fn cmd_merge(
    cli: &Cli,
    config: &FormsConfig,
    base: &Path,
    extension: &Path,
    uri: &str,
    out: Option<&PathBuf>,
) -> Result<()> {
    let base = read_store(base, cli.format)?;
    let extension = read_store(extension, cli.format)?;
    let merged = merge_schemas(&base, &extension, &parse_iri(uri, "--uri")?, config)?;
    let text = merged.to_turtle(&config.prefixes());
    match out {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_ref())?;

    match &cli.command {
        Commands::Paths { schema, generators } => cmd_paths(&cli, schema, *generators),
        Commands::Fields { schema } => cmd_fields(&cli, schema),
        Commands::Query {
            schema,
            root,
            target_type,
            delete,
            data,
        } => cmd_query(&cli, schema, root, target_type, *delete, data.as_ref()),
        Commands::Delta { old, new } => cmd_delta(&cli, &config, old, new),
        Commands::Merge {
            base,
            extension,
            uri,
            out,
        } => cmd_merge(&cli, &config, base, extension, uri, out.as_ref()),
    }
}
