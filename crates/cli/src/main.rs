mod check;
mod render;

use anyhow::{Context, Result, bail};
use clap::{Parser as ClapParser, Subcommand};
use std::path::PathBuf;
use textargs::{Parser, extract, tokenize};
use textargs_schema::{SCHEMA_ENV, SchemaDocument};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(ClapParser)]
#[command(name = "textargs")]
#[command(version, about = "Parse command text against a textargs schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of a piece of text, one JSON object per line
    Tokenize(TextArgs),

    /// Print the positional arguments and flags found in a piece of text
    Extract(TextArgs),

    /// Compile a schema document and report its shape
    Check(CheckArgs),

    /// Parse text against a schema document
    Parse(ParseArgs),
}

#[derive(clap::Args)]
struct TextArgs {
    /// Command text (multiple words are joined with spaces)
    #[arg(
        value_name = "TEXT",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    text: Vec<String>,
}

#[derive(clap::Args)]
struct SchemaArgs {
    /// Schema document (default: $TEXTARGS_SCHEMA)
    #[arg(short, long, value_name = "FILE")]
    schema: Option<PathBuf>,
}

impl SchemaArgs {
    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.schema {
            return Ok(path.clone());
        }
        match std::env::var_os(SCHEMA_ENV) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => bail!("no schema given (use --schema or set {SCHEMA_ENV})"),
        }
    }

    fn load(&self) -> Result<(PathBuf, SchemaDocument)> {
        let path = self.path()?;
        let doc = SchemaDocument::from_file(&path)
            .with_context(|| format!("failed to load schema: {}", path.display()))?;
        Ok((path, doc))
    }
}

#[derive(clap::Args)]
struct CheckArgs {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ParseArgs {
    #[command(flatten)]
    schema: SchemaArgs,

    #[command(flatten)]
    text: TextArgs,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            match cli.command {
                Commands::Tokenize(args) => tokenize_command(args),
                Commands::Extract(args) => extract_command(args),
                Commands::Check(args) => check_command(args),
                Commands::Parse(args) => parse_command(args).await,
            }
        })
}

fn tokenize_command(args: TextArgs) -> Result<()> {
    tracing::debug!("executing tokenize command");

    let text = args.text.join(" ");
    for token in tokenize(&text) {
        println!("{}", serde_json::to_string(&token)?);
    }
    Ok(())
}

fn extract_command(args: TextArgs) -> Result<()> {
    tracing::debug!("executing extract command");

    let text = args.text.join(" ");
    println!("{}", serde_json::to_string_pretty(&extract(&text))?);
    Ok(())
}

fn check_command(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let (path, doc) = args.schema.load()?;
    let parser: Parser = doc
        .compile()
        .with_context(|| format!("schema does not compile: {}", path.display()))?;
    let report = check::report(&path, &doc, &parser);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        // Human-readable output
        eprintln!();
        eprintln!("=== Schema Check Results ===");
        eprintln!("Schema: {}", report.schema);
        if !report.name.is_empty() {
            eprintln!("Name: {}", report.name);
        }
        eprintln!("Arguments: {}", report.arguments.len());
        for argument in &report.arguments {
            eprintln!("  - {}", argument.describe());
        }
        eprintln!("Options: {}", report.options.len());
        for option in &report.options {
            eprintln!("  - {}", option.describe());
        }
        eprintln!("OK: schema compiles");
    }
    Ok(())
}

async fn parse_command(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");

    let (path, doc) = args.schema.load()?;
    let parser: Parser = doc
        .compile()
        .with_context(|| format!("schema does not compile: {}", path.display()))?;

    let text = args.text.text.join(" ");
    match parser.parse(&text).await {
        Some(matches) => {
            let json = render::matches_json(&matches);
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(())
        }
        None => {
            eprintln!("no match");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
