use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use i18n_neutral_core::{apply, Document, I18nOptions, Manifest, Schema};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "i18n-neutral")]
#[command(about = "Rewrite i18n-marked schema fields into per-language nested fields")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the i18n rewrite to a schema definition
    Apply {
        /// Input schema definition file
        input: PathBuf,

        #[command(flatten)]
        plugin: PluginArgs,

        /// Output rewritten definition file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output manifest of registered virtuals and languages
        #[arg(long)]
        virtuals: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Validate a JSON document against the rewritten schema
    Validate {
        /// Input schema definition file (before the rewrite)
        schema: PathBuf,

        /// JSON document to validate
        document: PathBuf,

        #[command(flatten)]
        plugin: PluginArgs,

        /// Output format of the issue report
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct PluginArgs {
    /// Comma-separated language tags, in order (e.g. es,fr,en)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        conflicts_with = "config",
        required_unless_present = "config"
    )]
    languages: Vec<String>,

    /// Plugin options file: {"languages": [...], "useDefault": bool}
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the reserved default sub-field and the `.default` virtuals
    #[arg(long)]
    no_default: bool,
}

impl PluginArgs {
    fn resolve(&self) -> Result<I18nOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let value = read_json(path, "plugin options")?;
                I18nOptions::from_value(&value)
                    .map_err(|e| anyhow::Error::from(e).context("Invalid plugin options"))?
            }
            None => I18nOptions::new(self.languages.iter().map(|l| l.trim().to_string())),
        };
        if self.no_default {
            options.use_default = false;
        }
        tracing::debug!(
            languages = ?options.languages,
            use_default = options.use_default,
            "resolved plugin options"
        );
        Ok(options)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Apply {
            input,
            plugin,
            output,
            virtuals,
            format,
        } => {
            let options = plugin.resolve()?;
            let schema = load_schema(&input, &options)?;

            write_json(&schema.to_definition(), output.as_ref(), format)?;

            if let Some(path) = virtuals {
                let manifest = Manifest::from_schema(&schema)
                    .context("Schema carries no i18n configuration")?;
                write_json(&manifest, Some(&path), format)?;
            }
        }
        Commands::Validate {
            schema: schema_path,
            document,
            plugin,
            format,
        } => {
            let options = plugin.resolve()?;
            let schema = load_schema(&schema_path, &options)?;

            let data = read_json(&document, "document")?;
            let doc = Document::from_value(&schema, data)
                .map_err(|e| anyhow::Error::from(e).context("Invalid document"))?;

            let issues = doc.validate();
            for issue in &issues {
                eprintln!("{issue}");
            }
            write_json(&issues, None, format)?;

            if !issues.is_empty() {
                bail!("Document failed validation with {} issue(s)", issues.len());
            }
        }
    }

    Ok(())
}

/// Parse a schema definition and apply the rewrite to it.
fn load_schema(path: &Path, options: &I18nOptions) -> Result<Schema> {
    let definition = read_json(path, "schema")?;
    let mut schema = Schema::from_definition(&definition)
        .map_err(|e| anyhow::Error::from(e).context("Invalid schema definition"))?;
    apply(&mut schema, options)
        .map_err(|e| anyhow::Error::from(e).context("i18n rewrite failed"))?;
    Ok(schema)
}

fn read_json(path: &Path, what: &str) -> Result<serde_json::Value> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {what} file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {what} from: {}", path.display()))
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
