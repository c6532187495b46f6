use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer as _, Registry, filter, fmt, layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};
use tx_sanitizer_common::{CollectionPolicy, Era};
use tx_sanitizer_module_tx_exporter::{ExportFormat, ExportSession, ExportedArtifact};

const DEFAULT_ERA: &str = "conway";
const DEFAULT_COLLECTION_POLICY: &str = "default";
const DEFAULT_OUTPUT_FORMAT: &str = "hex";

fn default_config_path() -> PathBuf {
    PathBuf::from(option_env!("TX_SANITIZER_DEFAULT_CONFIG").unwrap_or("tx-sanitizer.toml"))
}

#[derive(clap::Parser, Clone, Debug)]
#[command(version, about = "Re-encode Cardano transactions for a target era")]
struct Args {
    /// Path to configuration.
    #[arg(long, default_value = default_config_path().into_os_string())]
    config: PathBuf,

    /// Treat INPUT as a CBOR hex string instead of a text envelope path.
    #[arg(long, global = true)]
    cbor_hex: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Debug)]
enum Command {
    /// Print the decoded transaction as JSON
    View { input: String },

    /// Normalise the transaction and print or write the result
    Export {
        input: String,
        #[arg(long)]
        era: Option<String>,
        #[arg(long)]
        policy: Option<String>,
        #[arg(long)]
        format: Option<String>,
        /// Write here instead of stdout. CBOR output requires this.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Write the transaction, as loaded, to a text envelope
    Save {
        input: String,
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long)]
        era: Option<String>,
    },
}

/// Settings resolved from the config file, environment and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settings {
    era: Era,
    policy: CollectionPolicy,
    format: ExportFormat,
}

impl Settings {
    fn from_config(config: &Config) -> Result<Self> {
        // Environment variables arrive with underscores in place of hyphens
        let get = |key: &str, default: &str| {
            config
                .get_string(key)
                .or_else(|_| config.get_string(&key.replace('-', "_")))
                .unwrap_or(default.to_string())
        };
        Ok(Self {
            era: get("era", DEFAULT_ERA).parse()?,
            policy: get("collection-policy", DEFAULT_COLLECTION_POLICY).parse()?,
            format: get("output-format", DEFAULT_OUTPUT_FORMAT).parse()?,
        })
    }

    fn override_with(
        mut self,
        era: Option<&str>,
        policy: Option<&str>,
        format: Option<&str>,
    ) -> Result<Self> {
        if let Some(era) = era {
            self.era = era.parse()?;
        }
        if let Some(policy) = policy {
            self.policy = policy.parse()?;
        }
        if let Some(format) = format {
            self.format = format.parse()?;
        }
        Ok(self)
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Ok(Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("TX_SANITIZER"))
        .build()?)
}

fn load(session: &mut ExportSession, input: &str, cbor_hex: bool) -> Result<()> {
    if cbor_hex {
        session.load_cbor_hex(input)?;
    } else {
        session
            .load_text_envelope(Path::new(input))
            .with_context(|| format!("Failed to load {input}"))?;
    }
    Ok(())
}

fn write_artifact(artifact: &ExportedArtifact, output: Option<&Path>) -> Result<()> {
    match (artifact, output) {
        (_, Some(path)) => {
            std::fs::write(path, artifact.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        (ExportedArtifact::CborBytes(_), None) => {
            anyhow::bail!("Raw CBOR output needs --output")
        }
        (_, None) => println!("{}", artifact.to_text()),
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args.config)?;
    let settings = Settings::from_config(&config)?;
    let mut session = ExportSession::new();

    match args.command {
        Command::View { input } => {
            load(&mut session, &input, args.cbor_hex)?;
            println!("{}", session.view()?);
        }
        Command::Export {
            input,
            era,
            policy,
            format,
            output,
        } => {
            let settings =
                settings.override_with(era.as_deref(), policy.as_deref(), format.as_deref())?;
            load(&mut session, &input, args.cbor_hex)?;
            let artifact = session.export(settings.era, settings.policy, settings.format)?;
            write_artifact(&artifact, output.as_deref())?;
        }
        Command::Save { input, output, era } => {
            let settings = settings.override_with(era.as_deref(), None, None)?;
            load(&mut session, &input, args.cbor_hex)?;
            let envelope = session.save_text_envelope(&output, settings.era)?;
            info!("{}", envelope.envelope_type);
        }
    }
    Ok(())
}

pub fn main() -> Result<()> {
    let args = Args::try_parse()?;

    // Standard logging using RUST_LOG for log levels default to INFO for events only
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env().add_directive(filter::LevelFilter::INFO.into()))
        .with_filter(filter::filter_fn(|meta| meta.is_event()));
    Registry::default().with(fmt_layer).init();

    run(args)
}
