use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use env_logger::Env;
use serde_json::json;
use std::path::{Path, PathBuf};
use synthetic_eml::content::Template;
use synthetic_eml::faker::Locale;
use synthetic_eml::{EmailGenerator, EmlWriter, GeneratorConfig, MessageOptions, parse_eml};

#[derive(Parser)]
#[command(author, version, about = "Generate synthetic .eml messages with a plausible Received chain")]
struct Cli {
    /// Path of the generated .eml file
    #[arg(short, long, default_value = "out/synthetic_test.eml")]
    output: PathBuf,

    /// Number of Received headers in the chain
    #[arg(long, allow_hyphen_values = true)]
    hops: Option<i64>,

    /// Locale for generated names and text (pl_PL, en_US, fr_FR, pt_BR)
    #[arg(long)]
    locale: Option<String>,

    /// JSON template with "subject", "text" and "html" keys
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// JSON file with generator defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HELO name used for fallback domains
    #[arg(long)]
    helo: Option<String>,

    /// Sender address (generated when omitted)
    #[arg(long)]
    from: Option<String>,

    /// Recipient address (generated when omitted)
    #[arg(long)]
    to: Option<String>,

    /// Arrival time of the final hop, RFC 3339 (defaults to now)
    #[arg(long)]
    start_time: Option<DateTime<Utc>>,

    /// How many messages to write
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Fold header lines at this many columns
    #[arg(long)]
    max_header_len: Option<usize>,

    /// Value for an X-Mailer header
    #[arg(long)]
    x_mailer: Option<String>,

    /// Add a Reply-To header equal to the sender
    #[arg(long)]
    reply_to: bool,

    /// Seed for names and bodies
    #[arg(long)]
    seed: Option<u64>,

    /// Re-read each written file and check it parses back
    #[arg(long)]
    verify: bool,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(locale) = &self.locale {
            config.locale = locale.parse::<Locale>()?;
        }
        if let Some(hops) = self.hops {
            config.hops = hops;
        }
        if let Some(helo) = &self.helo {
            config.helo = helo.clone();
        }
        if let Some(len) = self.max_header_len {
            config.max_header_len = len;
        }
        if self.x_mailer.is_some() {
            config.x_mailer = self.x_mailer.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.reply_to |= self.reply_to;
        Ok(config)
    }
}

/// `out/a.eml` becomes `out/a_001.eml` when writing a batch.
fn numbered_path(base: &Path, index: usize, count: usize) -> PathBuf {
    if count <= 1 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "message".into());
    let name = match base.extension() {
        Some(ext) => format!("{stem}_{:03}.{}", index + 1, ext.to_string_lossy()),
        None => format!("{stem}_{:03}", index + 1),
    };
    base.with_file_name(name)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.count == 0 {
        bail!("--count must be at least 1");
    }

    let config = cli.config()?;
    // Template problems must surface before anything is generated.
    let content = match &cli.template {
        Some(path) => Some(Template::load(path)?),
        None => None,
    };

    let mut generator = EmailGenerator::new(&config)?;
    let writer = EmlWriter::new(config.max_header_len);
    let mut summaries = Vec::with_capacity(cli.count);

    for index in 0..cli.count {
        let message = generator.create_message(MessageOptions {
            from: cli.from.clone(),
            to: cli.to.clone(),
            content: content.clone(),
            hops: None,
            start_time: cli.start_time,
        })?;

        let path = writer.write(&message, numbered_path(&cli.output, index, cli.count))?;
        let resolved = path.canonicalize().unwrap_or(path);

        if cli.verify {
            let raw = std::fs::read(&resolved)
                .with_context(|| format!("re-reading {}", resolved.display()))?;
            let parsed = parse_eml(&raw)?;
            let expected = message.headers_named("Received").count();
            if parsed.received.len() != expected {
                bail!(
                    "{}: expected {} Received headers, parsed {}",
                    resolved.display(),
                    expected,
                    parsed.received.len()
                );
            }
            log::info!("Verified {}", resolved.display());
        }

        if cli.json {
            summaries.push(json!({
                "path": resolved,
                "from": message.header("From"),
                "to": message.header("To"),
                "subject": message.header("Subject"),
                "message_id": message.header("Message-ID"),
                "received": message.headers_named("Received").collect::<Vec<_>>(),
            }));
        } else {
            println!("Wrote: {}", resolved.display());
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    }

    Ok(())
}
