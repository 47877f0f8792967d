use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use emote_core::{
    render, EmoteConfig, EmoteLinks, EmoteRecord, HoverPreview, HtmlSink, MatchPolicy,
    PlainTextSink, RenderOptions,
};
use emote_runtime::{EmoteStore, LoadOutcome, LoadReport};
use emote_source::{DictionarySource, FileSource, SevenTvSource};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "emotes")]
#[command(about = "Replace emote names in chat text with inline emotes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (TOML); missing file means defaults
    #[arg(long, global = true, default_value = ".emotes/config.toml")]
    config: PathBuf,

    /// Read the emote set from a saved API response instead of the network
    #[arg(long, global = true)]
    payload: Option<PathBuf>,

    /// Override the configured match policy
    #[arg(long, global = true, value_enum)]
    policy: Option<PolicyArg>,

    /// Override the configured emote set id
    #[arg(long, global = true)]
    emote_set: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment and render text (reads stdin lines when no text is given)
    Render(RenderArgs),

    /// Ranked emote name search
    Search(SearchArgs),

    /// Show one emote with its links and preview
    Lookup(LookupArgs),

    /// Summary of the loaded emote set
    Stats(JsonArgs),

    /// Inspect or create the config file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
struct RenderArgs {
    /// Text to render
    text: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Override the emote height in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Omit hover preview attributes
    #[arg(long)]
    no_preview: bool,
}

#[derive(Args)]
struct SearchArgs {
    query: String,

    #[arg(long, default_value_t = 10)]
    limit: usize,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct LookupArgs {
    name: String,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct JsonArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective config
    Show,

    /// Write the default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Word,
    CaseInsensitive,
    Colon,
}

impl From<PolicyArg> for MatchPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Word => MatchPolicy::Word,
            PolicyArg::CaseInsensitive => MatchPolicy::CaseInsensitive,
            PolicyArg::Colon => MatchPolicy::Colon,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Html,
    Plain,
    Json,
}

#[derive(Serialize)]
struct LookupOutput<'a> {
    record: &'a EmoteRecord,
    links: EmoteLinks,
    preview: Option<HoverPreview>,
}

#[derive(Serialize)]
struct StatsOutput {
    emote_set_id: String,
    policy: MatchPolicy,
    emotes: usize,
    animated: usize,
    generation: u64,
    skipped_no_asset: usize,
    skipped_invalid_name: usize,
    duplicates: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = EmoteConfig::load(&cli.config)
        .with_context(|| format!("Failed to read config {}", cli.config.display()))?;
    if let Some(policy) = cli.policy {
        config.match_policy = policy.into();
    }
    if let Some(set_id) = &cli.emote_set {
        config.emote_set_id = set_id.clone();
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose || config.debug_mode {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Config(cmd) => run_config(cmd, &cli.config, &config),
        Commands::Render(args) => {
            let (store, _) = load_store(config, cli.payload).await?;
            run_render(&store, args)
        }
        Commands::Search(args) => {
            let (store, _) = load_store(config, cli.payload).await?;
            run_search(&store, args)
        }
        Commands::Lookup(args) => {
            let (store, _) = load_store(config, cli.payload).await?;
            run_lookup(&store, args)
        }
        Commands::Stats(args) => {
            let (store, report) = load_store(config, cli.payload).await?;
            run_stats(&store, report, args)
        }
    }
}

async fn load_store(
    config: EmoteConfig,
    payload: Option<PathBuf>,
) -> Result<(EmoteStore, LoadReport)> {
    let source: Box<dyn DictionarySource> = match payload {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(
            SevenTvSource::new(config.api_base_url.clone())
                .context("Failed to create HTTP client")?,
        ),
    };

    let store = EmoteStore::new(config);
    match store
        .load(source.as_ref())
        .await
        .context("Failed to load emotes")?
    {
        LoadOutcome::Published(report) => Ok((store, report)),
        LoadOutcome::Discarded => anyhow::bail!("Emote store shut down during load"),
    }
}

fn run_render(store: &EmoteStore, args: RenderArgs) -> Result<()> {
    let mut options = store.render_options();
    if let Some(size) = args.size {
        options.emote_display_size = size;
    }
    if args.no_preview {
        options.show_preview_on_hover = false;
    }

    if args.text.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            print_stdout(&render_text(store, &line, &options, args.format)?)?;
        }
        return Ok(());
    }

    let text = args.text.join(" ");
    print_stdout(&render_text(store, &text, &options, args.format)?)
}

fn render_text(
    store: &EmoteStore,
    text: &str,
    options: &RenderOptions,
    format: OutputFormat,
) -> Result<String> {
    let segments = store.segment(text);
    Ok(match format {
        OutputFormat::Html => {
            let mut sink = HtmlSink::new();
            render(&segments, options, &mut sink);
            sink.finish()
        }
        OutputFormat::Plain => {
            let mut sink = PlainTextSink::new();
            render(&segments, options, &mut sink);
            sink.finish()
        }
        OutputFormat::Json => serde_json::to_string(&segments)?,
    })
}

fn run_search(store: &EmoteStore, args: SearchArgs) -> Result<()> {
    let names = store.search(&args.query, Some(args.limit));
    if args.json {
        return print_stdout(&serde_json::to_string_pretty(&names)?);
    }
    if names.is_empty() {
        log::info!("No emotes match '{}'", args.query);
    }
    for name in names {
        print_stdout(&name)?;
    }
    Ok(())
}

fn run_lookup(store: &EmoteStore, args: LookupArgs) -> Result<()> {
    let dictionary = store.dictionary();
    let record = dictionary
        .resolve(&args.name)
        .or_else(|| {
            store
                .policy()
                .is_case_insensitive()
                .then(|| dictionary.resolve_case_insensitive(&args.name))
                .flatten()
        })
        .with_context(|| format!("Unknown emote '{}'", args.name))?;

    let config = store.config();
    let output = LookupOutput {
        record,
        links: EmoteLinks::for_record(record, &config.asset.extension),
        preview: HoverPreview::for_emote(record, &store.render_options()),
    };

    if args.json {
        return print_stdout(&serde_json::to_string_pretty(&output)?);
    }

    let mut text = format!(
        "{} ({})\n  by {}\n  animated: {}\n  image: {}\n  page: {}",
        record.name(),
        record.source_id(),
        record.creator_label(),
        record.animated(),
        record.asset_url(),
        output.links.page_url,
    );
    for (label, url) in [
        ("1x", &output.links.image_1x),
        ("2x", &output.links.image_2x),
        ("4x", &output.links.image_4x),
    ] {
        text.push_str(&format!("\n  {label}: {url}"));
    }
    print_stdout(&text)
}

fn run_stats(store: &EmoteStore, report: LoadReport, args: JsonArgs) -> Result<()> {
    let config = store.config();
    let stats = StatsOutput {
        emote_set_id: config.emote_set_id,
        policy: config.match_policy,
        emotes: report.emotes,
        animated: report.animated,
        generation: report.generation,
        skipped_no_asset: report.build.skipped_no_asset,
        skipped_invalid_name: report.build.skipped_invalid_name,
        duplicates: report.build.duplicates,
    };

    if args.json {
        return print_stdout(&serde_json::to_string_pretty(&stats)?);
    }
    print_stdout(&format!(
        "emote set {}: {} emotes ({} animated), policy {}, skipped {} without asset, {} invalid names, {} duplicates",
        stats.emote_set_id,
        stats.emotes,
        stats.animated,
        stats.policy,
        stats.skipped_no_asset,
        stats.skipped_invalid_name,
        stats.duplicates,
    ))
}

fn run_config(cmd: ConfigCommand, path: &std::path::Path, config: &EmoteConfig) -> Result<()> {
    match cmd {
        ConfigCommand::Show => print_stdout(config.to_toml()?.trim_end()),
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            EmoteConfig::default()
                .save(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
            Ok(())
        }
    }
}
