use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use webparser_core::bundle::{build_site_bundle, write_site_bundle};
use webparser_core::{export, logging};
use webparser_core::{CrawlConfig, Crawler};

#[derive(Parser)]
#[command(name = "webparser")]
#[command(about = "Polite site crawler: link graph and site-bundle exporter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl seed URLs and export edges.csv and graph.json
    Crawl(CrawlArgs),
    /// Assemble site_bundle.json from graph.json and saved content
    SiteBundle(SiteBundleArgs),
    /// Crawl a site and emit a single bundle file in one step
    CrawlBundle(CrawlBundleArgs),
}

#[derive(Args)]
struct LogArgs {
    /// Log level (trace/debug/info/warn/error); RUST_LOG overrides
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
    /// Write logs to a file instead of stdout
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args)]
struct CrawlArgs {
    /// Seed URLs (one or more)
    #[arg(long, required = true, num_args = 1..)]
    seeds: Vec<String>,
    #[arg(long, default_value_t = 2)]
    max_depth: usize,
    #[arg(long, default_value_t = 10_000)]
    max_pages: usize,
    #[arg(long, default_value_t = 10)]
    concurrency: usize,
    #[arg(long, default_value_t = 2.0)]
    per_host_rps: f64,
    /// Keep discovered links inside the seeds' registrable domains (default)
    #[arg(long, overrides_with = "no_same_domain_only")]
    same_domain_only: bool,
    #[arg(long)]
    no_same_domain_only: bool,
    #[arg(long, default_value = "edges.csv")]
    edges_csv: PathBuf,
    #[arg(long, default_value = "graph.json")]
    graph_json: PathBuf,
    /// Save minimal HTML per page under --content-dir
    #[arg(long, overrides_with = "no_save_content")]
    save_content: bool,
    #[arg(long)]
    no_save_content: bool,
    #[arg(long, default_value = "content")]
    content_dir: PathBuf,
    /// Keep only headings and paragraphs in saved content
    #[arg(long, overrides_with = "no_content_text_only")]
    content_text_only: bool,
    #[arg(long)]
    no_content_text_only: bool,
    #[command(flatten)]
    log: LogArgs,
}

#[derive(Args)]
struct SiteBundleArgs {
    #[arg(long)]
    graph_json: PathBuf,
    #[arg(long)]
    content_dir: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Restrict the bundle to one site (FQDN suffix match)
    #[arg(long)]
    site_url: Option<String>,
    /// Root URL for depth computation (defaults to --site-url)
    #[arg(long)]
    root_url: Option<String>,
}

#[derive(Args)]
struct CrawlBundleArgs {
    /// Seed URL of the site
    #[arg(long)]
    seed: String,
    /// Output bundle path
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value_t = 2)]
    max_depth: usize,
    #[arg(long, default_value_t = 2_000)]
    max_pages: usize,
    #[arg(long, default_value_t = 10)]
    concurrency: usize,
    #[arg(long, default_value_t = 2.0)]
    per_host_rps: f64,
    #[arg(long, overrides_with = "no_same_domain_only")]
    same_domain_only: bool,
    #[arg(long)]
    no_same_domain_only: bool,
    /// Keep only headings and paragraphs in page text (default)
    #[arg(long, overrides_with = "no_content_text_only")]
    content_text_only: bool,
    #[arg(long)]
    no_content_text_only: bool,
    #[command(flatten)]
    log: LogArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Crawl(args) => run_crawl(args).await,
        Commands::SiteBundle(args) => run_site_bundle(args),
        Commands::CrawlBundle(args) => run_crawl_bundle(args).await,
    }
}

async fn run_crawl(args: CrawlArgs) -> Result<()> {
    logging::init(&args.log.log_level, args.log.log_json, args.log.log_file.as_deref())?;

    let cfg = CrawlConfig {
        seeds: args.seeds,
        max_depth: args.max_depth,
        max_pages: args.max_pages,
        same_domain_only: args.same_domain_only || !args.no_same_domain_only,
        concurrency: args.concurrency,
        per_host_rps: args.per_host_rps,
        save_content: args.save_content && !args.no_save_content,
        content_dir: args.content_dir,
        content_text_only: args.content_text_only && !args.no_content_text_only,
        ..Default::default()
    };
    let crawler = Crawler::new(cfg)?;
    crawler.run().await?;

    let graph = crawler.graph();
    export::write_edges_csv(&args.edges_csv, &graph.edges())?;
    export::write_graph_json(&args.graph_json, graph.nodes(), graph.edges())?;
    tracing::info!(
        edges_csv = %args.edges_csv.display(),
        graph_json = %args.graph_json.display(),
        "exports written"
    );
    Ok(())
}

fn run_site_bundle(args: SiteBundleArgs) -> Result<()> {
    let bundle = build_site_bundle(
        &args.graph_json,
        &args.content_dir,
        args.site_url.as_deref(),
        args.root_url.as_deref(),
    )?;
    write_site_bundle(&args.out, &bundle)?;
    Ok(())
}

async fn run_crawl_bundle(args: CrawlBundleArgs) -> Result<()> {
    logging::init(&args.log.log_level, args.log.log_json, args.log.log_file.as_deref())?;

    // graph.json and the content tree are staging artifacts; only the bundle
    // file survives.
    let staging = tempfile::Builder::new().prefix("crawl_bundle_").tempdir()?;
    let content_dir = staging.path().join("content");
    let graph_json = staging.path().join("graph.json");

    let cfg = CrawlConfig {
        seeds: vec![args.seed.clone()],
        max_depth: args.max_depth,
        max_pages: args.max_pages,
        same_domain_only: args.same_domain_only || !args.no_same_domain_only,
        concurrency: args.concurrency,
        per_host_rps: args.per_host_rps,
        save_content: true,
        content_dir: content_dir.clone(),
        content_text_only: args.content_text_only || !args.no_content_text_only,
        ..Default::default()
    };
    let crawler = Crawler::new(cfg)?;
    crawler.run().await?;

    let graph = crawler.graph();
    export::write_graph_json(&graph_json, graph.nodes(), graph.edges())?;
    let bundle = build_site_bundle(&graph_json, &content_dir, Some(&args.seed), Some(&args.seed))?;
    write_site_bundle(&args.out, &bundle)?;
    tracing::info!(
        out = %args.out.display(),
        pages = bundle.pages.len(),
        edges = bundle.edges.len(),
        "bundle written"
    );
    Ok(())
}
