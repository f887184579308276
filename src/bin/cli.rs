//! Course Catalogue CLI
//!
//! Serves the catalogue API, or runs one-shot crawls and semester lookups.

use std::path::PathBuf;
use std::sync::Arc;

use catalogue::{
    api::{self, AppState},
    error::{AppError, Result},
    models::{Config, Semester},
    services::{CatalogueCrawler, CourseParser, SemesterResolver, resolver_for},
    storage::CourseStore,
    utils::http::{self, HttpFetcher},
};
use clap::{Parser, Subcommand};

/// Course Catalogue - university course query crawler and API
#[derive(Parser, Debug)]
#[command(name = "catalogue", version, about = "Course catalogue crawler and API")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "catalogue.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Address to bind (overrides server.addr)
        #[arg(long)]
        addr: Option<String>,

        /// Crawl the whole catalogue before serving
        #[arg(long)]
        precache: bool,
    },

    /// Crawl once and print the courses as JSON
    Crawl {
        /// Only crawl this department
        #[arg(short, long)]
        department: Option<String>,

        /// Semester code to crawl (default: current)
        #[arg(short, long)]
        semester: Option<String>,
    },

    /// Show a semester (current when omitted)
    Semester { code: Option<String> },

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Everything the commands share.
struct Runtime {
    crawler: Arc<CatalogueCrawler>,
    resolver: Arc<dyn SemesterResolver>,
}

impl Runtime {
    /// Wire up the crawler for `semester`, or the resolver's current one.
    async fn build(config: &Config, semester: Option<String>) -> Result<Self> {
        let client = http::create_async_client(&config.crawler)?;
        let resolver = resolver_for(
            config.semester.strategy,
            client.clone(),
            &config.crawler.base_url,
        );

        let semester = match semester {
            Some(code) => Semester::parse(&code)?.code,
            None => resolver.current_code().await.map_err(|e| {
                AppError::config(format!("cannot resolve current semester: {e}"))
            })?,
        };
        log::info!("Using semester {semester}");

        let crawler = CatalogueCrawler::new(
            &config.crawler,
            CourseParser::new(&config.parser)?,
            Arc::new(HttpFetcher::new(client)),
            Arc::new(CourseStore::new()),
            &semester,
        );

        Ok(Self {
            crawler: Arc::new(crawler),
            resolver,
        })
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config);
    init_logging(cli.verbose, &config.logging.level);

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {e}");
        return Err(e);
    }

    match cli.command {
        Command::Serve { addr, precache } => {
            if let Some(addr) = addr {
                config.server.addr = addr;
            }

            let runtime = Runtime::build(&config, None).await?;
            let state = AppState::new(Arc::clone(&runtime.crawler), runtime.resolver);
            for line in state.build_info.to_string().lines() {
                log::info!("{line}");
            }

            if precache || config.server.precache {
                log::info!("Pre-caching current semester courses...");
                runtime.crawler.crawl_all().await;
            }

            api::serve(&config.server, state).await?;
        }

        Command::Crawl {
            department,
            semester,
        } => {
            let runtime = Runtime::build(&config, semester).await?;
            let outcome = match department {
                Some(department) => runtime.crawler.crawl_department(&department).await?,
                None => runtime.crawler.crawl_all().await,
            };
            log::info!(
                "Collected {} courses from {} departments",
                outcome.courses_stored,
                outcome.departments_visited
            );

            let courses = runtime.crawler.store().list();
            println!("{}", serde_json::to_string_pretty(&courses)?);
        }

        Command::Semester { code } => {
            let semester = match code {
                Some(code) => Semester::parse(&code)?,
                None => {
                    let client = http::create_async_client(&config.crawler)?;
                    resolver_for(config.semester.strategy, client, &config.crawler.base_url)
                        .current()
                        .await?
                }
            };
            println!("{}", serde_json::to_string_pretty(&semester)?);
        }

        Command::Validate => {
            log::info!("✓ Config OK ({})", cli.config.display());
        }
    }

    Ok(())
}
