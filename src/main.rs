use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use searchfront::api::DEFAULT_API_URL;
use searchfront::render::{DocumentView, ResultsView};
use searchfront::{
    ApiClient, Command, ConnectionStatus, DocumentViewer, Flow, Ranking, RankingMethod,
    ResultLimit, SearchController, SearchOptions, Session,
};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal client for a remote document search API", long_about = None)]
struct Args {
    /// Base URL of the search API
    #[arg(long, env = "SEARCHFRONT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Request timeout in seconds (transport default when unset)
    #[arg(long, env = "SEARCHFRONT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Results per search: 5, 10, 20 or 50
    #[arg(short, long, default_value_t = 10)]
    limit: u32,

    /// Ranking method: tfidf, svd or low-rank
    #[arg(short, long)]
    method: Option<String>,

    /// Rank parameter for svd / low-rank
    #[arg(short, long)]
    k: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the API connection and print index statistics
    Status,
    /// Run a single search and print the results
    Search {
        /// Query text
        query: Vec<String>,
    },
    /// Print one document
    Show {
        /// Document identifier
        id: String,
    },
    /// Interactive session (default)
    Interactive,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "searchfront=debug" } else { "searchfront=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn search_options(args: &Args) -> Result<SearchOptions> {
    let mut options = SearchOptions::default().with_limit(ResultLimit::try_from(args.limit)?);
    if let Some(method) = &args.method {
        let method: RankingMethod = method.parse()?;
        let k = if method.requires_k() {
            Some(args.k.unwrap_or(searchfront::session::DEFAULT_K))
        } else {
            args.k
        };
        options = options.with_ranking(Ranking::new(method, k)?);
    }
    Ok(options)
}

/// Run `fut` behind a spinner while it is pending
async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

async fn run_status(api: &ApiClient) -> Result<()> {
    let mut session = Session::new(api.clone(), SearchOptions::default());
    let status = with_spinner("Checking connection...", session.start()).await;
    print!("{}", session.render());
    if status != ConnectionStatus::Connected {
        bail!("search API unreachable");
    }
    Ok(())
}

async fn run_search(api: &ApiClient, query: &str, options: SearchOptions) -> Result<()> {
    let mut controller = SearchController::new(options);
    let submitted = with_spinner(
        "Searching...",
        controller.submit_search(api, query, options),
    )
    .await;
    if !submitted {
        bail!("query is empty");
    }
    print!("{}", ResultsView::project(controller.state()));
    Ok(())
}

async fn run_show(api: &ApiClient, id: &str) -> Result<()> {
    let mut viewer = DocumentViewer::new(id);
    let state = with_spinner("Loading document...", viewer.load_document(api, None)).await;
    print!("{}", DocumentView(state));
    Ok(())
}

async fn run_interactive(api: ApiClient, options: SearchOptions) -> Result<()> {
    let mut session = Session::new(api, options);
    with_spinner("Checking connection...", session.start()).await;
    println!("searchfront {} · type :help for commands", searchfront::VERSION);
    print!("{}", session.render());

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        let flow = if command.is_remote() {
            with_spinner("Working...", session.handle(command)).await
        } else {
            session.handle(command).await
        };
        if flow == Flow::Quit {
            break;
        }
        print!("{}", session.render());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let options = search_options(&args)?;
    let timeout = args.timeout_secs.map(Duration::from_secs);
    let api = ApiClient::with_timeout(&args.api_url, timeout)
        .with_context(|| format!("Invalid API URL '{}'", args.api_url))?;
    tracing::debug!("Using search API at {}", searchfront::SearchApi::base_url(&api));

    match args.command {
        Some(Commands::Status) => run_status(&api).await,
        Some(Commands::Search { ref query }) => run_search(&api, &query.join(" "), options).await,
        Some(Commands::Show { ref id }) => run_show(&api, id).await,
        Some(Commands::Interactive) | None => run_interactive(api, options).await,
    }
}
