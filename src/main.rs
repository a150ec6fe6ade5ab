mod analyze;
mod classify;
mod clock;
mod content;
mod crawl;
mod endpoint;
mod menu;
mod probe;
mod registry;
mod report;
mod size;
mod timeouts;
mod transport;

use std::process::ExitCode;

use clap::Parser;

use crawl::{CrawlError, Crawler};
use endpoint::{DnsError, Endpoint};
use timeouts::Timeouts;

/// Recursive crawler and analyzer for a single Gopher (RFC 1436) server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Hostname of the Gopher server to crawl.
    hostname: String,

    /// Port the Gopher server listens on.
    port: u16,

    /// Emit per-line parse tracing at debug level.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[async_std::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        femme::with_level(log::LevelFilter::Debug);
    } else {
        femme::start();
    }

    let endpoint = match Endpoint::resolve(&args.hostname, args.port).await {
        Ok(e) => e,
        Err(e) => return fatal_dns(e),
    };

    let timeouts = Timeouts::default();
    let crawler = Crawler::new(endpoint.clone(), timeouts);

    let mut registry = match crawler.run().await {
        Ok(registry) => registry,
        Err(e) => return fatal_crawl(e),
    };

    let analysis = analyze::analyze(&endpoint, &timeouts, &mut registry).await;

    let mut stdout = std::io::stdout();
    if let Err(e) = report::write_report(&mut stdout, &endpoint, &analysis) {
        log::error!("failed to write report: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn fatal_dns(err: DnsError) -> ExitCode {
    log::error!("{}", err);
    eprintln!("{}", err);
    ExitCode::FAILURE
}

fn fatal_crawl(err: CrawlError) -> ExitCode {
    log::error!("{}", err);
    eprintln!("{}", err);
    ExitCode::FAILURE
}
