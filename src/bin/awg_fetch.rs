//! awg-fetch: fetch URLs through the caching pipeline and report cache behaviour.
//!
//! Usage:
//!   awg-fetch [--repeat N] [--no-cache] [--base <url>] <url-or-path>...

use anyhow::{bail, Context};
use awg_http_cache::cache::CacheConfig;
use awg_http_cache::HttpClientBuilder;
use tracing_subscriber::EnvFilter;

struct Args {
    repeat: usize,
    no_cache: bool,
    base: Option<String>,
    targets: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    match argv.first().map(String::as_str) {
        None | Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            return Ok(());
        }
        Some("version") | Some("--version") | Some("-V") => {
            println!("awg-fetch {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let args = parse_args(&argv)?;
    init_tracing();

    run(args).await
}

fn print_usage() {
    println!(
        r#"awg-fetch - fetch through the AWG HTTP cache

USAGE:
    awg-fetch [OPTIONS] <URL-OR-PATH>...

OPTIONS:
    --repeat <N>      Fetch every target N times (default 2)
    --no-cache        Disable the response cache
    --base <URL>      Base URL for relative paths (overrides AWG_API_ENDPOINT)
    -h, --help        Show this help message
    -V, --version     Show version information

ENVIRONMENT:
    AWG_API_ENDPOINT            Base URL for relative paths
    AWG_HTTP_TIMEOUT_SECS       Transport timeout (default 30)
    AWG_PROXY_URL               Proxy for all requests
    AWG_HTTP_CACHE_ENABLED      Set to 0/false/off to disable caching
    RUST_LOG                    Log filter (default awg_http_cache=info)"#
    );
}

fn parse_args(argv: &[String]) -> anyhow::Result<Args> {
    let mut args = Args {
        repeat: 2,
        no_cache: false,
        base: None,
        targets: Vec::new(),
    };
    let mut it = argv.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--repeat" => {
                let n = it.next().context("--repeat needs a value")?;
                args.repeat = n
                    .parse::<usize>()
                    .with_context(|| format!("invalid --repeat value: {n}"))?
                    .max(1);
            }
            "--no-cache" => args.no_cache = true,
            "--base" => {
                args.base = Some(it.next().context("--base needs a value")?.clone());
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            target => args.targets.push(target.to_string()),
        }
    }
    if args.targets.is_empty() {
        bail!("no URL given; see awg-fetch --help");
    }
    Ok(args)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("awg_http_cache=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = CacheConfig::from_env();
    if args.no_cache {
        config = config.with_enabled(false);
    }

    let mut builder = HttpClientBuilder::from_env_with_cache(config)?;
    if let Some(base) = &args.base {
        builder = builder.base_url(base)?;
    }
    let client = builder.build()?;
    let cache = client
        .cache()
        .cloned()
        .context("client was built without a cache")?;

    for target in &args.targets {
        for attempt in 1..=args.repeat {
            let hits_before = cache.stats().hits;
            match client.get(target).await {
                Ok(resp) => {
                    let source = if cache.stats().hits > hits_before {
                        "hit"
                    } else {
                        "network"
                    };
                    println!(
                        "{target} #{attempt}: {} {} bytes ({source})",
                        resp.status(),
                        resp.body().len()
                    );
                }
                Err(e) => println!("{target} #{attempt}: error: {e}"),
            }
        }
    }

    let stats = cache.stats();
    println!(
        "cache: {} entries, {} hits, {} misses, {} stored (hit ratio {:.2})",
        cache.len(),
        stats.hits,
        stats.misses,
        stats.sets,
        stats.hit_ratio()
    );
    Ok(())
}
