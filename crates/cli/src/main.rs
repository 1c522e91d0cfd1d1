use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use oembed_api::ReqwestFetcher;
use oembed_engine::{Consumer, ConsumerConfig, ResolveOptions};
use oembed_registry::{ProviderRegistry, load_registry};
use oembed_types::EmbedObject;
use oembed_util::FORMAT_PARAM;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();

    let registry = load_registry().context("load provider registry")?;
    debug!(providers = registry.len(), "provider registry loaded");

    match matches.subcommand() {
        Some(("providers", sub)) => print_providers(&registry, sub.get_flag("json")),
        _ => run_resolve(registry, &matches),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// `RUST_LOG` directives, or `info` when unset or unparsable.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn build_cli() -> Command {
    Command::new("oembed")
        .about("Fetch oEmbed representations of resource URLs")
        .version(env!("CARGO_PKG_VERSION"))
        .args_conflicts_with_subcommands(true)
        .subcommand_negates_reqs(true)
        .arg(Arg::new("url").required(true).help("Resource URL to embed"))
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .action(ArgAction::Set)
                .help("Call this oEmbed endpoint directly instead of resolving one"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .action(ArgAction::Set)
                .value_parser(["json", "xml"])
                .help("Response format requested from the endpoint"),
        )
        .arg(
            Arg::new("param")
                .long("param")
                .short('p')
                .action(ArgAction::Append)
                .value_name("KEY=VALUE")
                .help("Extra query parameter sent to the endpoint"),
        )
        .arg(Arg::new("maxwidth").long("maxwidth").value_parser(value_parser!(u32)))
        .arg(Arg::new("maxheight").long("maxheight").value_parser(value_parser!(u32)))
        .arg(
            Arg::new("no-discovery")
                .long("no-discovery")
                .action(ArgAction::SetTrue)
                .help("Only use registered providers"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .value_parser(value_parser!(f64))
                .help("HTTP timeout in seconds"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_parser(["html", "json"])
                .default_value("html")
                .help("Print the rendered HTML or the raw attributes"),
        )
        .subcommand(
            Command::new("providers")
                .about("List registered providers")
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue).help("Print as JSON")),
        )
}

fn run_resolve(registry: ProviderRegistry, matches: &ArgMatches) -> Result<()> {
    let url = matches.get_one::<String>("url").context("missing resource URL")?;
    let options = resolve_options(matches)?;

    let mut config = ConsumerConfig::from_env();
    if let Some(secs) = matches.get_one::<f64>("timeout") {
        if !secs.is_finite() || *secs <= 0.0 {
            bail!("--timeout must be a positive number of seconds");
        }
        config.timeout = Duration::from_secs_f64(*secs);
    }

    let mut consumer = Consumer::with_fetcher(config, registry, Arc::new(ReqwestFetcher::new()));
    let object = consumer
        .resolve(url, &options)
        .with_context(|| format!("resolve {url}"))?;

    match matches.get_one::<String>("output").map(String::as_str) {
        Some("json") => print_attributes(&object)?,
        _ => println!("{}", object.render()),
    }
    Ok(())
}

fn resolve_options(matches: &ArgMatches) -> Result<ResolveOptions> {
    let mut options = ResolveOptions::default();
    if let Some(endpoint) = matches.get_one::<String>("endpoint") {
        options = options.with_endpoint(endpoint.clone());
    }
    if matches.get_flag("no-discovery") {
        options = options.without_discovery();
    }
    for raw in matches.get_many::<String>("param").into_iter().flatten() {
        let (key, value) = parse_param(raw)?;
        options = options.with_param(key, value);
    }
    for name in ["maxwidth", "maxheight"] {
        if let Some(value) = matches.get_one::<u32>(name) {
            options = options.with_param(name, value.to_string());
        }
    }
    if let Some(format) = matches.get_one::<String>("format") {
        options = options.with_param(FORMAT_PARAM, format.clone());
    }
    Ok(options)
}

fn parse_param(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("invalid --param '{raw}'; expected KEY=VALUE");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("invalid --param '{raw}'; key is empty");
    }
    Ok((key.to_string(), value.to_string()))
}

fn print_attributes(object: &EmbedObject) -> Result<()> {
    let rendered = serde_json::to_string_pretty(object.attributes()).context("serialize attributes")?;
    println!("{rendered}");
    Ok(())
}

fn print_providers(registry: &ProviderRegistry, as_json: bool) -> Result<()> {
    if as_json {
        let definitions: Vec<_> = registry.list().iter().map(|provider| provider.to_definition()).collect();
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }
    for provider in registry.list() {
        println!("{}\t{}", provider.name(), provider.endpoint());
        for pattern in provider.patterns() {
            println!("\t{pattern}");
        }
    }
    Ok(())
}
