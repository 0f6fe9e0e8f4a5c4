use anyhow::Context;
use beacon::client::{Client, Target};
use beacon::config::Config;
use beacon::http::message::ParsedMessage;
use clap::Parser;
use std::path::PathBuf;

/// Fetch a URL with a raw HTTP/1.1 GET request
#[derive(Debug, Parser)]
#[command(name = "beacon-get", version)]
struct Args {
    /// Target URL, e.g. http://localhost:8080/index.html
    #[arg(default_value = "http://localhost:8080/")]
    url: String,

    /// Save the response body here instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ask the server to keep the connection open between requests
    #[arg(long)]
    keep_alive: bool,

    /// Number of times to fetch the URL
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// YAML configuration file
    #[arg(long, env = "BEACON_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(args.config.as_deref())?.client;
    if args.keep_alive {
        cfg.keep_alive = true;
    }

    let target = Target::parse(&args.url)?;
    let mut client = Client::new(&target, &cfg);

    let outcome = tokio::select! {
        res = fetch(&mut client, &target, &args) => res,

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            Ok(())
        }
    };

    client.close().await;
    outcome
}

async fn fetch(client: &mut Client, target: &Target, args: &Args) -> anyhow::Result<()> {
    for _ in 0..args.repeat.max(1) {
        let response = client
            .get(&target.path)
            .await
            .with_context(|| format!("GET {} failed", args.url))?;

        print_head(&response);

        match &args.output {
            Some(path) => {
                tokio::fs::write(path, &response.body)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("\nSaved {} bytes to {}", response.body.len(), path.display());
            }
            None => print_body(&response),
        }
    }

    Ok(())
}

fn print_head(response: &ParsedMessage) {
    println!(
        "{} {} {}",
        response.version(),
        response.status_code().unwrap_or_default(),
        response.reason().unwrap_or_default()
    );
    for (key, value) in response.headers.iter() {
        println!("  {}: {}", key, value);
    }
}

fn print_body(response: &ParsedMessage) {
    let is_text = response
        .header("content-type")
        .map(|ct| ct.contains("text"))
        .unwrap_or(false);

    if !is_text {
        println!("\nReceived binary data ({} bytes)", response.body.len());
        return;
    }

    match std::str::from_utf8(&response.body) {
        Ok(text) => println!("\n{}", text),
        Err(_) => println!(
            "\nReceived text with invalid encoding ({} bytes)",
            response.body.len()
        ),
    }
}
