use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "settings-cli")]
#[command(about = "Management CLI for the site settings service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:2368")]
    url: String,

    /// Bearer token; anonymous when omitted.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List visible settings
    Browse {
        /// Comma-separated access classes (e.g. "blog,theme")
        #[arg(long = "type")]
        class: Option<String>,
    },
    /// Show one setting
    Read { key: String },
    /// Change one setting; the value is parsed as JSON when possible
    Edit { key: String, value: String },
    /// Replace the routes configuration with a local file
    Upload { file: PathBuf },
    /// Print the current routes configuration
    Download,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    match cli.command {
        Commands::Browse { class } => {
            let mut req = client.get(format!("{}/settings", cli.url)).headers(headers);
            if let Some(class) = class {
                req = req.query(&[("type", class)]);
            }
            print_response(req.send().await?).await?;
        }
        Commands::Read { key } => {
            let res = client
                .get(format!("{}/settings/{}", cli.url, key))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Edit { key, value } => {
            let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
            let res = client
                .put(format!("{}/settings", cli.url))
                .headers(headers)
                .json(&json!({ "settings": [{ "key": key, "value": value }] }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Upload { file } => {
            let body = tokio::fs::read(&file).await?;
            let res = client
                .post(format!("{}/settings/routes/yaml", cli.url))
                .headers(headers)
                .body(body)
                .send()
                .await?;
            if res.status().is_success() {
                println!("Routes configuration uploaded from {}", file.display());
            } else {
                print_response(res).await?;
            }
        }
        Commands::Download => {
            let res = client
                .get(format!("{}/settings/routes/yaml", cli.url))
                .headers(headers)
                .send()
                .await?;
            if res.status().is_success() {
                print!("{}", res.text().await?);
            } else {
                print_response(res).await?;
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: settings API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
