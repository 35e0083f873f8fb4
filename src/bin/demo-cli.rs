use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "demo-cli")]
#[command(about = "Command-line client for the fanout-demo service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8004")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered users
    Users,
    /// Register a user
    Add { name: String, email: String },
    /// Change a user's name and/or email
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a user
    Delete { id: i64 },
    /// Run the fan-out demonstration
    Fanout {
        /// Run the operations back to back instead of concurrently
        #[arg(long)]
        sequential: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Users => client.get(format!("{base}/users")).send().await?,
        Commands::Add { name, email } => {
            client
                .post(format!("{base}/users"))
                .json(&json!({ "name": name, "email": email }))
                .send()
                .await?
        }
        Commands::Edit { id, name, email } => {
            let mut patch = Map::new();
            if let Some(name) = name {
                patch.insert("name".into(), Value::from(name));
            }
            if let Some(email) = email {
                patch.insert("email".into(), Value::from(email));
            }
            client
                .put(format!("{base}/users/{id}"))
                .json(&patch)
                .send()
                .await?
        }
        Commands::Delete { id } => client.delete(format!("{base}/users/{id}")).send().await?,
        Commands::Fanout { sequential } => {
            let mode = if sequential { "sequential" } else { "concurrent" };
            client
                .post(format!("{base}/async-example?mode={mode}"))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
