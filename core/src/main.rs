use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use spotter_core::{ApiError, ClientConfig, Credentials, SpotterClient, Transport};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse reported animal sightings", long_about = None)]
struct Cli {
    /// API base URL, overrides SPOTTER_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(flatten)]
    account: Account,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct Account {
    #[arg(short, long, env = "SPOTTER_USERNAME")]
    username: String,

    #[arg(short, long, env = "SPOTTER_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the account
    Signup,
    /// List the names of all sightings
    List,
    /// Show one sighting
    Show { name: String },
    /// Download a sighting's image
    Image {
        name: String,
        /// Output file, defaults to <NAME>.<ext>
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let client = SpotterClient::from_config(&config)?;
    let credentials = Credentials::new(cli.account.username, cli.account.password);

    run(&client, &credentials, cli.command).await.map_err(|e| {
        if e.downcast_ref::<ApiError>().is_some_and(ApiError::requires_sign_in) {
            e.context("sign in again with valid credentials")
        } else {
            e
        }
    })
}

async fn run<T: Transport>(
    client: &SpotterClient<T>,
    credentials: &Credentials,
    command: Command,
) -> anyhow::Result<()> {
    if let Command::Signup = command {
        client.sign_up(credentials).await?;
        println!("account {} created", credentials.username);
        return Ok(());
    }

    client.sign_in(credentials).await?;
    match command {
        Command::Signup => {}
        Command::List => {
            for name in client.fetch_all_animal_names().await? {
                println!("{name}");
            }
        }
        Command::Show { name } => {
            let animal = client.fetch_details(&name).await?;
            println!("{} (#{})", animal.name, animal.id);
            println!("seen:     {}", animal.time_seen.format("%Y-%m-%d %H:%M:%S UTC"));
            println!("location: {:.4}, {:.4}", animal.latitude, animal.longitude);
            println!("image:    {}", animal.image_url);
            println!();
            println!("{}", animal.description);
        }
        Command::Image { name, out } => {
            let animal = client.fetch_details(&name).await?;
            let image = client.fetch_image(&animal.image_url).await?;
            let extension = image.format.extensions_str().first().copied().unwrap_or("img");
            let path = out.unwrap_or_else(|| default_image_path(&name, extension));
            std::fs::write(&path, &image.bytes).with_context(|| format!("writing {}", path.display()))?;
            println!("saved {}x{} image to {}", image.width, image.height, path.display());
        }
    }
    Ok(())
}

/// `<NAME>.<ext>` in the working directory, with anything outside
/// `[A-Za-z0-9_-]` in the name replaced so it stays one plain file name.
fn default_image_path(name: &str, extension: &str) -> PathBuf {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "image".to_string() } else { stem };
    PathBuf::from(format!("{stem}.{extension}"))
}
