//! Currency CLI
//!
//! Command-line interface for the Currency API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use currency_client::{ClientError, CurrencyClient};
use currency_types::HistoryQuery;

#[derive(Parser)]
#[command(name = "currency")]
#[command(author, version, about = "Currency rates API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Currency API
    #[arg(
        long,
        env = "CURRENCY_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest rates against a base currency
    Latest {
        /// Base currency code
        #[arg(long, default_value = "EUR")]
        base: String,
    },
    /// Convert an amount between currencies
    Convert {
        /// Amount to convert
        amount: Decimal,
        #[arg(long, default_value = "EUR")]
        from: String,
        #[arg(long, default_value = "USD")]
        to: String,
    },
    /// Historical rates, one page at a time
    History {
        /// Start date (yyyy-MM-dd)
        #[arg(long, default_value = "2024-05-01")]
        from_date: String,
        /// End date (yyyy-MM-dd)
        #[arg(long, default_value = "2024-05-17")]
        to_date: String,
        #[arg(long, default_value = "AUD")]
        currency: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
    /// Check API health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = CurrencyClient::new(&cli.api_url);

    let result = run(&client, cli.command).await;
    match result {
        Err(e) if e.is_not_found() => {
            println!("✗ No data available");
            std::process::exit(1);
        }
        other => Ok(other?),
    }
}

async fn run(client: &CurrencyClient, command: Commands) -> Result<(), ClientError> {
    match command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Latest { base } => {
            let rates = client.latest(&base).await?;
            println!("{}", serde_json::to_string_pretty(&rates)?);
        }

        Commands::Convert { amount, from, to } => {
            let conversion = client.convert(amount, &from, &to).await?;
            println!("{}", serde_json::to_string_pretty(&conversion)?);
        }

        Commands::History {
            from_date,
            to_date,
            currency,
            page,
            page_size,
        } => {
            let query = HistoryQuery {
                from_date,
                to_date,
                currency,
                page,
                page_size,
            };
            let rates = client.history(&query).await?;
            println!("{}", serde_json::to_string_pretty(&rates)?);
        }
    }

    Ok(())
}
