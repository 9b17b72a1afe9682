use ftx_rest::core::config::FtxConfig;
use ftx_rest::{FtxBuilder, VenueResponse};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Falls back to public endpoints when FTX_API_KEY / FTX_SECRET_KEY are not set
    let config = FtxConfig::from_env("FTX").unwrap_or_else(|_| FtxConfig::read_only());
    let ftx = FtxBuilder::new().with_config(config.clone()).build()?;

    println!("Fetching markets...");
    match ftx.list_markets().await? {
        VenueResponse::Success(markets) => {
            let markets = markets.as_array().cloned().unwrap_or_default();
            println!("Found {} markets", markets.len());
            for market in markets.iter().take(5) {
                println!(
                    "Market: {} ({}), price: {}",
                    market["name"], market["type"], market["price"]
                );
            }
        }
        VenueResponse::Rejected(error) => println!("Venue rejected request: {}", error),
    }

    if config.has_credentials() {
        match ftx.get_balances().await? {
            VenueResponse::Success(balances) => println!("Balances: {}", balances),
            VenueResponse::Rejected(error) => println!("Balances rejected: {}", error),
        }
    }

    Ok(())
}
