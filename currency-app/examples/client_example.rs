//! Client example driving the currency server against a local fake Frankfurter.
//!
//! Run with: cargo run -p currency-app --example client_example

use std::sync::Arc;

use axum::{Json, Router, extract::Query, routing::get};
use currency_cache::CacheAside;
use currency_client::CurrencyClient;
use currency_hex::{CurrencyService, ServiceSettings, inbound::HttpServer};
use currency_provider::{ProviderSettings, build_provider};
use currency_types::HistoryQuery;
use tokio::net::TcpListener;

/// Minimal stand-in for the Frankfurter API.
fn fake_frankfurter() -> Router {
    Router::new()
        .route(
            "/latest",
            get(
                |Query(q): Query<std::collections::HashMap<String, String>>| async move {
                    let base = q.get("from").cloned().unwrap_or_else(|| "EUR".into());
                    let amount: f64 = q.get("amount").and_then(|a| a.parse().ok()).unwrap_or(1.0);
                    let rates = match q.get("to") {
                        Some(to) => {
                            let mut one = serde_json::Map::new();
                            one.insert(to.clone(), serde_json::json!(amount * 1.0844));
                            serde_json::Value::Object(one)
                        }
                        None => serde_json::json!({ "AUD": 1.6281, "GBP": 0.8571, "USD": 1.0844 }),
                    };
                    Json(serde_json::json!({
                        "amount": amount, "base": base, "date": "2024-05-17", "rates": rates
                    }))
                },
            ),
        )
        .route(
            "/{range}",
            get(|| async {
                Json(serde_json::json!({
                    "amount": 1.0, "base": "EUR",
                    "start_date": "2024-05-01", "end_date": "2024-05-03",
                    "rates": {
                        "2024-05-01": { "AUD": 1.6346 },
                        "2024-05-02": { "AUD": 1.6313 },
                        "2024-05-03": { "AUD": 1.6271 }
                    }
                }))
            }),
        )
}

async fn spawn(router: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("server error: {e}");
        }
    });
    Ok(format!("http://{addr}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    let upstream = spawn(fake_frankfurter()).await?;
    println!("🚀 Fake Frankfurter on {upstream}");

    // Wire the real stack against it
    let provider = build_provider(&ProviderSettings::new(upstream))?;
    let settings = ServiceSettings::default().with_exclusions(["TRY", "PLN", "THB", "MXN"]);
    let service = CurrencyService::new(provider, Arc::new(CacheAside::new()), settings);
    let base_url = spawn(HttpServer::new(service).router()).await?;
    println!("🚀 Currency server on {base_url}");

    let client = CurrencyClient::new(&base_url);

    // ─────────────────────────────────────────────────────────────────────────
    // Demo
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let latest = client.latest("eur").await?;
    println!("✅ Latest {} rates: {:?}", latest.base, latest.rates);

    let conversion = client.convert("10".parse()?, "EUR", "USD").await?;
    println!("✅ 10 EUR = {} USD", conversion.rates["USD"]);

    let excluded = client.convert("10".parse()?, "EUR", "TRY").await;
    println!("✅ Excluded currency rejected: {}", excluded.unwrap_err());

    let history = client
        .history(&HistoryQuery {
            page_size: 2,
            ..HistoryQuery::default()
        })
        .await?;
    println!("\n📋 First page of AUD history:");
    for (date, rates) in history {
        println!("   - {date}: {}", rates["AUD"]);
    }

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
