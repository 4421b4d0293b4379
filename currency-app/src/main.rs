//! # Currency Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the shared cache and the Frankfurter provider
//! - Create the currency service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currency_cache::CacheAside;
use currency_hex::{CurrencyService, ServiceSettings, inbound::HttpServer};
use currency_provider::{ProviderSettings, RetryPolicy, build_provider};

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("currency-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // OpenTelemetry export is only switched on when a collector is configured
    let otel = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .ok()
        .map(|endpoint| init_tracer(&endpoint))
        .transpose()?;
    let (telemetry, otel_provider) = match otel {
        Some((tracer, provider)) => (
            Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Some(provider),
        ),
        None => (None, None),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,currency_app=debug,currency_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting currency server on port {}", config.port);
    tracing::info!(
        upstream = %config.frank_api,
        cache_ttl = ?config.cache_ttl,
        single_flight = config.cache_single_flight,
        excluded = ?config.exclusion_list,
        "Configuration loaded"
    );

    // One store for the whole process, shared by every request
    let cache = if config.cache_single_flight {
        CacheAside::with_single_flight()
    } else {
        CacheAside::new()
    };

    let provider = build_provider(&ProviderSettings {
        timeout: config.upstream_timeout,
        retry: RetryPolicy {
            max_retries: config.upstream_max_retries,
            ..RetryPolicy::default()
        },
        ..ProviderSettings::new(config.frank_api.as_str())
    })?;

    // Create the currency service
    let settings = ServiceSettings {
        cache_ttl: config.cache_ttl,
        cache_empty_results: config.cache_empty_results,
        ..ServiceSettings::default()
    }
    .with_exclusions(&config.exclusion_list);
    let service = CurrencyService::new(provider, Arc::new(cache), settings);

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    Ok(())
}
