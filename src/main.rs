use bidscope::analysis_core::{compare_searches, OutlierFilter, SearchResultSet};
use bidscope::config::{Cli, RunConfig};
use bidscope::ebay::EbayProviderFactory;
use bidscope::export;
use bidscope::scrape_core::{Normalizer, PaginationError};
use clap::Parser;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let config = match RunConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            process::exit(2);
        }
    };

    log::info!("🔎 Starting bidscope");
    log::info!("   Terms: {}", config.terms.join(", "));
    log::info!("   Locale: {}", config.locale.as_str());
    log::info!("   Marketplace: ebay.{}", config.domain);
    match config.outlier_bias {
        Some(bias) => log::info!("   Outlier filter: ±{:.0}% of average", bias * 100.0),
        None => log::info!("   Outlier filter: off"),
    }

    // Interrupts are honored at page boundaries only; the engine releases
    // the provider session before the abort reaches us.
    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt requested, stopping at the next page boundary");
                interrupt.store(true, Ordering::Relaxed);
            }
        });
    }

    let factory = match EbayProviderFactory::new(
        &config.domain,
        config.page_size,
        Duration::from_secs(config.request_timeout_secs),
    ) {
        Ok(factory) => factory,
        Err(e) => {
            log::error!("Could not build the page client: {}", e);
            process::exit(1);
        }
    };

    let normalizer = Normalizer::new(config.locale);
    let filter = match config.outlier_bias.map(OutlierFilter::new).transpose() {
        Ok(filter) => filter,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            process::exit(2);
        }
    };

    let set = match compare_searches(
        &factory,
        &config.terms,
        &normalizer,
        filter.as_ref(),
        &interrupt,
    )
    .await
    {
        Ok(set) => set,
        Err(PaginationError::Interrupted) => {
            log::error!("Interrupted by user");
            process::exit(0);
        }
        Err(e) => {
            log::error!("Run failed: {}", e);
            process::exit(1);
        }
    };

    print_table(&set);

    if let Some(path) = &config.export {
        if let Err(e) = export::write_result_set(path, &set) {
            log::error!("Export failed: {}", e);
            process::exit(1);
        }
    }

    if set.has_provider_failure() {
        process::exit(1);
    }
}

fn print_table(set: &SearchResultSet) {
    println!(
        "{:<28} {:>6} {:>8} {:>14}  {}",
        "search", "sales", "dropped", "average", "sold between"
    );
    for report in &set.reports {
        match &report.outcome {
            Ok(result) => {
                let currency = result
                    .listings
                    .first()
                    .map(|l| l.currency.as_str())
                    .unwrap_or("");
                println!(
                    "{:<28} {:>6} {:>8} {:>14}  {} - {}",
                    result.term,
                    result.listings.len(),
                    result.excluded_outliers,
                    format!("{:.2} {}", result.stats.average, currency),
                    result.stats.start.format("%d %b %Y"),
                    result.stats.end.format("%d %b %Y"),
                );
            }
            Err(e) => {
                println!("{:<28} no result ({})", report.term, e);
            }
        }
    }
}
