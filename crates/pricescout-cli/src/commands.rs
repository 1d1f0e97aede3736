//! Subcommand implementations: thin presentation over the engine.

use std::sync::Arc;

use anyhow::{bail, Context};
use pricescout_core::{cheapest, AppConfig, VendorResult};
use pricescout_db::{Pool, PoolConfig};
use pricescout_scraper::{default_registry, PriceScout, ProgressFn, ScraperConfig};

pub async fn lookup(config: &AppConfig, mpn: &str, save: bool) -> anyhow::Result<()> {
    let scout = build_engine(config)?;
    let results = scout.lookup_one(mpn).await;
    print_result_table(mpn, &results);

    if save {
        let pool = connect(config).await?;
        persist_results(&pool, mpn, &results).await?;
    }
    Ok(())
}

pub async fn batch(config: &AppConfig, file: &str, save: bool) -> anyhow::Result<()> {
    let mpns = read_mpn_file(file)?;
    let scout = build_engine(config)?;

    let progress: ProgressFn = Arc::new(|done, total| {
        println!("[{done}/{total}] completed");
    });
    let items = scout.lookup_batch(&mpns, Some(progress)).await;

    for item in &items {
        print_result_table(&item.mpn, &item.results);
    }

    if save {
        let pool = connect(config).await?;
        for item in &items {
            persist_results(&pool, &item.mpn, &item.results).await?;
        }
    }
    Ok(())
}

pub async fn history(config: &AppConfig, mpn: &str) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let series = pricescout_db::price_series(&pool, mpn).await?;
    if series.is_empty() {
        println!("no stored history for {mpn}");
        return Ok(());
    }

    println!("price history for {mpn}:");
    for (vendor, points) in &series {
        println!("  {vendor}:");
        for (scraped_at, price) in points {
            println!("    {}  ${price}", scraped_at.format("%Y-%m-%d %H:%M"));
        }
    }
    Ok(())
}

pub async fn report(config: &AppConfig, mpn: &str) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let (overall, per_vendor) = pricescout_db::average_prices(&pool, mpn).await?;

    let Some(overall) = overall else {
        println!("no stored history for {mpn}");
        return Ok(());
    };

    println!("price report for {mpn}:");
    println!("  overall average: ${overall}");
    for row in &per_vendor {
        println!(
            "  {:<14} avg ${:<10} ({} observation{})",
            row.vendor_name,
            row.average_price,
            row.observations,
            if row.observations == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn build_engine(config: &AppConfig) -> anyhow::Result<PriceScout> {
    let scraper_config = ScraperConfig::from_app_config(config);
    let registry = default_registry(&scraper_config).context("building vendor clients")?;
    Ok(PriceScout::new(registry, config.max_concurrent_mpns))
}

/// One MPN per line; surrounding whitespace trimmed, blank lines skipped.
/// A file with no usable lines is an input error, not an empty batch.
fn read_mpn_file(path: &str) -> anyhow::Result<Vec<String>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading MPN list {path}"))?;
    let mpns: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect();
    if mpns.is_empty() {
        bail!("MPN list {path} contains no part numbers");
    }
    Ok(mpns)
}

fn print_result_table(mpn: &str, results: &[VendorResult]) {
    println!("\n{mpn}");
    println!("{:<14} {:>12}  {:<9} {:<12} url", "vendor", "price", "stock", "condition");
    for result in results {
        let price = result
            .price
            .map_or_else(|| "-".to_string(), |p| format!("${p}"));
        let stock = match result.in_stock {
            Some(true) => "in stock",
            Some(false) => "no stock",
            None => "-",
        };
        let condition = result.condition.as_deref().unwrap_or("-");
        let url = result.url.as_deref().unwrap_or("-");
        println!(
            "{:<14} {:>12}  {:<9} {:<12} {url}",
            result.vendor_id, price, stock, condition
        );
    }
    match cheapest(results) {
        Some(offer) => println!("cheapest: {} at ${}", offer.vendor_id, offer.price),
        None => println!("no vendor stocks this part"),
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<Pool> {
    let Some(database_url) = &config.database_url else {
        bail!("DATABASE_URL must be set for persistence commands");
    };
    let pool = pricescout_db::connect_pool(database_url, PoolConfig::from_app_config(config))
        .await
        .context("connecting to the database")?;
    let applied = pricescout_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "database migrations applied");
    }
    Ok(pool)
}

/// Writes every found result through the smart-tracking path. Not-found
/// slots are skipped; absence is not an observation.
async fn persist_results(
    pool: &Pool,
    mpn: &str,
    results: &[VendorResult],
) -> anyhow::Result<()> {
    for result in results.iter().filter(|r| r.found) {
        pricescout_db::record_observation(pool, mpn, &result.vendor_id, result.price)
            .await
            .with_context(|| format!("recording {} price for {mpn}", result.vendor_id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::read_mpn_file;
    use std::io::Write;

    #[test]
    fn mpn_file_skips_blank_lines_and_trims() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "BX8071512100F\n\n  ST8000VN002  \n").expect("write");

        let mpns = read_mpn_file(file.path().to_str().expect("utf8 path")).expect("parse");
        assert_eq!(mpns, vec!["BX8071512100F", "ST8000VN002"]);
    }

    #[test]
    fn empty_mpn_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "\n   \n").expect("write");

        assert!(read_mpn_file(file.path().to_str().expect("utf8 path")).is_err());
    }

    #[test]
    fn missing_mpn_file_is_an_error() {
        assert!(read_mpn_file("/nonexistent/mpns.txt").is_err());
    }
}
