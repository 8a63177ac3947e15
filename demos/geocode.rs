use anyhow::{Result, bail};
use opencage::{Client, GeocodeParams};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG=opencage=debug shows the pacing decisions.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.is_empty() {
        bail!("usage: geocode <query>");
    }

    // Configure the key via OPENCAGE_API_KEY or a `.opencagerc` file.
    let client = Client::from_env()?;
    let params = GeocodeParams {
        no_annotations: true,
        ..GeocodeParams::default().with_limit(5)
    };

    let result = client.geocode(&query, Some(&params))?;
    for item in &result.results {
        println!(
            "{:>2}  {:.5},{:.5}  {}",
            item.confidence, item.geometry.lat, item.geometry.lng, item.formatted
        );
    }
    if let Some(rate) = &result.rate {
        eprintln!("{} of {} requests left", rate.remaining, rate.limit);
    }
    Ok(())
}
