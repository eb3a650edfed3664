//! Generate static files

use anyhow::Result;
use std::sync::Arc;

use crate::cache::{self, post_route, CacheDb, LISTING_ROUTE};
use crate::client::ContentSource;
use crate::generator::{listing_output, GenerateReport, Generator, PostOutcome};
use crate::Blog;

/// Generate the whole site and record every route in the cache
pub async fn run<S>(blog: &Blog, source: Arc<S>) -> Result<GenerateReport>
where
    S: ContentSource + ?Sized,
{
    let start = std::time::Instant::now();

    let generator = Generator::new(blog, source)?;
    let report = generator.generate().await?;

    let now = cache::now_secs();
    let mut cache = CacheDb::load(&blog.base_dir);
    cache.record_generated(LISTING_ROUTE, &listing_output(1), None, now);

    let mut uids = Vec::with_capacity(report.generated.len());
    for (uid, outcome) in &report.generated {
        match outcome {
            PostOutcome::Generated {
                output_path,
                last_publication_date,
            } => {
                cache.record_generated(
                    &post_route(uid),
                    output_path,
                    last_publication_date.clone(),
                    now,
                );
                uids.push(uid.clone());
            }
            PostOutcome::NotFound => {
                tracing::warn!("Listed article {} could not be fetched", uid);
            }
        }
    }

    cache.retain_posts(&uids);
    cache.save(&blog.base_dir)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} listing pages and {} articles in {:.2}s",
        report.listing_pages,
        uids.len(),
        duration.as_secs_f64()
    );

    Ok(report)
}
