//! Generator module - renders listing and article pages to the public directory

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::ContentSource;
use crate::content::{reading_minutes, ArticleBody, RenderState};
use crate::helpers::listing_path;
use crate::listing::ListingState;
use crate::templates::{ArticleData, ListingData, TemplateRenderer};
use crate::Blog;

/// Seconds before the fallback page reloads itself
const FALLBACK_REFRESH_SECS: u64 = 2;

/// Outcome of generating one article page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// Page written; path relative to the public directory
    Generated {
        output_path: String,
        last_publication_date: Option<String>,
    },
    /// The content source has no such article
    NotFound,
}

/// Summary of a full generation
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    pub listing_pages: usize,
    pub generated: Vec<(String, PostOutcome)>,
}

/// Static site generator over a content source
pub struct Generator<S: ?Sized> {
    blog: Blog,
    renderer: TemplateRenderer,
    source: Arc<S>,
}

impl<S> Generator<S>
where
    S: ContentSource + ?Sized,
{
    /// Create a new generator
    pub fn new(blog: &Blog, source: Arc<S>) -> Result<Self> {
        let renderer = TemplateRenderer::new(&blog.config, blog.i18n()?)?;

        Ok(Self {
            blog: blog.clone(),
            renderer,
            source,
        })
    }

    /// The content source pages are generated from
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Generate the listing, every article and the not-found page
    pub async fn generate(&self) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let listing_pages = self.generate_listing().await?;
        let generated = self.generate_paths().await?;
        self.generate_not_found()?;

        Ok(GenerateReport {
            listing_pages,
            generated,
        })
    }

    /// Generate the home page and every accumulated listing page
    ///
    /// Page `n` holds the items of the first `n` source pages, exactly what
    /// the home page shows after "load more" was used `n - 1` times. The
    /// control links to page `n + 1` and is left out on the last page.
    /// Returns the number of pages written.
    pub async fn generate_listing(&self) -> Result<usize> {
        let config = &self.blog.config;
        let first = self
            .source
            .get_by_type(&config.document_type, config.page_size)
            .await
            .context("Failed to fetch the first listing page")?;

        let mut state = ListingState::new(first);
        let mut page = 1;

        loop {
            let listing = ListingData {
                current: page,
                next_link: if state.has_more() {
                    listing_path(config, page + 1)
                } else {
                    String::new()
                },
            };

            let html = self.renderer.render_index(state.posts(), &listing)?;
            let output_path = self.blog.public_dir.join(listing_output(page));
            write_page(&output_path, &html)?;
            tracing::debug!("Generated: {:?}", output_path);

            if !state.has_more() {
                break;
            }

            state
                .load_more(self.source.as_ref())
                .await
                .with_context(|| format!("Failed to load listing page {}", page + 1))?;
            page += 1;
        }

        self.remove_listing_pages_after(page)?;
        tracing::info!(
            "Generated listing: {} posts over {} pages",
            state.posts().len(),
            page
        );

        Ok(page)
    }

    /// Generate every article known to the content source
    pub async fn generate_paths(&self) -> Result<Vec<(String, PostOutcome)>> {
        let config = &self.blog.config;
        let summaries = self
            .source
            .get_all_by_type(&config.document_type, config.page_size)
            .await
            .context("Failed to list articles")?;

        let mut outcomes = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let outcome = self.generate_post(&summary.id).await?;
            outcomes.push((summary.id, outcome));
        }

        tracing::info!("Generated {} articles", outcomes.len());
        Ok(outcomes)
    }

    /// Generate one article page
    ///
    /// When the content source has no record the page is not rendered and
    /// any previously generated copy is removed.
    pub async fn generate_post(&self, uid: &str) -> Result<PostOutcome> {
        let relative = post_output(uid);
        let output_path = self.blog.public_dir.join(&relative);

        let Some(article) = self.fetch_post(self.source.as_ref(), uid).await? else {
            if output_path.exists() {
                fs::remove_file(&output_path)?;
                tracing::info!("Removed article no longer available: {}", uid);
            }
            return Ok(PostOutcome::NotFound);
        };

        let html = self.render_article(RenderState::Ready, Some(&article))?;
        write_page(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(PostOutcome::Generated {
            output_path: relative,
            last_publication_date: article.last_published,
        })
    }

    /// Fetch an article from any content source (e.g. a preview client)
    pub async fn fetch_post<T>(&self, source: &T, uid: &str) -> Result<Option<ArticleBody>>
    where
        T: ContentSource + ?Sized,
    {
        source
            .get_by_uid(&self.blog.config.document_type, uid)
            .await
            .with_context(|| format!("Failed to fetch article {}", uid))
    }

    /// Render an article page, or the placeholder while its data is pending
    pub fn render_article(&self, state: RenderState, article: Option<&ArticleBody>) -> Result<String> {
        match (state, article) {
            (RenderState::Fallback, _) => self.renderer.render_fallback(FALLBACK_REFRESH_SECS),
            (RenderState::Ready, Some(article)) => {
                let minutes = reading_minutes(state, &article.sections);
                self.renderer
                    .render_post(&ArticleData::new(article, minutes))
            }
            (RenderState::Ready, None) => anyhow::bail!("No article data to render"),
        }
    }

    /// The not-found page
    pub fn render_not_found(&self) -> Result<String> {
        self.renderer.render_not_found()
    }

    /// Write the not-found page to `404.html`
    pub fn generate_not_found(&self) -> Result<PathBuf> {
        let output_path = self.blog.public_dir.join("404.html");
        write_page(&output_path, &self.render_not_found()?)?;
        Ok(output_path)
    }

    /// Remove listing pages left over from a longer listing
    fn remove_listing_pages_after(&self, last: usize) -> Result<()> {
        let pages_dir = self.blog.public_dir.join("page");
        if !pages_dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(&pages_dir)? {
            let path = entry?.path();
            let number = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<usize>().ok());
            if matches!(number, Some(n) if n > last) {
                fs::remove_dir_all(&path)?;
                tracing::debug!("Removed stale listing page: {:?}", path);
            }
        }

        Ok(())
    }
}

/// Output path of a listing page, relative to the public directory
pub fn listing_output(page: usize) -> String {
    if page <= 1 {
        "index.html".to_string()
    } else {
        format!("page/{}/index.html", page)
    }
}

/// Output path of an article page, relative to the public directory
pub fn post_output(uid: &str) -> String {
    format!("post/{}/index.html", slug::slugify(uid))
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, html).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
    Ok(())
}
