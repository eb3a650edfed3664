//! List site content

use anyhow::Result;

use crate::client::ContentSource;
use crate::helpers::post_path;
use crate::Blog;

/// List the articles known to the content source
pub async fn run<S>(blog: &Blog, source: &S) -> Result<()>
where
    S: ContentSource + ?Sized,
{
    let config = &blog.config;
    let posts = source
        .get_all_by_type(&config.document_type, config.page_size)
        .await?;

    println!("Posts ({}):", posts.len());
    for post in posts {
        println!(
            "  {} - {} [{}]",
            post.published_at.as_deref().unwrap_or("-"),
            post.title,
            post_path(config, &post.id)
        );
    }

    Ok(())
}
