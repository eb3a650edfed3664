//! Built-in blog templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping stays on: titles,
//! authors and headings come from the content API, and article bodies are
//! already sanitized by [`crate::richtext`] before they reach a template.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{ArticleBody, ArticleSummary};
use crate::helpers::{format_date_locale, post_path};
use crate::i18n::I18n;
use crate::richtext;

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
    config: ConfigData,
    translations: HashMap<String, String>,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig, i18n: I18n) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("index.html", include_str!("blog/index.html")),
            ("post.html", include_str!("blog/post.html")),
            ("fallback.html", include_str!("blog/fallback.html")),
            ("not_found.html", include_str!("blog/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
        ])?;

        tera.register_filter(
            "date_locale",
            DateLocaleFilter {
                format: config.date_format.clone(),
                tz: config.tz(),
                i18n: i18n.clone(),
            },
        );

        Ok(Self {
            tera,
            config: ConfigData::from(config),
            translations: i18n.get_all_translations(),
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// A context with the site configuration and translations
    pub fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.config);
        context.insert("t", &self.translations);
        context
    }

    /// Render an accumulated listing page
    pub fn render_index(&self, posts: &[ArticleSummary], listing: &ListingData) -> Result<String> {
        let posts: Vec<SummaryData> = posts
            .iter()
            .map(|p| SummaryData::new(p, &self.config))
            .collect();

        let mut context = self.base_context();
        context.insert("posts", &posts);
        context.insert("listing", listing);
        self.render("index.html", &context)
    }

    /// Render an article page
    pub fn render_post(&self, article: &ArticleData) -> Result<String> {
        let mut context = self.base_context();
        context.insert("article", article);
        self.render("post.html", &context)
    }

    /// Render the placeholder shown while a page is generated
    pub fn render_fallback(&self, refresh_secs: u64) -> Result<String> {
        let mut context = self.base_context();
        context.insert("refresh_secs", &refresh_secs);
        self.render("fallback.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.render("not_found.html", &self.base_context())
    }
}

/// Tera filter: format an API timestamp in the site language
struct DateLocaleFilter {
    format: String,
    tz: Option<chrono_tz::Tz>,
    i18n: I18n,
}

impl tera::Filter for DateLocaleFilter {
    fn filter(
        &self,
        value: &tera::Value,
        args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        if value.is_null() {
            return Ok(tera::Value::String(String::new()));
        }
        let s = tera::try_get_value!("date_locale", "value", String, value);
        let format = match args.get("format") {
            Some(val) => tera::try_get_value!("date_locale", "format", String, val),
            None => self.format.clone(),
        };

        Ok(tera::Value::String(format_date_locale(
            &s, &format, &self.i18n, self.tz,
        )))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub url: String,
    pub root: String,
    #[serde(skip)]
    site: SiteConfig,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
            site: config.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub published_at: Option<String>,
    pub path: String,
}

impl SummaryData {
    fn new(summary: &ArticleSummary, config: &ConfigData) -> Self {
        Self {
            id: summary.id.clone(),
            title: summary.title.clone(),
            subtitle: summary.subtitle.clone(),
            author: summary.author.clone(),
            published_at: summary.published_at.clone(),
            path: post_path(&config.site, &summary.id),
        }
    }
}

/// Position of an accumulated listing page
#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    /// 1-based number of pages accumulated
    pub current: usize,
    /// Link to the next accumulated page, empty on the last one
    pub next_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub title: String,
    pub banner_url: String,
    pub author: String,
    pub first_published: String,
    pub last_published: Option<String>,
    pub edited: bool,
    pub reading_minutes: usize,
    pub sections: Vec<SectionData>,
}

impl ArticleData {
    pub fn new(article: &ArticleBody, reading_minutes: usize) -> Self {
        Self {
            title: article.title.clone(),
            banner_url: article.banner_url.clone(),
            author: article.author.clone(),
            first_published: article.first_published.clone(),
            last_published: article.last_published.clone(),
            edited: article.is_edited(),
            reading_minutes,
            sections: article
                .sections
                .iter()
                .map(|s| SectionData {
                    heading: s.heading.clone(),
                    html: richtext::render_blocks(&s.rich_text),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    /// Sanitized body markup
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Section;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new(&SiteConfig::default(), I18n::new("pt-BR")).unwrap()
    }

    fn article() -> ArticleBody {
        ArticleBody {
            id: "hello".to_string(),
            title: "Hello <world>".to_string(),
            banner_url: "https://images.prismic.io/banner.png".to_string(),
            author: "Anon".to_string(),
            sections: vec![Section::plain("Intro", &["<b>bold?</b>"])],
            first_published: "2021-03-15T19:25:28+0000".to_string(),
            last_published: Some("2021-03-20T10:00:00+0000".to_string()),
        }
    }

    #[test]
    fn test_render_index_with_load_more() {
        let posts = vec![ArticleSummary {
            id: "como-utilizar-hooks".to_string(),
            published_at: Some("2021-03-15T19:25:28+0000".to_string()),
            title: "Como utilizar Hooks".to_string(),
            subtitle: "Pensando em sincronização".to_string(),
            author: "Joseph Oliveira".to_string(),
        }];
        let listing = ListingData {
            current: 1,
            next_link: "/page/2/".to_string(),
        };

        let html = renderer().render_index(&posts, &listing).unwrap();
        assert!(html.contains("Como utilizar Hooks"));
        assert!(html.contains("href=\"/post/como-utilizar-hooks/\""));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains("Carregar mais posts"));
    }

    #[test]
    fn test_render_index_without_more_pages() {
        let listing = ListingData {
            current: 3,
            next_link: String::new(),
        };
        let html = renderer().render_index(&[], &listing).unwrap();
        assert!(!html.contains("Carregar mais posts"));
    }

    #[test]
    fn test_render_post_escapes_content() {
        let data = ArticleData::new(&article(), 4);
        let html = renderer().render_post(&data).unwrap();

        assert!(html.contains("Hello &lt;world&gt;"));
        assert!(!html.contains("<b>bold?</b>"));
        assert!(html.contains("4 min"));
        assert!(html.contains("* editado em 20 mar 2021"));
    }

    #[test]
    fn test_render_post_not_edited() {
        let mut article = article();
        article.last_published = Some(article.first_published.clone());
        let html = renderer()
            .render_post(&ArticleData::new(&article, 1))
            .unwrap();
        assert!(!html.contains("editado em"));
    }

    #[test]
    fn test_render_fallback() {
        let html = renderer().render_fallback(2).unwrap();
        assert!(html.contains("Carregando..."));
        assert!(html.contains("http-equiv=\"refresh\" content=\"2\""));
    }
}
