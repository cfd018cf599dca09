//! News actions backed by NewsAPI.org.
//!
//! All news actions share one [`NewsApi`] handle (client, base URL, key).
//! Article lists are rendered by [`format_articles`]; source listings by
//! [`format_sources`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use relaybot_core::action::{Action, ActionResult, ExtractedSlots, ParamSpec, ParamType};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::http::{Upstream, missing_key, truncate};

/// Categories NewsAPI accepts for source listings.
pub const NEWS_CATEGORIES: [&str; 6] = [
    "business",
    "technology",
    "science",
    "health",
    "sports",
    "entertainment",
];

/// Shared NewsAPI handle.
#[derive(Clone)]
pub struct NewsApi {
    upstream: Upstream,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApi {
    pub fn new(upstream: Upstream, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            upstream,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Call an endpoint with the API key added, decoding into `T`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| missing_key("NEWS_API_KEY"))?;
        let url = format!("{}/{endpoint}", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![("apiKey", api_key)];
        query.extend_from_slice(params);

        let body = self
            .upstream
            .get_json("NewsAPI", &url, &query)
            .await
            .map_err(|e| {
                warn!(endpoint, error = %e, "News request failed");
                format!("Error fetching news: {e}")
            })?;

        let status = body.get("status").and_then(|s| s.as_str()).unwrap_or("ok");
        if status != "ok" {
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            return Err(format!("News API error: {message}"));
        }

        serde_json::from_value(body).map_err(|e| format!("Error reading news data: {e}"))
    }
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default, rename = "totalResults")]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<Article>,
}

/// One article, as NewsAPI reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: ArticleSource,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourcesResponse {
    #[serde(default)]
    sources: Vec<Source>,
}

/// A news source listing entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub country: String,
}

/// Render `publishedAt` as `YYYY-MM-DD HH:MM UTC`, or verbatim if unparsable.
pub fn format_published(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Numbered article list with source, truncated description and date.
pub fn format_articles(articles: &[Article], total: u64) -> String {
    if articles.is_empty() {
        return "No news articles found for your query.".into();
    }

    let mut out = format!("Found {total} articles:\n\n");
    for (i, article) in articles.iter().enumerate() {
        let title = article.title.as_deref().unwrap_or("No title");
        let source = article.source.name.as_deref().unwrap_or("Unknown");
        out.push_str(&format!("{}. **{title}**\n   Source: {source}\n", i + 1));
        if let Some(description) = article.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("   {}\n", truncate(description, 150)));
        }
        if let Some(published) = article.published_at.as_deref().filter(|p| !p.is_empty()) {
            out.push_str(&format!("   Published: {}\n", format_published(published)));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Numbered source list with category, country and short description.
pub fn format_sources(sources: &[Source]) -> String {
    if sources.is_empty() {
        return "No news sources found.".into();
    }

    let mut out = format!("Available News Sources ({}):\n\n", sources.len());
    for (i, source) in sources.iter().enumerate() {
        out.push_str(&format!("{}. **{}** ({})\n", i + 1, source.name, source.id));
        out.push_str(&format!(
            "   Category: {}, Country: {}\n",
            capitalize(&source.category),
            source.country.to_uppercase()
        ));
        if !source.description.is_empty() {
            out.push_str(&format!("   {}\n", truncate(&source.description, 100)));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn articles_result(result: Result<ArticlesResponse, String>, limit: usize) -> ActionResult {
    match result {
        Ok(response) => {
            let articles: Vec<Article> = response.articles.into_iter().take(limit).collect();
            let total = response.total_results.unwrap_or(articles.len() as u64);
            ActionResult::success(format_articles(&articles, total))
        }
        Err(reason) => ActionResult::failure(reason),
    }
}

// --- Actions ---

pub struct TopHeadlines {
    api: NewsApi,
    params: Vec<ParamSpec>,
}

impl TopHeadlines {
    pub fn new(api: NewsApi) -> Self {
        Self {
            api,
            params: vec![ParamSpec::optional(
                "country",
                ParamType::String,
                "Two-letter country code",
                Some("us"),
            )],
        }
    }
}

#[async_trait]
impl Action for TopHeadlines {
    fn name(&self) -> &str {
        "top_headlines"
    }

    fn description(&self) -> &str {
        "Gets latest news headlines for a country"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let country = slots.text("country").unwrap_or("us").to_lowercase();
        let result = self
            .api
            .fetch(
                "top-headlines",
                &[("country", country.as_str()), ("pageSize", "10")],
            )
            .await;
        articles_result(result, 5)
    }
}

pub struct SearchNews {
    api: NewsApi,
    params: Vec<ParamSpec>,
}

impl SearchNews {
    pub fn new(api: NewsApi) -> Self {
        Self {
            api,
            params: vec![ParamSpec::required(
                "topic",
                ParamType::String,
                "Topic or keywords to search for",
            )],
        }
    }
}

#[async_trait]
impl Action for SearchNews {
    fn name(&self) -> &str {
        "search_news"
    }

    fn description(&self) -> &str {
        "Searches for news articles about a specific topic"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let Some(topic) = slots.text("topic") else {
            return ActionResult::failure("No search topic given");
        };
        let result = self
            .api
            .fetch(
                "everything",
                &[
                    ("q", topic),
                    ("sortBy", "publishedAt"),
                    ("pageSize", "5"),
                    ("language", "en"),
                ],
            )
            .await;
        articles_result(result, 5)
    }
}

pub struct NewsSources {
    api: NewsApi,
    params: Vec<ParamSpec>,
}

impl NewsSources {
    pub fn new(api: NewsApi) -> Self {
        Self {
            api,
            params: vec![ParamSpec::optional(
                "category",
                ParamType::Enum(NEWS_CATEGORIES.iter().map(|c| c.to_string()).collect()),
                "Restrict sources to one category",
                None,
            )],
        }
    }
}

#[async_trait]
impl Action for NewsSources {
    fn name(&self) -> &str {
        "news_sources"
    }

    fn description(&self) -> &str {
        "Gets available news sources, optionally filtered by category"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let mut params = vec![("language", "en")];
        if let Some(category) = slots.text("category") {
            params.push(("category", category));
        }
        match self.api.fetch::<SourcesResponse>("sources", &params).await {
            Ok(response) => {
                let sources: Vec<Source> = response.sources.into_iter().take(10).collect();
                ActionResult::success(format_sources(&sources))
            }
            Err(reason) => ActionResult::failure(reason),
        }
    }
}

pub struct NewsBySource {
    api: NewsApi,
    params: Vec<ParamSpec>,
}

impl NewsBySource {
    pub fn new(api: NewsApi) -> Self {
        Self {
            api,
            params: vec![ParamSpec::required(
                "source",
                ParamType::String,
                "NewsAPI source id (e.g. bbc-news)",
            )],
        }
    }
}

#[async_trait]
impl Action for NewsBySource {
    fn name(&self) -> &str {
        "news_by_source"
    }

    fn description(&self) -> &str {
        "Gets news from a specific source"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let Some(source) = slots.text("source") else {
            return ActionResult::failure("No news source given");
        };
        let result = self
            .api
            .fetch("top-headlines", &[("sources", source), ("pageSize", "5")])
            .await;
        articles_result(result, 5)
    }
}

const NEWS_HELP: &str = "News Bot Commands:

Headlines:
- \"latest news\" or \"top headlines\" - Get current top headlines
- \"latest news from gb\" - Get headlines from a specific country (us, gb, ca, ...)

Search:
- \"news about [topic]\" - Search for articles about specific topics
- \"search [keyword]\" - Find articles containing keywords

Sources:
- \"news sources\" - Get list of available news sources
- \"technology news sources\" - Get sources by category (business, technology, ...)
- \"news from [source]\" - Get articles from a specific news source

Examples:
- \"What's the latest news?\"
- \"News about climate change\"
- \"Technology news sources\"
- \"News from BBC\"

Note: You need a free API key from NewsAPI.org";

pub struct NewsHelp;

#[async_trait]
impl Action for NewsHelp {
    fn name(&self) -> &str {
        "news_help"
    }

    fn description(&self) -> &str {
        "Gets news help and available commands"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &[]
    }

    async fn invoke(&self, _slots: &ExtractedSlots) -> ActionResult {
        ActionResult::success(NEWS_HELP)
    }
}

/// Concierge news lookup: US top headlines, optionally filtered by keyword.
pub struct GetNews {
    api: NewsApi,
    params: Vec<ParamSpec>,
}

impl GetNews {
    pub fn new(api: NewsApi) -> Self {
        Self {
            api,
            params: vec![ParamSpec::optional(
                "query",
                ParamType::String,
                "Keyword filter, or \"latest\" for plain headlines",
                Some("latest"),
            )],
        }
    }
}

#[async_trait]
impl Action for GetNews {
    fn name(&self) -> &str {
        "get_news"
    }

    fn description(&self) -> &str {
        "Get latest news headlines or search for specific news topics"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let query = slots.text("query").unwrap_or("latest");
        let mut params = vec![("country", "us"), ("pageSize", "5")];
        if !query.eq_ignore_ascii_case("latest") {
            params.push(("q", query));
        }
        let result = self.api.fetch("top-headlines", &params).await;
        articles_result(result, 5)
    }
}
