//! Movie lookup via The Movie Database (TMDb).

use async_trait::async_trait;
use relaybot_core::action::{Action, ActionResult, ExtractedSlots, ParamSpec, ParamType};
use serde::Deserialize;
use tracing::warn;

use crate::http::{Upstream, missing_key};

pub struct GetMovieInfo {
    upstream: Upstream,
    base_url: String,
    api_key: Option<String>,
    params: Vec<ParamSpec>,
}

impl GetMovieInfo {
    pub fn new(upstream: Upstream, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            upstream,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            params: vec![ParamSpec::required(
                "movie_title",
                ParamType::String,
                "Title of the movie to look up",
            )],
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Movie>,
}

#[derive(Debug, Deserialize)]
struct Movie {
    title: String,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    vote_count: u64,
}

impl Movie {
    fn render(&self) -> String {
        let year = self
            .release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| !y.is_empty())
            .unwrap_or("Unknown");
        let rating = self
            .vote_average
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".into());
        let overview = self
            .overview
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or("No overview available");
        format!(
            "Movie Information:\n**{}** ({year})\n\nRating: {rating}/10 ({} votes)\n\nOverview: {overview}",
            self.title, self.vote_count
        )
    }
}

#[async_trait]
impl Action for GetMovieInfo {
    fn name(&self) -> &str {
        "get_movie_info"
    }

    fn description(&self) -> &str {
        "Get movie information from The Movie Database (TMDb)"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let Some(api_key) = self.api_key.as_deref() else {
            return ActionResult::failure(missing_key("TMDB_API_KEY"));
        };
        let Some(title) = slots.text("movie_title") else {
            return ActionResult::failure("No movie title given");
        };

        let url = format!("{}/search/movie", self.base_url);
        let query = [("api_key", api_key), ("query", title)];
        let body = match self.upstream.get_json("TMDb", &url, &query).await {
            Ok(body) => body,
            Err(e) => {
                warn!(title, error = %e, "Movie lookup failed");
                return ActionResult::failure(format!("Error fetching movie data: {e}"));
            }
        };

        match serde_json::from_value::<SearchResponse>(body) {
            Ok(response) => match response.results.first() {
                Some(movie) => ActionResult::success(movie.render()),
                None => ActionResult::success(format!("No movies found for '{title}'")),
            },
            Err(e) => ActionResult::failure(format!("Error reading movie data: {e}")),
        }
    }
}
