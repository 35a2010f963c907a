//! HTTP client for the webby server

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::ApiError;
use super::models::{
    Book, BooksResponse, ChapterContent, ErrorResponse, PositionResponse, ReadingPosition,
    TocResponse,
};
use crate::reader::{Chapter, ContentSource, PositionStore, SavedPosition};

/// Webby server API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client
    client: Client,
    /// Server URL without trailing slash
    base_url: String,
    /// Bearer token, if logged in
    token: Option<String>,
}

impl ApiClient {
    /// Request timeout
    const TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client for the server at `base_url`
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url));
        }
        let client = Client::builder().timeout(Self::TIMEOUT).build()?;
        let token = token.filter(|t| !t.is_empty());

        Ok(Self { client, base_url, token })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET `path` as JSON, trying once more after a timeout or server error
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        match self.fetch_json(path).await {
            Err(err) if err.is_recoverable() => {
                warn!(path, %err, "Retrying request");
                self.fetch_json(path).await
            }
            result => result,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self.authorize(self.client.get(self.url(path))).send().await?;
        let body = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// List books in the library, optionally filtered by a search string
    pub async fn list_books(&self, search: Option<&str>) -> Result<Vec<Book>, ApiError> {
        let mut request = self.client.get(self.url("/api/books"));
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            request = request.query(&[("search", search)]);
        }
        debug!(?search, "GET /api/books");

        let response = self.authorize(request).send().await?;
        let body = check_status(response).await?.text().await?;
        let books: BooksResponse = serde_json::from_str(&body)?;
        Ok(books.books)
    }

    /// Metadata for one book
    pub async fn get_book(&self, book_id: &str) -> Result<Book, ApiError> {
        self.get_json(&format!("/api/books/{book_id}")).await
    }

    /// Ordered chapter list for a book
    pub async fn get_toc(&self, book_id: &str) -> Result<Vec<Chapter>, ApiError> {
        let toc: TocResponse = self.get_json(&format!("/api/books/{book_id}/toc")).await?;
        let mut chapters: Vec<Chapter> = toc.chapters.into_iter().map(Chapter::from).collect();
        chapters.sort_by_key(|c| c.index);
        Ok(chapters)
    }

    /// Plain text of one chapter
    pub async fn get_chapter_text(&self, book_id: &str, chapter: usize) -> Result<String, ApiError> {
        let content: ChapterContent =
            self.get_json(&format!("/api/books/{book_id}/text/{chapter}")).await?;
        Ok(content.content)
    }

    /// Saved reading position, `None` if the book was never opened
    pub async fn get_position(&self, book_id: &str) -> Result<Option<SavedPosition>, ApiError> {
        match self.get_json::<PositionResponse>(&format!("/api/books/{book_id}/position")).await {
            Ok(resp) => Ok(resp.position.and_then(|p| p.to_saved())),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Store the reading position for a book
    pub async fn post_position(
        &self,
        book_id: &str,
        position: SavedPosition,
    ) -> Result<(), ApiError> {
        let path = format!("/api/books/{book_id}/position");
        debug!(path, chapter = position.chapter, fraction = position.fraction, "POST");

        let body = ReadingPosition::from(position);
        let response = self.authorize(self.client.post(self.url(&path))).json(&body).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turn an error status into [`ApiError::Status`], preferring the server's message
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status: status.as_u16(), message: error_message(&body) })
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => err.error,
        Err(_) => body.trim().to_string(),
    }
}

impl ContentSource for ApiClient {
    async fn table_of_contents(&self, document_id: &str) -> anyhow::Result<Vec<Chapter>> {
        self.get_toc(document_id)
            .await
            .with_context(|| format!("Failed to fetch table of contents for {document_id}"))
    }

    async fn chapter_text(&self, document_id: &str, chapter: usize) -> anyhow::Result<String> {
        self.get_chapter_text(document_id, chapter)
            .await
            .with_context(|| format!("Failed to fetch chapter {}", chapter + 1))
    }
}

impl PositionStore for ApiClient {
    async fn load_position(&self, document_id: &str) -> anyhow::Result<Option<SavedPosition>> {
        Ok(self.get_position(document_id).await?)
    }

    async fn save_position(&self, document_id: &str, position: SavedPosition) -> anyhow::Result<()> {
        Ok(self.post_position(document_id, position).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/api/books"), "http://localhost:8080/api/books");
    }

    #[test]
    fn url_without_scheme_is_rejected() {
        assert!(matches!(ApiClient::new("localhost:8080", None), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn empty_token_means_anonymous() {
        let client = ApiClient::new("http://host", Some(String::new())).unwrap();
        assert!(client.token.is_none());
    }

    #[test]
    fn error_body_message_is_preferred() {
        assert_eq!(error_message(r#"{"error":"book not found"}"#), "book not found");
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }
}
