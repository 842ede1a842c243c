//! Internet Archive backend
//!
//! Searches through the advanced search API, paging lazily until enough hits
//! were consumed, and fetches items through the metadata API.

use super::query::QueryBuilder;
use super::traits::*;
use super::DEFAULT_ARCHIVE_URL;
use crate::config::OutgoingSettings;
use crate::error::ArchiveError;
use crate::network::HttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Rows requested per search page
const PAGE_SIZE: usize = 100;

/// Fields requested for each search hit
const SEARCH_FIELDS: [&str; 4] = ["identifier", "title", "description", "mediatype"];

/// Internet Archive search and metadata client
pub struct InternetArchive {
    client: HttpClient,
    base_url: String,
    page_size: usize,
    query_builder: QueryBuilder,
}

impl InternetArchive {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: DEFAULT_ARCHIVE_URL.to_string(),
            page_size: PAGE_SIZE,
            query_builder: QueryBuilder::default(),
        }
    }

    /// Build a client from outgoing settings
    pub fn from_settings(settings: &OutgoingSettings) -> Result<Self, ArchiveError> {
        let client = HttpClient::with_settings(settings)?;
        Ok(Self::new(client).with_base_url(&settings.archive_url))
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_query_builder(mut self, query_builder: QueryBuilder) -> Self {
        self.query_builder = query_builder;
        self
    }

    /// Fetch one page of search results
    async fn fetch_page(
        &self,
        query: &str,
        page: usize,
        rows: usize,
    ) -> Result<SearchPage, ArchiveError> {
        let url = format!("{}/advancedsearch.php", self.base_url);
        let mut params: Vec<(&str, String)> = vec![("q", query.to_string())];
        params.extend(SEARCH_FIELDS.iter().map(|field| ("fl[]", field.to_string())));
        params.push(("rows", rows.to_string()));
        params.push(("page", page.to_string()));
        params.push(("output", "json".to_string()));

        debug!("Fetching search page {} ({} rows) for {}", page, rows, query);

        let response = self.client.get_with_params(&url, &params).await?;
        let envelope: SearchEnvelope = response.error_for_status()?.json()?;
        Ok(envelope.response)
    }
}

#[async_trait]
impl ArchiveBackend for InternetArchive {
    fn name(&self) -> &str {
        "internet_archive"
    }

    fn download_base(&self) -> &str {
        &self.base_url
    }

    async fn search(
        &self,
        query: &ArchiveQuery,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ArchiveError> {
        let query = self.query_builder.build(query)?;
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let rows = max_results.min(self.page_size);
        let mut hits: Vec<SearchHit> = Vec::new();
        let mut page = 1usize;

        // Pages are only requested while more hits are needed.
        loop {
            let result = self.fetch_page(&query, page, rows).await?;
            let exhausted = result.docs.is_empty() || page * rows >= result.num_found;
            hits.extend(result.docs.into_iter().filter_map(SearchDoc::into_hit));

            if exhausted || hits.len() >= max_results {
                break;
            }
            page += 1;
        }
        hits.truncate(max_results);

        debug!("Search {} returned {} hits", query, hits.len());
        Ok(hits)
    }

    async fn get_item(&self, identifier: &str) -> Result<ArchiveItem, ArchiveError> {
        let url = format!(
            "{}/metadata/{}",
            self.base_url,
            urlencoding::encode(identifier)
        );
        let response = self.client.get(&url).await?.error_for_status()?;
        let envelope: MetadataEnvelope = response.json()?;

        match envelope.metadata {
            Some(metadata) => Ok(ArchiveItem {
                metadata,
                files: envelope.files,
            }),
            None => Err(ArchiveError::NotFound(identifier.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchPage,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(rename = "numFound", default)]
    num_found: usize,
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    identifier: String,
    title: Option<TextField>,
    description: Option<TextField>,
    mediatype: Option<TextField>,
}

impl SearchDoc {
    fn into_hit(self) -> Option<SearchHit> {
        if self.identifier.is_empty() {
            return None;
        }
        Some(SearchHit {
            identifier: self.identifier,
            title: self.title.map(TextField::into_text).unwrap_or_default(),
            description: self.description.map(TextField::into_text),
            mediatype: self.mediatype.map(TextField::into_text),
        })
    }
}

/// Search fields may come back as a string or a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    One(String),
    Many(Vec<String>),
}

impl TextField {
    fn into_text(self) -> String {
        match self {
            Self::One(text) => text,
            Self::Many(parts) => parts.join(" "),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataEnvelope {
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    files: Vec<ArchiveFile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::query::SearchFilters;
    use crate::archive::MainCollection;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn archive(server: &MockServer) -> InternetArchive {
        InternetArchive::new(HttpClient::new().unwrap()).with_base_url(server.uri())
    }

    fn docs(ids: &[&str]) -> serde_json::Value {
        json!(ids
            .iter()
            .map(|id| {
                json!({ "identifier": id, "title": format!("Title {}", id), "mediatype": "image" })
            })
            .collect::<Vec<_>>())
    }

    #[tokio::test]
    async fn test_search_single_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/advancedsearch.php"))
            .and(query_param("q", "(jazz) AND mediatype:image"))
            .and(query_param("rows", "10"))
            .and(query_param("page", "1"))
            .and(query_param("output", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": { "numFound": 2, "start": 0, "docs": [
                    { "identifier": "jazz-1", "title": "Jazz One", "description": ["A", "B"] },
                    { "identifier": "jazz-2", "title": ["Jazz", "Two"] }
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = ArchiveQuery::new(vec!["jazz".to_string()]);
        let hits = archive(&server).search(&query, 10).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].identifier, "jazz-1");
        assert_eq!(hits[0].title, "Jazz One");
        assert_eq!(hits[0].description.as_deref(), Some("A B"));
        assert_eq!(hits[1].title, "Jazz Two");
        assert!(hits[1].description.is_none());
    }

    #[tokio::test]
    async fn test_search_pages_lazily() {
        let server = MockServer::start().await;
        for (page, ids) in [("1", vec!["a", "b"]), ("2", vec!["c", "d"])] {
            Mock::given(method("GET"))
                .and(path("/advancedsearch.php"))
                .and(query_param("page", page))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "response": { "numFound": 10, "docs": docs(&ids) }
                })))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/advancedsearch.php"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let query = ArchiveQuery::new(vec!["jazz".to_string()]);
        let hits = archive(&server)
            .with_page_size(2)
            .search(&query, 3)
            .await
            .unwrap();

        let ids: Vec<&str> = hits.iter().map(|h| h.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_search_stops_when_results_run_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/advancedsearch.php"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": { "numFound": 2, "docs": docs(&["a", "b"]) }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = ArchiveQuery::new(vec!["jazz".to_string()]);
        let hits = archive(&server)
            .with_page_size(2)
            .search(&query, 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_search_sends_filter_clauses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/advancedsearch.php"))
            .and(query_param(
                "q",
                "(space) AND mediatype:image AND collection:(nasa)",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": { "numFound": 0, "docs": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let filters = SearchFilters {
            collections: vec![MainCollection::Nasa.into()],
            ..Default::default()
        };
        let query = ArchiveQuery::new(vec!["space".to_string()]).with_filters(filters);
        let hits = archive(&server).search(&query, 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_keywords_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = archive(&server)
            .search(&ArchiveQuery::new(vec![]), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Query(_)));
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let query = ArchiveQuery::new(vec!["jazz".to_string()]);
        let err = archive(&server).search(&query, 5).await.unwrap_err();
        assert!(matches!(err, ArchiveError::Http { status: 502 }));
    }

    #[tokio::test]
    async fn test_get_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata/jazz-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": { "identifier": "jazz-1", "title": "Jazz One" },
                "files": [
                    { "name": "pic.jpg", "format": "JPEG", "size": "2048", "md5": "aaa" },
                    { "name": "jazz-1_meta.xml", "format": "Metadata" }
                ]
            })))
            .mount(&server)
            .await;

        let item = archive(&server).get_item("jazz-1").await.unwrap();
        assert_eq!(item.metadata["title"], "Jazz One");
        assert_eq!(item.files.len(), 2);
        assert_eq!(item.files[0].name, "pic.jpg");
        assert_eq!(item.files[0].format.as_deref(), Some("JPEG"));
        assert_eq!(item.files[0].size, Some(json!("2048")));
        assert!(item.files[1].md5.is_none());
    }

    #[tokio::test]
    async fn test_get_item_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata/missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = archive(&server).get_item("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_item_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = archive(&server).get_item("broken").await.unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed(_)));
    }

    #[test]
    fn test_download_base_follows_base_url() {
        let archive = InternetArchive::new(HttpClient::new().unwrap())
            .with_base_url("http://localhost:8080/");
        assert_eq!(archive.download_base(), "http://localhost:8080");
        assert_eq!(archive.name(), "internet_archive");
    }
}
