//! HTTP client for the village subgraph.

use crate::error::{IndexerError, Result};
use crate::query::{decode_response, normalize_address, GraphQlRequest, VillageData, VillagesData};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use village_core::Village;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only client for the subgraph GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    http: Client,
    url: String,
}

impl SubgraphClient {
    /// Creates a client for the given endpoint.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(http, url))
    }

    /// Creates a client reusing an existing HTTP client.
    pub fn with_client(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches one village with all of its characters.
    pub async fn fetch_village(&self, address: &str) -> Result<Option<Village>> {
        let id = normalize_address(address)?;
        let data: VillageData = self.execute(&GraphQlRequest::village(&id)).await?;

        if let Some(village) = &data.village {
            info!(
                "Fetched village {} with {} characters",
                village.id,
                village.characters().len()
            );
        }
        Ok(data.village)
    }

    /// Lists villages owned by an address. Characters are not included.
    pub async fn villages_by_owner(&self, owner: &str) -> Result<Vec<Village>> {
        let owner = normalize_address(owner)?;
        let data: VillagesData = self
            .execute(&GraphQlRequest::villages_by_owner(&owner))
            .await?;
        Ok(data.villages)
    }

    /// Lists villages with at least two characters, characters included.
    pub async fn breedable_villages(&self) -> Result<Vec<Village>> {
        let data: VillagesData = self
            .execute(&GraphQlRequest::breedable_villages())
            .await?;
        Ok(data.villages)
    }

    async fn execute<T: DeserializeOwned>(&self, request: &GraphQlRequest<'_>) -> Result<T> {
        debug!("POST {} variables={}", self.url, request.variables);

        let response = self.http.post(&self.url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(IndexerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response and returns the request body it saw.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/graphql", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let request_body = loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break String::new();
                }
                buf.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    let body = &text[split + 4..];
                    if body.len() >= length {
                        break body.to_string();
                    }
                }
            };

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request_body
        });

        (url, handle)
    }

    const ADDR: &str = "0x00000000000000000000000000000000000000aa";

    fn local_client(url: String) -> SubgraphClient {
        let http = Client::builder().no_proxy().build().unwrap();
        SubgraphClient::with_client(http, url)
    }

    #[tokio::test]
    async fn test_fetch_village_posts_query() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"data":{"village":{"id":"0x00000000000000000000000000000000000000aa","charactersCount":"0","characters":[]}}}"#,
        )
        .await;

        let client = local_client(url);
        let village = client.fetch_village(ADDR).await.unwrap().unwrap();
        assert_eq!(village.id, ADDR);

        let request: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(request["variables"]["id"], ADDR);
        assert!(request["query"].as_str().unwrap().contains("village(id: $id)"));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (url, server) = serve_once("502 Bad Gateway", r#"{"message":"upstream"}"#).await;

        let client = local_client(url);
        let err = client.breedable_villages().await.unwrap_err();
        assert!(matches!(err, IndexerError::Status { status: 502, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_owner_is_rejected_before_request() {
        let client = SubgraphClient::new("http://127.0.0.1:9/graphql").unwrap();
        let err = client.villages_by_owner("alice").await.unwrap_err();
        assert!(matches!(err, IndexerError::InvalidAddress(_)));
    }
}
