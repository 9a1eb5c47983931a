use reqwest::StatusCode;
use thiserror::Error;
use tracing::info;

use crate::models::book::Book;
use crate::models::responses::{ErrorResponse, LookupResponse};

pub const DEFAULT_CATALOG_URL: &str = "http://0.0.0.0:7000";
pub const LOOKUP_SERVICE_URL: &str = "http://0.0.0.0:3001";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Status { status, .. } => format!("Book lookup failed ({})", status),
            ClientError::Http(_) | ClientError::Decode(_) => "Book lookup failed".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    catalog_url: String,
    lookup_url: String,
}

impl CatalogClient {
    pub fn new(catalog_url: String, lookup_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            catalog_url,
            lookup_url,
        }
    }

    pub async fn fetch_catalog(&self) -> Result<Vec<Book>, ClientError> {
        let url = format!("{}/books", self.catalog_url);
        info!("Fetching catalog from {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status(),
                message: None,
            });
        }

        let body = response.text().await?;
        let books: Vec<Book> = serde_json::from_str(&body)?;
        info!("Catalog loaded with {} books", books.len());
        Ok(books)
    }

    pub async fn lookup_isbn(&self, isbn: &str) -> Result<LookupResponse, ClientError> {
        let url = format!("{}/isbn/{}", self.lookup_url, isbn);
        info!("Looking up ISBN {} at {}", isbn, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message);
            return Err(ClientError::Status { status, message });
        }

        let found: LookupResponse = serde_json::from_str(&body)?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn fetch_catalog_decodes_book_array() {
        let body = r#"[{"ISBN_13":"9780141439518","title":"Pride and Prejudice","author":"Jane Austen","publisher":"Penguin","ebook":"Yes","cover":"http://covers/1342.jpg"}]"#;
        let url = serve_once("HTTP/1.1 200 OK", body).await;

        let client = CatalogClient::new(url, LOOKUP_SERVICE_URL.to_string());
        let books = client.fetch_catalog().await.unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].isbn_13, "9780141439518");
        assert_eq!(books[0].cover.as_deref(), Some("http://covers/1342.jpg"));
    }

    #[tokio::test]
    async fn lookup_decodes_data_and_message() {
        let body = r#"{"data":{"ISBN_13":"9780486282114","title":"Frankenstein","author":"Mary Shelley","publisher":"Dover","ebook":"No"},"message":"Book added"}"#;
        let url = serve_once("HTTP/1.1 200 OK", body).await;

        let client = CatalogClient::new(DEFAULT_CATALOG_URL.to_string(), url);
        let found = client.lookup_isbn("9780486282114").await.unwrap();

        assert_eq!(found.data.title, "Frankenstein");
        assert_eq!(found.data.cover, None);
        assert_eq!(found.message, "Book added");
    }

    #[tokio::test]
    async fn lookup_failure_surfaces_server_message() {
        let url = serve_once("HTTP/1.1 404 Not Found", r#"{"message":"Book not found"}"#).await;

        let client = CatalogClient::new(DEFAULT_CATALOG_URL.to_string(), url);
        let err = client.lookup_isbn("0000000000000").await.unwrap_err();

        assert_eq!(err.user_message(), "Book not found");
    }

    #[tokio::test]
    async fn lookup_failure_with_malformed_body_falls_back_to_generic() {
        let url = serve_once("HTTP/1.1 500 Internal Server Error", "upstream exploded").await;

        let client = CatalogClient::new(DEFAULT_CATALOG_URL.to_string(), url);
        let err = client.lookup_isbn("9780141439518").await.unwrap_err();

        match &err {
            ClientError::Status { status, message } => {
                assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(*message, None);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            err.user_message(),
            "Book lookup failed (500 Internal Server Error)"
        );
    }

    #[tokio::test]
    async fn catalog_failure_is_an_error_not_a_panic() {
        let url = serve_once("HTTP/1.1 502 Bad Gateway", "").await;

        let client = CatalogClient::new(url, LOOKUP_SERVICE_URL.to_string());
        assert!(client.fetch_catalog().await.is_err());
    }
}
