//! HTTP content source

use std::time::Duration;

use async_trait::async_trait;
use bsb_core::{Book, ContentSource};

use crate::canon::standard_corpus;
use crate::config::ReaderConfig;
use crate::DataError;

/// Fetches chapter markup from a text host.
///
/// The URL template may contain `{translation}`, `{book}` and `{chapter}`.
/// The book list is the standard canon.
pub struct HttpContentSource {
    client: reqwest::Client,
    url_template: String,
    translation: String,
    name: String,
}

impl HttpContentSource {
    pub fn new(
        url_template: impl Into<String>,
        translation: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DataError> {
        let url_template = url_template.into();
        if !url_template.contains("{book}") || !url_template.contains("{chapter}") {
            return Err(DataError::Config(format!(
                "content URL template needs {{book}} and {{chapter}}: {}",
                url_template
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bsb-reader/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let translation = translation.into();

        Ok(Self {
            client,
            name: format!("{} (http)", translation),
            url_template,
            translation,
        })
    }

    pub fn from_config(config: &ReaderConfig) -> Result<Self, DataError> {
        Self::new(
            config.content_url_template.clone(),
            config.translation.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Chapter URL for a book and chapter
    pub fn chapter_url(&self, book_id: &str, chapter: u32) -> String {
        self.url_template
            .replace("{translation}", &self.translation)
            .replace("{book}", book_id)
            .replace("{chapter}", &chapter.to_string())
    }

    async fn fetch(&self, url: &str) -> Result<String, DataError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        Ok(standard_corpus().books().to_vec())
    }

    async fn fetch_chapter_html(&self, book_id: &str, chapter: u32) -> anyhow::Result<String> {
        let url = self.chapter_url(book_id, chapter);
        tracing::debug!("GET {}", url);
        let html = self.fetch(&url).await?;
        tracing::debug!("Fetched {} {} ({} bytes)", book_id, chapter, html.len());
        Ok(html)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP response and report the request line
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            let request = String::from_utf8_lossy(&request).to_string();
            request.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}", addr), task)
    }

    #[test]
    fn test_chapter_url() {
        let source = HttpContentSource::new(
            "https://text.example/{translation}/{book}/{chapter}.html",
            "BSB",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(source.chapter_url("JHN", 3), "https://text.example/BSB/JHN/3.html");
        assert_eq!(source.source_name(), "BSB (http)");
    }

    #[test]
    fn test_template_requires_placeholders() {
        let result =
            HttpContentSource::new("https://text.example/{book}", "BSB", Duration::from_secs(5));
        assert!(matches!(result, Err(DataError::Config(_))));
    }

    #[tokio::test]
    async fn test_books_from_canon() {
        let source = HttpContentSource::from_config(&ReaderConfig::default()).unwrap();
        let books = source.list_books().await.unwrap();
        assert_eq!(books.len(), 66);
        assert_eq!(books[42].id, "JHN");
    }

    #[tokio::test]
    async fn test_fetch_chapter() {
        let (base, server) = serve_once("200 OK", "<p>In the beginning was the Word</p>").await;
        let source = HttpContentSource::new(
            format!("{}/{{translation}}/{{book}}/{{chapter}}.html", base),
            "BSB",
            Duration::from_secs(5),
        )
        .unwrap();

        let html = source.fetch_chapter_html("JHN", 1).await.unwrap();
        assert_eq!(html, "<p>In the beginning was the Word</p>");
        assert_eq!(server.await.unwrap(), "GET /BSB/JHN/1.html HTTP/1.1");
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let (base, server) = serve_once("404 Not Found", "missing").await;
        let source = HttpContentSource::new(
            format!("{}/{{book}}/{{chapter}}", base),
            "BSB",
            Duration::from_secs(5),
        )
        .unwrap();

        let err = source.fetch_chapter_html("XYZ", 1).await.unwrap_err();
        assert!(err.to_string().contains("404"));
        server.await.unwrap();
    }
}
