use crate::error::{PipelineError, Result};
use crate::utils::constants::{ARCHIVE_EXTENSION, DOWNLOAD_CHUNK_SIZE};
use futures_util::StreamExt;
use scraper::{Html, Selector};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info};
use url::Url;

/// One archive advertised on the listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveLink {
    pub url: Url,
    pub filename: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Discovers archives on the agency's listing page and mirrors them into
/// the local archive directory. A file that already exists locally is
/// never fetched again; its name alone identifies the archive.
pub struct ArchiveFetcher {
    client: reqwest::Client,
    listing_url: Url,
    destination: PathBuf,
}

impl ArchiveFetcher {
    pub fn new(listing_url: &str, destination: PathBuf) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            listing_url: Url::parse(listing_url)?,
            destination,
        })
    }

    /// Fetch the listing page and collect every hyperlink ending in the
    /// archive extension. Any failure here is fatal for the run; without
    /// a listing there is nothing to acquire.
    pub async fn discover(&self) -> Result<Vec<ArchiveLink>> {
        let discovery_err = |reason: String| PipelineError::Discovery {
            url: self.listing_url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(self.listing_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| discovery_err(e.to_string()))?;

        let html = response
            .text()
            .await
            .map_err(|e| discovery_err(e.to_string()))?;

        let links = parse_listing(&html, &self.listing_url)?;
        if links.is_empty() {
            return Err(discovery_err("no archive links found".to_string()));
        }

        info!(count = links.len(), "discovered archive links");
        Ok(links)
    }

    /// Download every link that has no local copy yet. A single failed
    /// transfer is logged and skipped; the rest of the batch proceeds.
    pub async fn download_all(&self, links: &[ArchiveLink]) -> Result<FetchSummary> {
        fs::create_dir_all(&self.destination)?;
        let mut summary = FetchSummary::default();

        for link in links {
            let local_path = self.destination.join(&link.filename);
            if local_path.exists() {
                info!(file = %link.filename, "already downloaded, skipping");
                summary.skipped += 1;
                continue;
            }

            match self.download_one(link, &local_path).await {
                Ok(()) => {
                    info!(file = %link.filename, "downloaded");
                    summary.downloaded += 1;
                }
                Err(e) => {
                    error!(file = %link.filename, cause = %e, "download failed");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    pub async fn fetch_all(&self) -> Result<FetchSummary> {
        let links = self.discover().await?;
        self.download_all(&links).await
    }

    async fn download_one(&self, link: &ArchiveLink, local_path: &Path) -> Result<()> {
        let response = self
            .client
            .get(link.url.clone())
            .send()
            .await?
            .error_for_status()?;

        // Stream to a temp file in the destination directory and rename on
        // success, so a dropped transfer never counts as "downloaded".
        let temp = NamedTempFile::new_in(&self.destination)?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, temp.as_file());

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            writer.write_all(&chunk?)?;
        }
        writer.flush()?;
        drop(writer);

        temp.persist(local_path).map_err(|e| PipelineError::Io(e.error))?;
        Ok(())
    }
}

/// Extract archive links from the listing HTML, resolved against the page
/// URL and deduplicated by filename.
fn parse_listing(html: &str, base: &Url) -> Result<Vec<ArchiveLink>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("static selector");
    let suffix = format!(".{}", ARCHIVE_EXTENSION);

    let mut links: Vec<ArchiveLink> = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.to_lowercase().ends_with(&suffix) {
            continue;
        }

        let url = base.join(href)?;
        let Some(filename) = url
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        if links.iter().all(|l| l.filename != filename) {
            links.push(ArchiveLink { url, filename });
        }
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const LISTING: &str = r#"
<html><body>
  <a href="2000.zip">2000</a>
  <a href="/historical/2001.zip">2001</a>
  <a href="https://files.example.gov/archive/2002.ZIP">2002</a>
  <a href="notes.pdf">release notes</a>
  <a href="2000.zip">duplicate</a>
</body></html>
"#;

    #[test]
    fn test_parse_listing_collects_archive_links() {
        let base = Url::parse("https://portal.example.gov/historical/").unwrap();
        let links = parse_listing(LISTING, &base).unwrap();

        let names: Vec<&str> = links.iter().map(|l| l.filename.as_str()).collect();
        assert_eq!(names, vec!["2000.zip", "2001.zip", "2002.ZIP"]);
        assert_eq!(
            links[0].url.as_str(),
            "https://portal.example.gov/historical/2000.zip"
        );
        assert_eq!(
            links[1].url.as_str(),
            "https://portal.example.gov/historical/2001.zip"
        );
    }

    #[test]
    fn test_parse_listing_without_links_is_empty() {
        let base = Url::parse("https://portal.example.gov/").unwrap();
        let links = parse_listing("<html><body>nothing here</body></html>", &base).unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_existing_file_is_never_refetched() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("2000.zip"), b"cached").unwrap();

        // The URL is unroutable; a fetch attempt would fail, so a clean
        // skip proves no transfer happened.
        let fetcher =
            ArchiveFetcher::new("http://127.0.0.1:1/", dir.path().to_path_buf()).unwrap();
        let links = vec![ArchiveLink {
            url: Url::parse("http://127.0.0.1:1/2000.zip").unwrap(),
            filename: "2000.zip".to_string(),
        }];

        let summary = fetcher.download_all(&links).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.downloaded, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(std::fs::read(dir.path().join("2000.zip")).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn test_failed_transfer_is_contained() {
        let dir = TempDir::new().unwrap();
        let fetcher =
            ArchiveFetcher::new("http://127.0.0.1:1/", dir.path().to_path_buf()).unwrap();
        let links = vec![
            ArchiveLink {
                url: Url::parse("http://127.0.0.1:1/2000.zip").unwrap(),
                filename: "2000.zip".to_string(),
            },
            ArchiveLink {
                url: Url::parse("http://127.0.0.1:1/2001.zip").unwrap(),
                filename: "2001.zip".to_string(),
            },
        ];

        let summary = fetcher.download_all(&links).await.unwrap();
        assert_eq!(summary.failed, 2);
        // No partial files left behind
        assert!(!dir.path().join("2000.zip").exists());
        assert!(!dir.path().join("2001.zip").exists());
    }
}
