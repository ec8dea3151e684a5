//! Remote page acquisition over HTTP.
//!
//! Page images live next to the atlas file on the server: the URL of each
//! page is the atlas URL with its file name replaced by the page's.

use super::fs::FileSystem;
use super::ImageAcquirer;
use crate::config::HttpOptions;
use crate::error::{AtlasError, Result};
use crate::texture::Texture;
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Downloads a URL into a directory and returns the local file.
pub trait Fetcher: Send + Sync {
    fn download(&self, url: &Url, target_dir: &Path) -> Result<PathBuf>;
}

impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    fn download(&self, url: &Url, target_dir: &Path) -> Result<PathBuf> {
        (**self).download(url, target_dir)
    }
}

/// Parse an atlas URL.
pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| AtlasError::MalformedReference(format!("{}: {}", url, e)))
}

/// Last path segment of a URL, used as the local file name.
pub fn file_name_of(url: &Url) -> Result<&str> {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AtlasError::MalformedReference(format!("no file name in {}", url)))
}

/// Derive a page image URL from the atlas URL.
///
/// "http://host/path/a.atlas" + "img.png" -> "http://host/path/img.png"
///
/// Only the file name of `texture_path` is used. Query and fragment of the
/// atlas URL are dropped.
pub fn derive_image_url(atlas_url: &Url, texture_path: &str) -> Result<Url> {
    let file_name = texture_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(texture_path);
    if file_name.is_empty() {
        return Err(AtlasError::MalformedReference(format!(
            "page reference '{}' has no file name",
            texture_path
        )));
    }
    if atlas_url.cannot_be_a_base() {
        return Err(AtlasError::MalformedReference(format!(
            "cannot derive page URL from {}",
            atlas_url
        )));
    }

    let atlas_path = atlas_url.path();
    let dir = match atlas_path.rfind('/') {
        Some(i) => &atlas_path[..=i],
        None => "/",
    };

    let mut url = atlas_url.clone();
    url.set_path(&format!("{}{}", dir, file_name));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Blocking HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(options: &HttpOptions) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(options.user_agent.clone());
        if !options.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| AtlasError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn download(&self, url: &Url, target_dir: &Path) -> Result<PathBuf> {
        let file_name = file_name_of(url)?;
        let transport = |e: reqwest::Error| AtlasError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().map_err(transport)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AtlasError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(AtlasError::Transport {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }
        let bytes = response.bytes().map_err(transport)?;

        std::fs::create_dir_all(target_dir)
            .map_err(|e| AtlasError::io(target_dir.display().to_string(), e))?;
        let local = target_dir.join(file_name);
        std::fs::write(&local, &bytes).map_err(|e| AtlasError::io(local.display().to_string(), e))?;

        log::debug!("Downloaded {} ({} bytes) to {}", url, bytes.len(), local.display());
        Ok(local)
    }
}

/// Acquires page images by downloading them from next to the atlas URL.
#[derive(Clone)]
pub struct RemoteSource {
    atlas_url: Url,
    target_dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    fs: Arc<dyn FileSystem>,
}

impl RemoteSource {
    pub fn new(
        atlas_url: Url,
        target_dir: impl Into<PathBuf>,
        fetcher: Arc<dyn Fetcher>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            atlas_url,
            target_dir: target_dir.into(),
            fetcher,
            fs,
        }
    }

    pub fn atlas_url(&self) -> &Url {
        &self.atlas_url
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }
}

impl ImageAcquirer for RemoteSource {
    fn acquire(&self, texture_path: &str) -> Result<Texture> {
        let url = derive_image_url(&self.atlas_url, texture_path)?;
        log::debug!("Fetching page {} from {}", texture_path, url);
        let local = self.fetcher.download(&url, &self.target_dir)?;
        let reader = self.fs.open(&local)?;
        Texture::decode(reader, url.as_str())
    }
}

impl std::fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSource")
            .field("atlas_url", &self.atlas_url.as_str())
            .field("target_dir", &self.target_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::source::fs::StdFileSystem;
    use crate::test_support::{png_bytes, MapFetcher};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_derive_image_url() {
        let atlas = url("http://host/path/a.atlas");
        assert_eq!(
            derive_image_url(&atlas, "img.png").unwrap().as_str(),
            "http://host/path/img.png"
        );
        // Only the file name of the page reference counts.
        assert_eq!(
            derive_image_url(&atlas, "/tmp/downloads/img.png").unwrap().as_str(),
            "http://host/path/img.png"
        );
    }

    #[test]
    fn test_derive_image_url_keeps_port_drops_query() {
        let atlas = url("https://cdn.example.com:8443/assets/hero/hero.atlas?v=3#top");
        assert_eq!(
            derive_image_url(&atlas, "hero_2.png").unwrap().as_str(),
            "https://cdn.example.com:8443/assets/hero/hero_2.png"
        );

        let root = url("http://host/a.atlas");
        assert_eq!(
            derive_image_url(&root, "img.png").unwrap().as_str(),
            "http://host/img.png"
        );
    }

    #[test]
    fn test_derive_image_url_malformed() {
        let atlas = url("http://host/path/a.atlas");
        let err = derive_image_url(&atlas, "pages/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedReference);

        let err = derive_image_url(&url("mailto:someone@example.com"), "img.png").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedReference);
    }

    #[test]
    fn test_parse_url_malformed() {
        assert_eq!(parse_url("not a url").unwrap_err().kind(), ErrorKind::MalformedReference);
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of(&url("http://host/path/a.atlas")).unwrap(), "a.atlas");
        assert!(file_name_of(&url("http://host/path/")).is_err());
    }

    #[test]
    fn test_remote_source_downloads_into_target_dir() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MapFetcher::new(&[(
            "http://host/path/img.png",
            png_bytes(6, 2),
        )]));
        let source = RemoteSource::new(
            url("http://host/path/a.atlas"),
            dir.path(),
            fetcher.clone(),
            Arc::new(StdFileSystem),
        );

        let texture = source.acquire("img.png").unwrap();
        assert_eq!((texture.width, texture.height), (6, 2));
        assert!(dir.path().join("img.png").exists());
        assert_eq!(fetcher.requests(), vec!["http://host/path/img.png".to_string()]);
    }

    #[test]
    fn test_remote_source_missing_page() {
        let dir = tempfile::tempdir().unwrap();
        let source = RemoteSource::new(
            url("http://host/path/a.atlas"),
            dir.path(),
            Arc::new(MapFetcher::new(&[])),
            Arc::new(StdFileSystem),
        );
        let err = source.acquire("missing.png").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    mod http_fetcher {
        use super::*;
        use crate::config::LoadOptions;
        use std::io::{Read, Write};
        use std::net::TcpListener;
        use std::sync::mpsc;
        use std::thread;

        /// Answers each connection with the next canned response and sends
        /// back the request head it received.
        fn serve(responses: Vec<(&'static str, Vec<u8>)>) -> (String, mpsc::Receiver<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                for (status, body) in responses {
                    let (mut stream, _) = listener.accept().unwrap();
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = stream.read(&mut buf).unwrap();
                        if n == 0 {
                            break;
                        }
                        head.extend_from_slice(&buf[..n]);
                    }
                    let _ = tx.send(String::from_utf8_lossy(&head).to_ascii_lowercase());
                    let reply = format!(
                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        body.len()
                    );
                    stream.write_all(reply.as_bytes()).unwrap();
                    stream.write_all(&body).unwrap();
                }
            });
            (base, rx)
        }

        fn direct() -> HttpOptions {
            HttpOptions {
                use_system_proxy: false,
                ..HttpOptions::default()
            }
        }

        #[test]
        fn test_download_writes_body() {
            let (base, requests) = serve(vec![("200 OK", b"atlas body".to_vec())]);
            let dir = tempfile::tempdir().unwrap();
            let target = dir.path().join("cache");

            let fetcher = HttpFetcher::new(&direct()).unwrap();
            let local = fetcher
                .download(&url(&format!("{}/path/a.atlas?v=1", base)), &target)
                .unwrap();

            assert_eq!(local, target.join("a.atlas"));
            assert_eq!(std::fs::read(&local).unwrap(), b"atlas body");
            let head = requests.recv().unwrap();
            assert!(head.starts_with("get /path/a.atlas?v=1 "));
            assert!(head.contains("user-agent: atlas-loader/"));
        }

        #[test]
        fn test_download_404_is_not_found() {
            let (base, _requests) = serve(vec![("404 Not Found", b"gone".to_vec())]);
            let dir = tempfile::tempdir().unwrap();

            let fetcher = HttpFetcher::new(&direct()).unwrap();
            let err = fetcher
                .download(&url(&format!("{}/path/a.png", base)), dir.path())
                .unwrap_err();

            assert_eq!(err.kind(), ErrorKind::NotFound);
            assert!(!dir.path().join("a.png").exists());
        }

        #[test]
        fn test_download_server_error_is_transport() {
            let (base, _requests) = serve(vec![("500 Internal Server Error", b"boom".to_vec())]);
            let dir = tempfile::tempdir().unwrap();

            let fetcher = HttpFetcher::new(&direct()).unwrap();
            let err = fetcher
                .download(&url(&format!("{}/path/a.png", base)), dir.path())
                .unwrap_err();

            assert_eq!(err.kind(), ErrorKind::Transport);
            assert!(matches!(err, AtlasError::Transport { ref message, .. } if message.contains("500")));
            assert!(!dir.path().join("a.png").exists());
        }

        #[test]
        fn test_load_from_remote_over_http() {
            let atlas = b"hero.png\nsize: 8, 4\nhead\n  bounds: 0, 0, 4, 4\n".to_vec();
            let (base, requests) = serve(vec![("200 OK", atlas), ("200 OK", png_bytes(8, 4))]);
            let dir = tempfile::tempdir().unwrap();
            let options = LoadOptions {
                http: direct(),
                ..LoadOptions::default()
            };

            let loaded = crate::loader::load_from_remote(
                &format!("{}/skel/hero.atlas", base),
                dir.path(),
                &options,
            )
            .unwrap();

            assert_eq!(loaded.page_count(), 1);
            assert_eq!(loaded.find_region("head").unwrap().u2, 0.5);
            assert!(requests.recv().unwrap().starts_with("get /skel/hero.atlas "));
            assert!(requests.recv().unwrap().starts_with("get /skel/hero.png "));
            assert!(dir.path().join("hero.png").exists());
        }
    }
}
