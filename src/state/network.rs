use log::{debug, info, warn};
use mlb_api::client::{ApiError, ApiResult};
use mlb_api::fetch::{Fetch, HttpFetcher};
use std::cell::Cell;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

const CONNECT_PAUSE: Duration = Duration::from_secs(1);

/// A way onto the network: bring it up, ask whether it is up, and fetch through it.
pub trait NetworkLink: Fetch {
    /// Try up to `max_attempts` times; true once the link is usable.
    fn connect(&mut self, max_attempts: u32) -> impl Future<Output = bool>;
    fn is_connected(&self) -> bool;
    fn ip_address(&self) -> Option<String>;
}

/// Live link over reqwest. Connecting probes the stats API host.
///
/// Only requests to the stats host move the connected flag; other hosts
/// (the price ticker) can fail without taking the link down.
#[derive(Debug)]
pub struct HttpLink {
    fetcher: HttpFetcher,
    probe_url: String,
    home_origin: Option<String>,
    connected: Cell<bool>,
    ip: Option<String>,
}

impl HttpLink {
    pub fn new(probe_url: impl Into<String>, timeout: Duration) -> Self {
        let probe_url = probe_url.into();
        Self {
            fetcher: HttpFetcher::new(timeout),
            home_origin: origin_of(&probe_url),
            probe_url,
            connected: Cell::new(false),
            ip: None,
        }
    }

    async fn probe(&self) -> bool {
        match self.fetcher.fetch(&self.probe_url).await {
            // Any HTTP answer means the host is reachable.
            Ok(_) | Err(ApiError::Api(..)) => true,
            Err(e) => {
                warn!("connectivity probe failed: {e}");
                false
            }
        }
    }

    /// Local address the OS would route the probe host through. Nothing is sent.
    async fn local_ip(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.probe_url).ok()?;
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        let socket = tokio::net::UdpSocket::bind("0.0.0.0:0").await.ok()?;
        socket.connect((host, port)).await.ok()?;
        socket.local_addr().ok().map(|addr| addr.ip().to_string())
    }
}

/// `scheme://host:port` of a URL.
fn origin_of(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()
        .map(|u| u.origin().ascii_serialization())
}

impl Fetch for HttpLink {
    async fn fetch(&self, url: &str) -> ApiResult<String> {
        let result = self.fetcher.fetch(url).await;
        if origin_of(url) != self.home_origin {
            return result;
        }
        match &result {
            Ok(_) | Err(ApiError::Api(..)) => self.connected.set(true),
            Err(ApiError::Network(..)) => self.connected.set(false),
            Err(_) => {}
        }
        result
    }
}

impl NetworkLink for HttpLink {
    async fn connect(&mut self, max_attempts: u32) -> bool {
        for attempt in 1..=max_attempts.max(1) {
            info!("connecting to {} (attempt {attempt}/{max_attempts})", self.probe_url);
            if self.probe().await {
                self.connected.set(true);
                self.ip = self.local_ip().await;
                info!("online, local address {}", self.ip.as_deref().unwrap_or("unknown"));
                return true;
            }
            if attempt < max_attempts {
                tokio::time::sleep(CONNECT_PAUSE).await;
            }
        }
        self.connected.set(false);
        false
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn ip_address(&self) -> Option<String> {
        self.ip.clone()
    }
}

/// Offline link serving recorded responses from a directory.
///
/// `schedule.json`, `standings.json` and `feed_live.json` answer the matching
/// stats endpoints; anything else is answered by `ticker.json`.
#[derive(Debug)]
pub struct ReplayLink {
    dir: PathBuf,
    connected: bool,
}

impl ReplayLink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), connected: false }
    }

    fn file_for(url: &str) -> &'static str {
        let path = url.split('?').next().unwrap_or(url);
        if path.ends_with("/schedule") {
            "schedule.json"
        } else if path.ends_with("/standings") {
            "standings.json"
        } else if path.ends_with("/feed/live") {
            "feed_live.json"
        } else {
            "ticker.json"
        }
    }
}

impl Fetch for ReplayLink {
    async fn fetch(&self, url: &str) -> ApiResult<String> {
        let path = self.dir.join(Self::file_for(url));
        debug!("replaying {} for {url}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ApiError::NotFound(format!("{}: {e}", path.display())))
    }
}

impl NetworkLink for ReplayLink {
    async fn connect(&mut self, _max_attempts: u32) -> bool {
        self.connected = tokio::fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !self.connected {
            warn!("replay directory {} is missing", self.dir.display());
        }
        self.connected
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn ip_address(&self) -> Option<String> {
        None
    }
}

/// The link picked at startup.
#[derive(Debug)]
pub enum AnyLink {
    Http(HttpLink),
    Replay(ReplayLink),
}

impl Fetch for AnyLink {
    async fn fetch(&self, url: &str) -> ApiResult<String> {
        match self {
            AnyLink::Http(link) => link.fetch(url).await,
            AnyLink::Replay(link) => link.fetch(url).await,
        }
    }
}

impl NetworkLink for AnyLink {
    async fn connect(&mut self, max_attempts: u32) -> bool {
        match self {
            AnyLink::Http(link) => link.connect(max_attempts).await,
            AnyLink::Replay(link) => link.connect(max_attempts).await,
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            AnyLink::Http(link) => link.is_connected(),
            AnyLink::Replay(link) => link.is_connected(),
        }
    }

    fn ip_address(&self) -> Option<String> {
        match self {
            AnyLink::Http(link) => link.ip_address(),
            AnyLink::Replay(link) => link.ip_address(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn http_link_connects_when_host_answers() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/api/v1").with_status(404).create_async().await;

        let mut link = HttpLink::new(format!("{}/api/v1", server.url()), Duration::from_secs(2));
        assert!(!link.is_connected());
        assert!(link.connect(1).await);
        assert!(link.is_connected());
    }

    #[tokio::test]
    async fn http_link_gives_up_after_attempts() {
        let mut link = HttpLink::new("http://127.0.0.1:1/api/v1", Duration::from_secs(1));
        assert!(!link.connect(2).await);
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn transport_failure_on_the_stats_host_marks_link_down() {
        let link = HttpLink::new("http://127.0.0.1:1/api/v1", Duration::from_secs(1));
        link.connected.set(true);

        assert!(link.fetch("http://127.0.0.1:1/api/v1/schedule").await.is_err());
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn other_hosts_failing_leave_the_link_up() {
        let link = HttpLink::new("http://127.0.0.1:1/api/v1", Duration::from_secs(1));
        link.connected.set(true);

        assert!(link.fetch("http://127.0.0.1:2/price.json").await.is_err());
        assert!(link.is_connected());
    }

    #[test]
    fn origins_compare_scheme_host_and_port() {
        assert_eq!(
            origin_of("https://statsapi.mlb.com/api/v1/schedule?date=2024-04-01"),
            origin_of("https://statsapi.mlb.com/api/v1")
        );
        assert_ne!(origin_of("http://127.0.0.1:1/a"), origin_of("http://127.0.0.1:2/a"));
        assert_eq!(origin_of("not a url"), None);
    }

    #[test]
    fn replay_routes_by_endpoint() {
        let base = "https://statsapi.mlb.com/api/v1";
        assert_eq!(ReplayLink::file_for(&format!("{base}/schedule?sportId=1")), "schedule.json");
        assert_eq!(ReplayLink::file_for(&format!("{base}/standings?leagueId=103,104")), "standings.json");
        assert_eq!(ReplayLink::file_for(&format!("{base}/game/1/feed/live")), "feed_live.json");
        assert_eq!(ReplayLink::file_for("https://api.example.com/price.json"), "ticker.json");
    }

    #[tokio::test]
    async fn replay_serves_files_from_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("schedule.json"), r#"{"dates":[]}"#).unwrap();

        let mut link = AnyLink::Replay(ReplayLink::new(dir.path()));
        assert!(link.connect(3).await);
        assert_eq!(link.ip_address(), None);

        let body = link.fetch("http://x/api/v1/schedule?date=2024-04-01").await.unwrap();
        assert_eq!(body, r#"{"dates":[]}"#);

        let missing = link.fetch("http://x/api/v1/standings").await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn replay_without_directory_stays_down() {
        let mut link = ReplayLink::new("/nonexistent/replay");
        assert!(!link.connect(1).await);
        assert!(!link.is_connected());
    }
}
