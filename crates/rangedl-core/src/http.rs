//! Curl transport settings shared by the HEAD probe and ranged GETs.

use std::time::Duration;

/// Transport options applied to every curl `Easy` handle.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Hard timeout for the HEAD probe only; ranged GETs rely on the low-speed limit.
    pub probe_timeout: Duration,
    /// Abort a transfer if throughput stays below this many bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub max_redirections: u32,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            max_redirections: 10,
            user_agent: default_user_agent(),
        }
    }
}

pub(crate) fn default_user_agent() -> String {
    format!("rangedl/{}", env!("CARGO_PKG_VERSION"))
}

impl HttpOptions {
    /// Builds an `Easy` handle for `url` with redirects and transport limits set.
    pub(crate) fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        Ok(easy)
    }
}
