use crate::models::XmlcheckConfig;
use crate::server::{self, AppState};
use crate::validator::DocumentValidator;
use crate::Result;
use anyhow::Context;
use std::net::SocketAddr;

/// Command-line overrides for `xmlcheck serve`
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Open the upload form in a browser once the server starts
    pub open: bool,
}

/// Resolve the listen address from flags, then config
pub fn resolve_addr(config: &XmlcheckConfig, options: &ServeOptions) -> Result<SocketAddr> {
    let host = options.host.as_deref().unwrap_or(&config.server.host);
    let port = options.port.unwrap_or(config.server.port);
    let raw = if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    };
    raw.parse()
        .with_context(|| format!("Invalid listen address '{}'", raw))
}

pub async fn run(config: &XmlcheckConfig, options: ServeOptions) -> Result<()> {
    let addr = resolve_addr(config, &options)?;
    let state = AppState::new(DocumentValidator::from_config(&config));

    if options.open {
        open_browser(&format!("http://{}/", addr));
    }

    server::start_server(addr, state, config.server.max_upload_bytes).await
}

#[cfg(feature = "ui")]
fn open_browser(url: &str) {
    if let Err(e) = open::that(url) {
        eprintln!("Failed to open browser: {}. Please open {} manually.", e, url);
    }
}

#[cfg(not(feature = "ui"))]
fn open_browser(url: &str) {
    use colored::Colorize;
    eprintln!(
        "{}",
        format!("⚠ Built without the 'ui' feature; open {} manually", url).yellow()
    );
}
