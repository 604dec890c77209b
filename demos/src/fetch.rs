//! HTTP fetches run on the runtime's blocking pool.

use reqwest::blocking::Client;
use std::time::Duration;
use strand::io::{IoErrorCode, IoFailure, perform_io};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; strand-scraper/0.1)";

/// A successfully fetched page.
pub(crate) struct Page {
    pub(crate) status: u16,
    pub(crate) body: String,
}

/// Builds the blocking client shared by every fetch.
pub(crate) fn client(timeout: Duration) -> Result<Client, IoFailure> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| classify(&err))
}

/// Fetches `url`, following redirects, without blocking other tasks.
///
/// A non-success status is reported as [`IoErrorCode::Status`].
pub(crate) async fn fetch(client: Client, url: String) -> Result<Page, IoFailure> {
    perform_io(move || {
        let response = client.get(&url).send().map_err(|err| classify(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IoFailure::status(
                status.as_u16(),
                format!("{url} answered {status}"),
            ));
        }

        let body = response.text().map_err(|err| classify(&err))?;

        Ok(Page {
            status: status.as_u16(),
            body,
        })
    })
    .await
}

/// Maps a transport error onto an [`IoErrorCode`].
fn classify(err: &reqwest::Error) -> IoFailure {
    let code = if err.is_timeout() {
        IoErrorCode::Timeout
    } else if err.is_connect() {
        connect_code(err)
    } else if let Some(status) = err.status() {
        IoErrorCode::Status(status.as_u16())
    } else {
        IoErrorCode::Transport
    };

    IoFailure::new(code, error_chain(err))
}

/// Refines a connection failure by looking at its cause chain.
fn connect_code(err: &reqwest::Error) -> IoErrorCode {
    let chain = error_chain(err).to_ascii_lowercase();

    if chain.contains("dns") || chain.contains("resolve") || chain.contains("lookup") {
        IoErrorCode::Dns
    } else if chain.contains("tls") || chain.contains("certificate") || chain.contains("handshake") {
        IoErrorCode::Tls
    } else {
        IoErrorCode::Connect
    }
}

/// The error message followed by every source, `: `-separated.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
