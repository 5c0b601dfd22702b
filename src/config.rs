use std::net::SocketAddr;

/// Host and port reported to the page when a request does not name one.
pub const DEFAULT_HOST: &str = "localhost:3000";

#[derive(Clone, Debug)]
pub struct Configuration {
    pub mode: RunMode,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunMode {
    /// Render once for the process environment and write to stdout.
    Cgi,
    /// Serve the page over HTTP until the process is stopped.
    Serve(HttpConfiguration),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpConfiguration {
    pub listen_on: SocketAddr,
    pub default_hostname: String,
}
