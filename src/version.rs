//! Version strings reported in the page and in the CGI environment.

/// The version of CGI that the page server emulates.
pub const CGI_VERSION: &str = "CGI/1.1";

/// The CGI-defined "server software version".
pub const SERVER_SOFTWARE_VERSION: &str = concat!("printenv/", env!("CARGO_PKG_VERSION"));

/// The runtime identification shown on the rendered page.
pub fn runtime_version() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
