use crate::config::{Configuration, HttpConfiguration, RunMode, DEFAULT_HOST};

use anyhow::Context;
use clap::{App, Arg, ArgMatches};
use std::ffi::OsString;
use std::net::SocketAddr;

const ABOUT: &str = r#"
Print a snapshot of the environment as an HTML page

Run without options, this behaves as a CGI program: it writes a text/html CGI
response listing every environment variable, sorted by name, to standard output.
Diagnostics go to standard error and are controlled with RUST_LOG.

With --listen, it instead serves the same page over HTTP. Each request is rendered
from a fresh snapshot of the process environment plus the CGI meta-variables a
CGI program would receive for that request.
"#;

// HTTP configuration
const ARG_LISTEN_ON: &str = "listen";
const ARG_DEFAULT_HOSTNAME: &str = "hostname";

pub fn printenv_app_definition() -> App<'static, 'static> {
    App::new("printenv")
    .version(clap::crate_version!())
    .about(ABOUT)
    .arg(
        Arg::with_name(ARG_LISTEN_ON)
            .short("l")
            .long("listen")
            .value_name("IP_PORT")
            .takes_value(true)
            .required(true)
            .help("serve the page over HTTP on this IP address and port (e.g. 127.0.0.1:3000) instead of running as a CGI program"),
    )
    .arg(
        Arg::with_name(ARG_DEFAULT_HOSTNAME)
            .long("hostname")
            .value_name("HOSTNAME")
            .takes_value(true)
            .help("the hostname (and the port if not :80) reported when a request has no Host header. Default: localhost:3000"),
    )
}

pub fn parse_command_line() -> anyhow::Result<Configuration> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<OsString> = std::env::args_os().collect();
    if invoked_as_cgi(&args, std::env::var_os("GATEWAY_INTERFACE").is_some()) {
        tracing::debug!(words = args.len().saturating_sub(1), "Running as a CGI program");
        return Ok(Configuration { mode: RunMode::Cgi });
    }

    let matches = printenv_app_definition().get_matches_from(args);
    parse_configuration_from(matches)
}

/// Whether this is a CGI invocation, in which case the command line is not ours.
///
/// A web server may pass the words of a query string without '=' as arguments
/// (RFC 3875, section 4.4), so any argv is valid under a CGI gateway. Outside of
/// one, only options select server mode.
fn invoked_as_cgi(args: &[OsString], has_gateway_interface: bool) -> bool {
    has_gateway_interface
        || !args
            .iter()
            .skip(1)
            .any(|a| a.to_string_lossy().starts_with('-'))
}

pub fn parse_configuration_from(matches: ArgMatches) -> anyhow::Result<Configuration> {
    let listen_on = matches
        .value_of(ARG_LISTEN_ON)
        .ok_or_else(|| anyhow::anyhow!("A listen address is required to serve the page"))?;
    let addr: SocketAddr = listen_on
        .parse()
        .with_context(|| format!("Invalid listen address {}", listen_on))?;
    let hostname = matches
        .value_of(ARG_DEFAULT_HOSTNAME)
        .unwrap_or(DEFAULT_HOST);

    tracing::info!(?addr, hostname, "Configured to serve the page");

    Ok(Configuration {
        mode: RunMode::Serve(HttpConfiguration {
            listen_on: addr,
            default_hostname: hostname.to_owned(),
        }),
    })
}
