use crate::cgi::compose_response;
use crate::config::HttpConfiguration;
use crate::http_util::{build_cgi_environment, internal_error};
use crate::render::{render, EnvironmentMap};

use std::io::Write;
use std::net::SocketAddr;

use anyhow::Context;
use hyper::body::HttpBody;
use hyper::{http::request::Parts, Body, Request, Response};
use tracing::instrument;

pub mod app;
mod cgi;
pub mod config;
pub mod environment;
mod http_util;
pub mod render;
pub mod server;
pub mod version;

/// Render the page for `env` and write it out as a CGI response.
///
/// Nothing else is ever written to `out`, so the CGI header is always the first
/// thing the web server reads.
pub fn write_cgi_page<W: Write>(out: &mut W, env: &EnvironmentMap) -> anyhow::Result<()> {
    let page = render(env, &version::runtime_version());
    tracing::debug!(variables = env.len(), bytes = page.as_str().len(), "Rendered page");
    out.write_all(page.as_str().as_bytes())
        .context("Couldn't write the page to the CGI output")?;
    out.flush().context("Couldn't flush the CGI output")?;
    Ok(())
}

/// Routes inbound HTTP requests when the page is served directly.
#[derive(Clone)]
pub struct Router {
    default_host: String,
}

impl Router {
    pub fn new(http: &HttpConfiguration) -> Self {
        Router {
            default_host: http.default_hostname.clone(),
        }
    }

    /// Route the request to the correct handler
    ///
    /// `/healthz` is built in. Every other path gets the environment page.
    #[instrument(level = "info", skip(self, req), fields(uri = %req.uri()))]
    pub async fn route(
        &self,
        req: Request<Body>,
        client_addr: SocketAddr,
    ) -> Result<Response<Body>, hyper::Error> {
        tracing::trace!("Processing request");

        match req.uri().path() {
            "/healthz" => Ok(Response::new(Body::from("OK"))),
            _ => {
                let (parts, body) = req.into_parts();
                let content_length = drain_body(body).await?;
                match self.render_page(&parts, content_length, client_addr) {
                    Ok(res) => Ok(res),
                    Err(e) => Ok(internal_error(format!("{:#}", e))),
                }
            }
        }
    }

    /// Render the page from a fresh snapshot of the environment.
    ///
    /// The request's CGI meta-variables go on top of the process environment.
    fn render_page(
        &self,
        req: &Parts,
        content_length: usize,
        client_addr: SocketAddr,
    ) -> anyhow::Result<Response<Body>> {
        let snapshot = environment::capture();
        let cgi_vars = build_cgi_environment(req, content_length, client_addr, &self.default_host);
        let env = environment::overlay(&snapshot, &cgi_vars);

        let page = render(&env, &version::runtime_version());
        compose_response(page.as_str().as_bytes())
    }
}

/// Read the request body to the end, keeping only its length.
async fn drain_body(mut body: Body) -> Result<usize, hyper::Error> {
    let mut len = 0;
    while let Some(chunk) = body.data().await {
        len += chunk?.len();
    }
    Ok(len)
}
