use std::net::{SocketAddr, TcpListener};

use crate::config::HttpConfiguration;
use crate::Router;

use anyhow::Context;
use hyper::{
    server::conn::AddrStream,
    service::{make_service_fn, service_fn},
    Server,
};

pub struct PageServer {
    router: Router,
    listener: TcpListener,
}

impl PageServer {
    /// Bind the listen address. Serving starts with [PageServer::serve].
    pub fn bind(http_configuration: &HttpConfiguration, router: Router) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(http_configuration.listen_on)
            .with_context(|| format!("Couldn't listen on {}", http_configuration.listen_on))?;
        Ok(Self { router, listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let router = self.router;
        let mk_svc = make_service_fn(move |conn: &AddrStream| {
            let addr = conn.remote_addr();
            let r = router.clone();
            async move {
                Ok::<_, std::convert::Infallible>(service_fn(move |req| {
                    let r2 = r.clone();
                    async move { r2.route(req, addr).await }
                }))
            }
        });

        let server = Server::from_tcp(self.listener)?.serve(mk_svc);
        tracing::info!(address = %server.local_addr(), "Serving the environment page");
        server.await?;

        Ok(())
    }
}
