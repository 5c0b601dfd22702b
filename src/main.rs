use printenv::app::parse_command_line;
use printenv::config::RunMode;
use printenv::server::PageServer;
use printenv::{environment, write_cgi_page, Router};

#[tokio::main]
pub async fn main() -> Result<(), anyhow::Error> {
    let configuration = parse_command_line()?;

    match &configuration.mode {
        RunMode::Cgi => {
            // Captured once, before anything is written.
            let env = environment::capture();
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_cgi_page(&mut out, &env)
        }
        RunMode::Serve(http) => {
            let server = PageServer::bind(http, Router::new(http))?;
            server.serve().await
        }
    }
}
