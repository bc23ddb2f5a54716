use crate::config::PmkConfig;
use anyhow::Result;
use pmk_agent::AgentContext;
use pmk_server::ServerConfig;

pub async fn run_serve(
    context: AgentContext,
    config: &PmkConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut server = config.server.clone();
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }

    let server_config = ServerConfig::new(context).with_security(server.security());
    let addr = server.addr();
    println!("PMK server starting on http://{addr}");
    println!("Press Ctrl+C to stop");
    pmk_server::serve(server_config, &addr).await?;
    Ok(())
}
