use clap::Parser;

use crate::config::ServiceConfig;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "meter-aggregation-rs",
    version,
    about = "Condensed and aggregated views over cumulative meter readings"
)]
pub struct Args {
    /// Overrides METER_HTTP_HOST.
    #[arg(long)]
    pub host: Option<String>,
    /// Overrides METER_HTTP_PORT.
    #[arg(long)]
    pub port: Option<u16>,
}

impl Args {
    pub fn apply(&self, config: &mut ServiceConfig) {
        if let Some(host) = &self.host {
            config.http_host = host.clone();
        }
        if let Some(port) = self.port {
            config.http_port = port;
        }
    }
}
