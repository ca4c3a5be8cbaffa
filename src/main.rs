use std::io::ErrorKind;

use tracing::{error, info, warn};

use httpmail::{Config, HttpMailError, LettreConnector, WebServer};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn load_config(path: &str) -> httpmail::Result<Config> {
    let mut config = match Config::load(path) {
        Ok(config) => config,
        Err(HttpMailError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            eprintln!("{path} not found, using default configuration.");
            Config::default()
        }
        Err(e) => return Err(e),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

fn log_settings(config: &Config) {
    info!("\tsmtp address: {}", config.smtp.address);
    info!("\tlocked mail-from: {}", config.defaults.locked_from);
    info!("\tmail-defaults:");
    info!("\t\tto: {}", config.defaults.to);
    info!("\t\tfrom: {}", config.defaults.from);
    info!("\t\tsubject: {}", config.defaults.subject);
    info!("\t\tbody: {}", config.defaults.body);
    if config.smtp.skip_tls {
        warn!("this instance is running without tls");
    }
}

fn build_connector(config: &Config) -> httpmail::Result<LettreConnector> {
    let mut connector = LettreConnector::new().with_connect_timeout(config.smtp.connect_timeout());
    if let Some(name) = &config.smtp.hello_name {
        connector = connector.with_hello_name(name.clone());
    }
    if let Some(path) = &config.smtp.ca_file {
        let pem = std::fs::read(path)?;
        connector = connector.with_root_certificate_pem(&pem)?;
        info!("\ttrusting relay certificates from {}", path);
    }
    Ok(connector)
}

#[tokio::main]
async fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    if let Err(e) = httpmail::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        httpmail::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Initiating HTTP-to-SMTP relay");
    log_settings(&config);

    let connector = match build_connector(&config) {
        Ok(connector) => connector,
        Err(e) => {
            error!("Failed to set up SMTP connector: {}", e);
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, connector) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
