use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_server() -> String {
    "127.0.0.1:9000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

lazy_static! {
    pub static ref CONFIG: Config = match envy::from_env() {
        Ok(config) => config,
        Err(err) => {
            // the logger is configured from CONFIG, so it is not up yet
            eprintln!("Failed to read configuration from environment: {}", err);
            std::process::exit(1);
        }
    };
}
