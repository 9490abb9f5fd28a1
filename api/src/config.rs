use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// Persist to MongoDB.
    #[default]
    Mongodb,

    /// Keep everything in process memory. Nothing survives a restart.
    Memory,
}

#[derive(Clone, Debug, Parser)]
#[command(name = "berth-api", version, about = "Berth app certificate API")]
pub struct BerthApiConfig {
    #[clap(
        short,
        long,
        env = "BERTH_API_BIND_ADDR",
        default_value = "0.0.0.0:4000"
    )]
    pub bind_addr: SocketAddr,

    /// Origin allowed to make credentialed cross-origin requests.
    #[clap(
        long,
        env = "BERTH_API_PUBLIC_URL",
        default_value = "http://localhost:4000"
    )]
    pub public_url: String,

    /// Print the OpenAPI document and exit.
    #[clap(long, default_value_t = false)]
    pub dump_openapi: bool,

    #[clap(long, env = "BERTH_API_STORAGE", value_enum, default_value_t)]
    pub storage: StorageBackend,

    #[clap(
        long,
        env = "BERTH_API_MONGODB_URI",
        default_value = "mongodb://localhost:27017/berth"
    )]
    pub mongodb_uri: String,

    /// API token for the `admin` user. When set, the user is created (or its
    /// token replaced) at startup.
    #[clap(long, env = "BERTH_API_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,
}

#[cfg(test)]
impl Default for BerthApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4000)),
            public_url: "http://localhost:4000".into(),
            dump_openapi: false,
            storage: StorageBackend::Memory,
            mongodb_uri: String::new(),
            admin_token: None,
        }
    }
}
