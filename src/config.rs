use envconfig::Envconfig;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "DATABASE_URL", default = "postgresql://localhost/community_server")]
    pub database_url: String,

    #[envconfig(from = "COMMUNITY_SERVER_PORT", default = "3000")]
    pub port: u16,

    #[envconfig(from = "COMMUNITY_SERVER_MAX_DB_CONNECTIONS", default = "5")]
    pub max_db_connections: u32,

    #[envconfig(from = "COMMUNITY_SERVER_MAX_BODY_BYTES", default = "262144")] // 256 KiB
    pub max_body_bytes: usize,

    #[envconfig(from = "COMMUNITY_SERVER_NAME", default = "Community Server")]
    pub server_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, envconfig::Error> {
        Self::init_from_env()
    }
}
