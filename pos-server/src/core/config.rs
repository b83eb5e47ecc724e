/// Server configuration - every knob of the POS node
///
/// # Environment variables
///
/// All settings can be overridden via environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/boba/pos | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | MENU_PATH | {WORK_DIR}/menu.json | Menu and recipe definitions |
/// | INVENTORY_SEED_PATH | {WORK_DIR}/inventory_seed.json | First-run inventory seed |
/// | LOG_LEVEL | info | Log verbosity |
/// | ENVIRONMENT | development | Runtime environment |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/pos HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Path to the menu JSON (products, sizes, prices, recipes, addons)
    pub menu_path: String,
    /// Path to the inventory seed JSON, applied only to an empty store
    pub inventory_seed_path: String,
    /// Log verbosity passed to the tracing subscriber
    pub log_level: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to their defaults.
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/boba/pos".into());
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            menu_path: std::env::var("MENU_PATH")
                .unwrap_or_else(|_| format!("{work_dir}/menu.json")),
            inventory_seed_path: std::env::var("INVENTORY_SEED_PATH")
                .unwrap_or_else(|_| format!("{work_dir}/inventory_seed.json")),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            work_dir,
        }
    }

    /// Path of the embedded database file
    pub fn database_path(&self) -> String {
        format!("{}/pos.redb", self.work_dir)
    }

    /// Override the paths that matter for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        let work_dir = work_dir.into();
        config.menu_path = format!("{work_dir}/menu.json");
        config.inventory_seed_path = format!("{work_dir}/inventory_seed.json");
        config.work_dir = work_dir;
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
