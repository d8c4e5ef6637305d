use clap::Parser;
use serde::Deserialize;
use store::StoreConfig;

use crate::{commands::Command, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/pawledger.toml";

/// Where the ledger is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    /// Path of the SQLite file, created when missing.
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Log level for the workspace crates.
    pub level: String,
    /// Owner of every row this process reads or writes.
    pub user: String,
    pub database: Database,
    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            user: "local".to_string(),
            database: Database::Sqlite("pawledger.db".to_string()),
            store: StoreConfig::default(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pawledger", about = "Keep track of what your pets cost")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the SQLite file; `:memory:` keeps everything in memory.
    #[arg(long)]
    database: Option<String>,
    /// Override the user id.
    #[arg(long)]
    user: Option<String>,
    /// Override the log level.
    #[arg(long)]
    level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

impl Args {
    fn apply(self, mut settings: AppConfig) -> (AppConfig, Command) {
        if let Some(database) = self.database {
            settings.database = match database.as_str() {
                ":memory:" | "memory" => Database::Memory,
                _ => Database::Sqlite(database),
            };
        }
        if let Some(user) = self.user {
            settings.user = user;
        }
        if let Some(level) = self.level {
            settings.level = level;
        }
        (settings, self.command.unwrap_or_default())
    }
}

pub fn load() -> Result<(AppConfig, Command)> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let settings: AppConfig = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(config::Environment::with_prefix("PAWLEDGER").separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(args.apply(settings))
}

#[cfg(test)]
mod tests {
    use store::DeletePolicy;

    use super::*;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings = from_toml("user = \"alice\"");
        assert_eq!(settings.user, "alice");
        assert_eq!(settings.level, "info");
        assert_eq!(settings.database, Database::Sqlite("pawledger.db".to_string()));
        assert_eq!(settings.store.delete_policy, DeletePolicy::Cascade);
        assert_eq!(settings.store.pet_limit.max_attempts, 5);
    }

    #[test]
    fn store_section_is_read() {
        let settings = from_toml(
            r#"
            database = "memory"

            [store]
            delete_policy = "restrict"
            default_currency = "CHF"

            [store.expense_limit]
            max_attempts = 3
            window_ms = 1000
            "#,
        );
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.store.delete_policy, DeletePolicy::Restrict);
        assert_eq!(settings.store.default_currency, store::Currency::Chf);
        assert_eq!(settings.store.expense_limit.max_attempts, 3);
    }

    #[test]
    fn command_line_overrides_the_file() {
        let args = Args::try_parse_from([
            "pawledger",
            "--database",
            ":memory:",
            "--user",
            "bob",
            "pets",
        ])
        .unwrap();
        let (settings, command) = args.apply(AppConfig::default());
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.user, "bob");
        assert!(matches!(command, Command::Pets));

        let (_, command) = Args::try_parse_from(["pawledger"])
            .unwrap()
            .apply(AppConfig::default());
        assert!(matches!(command, Command::Summary { .. }));
    }

    #[test]
    fn database_urls() {
        assert_eq!(Database::Memory.url(), "sqlite::memory:");
        assert_eq!(
            Database::Sqlite("data/pets.db".to_string()).url(),
            "sqlite:data/pets.db?mode=rwc"
        );
    }
}
