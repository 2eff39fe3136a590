use anyhow::{Context, Result};
use clap::Parser;
use notedeck_core::{load_config, CoreConfig, SessionConfig};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug, Default)]
#[command(name = "notedeck", version, about = "Terminal note manager")]
pub struct Args {
    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Note database file (in-memory when omitted)
    #[arg(long)]
    pub database: Option<PathBuf>,
    /// Signed-in user id
    #[arg(long)]
    pub user: Option<Uuid>,
    /// Signed-in user email
    #[arg(long)]
    pub email: Option<String>,
    /// Log level: trace|debug|info|warn|error
    #[arg(long)]
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    /// Config file, then `NOTEDECK_*` environment, then flags.
    pub fn resolve_config(&self) -> Result<CoreConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => CoreConfig::default(),
        };
        config.apply_env().context("applying environment overrides")?;
        self.apply_flags(&mut config);
        Ok(config)
    }

    fn apply_flags(&self, config: &mut CoreConfig) {
        if let Some(path) = &self.database {
            config.database_path = Some(path.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = Some(level.clone());
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        if let Some(user_id) = self.user {
            let email = self
                .email
                .clone()
                .or_else(|| config.session.take().map(|session| session.email))
                .unwrap_or_default();
            config.session = Some(SessionConfig { user_id, email });
        } else if let (Some(email), Some(session)) = (&self.email, config.session.as_mut()) {
            session.email = email.clone();
        }
    }
}
