use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

/// Host settings read from the process environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    /// Reference feed used when `--reference` is not given
    pub reference_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Environment::parse(&lookup("QUOTE_ENV").unwrap_or_else(|| "dev".to_string()));
        let reference_path = lookup("QUOTE_REFERENCE_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Settings { env, reference_path }
    }

    /// A path given on the command line wins over the environment
    pub fn reference_path(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.reference_path.clone())
    }
}
