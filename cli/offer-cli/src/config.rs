use clap::ValueEnum;

pub const DEFAULT_NAMESPACE: &str = "com.nfpawn";

/// Deployment the batch is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Environment {
    #[default]
    Main,
    Test,
    Local,
}

impl Environment {
    pub fn namespace(self) -> &'static str {
        match self {
            Environment::Test => "com.nfpawn.test",
            Environment::Main | Environment::Local => DEFAULT_NAMESPACE,
        }
    }

    pub fn api_base(self) -> &'static str {
        match self {
            Environment::Main => "https://api.nfpawn.com",
            Environment::Test => "https://api-test.nfpawn.com",
            Environment::Local => "http://localhost:4445",
        }
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub environment: Environment,
    pub namespace: String,
    pub api_base: String,
}

impl Settings {
    /// Environment defaults with optional explicit overrides.
    pub fn resolve(
        environment: Environment,
        namespace: Option<String>,
        api_base: Option<String>,
    ) -> Self {
        Self {
            environment,
            namespace: namespace.unwrap_or_else(|| environment.namespace().to_owned()),
            api_base: api_base.unwrap_or_else(|| environment.api_base().to_owned()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(Environment::default(), None, None)
    }
}
