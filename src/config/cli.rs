use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the Vellum binary.
#[derive(Debug, Parser)]
#[command(
    name = "vellum",
    version,
    about = "Signed sessions, password records and aged cache reads"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "VELLUM_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Sign a payload with the configured secret key.
    Sign(SignArgs),
    /// Verify a signed token and print its payload.
    Verify(VerifyArgs),
    /// Derive a salted password record.
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
    /// Check a password against a stored record.
    #[command(name = "check-password")]
    CheckPassword(CheckPasswordArgs),
    /// Run signup, login, posting and cached reads against in-memory stores.
    Demo(DemoArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SignArgs {
    #[arg(value_name = "PAYLOAD")]
    pub payload: String,
}

#[derive(Debug, Args, Clone)]
pub struct VerifyArgs {
    #[arg(value_name = "TOKEN")]
    pub token: String,
}

#[derive(Debug, Args, Clone)]
pub struct HashPasswordArgs {
    #[arg(value_name = "NAME")]
    pub name: String,

    #[arg(value_name = "PASSWORD")]
    pub password: String,

    /// Use this salt instead of generating one.
    #[arg(long, value_name = "SALT")]
    pub salt: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CheckPasswordArgs {
    #[arg(value_name = "NAME")]
    pub name: String,

    #[arg(value_name = "PASSWORD")]
    pub password: String,

    /// Stored `hash|salt` record.
    #[arg(value_name = "RECORD")]
    pub record: String,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of posts to create.
    #[arg(long, default_value_t = DEFAULT_DEMO_POSTS)]
    pub posts: usize,

    /// Seconds to wait before re-reading the cached front page.
    #[arg(long = "pause-secs", default_value_t = 1)]
    pub pause_secs: u64,
}

const DEFAULT_DEMO_POSTS: usize = 3;

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            posts: DEFAULT_DEMO_POSTS,
            pause_secs: 1,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the signing secret.
    #[arg(long = "secret-key", value_name = "SECRET", global = true)]
    pub secret_key: Option<String>,

    /// Override the generated salt length.
    #[arg(long = "salt-length", value_name = "COUNT", global = true)]
    pub salt_length: Option<usize>,

    /// Override the in-memory cache capacity.
    #[arg(long = "cache-store-capacity", value_name = "COUNT", global = true)]
    pub cache_store_capacity: Option<usize>,

    /// Override the number of posts on the front page listing.
    #[arg(long = "cache-listing-limit", value_name = "COUNT", global = true)]
    pub cache_listing_limit: Option<usize>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}
