//! CLI definitions for the `expense-gateway` binary.
//!
//! Every Solid setting can come from a flag or its environment variable;
//! the environment names match the ones the getting-started guides use.

use clap::{Args, Parser, Subcommand};
use url::Url;

use expense_types::config::AuthFlow;

/// REST gateway for expense records stored in a Solid pod.
#[derive(Parser)]
#[command(name = "expense-gateway", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log one JSON object per event.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve(ServeArgs),

    /// Print the storage roots declared in a WebID profile.
    Pods {
        /// WebID to resolve (e.g. https://id.example/alice/profile/card#me).
        webid: Url,

        /// Output a JSON array instead of one URI per line.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        solid: SolidArgs,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Interface to bind.
    #[arg(long, env = "EXPENSE_GATEWAY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "EXPENSE_GATEWAY_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Largest accepted request body (file uploads), in bytes.
    #[arg(long, env = "EXPENSE_GATEWAY_MAX_UPLOAD", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    #[command(flatten)]
    pub solid: SolidArgs,
}

/// Connection settings for the pod and its identity provider.
#[derive(Args)]
pub struct SolidArgs {
    /// Use a throwaway in-memory pod instead of a real one. No credentials needed.
    #[arg(long)]
    pub in_memory: bool,

    /// Identity provider URI (e.g. https://login.inrupt.com).
    #[arg(long, env = "MY_SOLID_IDP", required_unless_present = "in_memory")]
    pub idp: Option<Url>,

    /// Client id registered with the identity provider.
    #[arg(long, env = "MY_SOLID_CLIENT_ID", required_unless_present = "in_memory")]
    pub client_id: Option<String>,

    /// Client secret registered with the identity provider.
    #[arg(
        long,
        env = "MY_SOLID_CLIENT_SECRET",
        hide_env_values = true,
        required_unless_present = "in_memory"
    )]
    pub client_secret: Option<String>,

    /// How credentials are sent to the token endpoint
    /// (client_secret_basic or client_secret_post).
    #[arg(long, env = "MY_AUTH_FLOW", required_unless_present = "in_memory")]
    pub auth_flow: Option<AuthFlow>,

    /// Origin of a pod the access token may be sent to. Repeat or separate
    /// with commas. When none is given, any pod that asks for
    /// authentication receives the token.
    #[arg(long = "pod-origin", env = "EXPENSE_GATEWAY_POD_ORIGINS", value_delimiter = ',')]
    pub pod_origins: Vec<Url>,

    /// Timeout for each request to the pod or identity provider, in seconds.
    #[arg(long, env = "EXPENSE_GATEWAY_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}
