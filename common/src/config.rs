//! Configuration types for output, tracing and backend connectivity

/// Output and logging configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress error output
    pub quiet: bool,
    /// Verbosity level: 0=ERROR, 1=INFO, 2=DEBUG, 3=TRACE
    pub verbose: u8,
    /// Print summary statistics at the end
    pub print_summary: bool,
}

/// Tracing configuration for debugging
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Debug log file path, logs go to stderr when unset
    pub debug_log_file: Option<std::path::PathBuf>,
}

/// Default address of every MFT service when running the standalone server.
pub const DEFAULT_SERVICE_ADDR: &str = "localhost:7003";

/// Addresses (`host:port`) of the backend services the client talks to.
///
/// The standalone MFT server exposes all three services on a single port, which is why they
/// share a default. Deployments that split the services override them individually.
#[derive(Debug, Clone, PartialEq, Eq, clap::Args)]
pub struct ServiceEndpoints {
    /// Transfer API address (resource metadata, transfer submission and state)
    #[arg(
        long,
        env = "MFT_TRANSFER_API",
        default_value = DEFAULT_SERVICE_ADDR,
        value_name = "HOST:PORT",
        global = true,
        help_heading = "Backend connection"
    )]
    pub transfer_api: String,

    /// Resource service address (storage registry)
    #[arg(
        long,
        env = "MFT_RESOURCE_SERVICE",
        default_value = DEFAULT_SERVICE_ADDR,
        value_name = "HOST:PORT",
        global = true,
        help_heading = "Backend connection"
    )]
    pub resource_service: String,

    /// Secret service address (credential registry)
    #[arg(
        long,
        env = "MFT_SECRET_SERVICE",
        default_value = DEFAULT_SERVICE_ADDR,
        value_name = "HOST:PORT",
        global = true,
        help_heading = "Backend connection"
    )]
    pub secret_service: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            transfer_api: DEFAULT_SERVICE_ADDR.to_string(),
            resource_service: DEFAULT_SERVICE_ADDR.to_string(),
            secret_service: DEFAULT_SERVICE_ADDR.to_string(),
        }
    }
}

impl ServiceEndpoints {
    /// Use the same address for all three services
    pub fn single(addr: &str) -> Self {
        Self {
            transfer_api: addr.to_string(),
            resource_service: addr.to_string(),
            secret_service: addr.to_string(),
        }
    }
}

/// Timeouts applied to every RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::Args)]
pub struct TimeoutConfig {
    /// Maximum time to wait when opening a connection to a service
    ///
    /// Accepts human readable durations, e.g. "500ms", "5s".
    #[arg(
        long,
        default_value = "5s",
        value_name = "DURATION",
        value_parser = humantime::parse_duration,
        global = true,
        help_heading = "Backend connection"
    )]
    pub connect_timeout: std::time::Duration,

    /// Maximum time to wait for a single reply from a service
    #[arg(
        long,
        default_value = "30s",
        value_name = "DURATION",
        value_parser = humantime::parse_duration,
        global = true,
        help_heading = "Backend connection"
    )]
    pub request_timeout: std::time::Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: std::time::Duration::from_secs(5),
            request_timeout: std::time::Duration::from_secs(30),
        }
    }
}

impl TimeoutConfig {
    /// Validate configuration and return errors if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.connect_timeout.is_zero() {
            return Err("connect timeout must be greater than zero".to_string());
        }
        if self.request_timeout.is_zero() {
            return Err("request timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}
