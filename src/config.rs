// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the oracle.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. config.yaml file
//! 3. `.env` file and environment variables (provider credentials, ORACLE_*)
//! 4. CLI arguments
//!
//! Provider credentials are held as [`SecretString`] and are never
//! serialized back out.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::device::QpuMode;
use crate::error::{Error, Result};
use crate::provider::Provider;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Provider credentials and QPU tier policy
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Defaults for request fields
    #[serde(default)]
    pub defaults: RequestDefaults,

    /// VQE loop settings
    #[serde(default)]
    pub vqe: VqeSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Resource limits
    #[serde(default)]
    pub limits: ResourceLimits,
}

impl Config {
    /// Load configuration from file, `.env` and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["config.yaml", "config.yml", "/etc/quantum-oracle/config.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        // Variables already present in the process environment win over .env
        let _ = dotenvy::dotenv();

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("ORACLE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("ORACLE_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = env::var("ORACLE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("ORACLE_QPU_MODE") {
            match val.parse() {
                Ok(mode) => self.defaults.qpu_mode = mode,
                Err(e) => tracing::warn!(value = %val, error = %e, "Ignoring ORACLE_QPU_MODE"),
            }
        }
        if let Ok(val) = env::var("ORACLE_PROVIDER") {
            if val.eq_ignore_ascii_case("any") {
                self.defaults.provider = None;
            } else {
                match val.parse() {
                    Ok(provider) => self.defaults.provider = Some(provider),
                    Err(e) => tracing::warn!(value = %val, error = %e, "Ignoring ORACLE_PROVIDER"),
                }
            }
        }
        if let Ok(val) = env::var("ORACLE_WIRES") {
            if let Ok(wires) = val.parse() {
                self.vqe.wires = wires;
            }
        }
        if let Ok(val) = env::var("ORACLE_VQE_STEPS") {
            if let Ok(steps) = val.parse() {
                self.vqe.steps = steps;
            }
        }
        if let Ok(val) = env::var("ORACLE_VQE_STEPSIZE") {
            if let Ok(stepsize) = val.parse() {
                self.vqe.stepsize = stepsize;
            }
        }
        if let Ok(val) = env::var("ORACLE_SHOTS") {
            if let Ok(shots) = val.parse() {
                self.vqe.shots = shots;
            }
        }

        let p = &mut self.providers;
        if let Ok(val) = env::var("FORCE_FREE_QPU") {
            p.force_free_qpu = parse_flag(&val);
        }

        // IBM
        override_secret(&mut p.ibm.token, "IBMQ_TOKEN");

        // AWS Braket
        override_plain(&mut p.aws_braket.region, "AWS_REGION");
        override_secret(&mut p.aws_braket.access_key_id, "AWS_ACCESS_KEY_ID");
        override_secret(&mut p.aws_braket.secret_access_key, "AWS_SECRET_ACCESS_KEY");

        // Azure
        override_plain(&mut p.azure.subscription_id, "AZURE_SUBSCRIPTION_ID");
        override_plain(&mut p.azure.resource_group, "AZURE_RESOURCE_GROUP");
        override_plain(&mut p.azure.workspace_name, "AZURE_WORKSPACE_NAME");
        override_plain(&mut p.azure.location, "AZURE_LOCATION");

        // Google
        override_plain(&mut p.google.project_id, "GOOGLE_PROJECT_ID");
        override_secret(&mut p.google.api_key, "GOOGLE_API_KEY");
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Server port cannot be 0".into()));
        }
        if self.vqe.wires == 0 {
            return Err(Error::Config("vqe.wires must be > 0".into()));
        }
        if self.vqe.wires > self.limits.max_wires {
            return Err(Error::Config(format!(
                "vqe.wires {} exceeds limits.max_wires {}",
                self.vqe.wires, self.limits.max_wires
            )));
        }
        if self.vqe.steps > self.limits.max_steps {
            return Err(Error::Config(format!(
                "vqe.steps {} exceeds limits.max_steps {}",
                self.vqe.steps, self.limits.max_steps
            )));
        }
        if !(self.vqe.stepsize > 0.0) {
            return Err(Error::Config("vqe.stepsize must be > 0".into()));
        }
        if self.vqe.shots == 0 || self.vqe.shots > self.limits.max_shots {
            return Err(Error::Config(format!(
                "vqe.shots must be in 1..={}",
                self.limits.max_shots
            )));
        }
        if self.server.cors.allow_all {
            tracing::warn!(
                "CORS is set to allow all origins. This is insecure for production use. \
                 Configure specific origins under server.cors.allowed_origins."
            );
        }
        Ok(())
    }
}

/// Only `true`, in any case, enables a flag.
fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true")
}

fn override_plain(slot: &mut Option<String>, var: &str) {
    if let Ok(val) = env::var(var) {
        *slot = Some(val);
    }
}

fn override_secret(slot: &mut Option<SecretString>, var: &str) {
    if let Ok(val) = env::var(var) {
        *slot = Some(SecretString::from(val));
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsConfig::default(),
            shutdown_timeout_sec: default_shutdown_timeout(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allow all origins (INSECURE - for development only)
    #[serde(default)]
    pub allow_all: bool,

    /// Allowed origins when allow_all is false
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_all: false,
            allowed_origins: vec![
                "http://localhost:3000".into(),
                "http://127.0.0.1:3000".into(),
            ],
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8000
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Provider credentials and tier policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Prefer free simulator targets over paid QPUs in full mode
    #[serde(default = "default_true")]
    pub force_free_qpu: bool,

    #[serde(default)]
    pub ibm: IbmCredentials,

    #[serde(default)]
    pub aws_braket: AwsBraketCredentials,

    #[serde(default)]
    pub azure: AzureCredentials,

    #[serde(default)]
    pub google: GoogleCredentials,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            force_free_qpu: true,
            ibm: IbmCredentials::default(),
            aws_braket: AwsBraketCredentials::default(),
            azure: AzureCredentials::default(),
            google: GoogleCredentials::default(),
        }
    }
}

/// IBM Quantum credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IbmCredentials {
    /// API token (`IBMQ_TOKEN`)
    #[serde(default, skip_serializing)]
    pub token: Option<SecretString>,
}

/// AWS Braket credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsBraketCredentials {
    /// Region (`AWS_REGION`)
    #[serde(default)]
    pub region: Option<String>,

    /// Access key id (`AWS_ACCESS_KEY_ID`)
    #[serde(default, skip_serializing)]
    pub access_key_id: Option<SecretString>,

    /// Secret access key (`AWS_SECRET_ACCESS_KEY`)
    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<SecretString>,
}

/// Azure Quantum workspace credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AzureCredentials {
    #[serde(default)]
    pub subscription_id: Option<String>,

    #[serde(default)]
    pub resource_group: Option<String>,

    #[serde(default)]
    pub workspace_name: Option<String>,

    #[serde(default)]
    pub location: Option<String>,
}

/// Google Quantum AI credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleCredentials {
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,
}

/// Defaults applied when a request omits `qpu_mode` or `provider`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDefaults {
    #[serde(default = "default_qpu_mode")]
    pub qpu_mode: QpuMode,

    /// Preferred provider for full mode; `None` scans all providers in order
    #[serde(default = "default_provider")]
    pub provider: Option<Provider>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            qpu_mode: default_qpu_mode(),
            provider: default_provider(),
        }
    }
}

fn default_qpu_mode() -> QpuMode {
    QpuMode::Hybrid
}

fn default_provider() -> Option<Provider> {
    Some(Provider::Ibm)
}

/// VQE loop settings shared by all hybrid routines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VqeSettings {
    /// Number of wires every device is created with
    #[serde(default = "default_wires")]
    pub wires: u32,

    /// Optimizer steps per VQE run
    #[serde(default = "default_steps")]
    pub steps: u32,

    /// Gradient descent step size
    #[serde(default = "default_stepsize")]
    pub stepsize: f64,

    /// Entangling layers of the hardware-efficient ansatz
    #[serde(default = "default_layers")]
    pub layers: u32,

    /// Shots per Pauli term on the sampled (hybrid) device
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Seed for shot sampling, random when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for VqeSettings {
    fn default() -> Self {
        Self {
            wires: default_wires(),
            steps: default_steps(),
            stepsize: default_stepsize(),
            layers: default_layers(),
            shots: default_shots(),
            seed: None,
        }
    }
}

fn default_wires() -> u32 {
    4
}

fn default_steps() -> u32 {
    100
}

fn default_stepsize() -> f64 {
    0.1
}

fn default_layers() -> u32 {
    2
}

fn default_shots() -> u32 {
    1000
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum wires per device
    #[serde(default = "default_max_wires")]
    pub max_wires: u32,

    /// Maximum optimizer steps
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Maximum shots
    #[serde(default = "default_max_shots")]
    pub max_shots: u32,

    /// Maximum QAOA depth `p`
    #[serde(default = "default_max_qaoa_depth")]
    pub max_qaoa_depth: u32,

    /// Maximum Krylov subspace size
    #[serde(default = "default_max_subspace_size")]
    pub max_subspace_size: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_wires: default_max_wires(),
            max_steps: default_max_steps(),
            max_shots: default_max_shots(),
            max_qaoa_depth: default_max_qaoa_depth(),
            max_subspace_size: default_max_subspace_size(),
        }
    }
}

fn default_max_wires() -> u32 {
    10
}

fn default_max_steps() -> u32 {
    10_000
}

fn default_max_shots() -> u32 {
    100_000
}

fn default_max_qaoa_depth() -> u32 {
    16
}

fn default_max_subspace_size() -> u32 {
    16
}
