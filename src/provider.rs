// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum cloud providers and credential presence checks.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ProvidersConfig;
use crate::error::ValidationError;

/// Cloud provider offering QPU or remote simulator access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "ibm")]
    Ibm,
    #[serde(rename = "aws-braket")]
    AwsBraket,
    #[serde(rename = "azure")]
    Azure,
    #[serde(rename = "google")]
    Google,
}

/// Scan order used when no provider is preferred. Earlier entries win ties.
pub const PROVIDERS: [Provider; 4] = [
    Provider::Ibm,
    Provider::AwsBraket,
    Provider::Azure,
    Provider::Google,
];

impl Provider {
    /// Wire name used in requests and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ibm => "ibm",
            Provider::AwsBraket => "aws-braket",
            Provider::Azure => "azure",
            Provider::Google => "google",
        }
    }

    /// Configuration values that must all be present for this provider.
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            Provider::Ibm => &["IBMQ_TOKEN"],
            Provider::AwsBraket => &["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "AWS_REGION"],
            Provider::Azure => &[
                "AZURE_SUBSCRIPTION_ID",
                "AZURE_RESOURCE_GROUP",
                "AZURE_WORKSPACE_NAME",
                "AZURE_LOCATION",
            ],
            Provider::Google => &["GOOGLE_PROJECT_ID", "GOOGLE_API_KEY"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ibm" => Ok(Provider::Ibm),
            "aws-braket" => Ok(Provider::AwsBraket),
            "azure" => Ok(Provider::Azure),
            "google" => Ok(Provider::Google),
            other => Err(ValidationError::field(
                "provider",
                format!(
                    "unknown provider '{}', expected one of ibm, aws-braket, azure, google",
                    other
                ),
            )),
        }
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

fn present_secret(value: &Option<SecretString>) -> bool {
    value
        .as_ref()
        .is_some_and(|v| !v.expose_secret().is_empty())
}

/// Whether every credential value the provider needs is configured.
///
/// Empty strings count as absent.
pub fn has_provider_key(providers: &ProvidersConfig, provider: Provider) -> bool {
    match provider {
        Provider::Ibm => present_secret(&providers.ibm.token),
        Provider::AwsBraket => {
            let aws = &providers.aws_braket;
            present_secret(&aws.access_key_id)
                && present_secret(&aws.secret_access_key)
                && present(&aws.region)
        }
        Provider::Azure => {
            let az = &providers.azure;
            present(&az.subscription_id)
                && present(&az.resource_group)
                && present(&az.workspace_name)
                && present(&az.location)
        }
        Provider::Google => {
            let g = &providers.google;
            present(&g.project_id) && present_secret(&g.api_key)
        }
    }
}
