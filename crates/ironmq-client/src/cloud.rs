//! Cloud region selection and base endpoint construction.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Service domain shared by every region host.
pub const SERVICE_DOMAIN: &str = "iron.io";

/// REST API version segment.
pub const API_VERSION: &str = "1";

/// Cloud region hosting the queue service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Cloud {
    #[default]
    Aws,
    Rackspace,
}

impl Cloud {
    /// Region host name for this cloud
    pub fn host(&self) -> &'static str {
        match self {
            Self::Aws => "mq-aws-us-east-1",
            Self::Rackspace => "mq-rackspace-dfw",
        }
    }

    /// Project-scoped base endpoint, always ending in `/`.
    ///
    /// ```
    /// use ironmq_client::Cloud;
    ///
    /// assert_eq!(
    ///     Cloud::Aws.base_url("abc123"),
    ///     "https://mq-aws-us-east-1.iron.io/1/projects/abc123/"
    /// );
    /// ```
    pub fn base_url(&self, project_id: &str) -> String {
        format!(
            "https://{}.{}/{}/projects/{}/",
            self.host(),
            SERVICE_DOMAIN,
            API_VERSION,
            urlencoding::encode(project_id)
        )
    }
}

impl std::fmt::Display for Cloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Rackspace => write!(f, "rackspace"),
        }
    }
}

impl FromStr for Cloud {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "rackspace" => Ok(Self::Rackspace),
            other => Err(ValidationError::InvalidFormat {
                field: "cloud".to_string(),
                message: format!("unknown cloud '{}', expected 'aws' or 'rackspace'", other),
            }),
        }
    }
}

impl TryFrom<String> for Cloud {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
#[path = "cloud_tests.rs"]
mod tests;
