//! Instance identity configuration
//!
//! Describes the machine the agent runs on. Every forwarded record carries
//! these values in an `instance@<enterprise_number>` structured data element.

use std::fmt;

use serde::Deserialize;

/// Private enterprise number used in the structured data ID
pub const DEFAULT_ENTERPRISE_NUMBER: u32 = 47450;

/// Which identity params go into the instance element
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum MessageFormat {
    /// `director`, `deployment`, `group`, `az`, `id` (default)
    #[default]
    Rfc5424,
    /// Like `rfc5424` but `id` carries the instance index
    JobIndex,
    /// Like `job_index`, plus the instance UUID as `uuid`
    JobIndexId,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rfc5424 => "rfc5424",
            Self::JobIndex => "job_index",
            Self::JobIndexId => "job_index_id",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for MessageFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "rfc5424" => Ok(Self::Rfc5424),
            "job_index" => Ok(Self::JobIndex),
            "job_index_id" => Ok(Self::JobIndexId),
            other => Err(format!("unknown instance.message_format: {other}")),
        }
    }
}

/// Instance identity
///
/// # Example
///
/// ```toml
/// [instance]
/// director = "bosh"
/// deployment = "cf"
/// group = "router"
/// az = "z1"
/// id = "6c6c6f35-1d2e-4b0f-9f5a-6c0e2a9a7e11"
/// index = 0
/// message_format = "rfc5424"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Name of the deployment manager
    pub director: String,

    /// Deployment name
    pub deployment: String,

    /// Instance group (job) name
    pub group: String,

    /// Availability zone
    pub az: String,

    /// Instance UUID
    pub id: String,

    /// Instance index within its group
    pub index: u32,

    /// Enterprise number in the structured data ID
    /// Default: 47450
    pub enterprise_number: u32,

    /// Param layout of the instance element
    /// Default: rfc5424
    pub message_format: MessageFormat,

    /// HOSTNAME header for forwarded records
    /// Default: the system hostname
    pub hostname: Option<String>,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            director: String::new(),
            deployment: String::new(),
            group: String::new(),
            az: String::new(),
            id: String::new(),
            index: 0,
            enterprise_number: DEFAULT_ENTERPRISE_NUMBER,
            message_format: MessageFormat::Rfc5424,
            hostname: None,
        }
    }
}

impl InstanceConfig {
    /// Structured data ID, e.g. `instance@47450`
    pub fn element_id(&self) -> String {
        format!("instance@{}", self.enterprise_number)
    }

    /// Params for the instance element, in wire order
    pub fn element_params(&self) -> Vec<(&'static str, String)> {
        let id = match self.message_format {
            MessageFormat::Rfc5424 => self.id.clone(),
            MessageFormat::JobIndex | MessageFormat::JobIndexId => self.index.to_string(),
        };
        let mut params = vec![
            ("director", self.director.clone()),
            ("deployment", self.deployment.clone()),
            ("group", self.group.clone()),
            ("az", self.az.clone()),
            ("id", id),
        ];
        if self.message_format == MessageFormat::JobIndexId {
            params.push(("uuid", self.id.clone()));
        }
        params
    }
}
