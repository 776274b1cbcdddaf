//! Record enrichment
//!
//! Every record leaving the coordinator carries the instance structured
//! data element and a hostname. Lines from tailed files additionally get an
//! app-name naming the job directory they were found in:
//!
//! ```text
//! <root>/syslog_forwarder/file.log  ->  APP-NAME syslog_forwarder
//! <root>/kernel.log                 ->  APP-NAME kernel
//! ```

use std::path::{Component, Path, PathBuf};

use chrono::Local;
use sysfwd_config::InstanceConfig;
use sysfwd_record::{
    Facility, Record, RecordError, Severity, StructuredElement, sanitize_header_field,
};
use sysfwd_sources::LineEvent;

const MAX_HOSTNAME_LEN: usize = 255;
const MAX_APP_NAME_LEN: usize = 48;

/// Applies the instance identity to records
#[derive(Debug, Clone)]
pub struct RecordStamper {
    element: StructuredElement,
    hostname: String,
    root: PathBuf,
}

impl RecordStamper {
    /// Build from the instance section and the tailer root
    pub fn new(instance: &InstanceConfig, root: impl Into<PathBuf>) -> Self {
        let element = instance
            .element_params()
            .into_iter()
            .fold(StructuredElement::new(instance.element_id()), |e, (k, v)| {
                e.param(k, v)
            });

        Self {
            element,
            hostname: resolve_hostname(instance),
            root: root.into(),
        }
    }

    /// Hostname written into records that do not carry one
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Put the instance element in front of a decoded socket record
    ///
    /// An element with the same ID sent by the local program is replaced.
    pub fn stamp(&self, record: &Record) -> Result<Record, RecordError> {
        record
            .to_builder()
            .prepend_element(self.element.clone())
            .build()
    }

    /// Wrap a tailed line in a record
    pub fn line_record(&self, event: &LineEvent) -> Result<Record, RecordError> {
        let mut builder = Record::builder(event.line.as_str())
            .facility(Facility::User)
            .severity(Severity::Info)
            .timestamp(Local::now().fixed_offset())
            .hostname(self.hostname.as_str())
            .element(self.element.clone());

        if let Some(app_name) = self.app_name_for(&event.path) {
            builder = builder.app_name(app_name);
        }
        builder.build()
    }

    /// First path component below the root, or the file stem for files
    /// directly in the root
    fn app_name_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut components = relative.components().filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        });

        let first = components.next()?;
        let name = if components.next().is_some() {
            first.to_string_lossy()
        } else {
            Path::new(first).file_stem()?.to_string_lossy()
        };
        Some(sanitize_header_field(&name, MAX_APP_NAME_LEN))
    }
}

/// Configured hostname, else the system's, else `localhost`
fn resolve_hostname(instance: &InstanceConfig) -> String {
    if let Some(configured) = instance.hostname.as_deref().map(str::trim)
        && !configured.is_empty()
    {
        return sanitize_header_field(configured, MAX_HOSTNAME_LEN);
    }
    system_hostname().unwrap_or_else(|| {
        tracing::debug!("hostname unavailable, using localhost");
        "localhost".to_string()
    })
}

fn system_hostname() -> Option<String> {
    let name = hostname::get().ok()?;
    let name = name.to_string_lossy();
    let name = name.trim();
    (!name.is_empty()).then(|| sanitize_header_field(name, MAX_HOSTNAME_LEN))
}
