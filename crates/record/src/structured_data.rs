//! Structured data elements (RFC5424 section 6.3)

use crate::RecordError;

/// Maximum length of an SD-ID or PARAM-NAME
const MAX_SD_NAME_LEN: usize = 32;

/// One `[ID name="value" ...]` block.
///
/// Params keep their insertion order; values are plain strings (escaping is
/// applied by the encoder, removed by the decoder).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuredElement {
    id: String,
    params: Vec<(String, String)>,
}

impl StructuredElement {
    /// Create an element with no params
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: Vec::new(),
        }
    }

    /// Append a param
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Element ID, e.g. `instance@47450`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Params in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check that the ID and every param name are valid SD-NAMEs
    pub(crate) fn validate(&self) -> Result<(), RecordError> {
        validate_sd_name("sd-id", &self.id)?;
        for (name, _) in &self.params {
            validate_sd_name("sd-param-name", name)?;
        }
        Ok(())
    }

    pub(crate) fn from_parts(id: String, params: Vec<(String, String)>) -> Self {
        Self { id, params }
    }
}

/// SD-NAME = 1*32PRINTUSASCII except '=', SP, ']', '"'
fn validate_sd_name(field: &'static str, name: &str) -> Result<(), RecordError> {
    if name.is_empty() {
        return Err(RecordError::invalid_field(field, name, "must not be empty"));
    }
    if name.len() > MAX_SD_NAME_LEN {
        return Err(RecordError::invalid_field(
            field,
            name,
            "longer than 32 characters",
        ));
    }
    if !name.bytes().all(is_sd_name_byte) {
        return Err(RecordError::invalid_field(
            field,
            name,
            "contains a character not allowed in an SD-NAME",
        ));
    }
    Ok(())
}

#[inline]
pub(crate) fn is_sd_name_byte(b: u8) -> bool {
    (33..=126).contains(&b) && b != b'=' && b != b']' && b != b'"'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let element = StructuredElement::new("instance@47450")
            .param("director", "bosh")
            .param("az", "z1");
        assert_eq!(element.id(), "instance@47450");
        assert_eq!(element.params()[0].0, "director");
        assert_eq!(element.params()[1].0, "az");
        assert_eq!(element.get("az"), Some("z1"));
        assert_eq!(element.get("missing"), None);
    }

    #[test]
    fn test_validate() {
        assert!(StructuredElement::new("instance@47450").validate().is_ok());
        assert!(StructuredElement::new("").validate().is_err());
        assert!(StructuredElement::new("has space").validate().is_err());
        assert!(StructuredElement::new("a=b").validate().is_err());
        assert!(StructuredElement::new("x".repeat(33)).validate().is_err());
        assert!(
            StructuredElement::new("ok")
                .param("bad]name", "v")
                .validate()
                .is_err()
        );
    }
}
