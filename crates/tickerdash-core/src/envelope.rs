//! Machine-readable response wrapper emitted by the CLI.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, DataUnavailable, ProviderId, UnavailableCause, UtcDateTime, ValidationError};

/// Schema version stamped on every envelope.
pub const SCHEMA_VERSION: &str = "v1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(
        meta: EnvelopeMeta,
        data: T,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate()?;
        errors.iter().try_for_each(EnvelopeError::validate)?;
        Ok(Self { meta, data, errors })
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<T: Serialize> Envelope<T> {
    /// Serializes the envelope, re-validating metadata first.
    pub fn to_json(&self, pretty: bool) -> Result<String, CoreError> {
        self.meta.validate()?;
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    pub source_chain: Vec<ProviderId>,
    pub latency_ms: u64,
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    /// Metadata with a fresh v4 request id and the current schema version.
    pub fn new(
        source_chain: Vec<ProviderId>,
        latency_ms: u64,
        cache_hit: bool,
    ) -> Result<Self, ValidationError> {
        Self::with_request_id(Uuid::new_v4().to_string(), source_chain, latency_ms, cache_hit)
    }

    pub fn with_request_id(
        request_id: impl Into<String>,
        source_chain: Vec<ProviderId>,
        latency_ms: u64,
        cache_hit: bool,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            schema_version: String::from(SCHEMA_VERSION),
            generated_at: UtcDateTime::now(),
            source_chain,
            latency_ms,
            cache_hit,
            warnings: Vec::new(),
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < 8 {
            return Err(ValidationError::InvalidRequestId);
        }

        if !is_valid_schema_version(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }

        if self.source_chain.is_empty() {
            return Err(ValidationError::EmptySourceChain);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProviderId>,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            retryable: None,
            source: None,
        };
        error.validate()?;
        Ok(error)
    }

    /// Envelope form of a failed fetch. Transport failures may succeed on
    /// the next refresh; unknown symbols will not.
    pub fn data_unavailable(error: &DataUnavailable, source: ProviderId) -> Self {
        Self {
            code: String::from(error.code()),
            message: String::from(error.message()),
            retryable: Some(error.cause() == UnavailableCause::Transport),
            source: Some(source),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }

        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }

        Ok(())
    }
}

fn is_valid_schema_version(value: &str) -> bool {
    let Some(version) = value.strip_prefix('v') else {
        return false;
    };

    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_meta_gets_uuid_request_id() {
        let meta = EnvelopeMeta::new(vec![ProviderId::Synthetic], 3, false).expect("valid meta");

        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert!(Uuid::parse_str(&meta.request_id).is_ok());
    }

    #[test]
    fn rejects_short_request_id() {
        let err = EnvelopeMeta::with_request_id("abc", vec![ProviderId::Yahoo], 1, false)
            .expect_err("must fail");
        assert_eq!(err, ValidationError::InvalidRequestId);
    }

    #[test]
    fn rejects_empty_source_chain() {
        let err = EnvelopeMeta::new(Vec::new(), 1, false).expect_err("must fail");
        assert_eq!(err, ValidationError::EmptySourceChain);
    }

    #[test]
    fn schema_version_needs_three_numeric_parts() {
        assert!(is_valid_schema_version("v1.0.0"));
        assert!(!is_valid_schema_version("1.0.0"));
        assert!(!is_valid_schema_version("v1.0"));
        assert!(!is_valid_schema_version("v1.x.0"));
    }

    #[test]
    fn unknown_symbol_error_is_not_retryable() {
        let error = EnvelopeError::data_unavailable(
            &DataUnavailable::unknown_symbol("ZZZZ"),
            ProviderId::Yahoo,
        );

        assert_eq!(error.code, "data.unavailable");
        assert_eq!(error.retryable, Some(false));
        assert!(error.validate().is_ok());
    }

    #[test]
    fn envelope_omits_empty_errors() {
        let meta = EnvelopeMeta::new(vec![ProviderId::Yahoo], 0, true).expect("valid meta");
        let json = serde_json::to_value(Envelope::success(meta, 1_u8)).expect("serialize");
        assert!(json.get("errors").is_none());
        assert_eq!(json["data"], 1);
    }

    #[test]
    fn to_json_rejects_tampered_meta() {
        let mut meta = EnvelopeMeta::new(vec![ProviderId::Yahoo], 0, false).expect("valid meta");
        meta.schema_version = String::from("1");

        let err = Envelope::success(meta, ()).to_json(false).expect_err("must fail");
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidSchemaVersion { .. })
        ));
    }
}
