//! Wire types for the job listing and job metadata documents.
//!
//! Responses are decoded into these structures instead of being walked as
//! untyped maps, so a shape mismatch surfaces as a [`DecodeError`].

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::{connection::parse_http_url, error::DecodeError};

/// One job (or folder) in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobRecord {
    /// Display name matched against path segments.
    pub name: String,
    /// Absolute URL of the job or folder.
    pub url: String,
}

/// The `jobs` array of a folder or of the server root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListing {
    /// Records in server order.
    pub jobs: Vec<JobRecord>,
}

impl JobListing {
    /// Decodes a listing document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Shape`] if `jobs` is missing or any record lacks
    /// a string `name` or `url`.
    pub fn decode(document: Value, url: &Url) -> Result<Self, DecodeError> {
        serde_json::from_value(document).map_err(|source| DecodeError::Shape {
            shape: "job listing",
            url: url.to_string(),
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// First record whose name equals `name` exactly.
    pub fn find(&self, name: &str) -> Option<&JobRecord> {
        self.jobs.iter().find(|job| job.name == name)
    }
}

impl JobRecord {
    /// Parses the record's URL.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidUrl`] unless the URL is an absolute http
    /// or https URL.
    pub fn endpoint(&self) -> Result<Url, DecodeError> {
        parse_http_url(&self.url).map_err(|_| DecodeError::InvalidUrl {
            shape: "job listing",
            url: self.url.clone(),
        })
    }
}

/// The parts of a job's metadata document the client reads.
#[derive(Debug, Clone, Deserialize)]
pub struct JobMetadata {
    /// Property blocks attached to the job.
    pub property: Vec<JobProperty>,
    /// Builds, most recent first. Absent for jobs that never ran.
    #[serde(default)]
    pub builds: Option<Vec<BuildRef>>,
}

impl JobMetadata {
    /// Decodes a metadata document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Shape`] if `property` is missing or the property
    /// or parameter blocks have the wrong types.
    pub fn decode(document: Value, url: &Url) -> Result<Self, DecodeError> {
        serde_json::from_value(document).map_err(|source| DecodeError::Shape {
            shape: "job metadata",
            url: url.to_string(),
            source,
        })
    }

    /// Every parameter definition across all property blocks, in order.
    pub fn parameter_definitions(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.property
            .iter()
            .filter_map(|p| p.parameter_definitions.as_deref())
            .flatten()
    }
}

/// One entry of the `property` array. Only parameter blocks matter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobProperty {
    /// Declared parameters, present only on parameter blocks.
    #[serde(default, rename = "parameterDefinitions")]
    pub parameter_definitions: Option<Vec<ParameterDefinition>>,
}

/// A declared build parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterDefinition {
    /// Default value, absent for parameters without one.
    #[serde(default, rename = "defaultParameterValue")]
    pub default_parameter_value: Option<DefaultParameterValue>,
}

/// Default value block of a parameter definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultParameterValue {
    /// Parameter name as declared on the job.
    #[serde(default)]
    pub name: Option<String>,
    /// `None` when the value is absent or JSON `null`.
    #[serde(default)]
    pub value: Option<Value>,
}

/// Entry in a job's `builds` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildRef {
    /// Absolute URL of the build.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn url() -> Url {
        Url::parse("http://ci/api/json").unwrap()
    }

    #[test]
    fn test_listing_decodes_and_keeps_order() {
        let listing = JobListing::decode(
            json!({
                "_class": "hudson.model.Hudson",
                "jobs": [
                    {"_class": "x", "name": "team", "url": "http://ci/job/team/", "color": "blue"},
                    {"name": "team", "url": "http://ci/job/team-dup/"}
                ]
            }),
            &url(),
        )
        .unwrap();

        assert_eq!(listing.jobs.len(), 2);
        assert_eq!(listing.find("team").unwrap().url, "http://ci/job/team/");
        assert!(listing.find("Team").is_none());
    }

    #[test]
    fn test_listing_without_jobs_is_decode_error() {
        let err = JobListing::decode(json!({"name": "leaf"}), &url()).unwrap_err();
        assert!(matches!(err, DecodeError::Shape { shape: "job listing", .. }));
    }

    #[test]
    fn test_record_endpoint_rejects_non_http() {
        let record = JobRecord {
            name: "odd".to_string(),
            url: "file:///etc/passwd".to_string(),
        };
        assert!(matches!(
            record.endpoint(),
            Err(DecodeError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_metadata_without_property_is_decode_error() {
        let err = JobMetadata::decode(json!({"builds": []}), &url()).unwrap_err();
        assert!(matches!(err, DecodeError::Shape { shape: "job metadata", .. }));
    }

    #[test]
    fn test_metadata_with_non_list_property_is_decode_error() {
        let err = JobMetadata::decode(json!({"property": "oops"}), &url()).unwrap_err();
        assert!(matches!(err, DecodeError::Shape { shape: "job metadata", .. }));

        let err = JobMetadata::decode(
            json!({"property": [{"parameterDefinitions": {"name": "ENV"}}]}),
            &url(),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Shape { shape: "job metadata", .. }));
    }

    #[test]
    fn test_metadata_collects_definitions_from_every_block() {
        let metadata = JobMetadata::decode(
            json!({
                "property": [
                    {"_class": "jenkins.model.BuildDiscarderProperty"},
                    {"parameterDefinitions": [
                        {"defaultParameterValue": {"name": "ENV", "value": "staging"}}
                    ]},
                    {"parameterDefinitions": [
                        {"defaultParameterValue": {"name": "COUNT", "value": null}},
                        {"name": "NO_DEFAULT"}
                    ]}
                ]
            }),
            &url(),
        )
        .unwrap();

        let defs: Vec<_> = metadata.parameter_definitions().collect();
        assert_eq!(defs.len(), 3);
        let first = defs[0].default_parameter_value.as_ref().unwrap();
        assert_eq!(first.name.as_deref(), Some("ENV"));
        assert_eq!(first.value, Some(json!("staging")));
        assert_eq!(defs[1].default_parameter_value.as_ref().unwrap().value, None);
        assert!(defs[2].default_parameter_value.is_none());
        assert!(metadata.builds.is_none());
    }
}
