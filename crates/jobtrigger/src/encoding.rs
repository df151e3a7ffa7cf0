//! Query encoding for the trigger request.

use reqwest::Url;
use tracing::debug;

use crate::{connection::trigger_url, parameters::ParameterSet};

/// Name/value pairs for every parameter with a supported value type.
///
/// Unsupported values are skipped rather than reported.
pub fn query_pairs(params: &ParameterSet) -> Vec<(&str, String)> {
    params
        .iter()
        .filter_map(|(name, value)| {
            let encoded = value.encode();
            if encoded.is_none() {
                debug!(parameter = %name, "dropping parameter with unsupported value type");
            }
            encoded.map(|v| (name.as_str(), v))
        })
        .collect()
}

/// Trigger URL for the job at `endpoint` carrying `params` as a
/// form-urlencoded query.
pub fn build_trigger_url(endpoint: &Url, params: &ParameterSet) -> Url {
    let mut url = trigger_url(endpoint);
    let pairs = query_pairs(params);
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use super::*;
    use crate::parameters::ParameterValue;

    fn endpoint() -> Url {
        Url::parse("http://ci/job/team/job/service/").unwrap()
    }

    #[test]
    fn test_encodes_mixed_types() {
        let mut params = ParameterSet::new();
        params.insert("COUNT", 3_i64);
        params.insert("DRYRUN", true);
        params.insert("TARGET", "prod");

        let url = build_trigger_url(&endpoint(), &params);

        let pairs: BTreeSet<&str> = url.query().unwrap().split('&').collect();
        assert_eq!(
            pairs,
            BTreeSet::from(["COUNT=3", "DRYRUN=true", "TARGET=prod"])
        );
        assert_eq!(url.path(), "/job/team/job/service/buildWithParameters");
    }

    #[test]
    fn test_unsupported_values_are_dropped() {
        let mut params = ParameterSet::new();
        params.insert("RATIO", ParameterValue::Unsupported(json!(0.5)));
        params.insert("ENV", "prod");

        let pairs = query_pairs(&params);

        assert_eq!(pairs, vec![("ENV", "prod".to_string())]);
    }

    #[test]
    fn test_values_are_url_encoded() {
        let mut params = ParameterSet::new();
        params.insert("MESSAGE", "a b&c=d");

        let url = build_trigger_url(&endpoint(), &params);

        assert_eq!(url.query(), Some("MESSAGE=a+b%26c%3Dd"));
    }

    #[test]
    fn test_empty_set_produces_no_query() {
        let url = build_trigger_url(&endpoint(), &ParameterSet::new());
        assert_eq!(url.query(), None);
    }
}
