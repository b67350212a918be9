//! Cache Key Derivation
//!
//! Maps a logical request onto a deterministic cache key.

use crate::client::RequestBody;

// == Header Normalization ==
/// Lower-cases header names and sorts the pairs.
///
/// Pairs are ordered by name then value so duplicate names cannot make the
/// result depend on insertion order.
///
/// # Arguments
/// * `headers` - Header pairs in caller order and case
pub fn normalize_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    let mut normalized: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
        .collect();
    normalized.sort();
    normalized
}

// == Key Builder ==
/// Builds the cache key for a request.
///
/// Format: `METHOD::URL::[[name,value],...]::BODY`.
///
/// # Arguments
/// * `method` - HTTP method, already upper-cased
/// * `url` - Target URL, used verbatim
/// * `headers` - Outbound headers before any defaults are added
/// * `body` - Request body; `None` contributes an empty segment
pub fn build_cache_key(
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: Option<&RequestBody>,
) -> String {
    let normalized = normalize_headers(headers);
    let pairs: Vec<[&str; 2]> = normalized
        .iter()
        .map(|(name, value)| [name.as_str(), value.as_str()])
        .collect();
    // Serializing plain strings cannot fail
    let serialized_headers = serde_json::to_string(&pairs).unwrap_or_default();
    let serialized_body = body.map(RequestBody::key_material).unwrap_or_default();

    format!("{method}::{url}::{serialized_headers}::{serialized_body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_key_format() {
        let key = build_cache_key(
            "GET",
            "http://localhost/data",
            &pairs(&[("Accept", "application/json")]),
            None,
        );
        assert_eq!(
            key,
            r#"GET::http://localhost/data::[["accept","application/json"]]::"#
        );
    }

    #[test]
    fn test_header_case_and_order_ignored() {
        let a = build_cache_key(
            "GET",
            "http://x/",
            &pairs(&[("X-One", "1"), ("accept", "text/html")]),
            None,
        );
        let b = build_cache_key(
            "GET",
            "http://x/",
            &pairs(&[("ACCEPT", "text/html"), ("x-one", "1")]),
            None,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_header_values_are_case_sensitive() {
        let a = build_cache_key("GET", "http://x/", &pairs(&[("accept", "A")]), None);
        let b = build_cache_key("GET", "http://x/", &pairs(&[("accept", "a")]), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_body_variants_differ() {
        let structured = RequestBody::from(json!({"a": 1}));
        let scalar = RequestBody::scalar("hello");
        let binary = RequestBody::from(b"hello".to_vec());

        let keys: Vec<String> = [&structured, &scalar, &binary]
            .iter()
            .map(|body| build_cache_key("POST", "http://x/", &[], Some(body)))
            .collect();

        assert!(keys[0].ends_with(r#"::{"a":1}"#));
        assert!(keys[1].ends_with("::hello"));
        assert!(keys[2].ends_with("::aGVsbG8="));
    }

    #[test]
    fn test_structured_body_key_is_canonical() {
        let a = RequestBody::from(json!({"a": 1, "b": {"y": 2, "x": 1}}));
        let b = RequestBody::from(json!({"b": {"x": 1, "y": 2}, "a": 1}));
        assert_eq!(
            build_cache_key("POST", "http://x/", &[], Some(&a)),
            build_cache_key("POST", "http://x/", &[], Some(&b))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Shuffling headers and changing name case never changes the key.
        #[test]
        fn prop_key_ignores_header_order_and_case(
            (headers, shuffled) in prop::collection::vec(("[a-z][a-z-]{0,10}", "[ -~]{0,16}"), 0..8)
                .prop_flat_map(|h| (Just(h.clone()), Just(h).prop_shuffle())),
            upper in any::<bool>(),
            url in "http://[a-z]{1,10}/[a-z0-9/]{0,20}",
            body in proptest::option::of("[a-z0-9]{0,20}"),
        ) {
            let shuffled: Vec<(String, String)> = shuffled
                .into_iter()
                .map(|(n, v)| (if upper { n.to_ascii_uppercase() } else { n }, v))
                .collect();
            let body = body.map(RequestBody::Scalar);

            prop_assert_eq!(
                build_cache_key("GET", &url, &headers, body.as_ref()),
                build_cache_key("GET", &url, &shuffled, body.as_ref())
            );
        }
    }
}
