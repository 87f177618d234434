//! Verify the request builder against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names an operation, gives its parameters exactly as a caller (or
//! the FFI) would pass them, and lists either the expected request or the
//! expected missing parameters. Bodies are compared as parsed JSON so key
//! order does not matter. Header names are compared exactly, which keeps the
//! casing of caller overrides observable.

use std::collections::BTreeSet;

use cloud_databases_core::operation::{self, OPERATIONS};
use cloud_databases_core::{ApiError, CallParameters, CloudDatabasesClient, HttpMethod};
use serde_json::Value;

fn load() -> Value {
    let raw = include_str!("../../test-vectors/operations.json");
    serde_json::from_str(raw).unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

#[test]
fn operation_test_vectors() {
    let vectors = load();
    let base = vectors["base_url"].as_str().unwrap();
    let client = CloudDatabasesClient::new(base);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let op = case["operation"].as_str().unwrap();
        let spec = operation::find(op).unwrap_or_else(|| panic!("{name}: unknown operation {op}"));
        let params = CallParameters::from_json(case["params"].clone()).unwrap();

        if let Some(expected) = case.get("expected_error") {
            let want: Vec<String> = serde_json::from_value(expected["missing"].clone()).unwrap();
            match client.build(spec, &params) {
                Err(ApiError::MissingParameters(got)) => assert_eq!(got, want, "{name}: missing"),
                other => panic!("{name}: expected MissingParameters, got {other:?}"),
            }
            continue;
        }

        let expected = &case["expected_request"];
        let req = client.build(spec, &params).unwrap_or_else(|e| panic!("{name}: {e}"));

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.endpoint, format!("{base}{}", expected["path"].as_str().unwrap()), "{name}: path");
        if let Some(url) = expected.get("url") {
            assert_eq!(req.url(), format!("{base}{}", url.as_str().unwrap()), "{name}: url");
        }

        if let Some(headers) = expected.get("headers") {
            for (header, value) in headers.as_object().unwrap() {
                let got = req.headers.iter().find(|(k, _)| k == header).map(|(_, v)| v.as_str());
                assert_eq!(got, value.as_str(), "{name}: header {header}");
            }
        }
        if let Some(absent) = expected.get("absent_headers") {
            for header in absent.as_array().unwrap() {
                let header = header.as_str().unwrap();
                assert!(
                    req.headers.iter().all(|(k, _)| k != header),
                    "{name}: header {header} should be absent"
                );
            }
        }

        match &expected["body"] {
            Value::Null => assert_eq!(req.body, None, "{name}: body"),
            body => assert_eq!(req.json_body().as_ref(), Some(body), "{name}: body"),
        }
    }
}

#[test]
fn every_operation_has_a_vector() {
    let vectors = load();
    let covered: BTreeSet<&str> = vectors["cases"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|case| case.get("expected_request").is_some())
        .map(|case| case["operation"].as_str().unwrap())
        .collect();

    for spec in OPERATIONS {
        assert!(covered.contains(spec.name), "no request vector for {}", spec.name);
    }
}

#[test]
fn analytics_header_names_the_operation() {
    let vectors = load();
    let client = CloudDatabasesClient::new(vectors["base_url"].as_str().unwrap());

    for case in vectors["cases"].as_array().unwrap() {
        if case.get("expected_request").is_none() {
            continue;
        }
        let op = case["operation"].as_str().unwrap();
        let params = CallParameters::from_json(case["params"].clone()).unwrap();
        let req = client.build(operation::find(op).unwrap(), &params).unwrap();
        let analytics = req.header("X-IBMCloud-SDK-Analytics").unwrap();
        assert_eq!(
            analytics,
            format!("service_name=cloud_databases;service_version=v5;operation_id={op}"),
            "{op}"
        );
        assert!(req.header("User-Agent").unwrap().starts_with("cloud-databases-rust-sdk/"));
    }
}
