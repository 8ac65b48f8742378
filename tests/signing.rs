// Integration tests for request signing

use anyhow::Result;
use stratus::signing::SIGNATURE_PARAM;
use stratus::{ClientContext, FakeCredentials, QuerySigner, basic_auth_header, canonical_query};
use std::sync::Arc;

const PARAMS: [(&str, &str); 6] = [
    ("Action", "DescribeRegions"),
    ("AccessKeyId", "testid"),
    ("Format", "JSON"),
    ("Timestamp", "2016-02-23T12:46:24Z"),
    ("Version", "2014-05-26"),
    ("SignatureNonce", "3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf"),
];

#[test]
fn canonical_form_of_a_real_request() {
    assert_eq!(
        canonical_query(&PARAMS),
        "AccessKeyId=testid&Action=DescribeRegions&Format=JSON\
         &SignatureNonce=3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf\
         &Timestamp=2016-02-23T12%3A46%3A24Z&Version=2014-05-26"
    );
}

#[test]
fn hmac_sha1_signature() -> Result<()> {
    let credentials = FakeCredentials::new("testid", "testsecret");
    let signature = QuerySigner::new(&credentials).sign(&PARAMS)?;
    assert_eq!(signature, "fWhoURlHiHVoXjP7Jtd6Qi0OYJU=");
    Ok(())
}

#[test]
fn signed_query_appends_encoded_signature() -> Result<()> {
    let credentials = FakeCredentials::new("testid", "testsecret");
    let query = QuerySigner::new(&credentials).signed_query(&PARAMS)?;
    assert!(query.starts_with("AccessKeyId=testid&Action=DescribeRegions"));
    assert!(query.ends_with(&format!("&{SIGNATURE_PARAM}=fWhoURlHiHVoXjP7Jtd6Qi0OYJU%3D")));
    Ok(())
}

#[test]
fn parameter_order_does_not_change_signature() -> Result<()> {
    let credentials = FakeCredentials::new("testid", "testsecret");
    let signer = QuerySigner::new(&credentials);
    let mut reversed = PARAMS;
    reversed.reverse();
    assert_eq!(signer.sign(&reversed)?, signer.sign(&PARAMS)?);
    Ok(())
}

#[test]
fn signing_through_a_client_context() -> Result<()> {
    let context = ClientContext::new(
        "fake",
        "http://localhost",
        Arc::new(FakeCredentials::new("user", "pass")),
    )?;
    assert_eq!(basic_auth_header(context.credentials()), "Basic dXNlcjpwYXNz");

    let owned: Vec<(String, String)> = vec![("Action".into(), "List".into())];
    let query = QuerySigner::new(context.credentials()).signed_query(&owned)?;
    assert!(query.starts_with("Action=List&Signature="));
    Ok(())
}
