//! Keystore, issuance, and presentation flow through the CLI handlers,
//! using files in a temporary directory.

use serde_json::{json, Map};
use wp_cli::credential::{issue_credential, verify_file};
use wp_cli::keystore::{keygen, passwd};
use wp_cli::presentation::{accept, new_challenge_request, present};
use wp_cli::{open_session, write_json};
use wp_core::Timestamp;
use wp_vc::Reason;

#[test]
fn issuer_and_holder_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let issuer_ks = dir.path().join("issuer.wpkeystore");
    let holder_ks = dir.path().join("holder.wpkeystore");
    let vc_path = dir.path().join("ada.wpvc");
    let challenge_path = dir.path().join("challenge.json");
    let presentation_path = dir.path().join("presentation.json");

    keygen(&issuer_ks, "issuer-pw", false).unwrap();
    let holder = keygen(&holder_ks, "holder-pw", false).unwrap();

    let issuer = open_session(&issuer_ks, "issuer-pw").unwrap();
    let issuer_did = issuer.did().unwrap().to_string();
    let mut claims = Map::new();
    claims.insert("name".into(), json!("Ada"));
    claims.insert("dept".into(), json!("CS"));
    let vc = issuer
        .with_identity(|id| {
            issue_credential(id, holder.did().as_str(), Some("studentCard"), None, claims, None)
        })
        .unwrap()
        .unwrap();
    write_json(Some(&vc_path), &vc).unwrap();
    assert!(verify_file(&vc_path, &[]).unwrap().is_trusted());

    passwd(&holder_ks, "holder-pw", "holder-pw-2").unwrap();
    let mut holder = open_session(&holder_ks, "holder-pw-2").unwrap();

    let request = new_challenge_request("kampus-kapi", 120).unwrap();
    write_json(Some(&challenge_path), &serde_json::to_value(&request).unwrap()).unwrap();
    let presentation = holder
        .with_identity(|id| present(&challenge_path, Some(id), Some(vc)))
        .unwrap()
        .unwrap();
    let holder_did = holder.did().unwrap().to_string();
    holder.lock();
    assert!(holder.with_identity(|_| ()).is_err());
    write_json(Some(&presentation_path), &presentation).unwrap();

    let result = accept(&challenge_path, &presentation_path, &[]).unwrap();
    assert!(result.is_trusted(), "{result:?}");
    assert_eq!(result.issuer.as_deref(), Some(issuer_did.as_str()));
    assert_eq!(result.subject.as_deref(), Some(holder_did.as_str()));
}

#[test]
fn expired_credential_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let ks = dir.path().join("issuer.wpkeystore");
    let vc_path = dir.path().join("old.wpvc");
    let issuer = keygen(&ks, "pw", false).unwrap();

    let vc = issue_credential(
        &issuer,
        "did:key:z6MkSubject",
        None,
        Some("Badge"),
        Map::new(),
        Some(Timestamp::from_epoch_secs(1_000).unwrap()),
    )
    .unwrap();
    write_json(Some(&vc_path), &vc).unwrap();

    let result = verify_file(&vc_path, &[]).unwrap();
    assert!(!result.valid);
    assert_eq!(result.reason, Reason::Expired);
}
