//! Challenge/presentation round trips between a verifier and a holder.

use std::sync::Arc;
use std::thread;

use serde_json::{json, Map, Value};
use wp_core::{Did, Timestamp};
use wp_crypto::Ed25519KeyPair;
use wp_keystore::Identity;
use wp_presentation::{
    accept_presentation, accept_presentation_at, build_presentation, ChallengeRegistry,
    ChallengeRequest,
};
use wp_vc::{issue, InMemoryRevocationRegistry, IssueParams, Reason, RevocationRegistry};

fn issuer() -> Identity {
    Identity::with_did(
        Did::parse("did:key:zABC").unwrap(),
        Ed25519KeyPair::from_seed(&[0xAB; 32]),
    )
}

fn holder() -> Identity {
    Identity::from_keypair(Ed25519KeyPair::from_seed(&[0x42; 32]))
}

fn credential_for(subject: &Identity) -> Value {
    let mut claims = Map::new();
    claims.insert("name".into(), json!("Ada"));
    issue(
        &issuer(),
        IssueParams::new(subject.did().as_str(), "StudentCard", claims),
    )
    .unwrap()
    .to_value()
    .unwrap()
}

fn t(secs: i64) -> Timestamp {
    Timestamp::from_epoch_secs(secs).unwrap()
}

#[test]
fn full_presentation_is_accepted_once() {
    let registry = ChallengeRegistry::new();
    let revocations = InMemoryRevocationRegistry::new();
    let challenge = registry.new_challenge("kampus-kapi", 120).unwrap();

    let request = ChallengeRequest::from_value(&serde_json::to_value(challenge.to_request()).unwrap())
        .unwrap();
    let holder = holder();
    let payload = build_presentation(&request, Some(&holder), Some(credential_for(&holder)))
        .to_value()
        .unwrap();

    let first = accept_presentation(&registry, &payload, &revocations);
    assert!(first.valid, "{first:?}");
    assert!(!first.revoked);
    assert_eq!(first.reason, Reason::Ok);
    assert_eq!(first.issuer.as_deref(), Some("did:key:zABC"));
    assert_eq!(first.subject.as_deref(), Some(holder.did().as_str()));

    let second = accept_presentation(&registry, &payload, &revocations);
    assert!(!second.valid);
    assert_eq!(second.reason, Reason::UnknownOrUsedChallenge);
}

#[test]
fn expired_challenge_is_rejected() {
    let registry = ChallengeRegistry::new();
    let challenge = registry.new_challenge_at("door", 1, t(1_000)).unwrap();
    let payload = build_presentation(&challenge.to_request(), None, None)
        .to_value()
        .unwrap();

    let r = accept_presentation_at(
        &registry,
        &payload,
        &InMemoryRevocationRegistry::new(),
        t(1_002),
    );
    assert!(!r.valid);
    assert_eq!(r.reason, Reason::Expired);
}

#[test]
fn expired_challenge_with_a_real_clock() {
    let registry = ChallengeRegistry::new();
    let challenge = registry.new_challenge("door", 1).unwrap();
    let payload = build_presentation(&challenge.to_request(), None, None)
        .to_value()
        .unwrap();
    thread::sleep(std::time::Duration::from_secs(2));
    let r = accept_presentation(&registry, &payload, &InMemoryRevocationRegistry::new());
    assert_eq!(r.reason, Reason::Expired);
}

#[test]
fn unknown_nonce_and_missing_challenge() {
    let registry = ChallengeRegistry::new();
    let revocations = InMemoryRevocationRegistry::new();
    let r = accept_presentation(
        &registry,
        &json!({"type": "present", "challenge": "never-issued"}),
        &revocations,
    );
    assert_eq!(r.reason, Reason::UnknownOrUsedChallenge);

    let r = accept_presentation(&registry, &json!({"vc": {}}), &revocations);
    assert_eq!(r.reason, Reason::Malformed);
}

#[test]
fn revoked_credential_is_valid_but_flagged() {
    let registry = ChallengeRegistry::new();
    let revocations = InMemoryRevocationRegistry::new();
    let holder = holder();
    let vc = credential_for(&holder);
    revocations.revoke("did:key:zABC", vc["jti"].as_str().unwrap());

    let challenge = registry.new_challenge("door", 120).unwrap();
    let payload = build_presentation(&challenge.to_request(), Some(&holder), Some(vc))
        .to_value()
        .unwrap();
    let r = accept_presentation(&registry, &payload, &revocations);
    assert!(r.valid);
    assert!(r.revoked);
}

#[test]
fn credential_envelope_without_holder() {
    let registry = ChallengeRegistry::new();
    let challenge = registry.new_challenge("door", 120).unwrap();
    let payload = json!({"vc": credential_for(&holder()), "challenge": challenge.nonce});
    let r = accept_presentation(&registry, &payload, &InMemoryRevocationRegistry::new());
    assert!(r.valid);
    assert_eq!(r.issuer.as_deref(), Some("did:key:zABC"));
}

#[test]
fn tampered_credential_still_burns_the_nonce() {
    let registry = ChallengeRegistry::new();
    let revocations = InMemoryRevocationRegistry::new();
    let challenge = registry.new_challenge("door", 120).unwrap();
    let mut vc = credential_for(&holder());
    vc["credentialSubject"]["name"] = json!("Mallory");
    let payload = json!({"vc": vc, "challenge": challenge.nonce});

    assert_eq!(
        accept_presentation(&registry, &payload, &revocations).reason,
        Reason::BadSignature
    );
    assert_eq!(
        accept_presentation(&registry, &payload, &revocations).reason,
        Reason::UnknownOrUsedChallenge
    );
}

#[test]
fn someone_elses_credential_is_a_subject_mismatch() {
    let registry = ChallengeRegistry::new();
    let challenge = registry.new_challenge("door", 120).unwrap();
    let other = Identity::from_keypair(Ed25519KeyPair::from_seed(&[0x07; 32]));
    let payload = build_presentation(
        &challenge.to_request(),
        Some(&holder()),
        Some(credential_for(&other)),
    )
    .to_value()
    .unwrap();
    let r = accept_presentation(&registry, &payload, &InMemoryRevocationRegistry::new());
    assert!(!r.valid);
    assert_eq!(r.reason, Reason::SubjectHolderMismatch);
}

#[test]
fn echoed_audience_must_match() {
    let registry = ChallengeRegistry::new();
    let challenge = registry.new_challenge("door", 120).unwrap();
    let mut request = challenge.to_request();
    request.aud = Some("phishing-site".into());
    let payload = build_presentation(&request, Some(&holder()), None)
        .to_value()
        .unwrap();
    let r = accept_presentation(&registry, &payload, &InMemoryRevocationRegistry::new());
    assert_eq!(r.reason, Reason::AudienceMismatch);
}

#[test]
fn echoed_expiry_must_match_the_issued_one() {
    let registry = ChallengeRegistry::new();
    let challenge = registry.new_challenge("door", 120).unwrap();
    let mut request = challenge.to_request();
    request.exp = Some(challenge.expires_at + 86_400);
    let holder = holder();
    let payload = build_presentation(&request, Some(&holder), Some(credential_for(&holder)))
        .to_value()
        .unwrap();

    let r = accept_presentation(&registry, &payload, &InMemoryRevocationRegistry::new());
    assert!(!r.valid);
    assert_eq!(r.reason, Reason::Malformed);

    // The nonce was still consumed.
    let again = accept_presentation(&registry, &payload, &InMemoryRevocationRegistry::new());
    assert_eq!(again.reason, Reason::UnknownOrUsedChallenge);
}

#[test]
fn presentation_without_echoed_expiry_is_accepted() {
    let registry = ChallengeRegistry::new();
    let challenge = registry.new_challenge("door", 120).unwrap();
    let mut request = challenge.to_request();
    request.exp = None;
    let payload = build_presentation(&request, Some(&holder()), None)
        .to_value()
        .unwrap();
    let r = accept_presentation(&registry, &payload, &InMemoryRevocationRegistry::new());
    assert!(r.valid, "{r:?}");
}

#[test]
fn forged_holder_signature_is_rejected() {
    let registry = ChallengeRegistry::new();
    let challenge = registry.new_challenge("door", 120).unwrap();
    let holder = holder();
    let mut payload = build_presentation(
        &challenge.to_request(),
        Some(&holder),
        Some(credential_for(&holder)),
    )
    .to_value()
    .unwrap();
    let forger = Ed25519KeyPair::from_seed(&[0x99; 32]);
    payload["holder"]["sig_b64u"] = json!(forger.sign(b"anything").to_b64u());

    let r = accept_presentation(&registry, &payload, &InMemoryRevocationRegistry::new());
    assert!(!r.valid);
    assert_eq!(r.reason, Reason::BadHolderSignature);
}

#[test]
fn concurrent_presentations_have_exactly_one_winner() {
    let registry = Arc::new(ChallengeRegistry::new());
    let revocations = Arc::new(InMemoryRevocationRegistry::new());
    let holder = holder();
    let challenge = registry.new_challenge("door", 120).unwrap();
    let payload = Arc::new(
        build_presentation(
            &challenge.to_request(),
            Some(&holder),
            Some(credential_for(&holder)),
        )
        .to_value()
        .unwrap(),
    );

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let revocations = Arc::clone(&revocations);
            let payload = Arc::clone(&payload);
            thread::spawn(move || accept_presentation(&registry, &payload, revocations.as_ref()))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.valid).count(), 1);
    assert!(results
        .iter()
        .filter(|r| !r.valid)
        .all(|r| r.reason == Reason::UnknownOrUsedChallenge));
}

#[test]
fn distinct_nonces_are_independent() {
    let registry = ChallengeRegistry::new();
    let a = registry.new_challenge("door", 120).unwrap();
    let b = registry.new_challenge("door", 120).unwrap();
    let revocations = InMemoryRevocationRegistry::new();
    for c in [&b, &a] {
        let payload = build_presentation(&c.to_request(), None, None)
            .to_value()
            .unwrap();
        assert!(accept_presentation(&registry, &payload, &revocations).valid);
    }
    assert!(registry.is_empty());
}
