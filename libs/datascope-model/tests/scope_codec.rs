#![allow(clippy::unwrap_used, clippy::expect_used)]

use datascope_model::{SCOPE_BIN_VERSION, EffectiveScope, ScopeDecodeError, decode_scope, encode_scope};

#[test]
fn round_trips_restricted_scope_payload() {
    let scope = EffectiveScope::new(true, [1, 2, 3, 4, 5]).with_tree_version(17);

    let encoded = encode_scope(&scope).expect("scope encodes");
    assert_eq!(encoded[0], SCOPE_BIN_VERSION);

    let decoded = decode_scope(&encoded).expect("scope decodes");
    assert_eq!(decoded, scope);
    assert_eq!(decoded.tree_version(), 17);
}

#[test]
fn round_trips_all_scope_payload() {
    let scope = EffectiveScope::all().with_tree_version(3);
    let decoded = decode_scope(&encode_scope(&scope).unwrap()).unwrap();
    assert!(decoded.is_all());
    assert!(decoded.includes_self());
    assert!(decoded.unit_ids().is_empty());
}

#[test]
fn decode_rejects_unknown_version() {
    let mut encoded = encode_scope(&EffectiveScope::self_only()).expect("encodes scope");
    encoded[0] = SCOPE_BIN_VERSION.wrapping_add(1);

    let err = decode_scope(&encoded).expect_err("version mismatch should error");
    let message = err.to_string();
    assert!(
        message.contains("unsupported scope payload version"),
        "expected version error, got: {message}"
    );
}

#[test]
fn decode_rejects_empty_and_truncated_payloads() {
    assert!(matches!(decode_scope(&[]), Err(ScopeDecodeError::Empty)));

    let encoded = encode_scope(&EffectiveScope::new(false, [100, 200])).unwrap();
    let truncated = &encoded[..encoded.len() - 1];
    assert!(matches!(
        decode_scope(truncated),
        Err(ScopeDecodeError::Postcard(_))
    ));
}
