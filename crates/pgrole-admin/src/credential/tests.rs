use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_digest_is_password_then_user() {
    assert_eq!(
        md5_password("a", "secure!"),
        "md5c508a37ceffb5849f3d0bade97971548"
    );
    assert_eq!(
        md5_password("a", "insecure!"),
        "md5d2124f980c23257bc6580354abe58bd6"
    );
    assert_eq!(
        md5_password("postgres", "pw"),
        "md5b357da35ac2798f458a3c210f55484a6"
    );
}

#[test]
fn test_digest_with_special_characters() {
    assert_eq!(
        md5_password("q\"", "p'w\\x\""),
        "md5e245309a5463d22100038dd13b205bf1"
    );
}

#[test]
fn test_digest_depends_on_user() {
    assert_ne!(md5_password("a", "secure!"), md5_password("b", "secure!"));
}

#[test]
fn test_digest_shape() {
    let digest = md5_password("alice", "swordfish");
    assert_eq!(digest.len(), 35);
    assert!(is_md5_digest(&digest));
}

#[test]
fn test_non_md5_stored_values() {
    assert!(!is_md5_digest("SCRAM-SHA-256$4096:c2FsdA==$a:b"));
    assert!(!is_md5_digest("md5"));
    assert!(!is_md5_digest("md5XYZ8a37ceffb5849f3d0bade97971548"));
    assert!(!is_md5_digest(""));
}
