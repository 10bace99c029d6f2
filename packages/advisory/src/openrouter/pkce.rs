use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Unreserved URI characters permitted in a PKCE code verifier (RFC 7636 §4.1).
const UNRESERVED: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Verifier length in characters. RFC 7636 requires 43..=128.
pub const VERIFIER_LENGTH: usize = 64;

/// Generate a high-entropy random code verifier from the unreserved set.
pub fn generate_code_verifier() -> String {
    let mut rng = rand::rngs::OsRng;
    (0..VERIFIER_LENGTH)
        .map(|_| UNRESERVED[rng.gen_range(0..UNRESERVED.len())] as char)
        .collect()
}

/// Derive the S256 code challenge: base64url (no padding) of the SHA-256
/// digest of the exact verifier bytes. The plaintext verifier is never sent
/// during authorization.
pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
