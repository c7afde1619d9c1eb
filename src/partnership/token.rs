use rand::rngs::OsRng;
use rand::RngCore;

/// Token length in raw bytes (256 bits of entropy)
pub const TOKEN_BYTES: usize = 32;

/// Generate an unguessable invitation token as lowercase hex.
///
/// Tokens come from the operating system's CSPRNG, never from the
/// non-cryptographic generator used for scoring jitter.
#[must_use]
pub fn generate_invitation_token() -> String {
    random_hex_token()
}

/// Generate a bearer access token issued to a user at registration.
///
/// Same entropy and encoding as invitation tokens, but the two kinds live
/// in separate indexes and are never interchangeable. The access token is
/// the credential; user ids are public and must never authenticate.
#[must_use]
pub fn generate_access_token() -> String {
    random_hex_token()
}

fn random_hex_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    let mut token = String::with_capacity(TOKEN_BYTES * 2);
    for byte in bytes {
        token.push_str(&format!("{byte:02x}"));
    }
    token
}
