use crate::application::{
    error::{ApplicationError, ApplicationResult},
    ports::security::SecretDigester,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const MIN_DIGEST_KEY_BYTES: usize = 32;

/// HMAC-SHA256 keyed digest, hex encoded. A leaked table of digests is
/// useless without the key, which also makes it safe for six-digit codes.
#[derive(Clone)]
pub struct HmacSecretDigester {
    mac: HmacSha256,
}

impl HmacSecretDigester {
    pub fn new(key: &[u8]) -> ApplicationResult<Self> {
        if key.len() < MIN_DIGEST_KEY_BYTES {
            return Err(ApplicationError::infrastructure(format!(
                "token digest key must be at least {MIN_DIGEST_KEY_BYTES} bytes"
            )));
        }
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;
        Ok(Self { mac })
    }
}

impl SecretDigester for HmacSecretDigester {
    fn digest(&self, secret: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(secret.as_bytes());
        format!("{:x}", mac.finalize().into_bytes())
    }

    fn matches(&self, secret: &str, expected_digest: &str) -> bool {
        let actual = self.digest(secret);
        actual.as_bytes().ct_eq(expected_digest.as_bytes()).into()
    }
}
