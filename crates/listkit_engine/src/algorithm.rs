use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use crate::JwtError;

/// Signing algorithm named in the token header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Unsigned token; the signature segment is empty.
    None,
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }

    pub(crate) fn sign(self, secret: &[u8], message: &[u8]) -> Result<Vec<u8>, JwtError> {
        match self {
            Self::None => Ok(Vec::new()),
            Self::Hs256 => hmac_sign::<Hmac<Sha256>>(secret, message),
            Self::Hs384 => hmac_sign::<Hmac<Sha384>>(secret, message),
            Self::Hs512 => hmac_sign::<Hmac<Sha512>>(secret, message),
        }
    }

    /// Constant-time comparison against a freshly computed signature.
    pub(crate) fn verify(
        self,
        secret: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, JwtError> {
        match self {
            Self::None => Ok(signature.is_empty()),
            Self::Hs256 => hmac_verify::<Hmac<Sha256>>(secret, message, signature),
            Self::Hs384 => hmac_verify::<Hmac<Sha384>>(secret, message, signature),
            Self::Hs512 => hmac_verify::<Hmac<Sha512>>(secret, message, signature),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::None, Self::Hs256, Self::Hs384, Self::Hs512]
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| JwtError::InvalidToken(format!("unsupported algorithm {s}")))
    }
}

fn hmac_sign<M: Mac + KeyInit>(secret: &[u8], message: &[u8]) -> Result<Vec<u8>, JwtError> {
    let mut mac = <M as Mac>::new_from_slice(secret).map_err(|_| JwtError::InvalidKey)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_verify<M: Mac + KeyInit>(
    secret: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<bool, JwtError> {
    let mut mac = <M as Mac>::new_from_slice(secret).map_err(|_| JwtError::InvalidKey)?;
    mac.update(message);
    Ok(mac.verify_slice(signature).is_ok())
}
