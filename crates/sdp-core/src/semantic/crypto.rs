//! SDES key material (RFC 4568). Only one `a=crypto` line per media is
//! supported.

use super::{at_most_one, live};
use crate::error::Result;
use crate::raw::attributes::{Crypto, CryptoSuite, KeyParams};
use crate::raw::{Attribute, AttributeCollection, AttributeHandle, AttributeValue};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;

/// AES_CM_128 master key (16 bytes) plus master salt (14 bytes)
const MASTER_KEY_SALT_LEN: usize = 30;

#[derive(Debug, Clone, Default)]
pub struct CryptoWrapper {
    handle: Option<AttributeHandle>,
}

impl CryptoWrapper {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        Ok(Self {
            handle: at_most_one(attributes, &["crypto"])?,
        })
    }

    pub fn get<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a Crypto> {
        match attributes.value(self.handle?)? {
            AttributeValue::Crypto(crypto) => Some(crypto),
            _ => None,
        }
    }

    pub fn is_present(&self, attributes: &AttributeCollection) -> bool {
        self.get(attributes).is_some()
    }

    pub fn suite(&self, attributes: &AttributeCollection) -> Option<CryptoSuite> {
        self.get(attributes).map(|c| c.suite)
    }

    pub fn key<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a str> {
        self.get(attributes).map(Crypto::key)
    }

    pub fn session_params<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a str> {
        self.get(attributes).and_then(|c| c.session_params.as_deref())
    }

    pub fn set(&mut self, attributes: &mut AttributeCollection, crypto: Option<Crypto>) {
        match (live(&mut self.handle, attributes), crypto) {
            (Some(handle), None) => {
                attributes.remove(handle);
                self.handle = None;
            }
            (Some(handle), Some(crypto)) => {
                if let Some(attribute) = attributes.get_mut(handle) {
                    attribute.set_value(AttributeValue::Crypto(crypto));
                }
            }
            (None, Some(crypto)) => {
                self.handle = Some(attributes.append(Attribute::new("crypto", AttributeValue::Crypto(crypto))));
            }
            (None, None) => {}
        }
    }

    pub fn remove(&mut self, attributes: &mut AttributeCollection) {
        self.set(attributes, None);
    }

    /// Append `crypto:1 AES_CM_128_HMAC_SHA1_80 inline:<random key>` unless a
    /// crypto attribute is already present.
    pub fn generate_aes_cm_128_hmac_sha1_80(&mut self, attributes: &mut AttributeCollection) {
        if live(&mut self.handle, attributes).is_some() {
            return;
        }
        let mut material = [0u8; MASTER_KEY_SALT_LEN];
        rand::thread_rng().fill_bytes(&mut material);
        let crypto = Crypto::new(
            1,
            CryptoSuite::AesCm128HmacSha1_80,
            KeyParams::inline(STANDARD.encode(material)),
        );
        self.set(attributes, Some(crypto));
    }
}
