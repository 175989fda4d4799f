//! ICE credentials (RFC 5245 section 15.4).

use super::{at_most_one, live, random_string};
use crate::error::Result;
use crate::raw::{Attribute, AttributeCollection, AttributeHandle, AttributeValue, OrderedItem};

/// `ice-char = ALPHA / DIGIT / "+" / "/"`
const ICE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const UFRAG_LEN: usize = 16;
const PWD_LEN: usize = 24;
const GOOGLE_ICE: &str = "google-ice";

/// Position of each ICE attribute in the contiguous block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Lite = 0,
    Ufrag = 1,
    Pwd = 2,
    Options = 3,
    Mismatch = 4,
}

const NAMES: [&str; 5] = ["ice-lite", "ice-ufrag", "ice-pwd", "ice-options", "ice-mismatch"];

/// ICE attributes of one media.
///
/// The attributes always stay contiguous in `lite, ufrag, pwd, options,
/// mismatch` order no matter in which order they are set.
#[derive(Debug, Clone, Default)]
pub struct Ice {
    handles: [Option<AttributeHandle>; 5],
}

impl Ice {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        let mut handles = [None; 5];
        for (slot, name) in NAMES.iter().enumerate() {
            handles[slot] = at_most_one(attributes, &[name])?;
        }
        Ok(Self { handles })
    }

    fn string(&self, attributes: &AttributeCollection, slot: Slot) -> Option<String> {
        let handle = self.handles[slot as usize]?;
        match attributes.value(handle)? {
            AttributeValue::IceUfrag(s) | AttributeValue::IcePwd(s) | AttributeValue::IceOptions(s) => {
                Some(s.clone())
            }
            _ => None,
        }
    }

    pub fn ufrag(&self, attributes: &AttributeCollection) -> Option<String> {
        self.string(attributes, Slot::Ufrag)
    }

    pub fn pwd(&self, attributes: &AttributeCollection) -> Option<String> {
        self.string(attributes, Slot::Pwd)
    }

    pub fn options(&self, attributes: &AttributeCollection) -> Option<String> {
        self.string(attributes, Slot::Options)
    }

    pub fn lite(&self, attributes: &AttributeCollection) -> bool {
        self.handles[Slot::Lite as usize].is_some_and(|h| attributes.contains(h))
    }

    pub fn mismatch(&self, attributes: &AttributeCollection) -> bool {
        self.handles[Slot::Mismatch as usize].is_some_and(|h| attributes.contains(h))
    }

    /// ICE is in use when a ufrag or `ice-lite` is present
    pub fn is_present(&self, attributes: &AttributeCollection) -> bool {
        self.ufrag(attributes).is_some() || self.lite(attributes)
    }

    pub fn set_ufrag(&mut self, attributes: &mut AttributeCollection, ufrag: Option<String>) -> Result<()> {
        self.set(attributes, Slot::Ufrag, ufrag.map(AttributeValue::IceUfrag))
    }

    pub fn set_pwd(&mut self, attributes: &mut AttributeCollection, pwd: Option<String>) -> Result<()> {
        self.set(attributes, Slot::Pwd, pwd.map(AttributeValue::IcePwd))
    }

    pub fn set_options(&mut self, attributes: &mut AttributeCollection, options: Option<String>) -> Result<()> {
        self.set(attributes, Slot::Options, options.map(AttributeValue::IceOptions))
    }

    /// Fresh random credentials with `google-ice` options
    pub fn generate(&mut self, attributes: &mut AttributeCollection) -> Result<()> {
        self.set_ufrag(attributes, Some(random_string(ICE_CHARS, UFRAG_LEN)))?;
        self.set_pwd(attributes, Some(random_string(ICE_CHARS, PWD_LEN)))?;
        self.set_options(attributes, Some(GOOGLE_ICE.to_string()))
    }

    fn set(
        &mut self,
        attributes: &mut AttributeCollection,
        slot: Slot,
        value: Option<AttributeValue>,
    ) -> Result<()> {
        let index = slot as usize;
        let current = live(&mut self.handles[index], attributes);

        match (current, value) {
            (Some(handle), None) => {
                attributes.remove(handle);
                self.handles[index] = None;
            }
            (None, None) => {}
            (Some(handle), Some(value)) => {
                if let Some(attribute) = attributes.get_mut(handle) {
                    attribute.set_value(value);
                }
            }
            (None, Some(value)) => {
                let mut items = Vec::new();
                let mut new_at = 0;
                for (i, name) in NAMES.iter().enumerate() {
                    if i == index {
                        new_at = items.len();
                        items.push(OrderedItem::New(Attribute::new(*name, value.clone())));
                    } else if let Some(h) = live(&mut self.handles[i], attributes) {
                        items.push(OrderedItem::Present(h));
                    }
                }
                let handles = attributes.insert_with_order(items)?;
                self.handles[index] = handles.get(new_at).copied();
            }
        }
        Ok(())
    }
}
