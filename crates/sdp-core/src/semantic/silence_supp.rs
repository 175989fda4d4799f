use super::{at_most_one, live};
use crate::error::Result;
use crate::raw::attributes::SilenceSupp;
use crate::raw::{Attribute, AttributeCollection, AttributeHandle, AttributeValue};

/// `a=silenceSupp` (RFC 3108)
#[derive(Debug, Clone, Default)]
pub struct SilenceSuppWrapper {
    handle: Option<AttributeHandle>,
}

impl SilenceSuppWrapper {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        Ok(Self {
            handle: at_most_one(attributes, &["silenceSupp"])?,
        })
    }

    pub fn get<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a SilenceSupp> {
        match attributes.value(self.handle?)? {
            AttributeValue::SilenceSupp(value) => Some(value),
            _ => None,
        }
    }

    pub fn enabled(&self, attributes: &AttributeCollection) -> Option<bool> {
        self.get(attributes).map(|s| s.enabled)
    }

    /// Writing `Some(flag)` resets every other field to unspecified.
    pub fn set_enabled(&mut self, attributes: &mut AttributeCollection, enabled: Option<bool>) {
        let value = enabled.map(|e| AttributeValue::SilenceSupp(SilenceSupp::with_enabled(e)));
        match (live(&mut self.handle, attributes), value) {
            (Some(handle), Some(value)) => {
                if let Some(attribute) = attributes.get_mut(handle) {
                    attribute.set_value(value);
                }
            }
            (Some(handle), None) => {
                attributes.remove(handle);
                self.handle = None;
            }
            (None, Some(value)) => {
                self.handle = Some(attributes.append(Attribute::new("silenceSupp", value)));
            }
            (None, None) => {}
        }
    }
}
