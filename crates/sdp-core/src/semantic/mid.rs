//! Media identification (RFC 5888).

use super::{at_most_one, live};
use crate::error::Result;
use crate::raw::{Attribute, AttributeCollection, AttributeHandle, AttributeValue};

#[derive(Debug, Clone, Default)]
pub struct Mid {
    handle: Option<AttributeHandle>,
}

impl Mid {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        Ok(Self {
            handle: at_most_one(attributes, &["mid"])?,
        })
    }

    pub fn get<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a str> {
        match attributes.value(self.handle?)? {
            AttributeValue::Mid(mid) => Some(mid.as_str()),
            _ => None,
        }
    }

    /// `None` removes the `a=mid` line.
    pub fn set(&mut self, attributes: &mut AttributeCollection, mid: Option<String>) {
        match (live(&mut self.handle, attributes), mid) {
            (Some(handle), Some(mid)) => {
                if let Some(attribute) = attributes.get_mut(handle) {
                    attribute.set_value(AttributeValue::Mid(mid));
                }
            }
            (Some(handle), None) => {
                attributes.remove(handle);
                self.handle = None;
            }
            (None, Some(mid)) => {
                self.handle = Some(attributes.append(Attribute::new("mid", AttributeValue::Mid(mid))));
            }
            (None, None) => {}
        }
    }
}
