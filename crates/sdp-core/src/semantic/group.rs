//! Session level `a=group` (RFC 5888).
//!
//! The wrapper owns the attribute only. Assigning `mid` values to the media
//! it names is done by [`crate::SessionDescription`], which sees both scopes.

use super::{at_most_one, live};
use crate::error::Result;
use crate::raw::attributes::{Group as GroupValue, GroupSemantics};
use crate::raw::{Attribute, AttributeCollection, AttributeHandle, AttributeValue};

/// First of `prefix`, `prefix-1`, `prefix-2`... not in `reserved`. The chosen
/// name is added to `reserved`.
pub fn generate_name(prefix: &str, reserved: &mut Vec<String>) -> String {
    let mut name = prefix.to_string();
    let mut i = 0;
    while reserved.contains(&name) {
        i += 1;
        name = format!("{}-{}", prefix, i);
    }
    reserved.push(name.clone());
    name
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    handle: Option<AttributeHandle>,
}

impl Group {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        Ok(Self {
            handle: at_most_one(attributes, &["group"])?,
        })
    }

    fn value<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a GroupValue> {
        match attributes.value(self.handle?)? {
            AttributeValue::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn semantics(&self, attributes: &AttributeCollection) -> Option<GroupSemantics> {
        self.value(attributes).map(|g| g.semantics)
    }

    pub fn tags(&self, attributes: &AttributeCollection) -> Vec<String> {
        self.value(attributes).map(|g| g.tags.clone()).unwrap_or_default()
    }

    /// Write the group as the first session attribute, or remove it.
    pub fn set(&mut self, attributes: &mut AttributeCollection, group: Option<GroupValue>) {
        match (live(&mut self.handle, attributes), group) {
            (Some(handle), Some(group)) => {
                if let Some(attribute) = attributes.get_mut(handle) {
                    attribute.set_value(AttributeValue::Group(group));
                }
            }
            (Some(handle), None) => {
                attributes.remove(handle);
                self.handle = None;
            }
            (None, Some(group)) => {
                self.handle = Some(attributes.prepend(Attribute::new("group", AttributeValue::Group(group))));
            }
            (None, None) => {}
        }
    }

    /// Append a tag to an existing group; no-op without one.
    pub fn add_tag(&mut self, attributes: &mut AttributeCollection, tag: String) {
        if let Some(handle) = live(&mut self.handle, attributes) {
            if let Some(AttributeValue::Group(group)) = attributes.value_mut(handle) {
                group.tags.push(tag);
            }
        }
    }
}
