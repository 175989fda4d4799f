//! SDP attributes and the ordered collection that owns them.
//!
//! An [`AttributeCollection`] stores its attributes in an arena and hands out
//! [`AttributeHandle`]s. A handle stays valid until the attribute is removed;
//! slots are never reused, so a stale handle can never alias a newer
//! attribute. Attributes do not point back at their collection: moving one
//! to another scope is a [`AttributeCollection::remove`] followed by an insert
//! on the target, which makes double membership unrepresentable.

use super::attributes::AttributeValue;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// One `a=` line: a name and its typed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, AttributeValue::Flag)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut AttributeValue {
        &mut self.value
    }

    pub fn set_value(&mut self, value: AttributeValue) {
        self.value = value;
    }
}

impl FromStr for Attribute {
    type Err = Error;

    /// Parse the text after `a=`, e.g. `rtpmap:0 PCMU/8000` or `rtcp-mux`.
    fn from_str(s: &str) -> Result<Self> {
        let (name, value) = match s.split_once(':') {
            Some((name, value)) => (name, Some(value)),
            None => (s, None),
        };
        if name.is_empty() {
            return Err(Error::parse(format!("attribute without a name: {:?}", s)));
        }
        Ok(Self::new(name, AttributeValue::parse(name, value)?))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_flag() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.name, self.value)
        }
    }
}

/// Stable reference to an attribute inside one [`AttributeCollection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeHandle(usize);

impl AttributeHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for AttributeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Argument of [`AttributeCollection::insert_with_order`]
#[derive(Debug, Clone)]
pub enum OrderedItem {
    /// An attribute that may already be in the collection
    Present(AttributeHandle),
    /// A new attribute to place relative to its neighbours
    New(Attribute),
}

impl From<Attribute> for OrderedItem {
    fn from(attribute: Attribute) -> Self {
        OrderedItem::New(attribute)
    }
}

impl From<AttributeHandle> for OrderedItem {
    fn from(handle: AttributeHandle) -> Self {
        OrderedItem::Present(handle)
    }
}

/// Ordered attributes of one SDP scope (session or media)
#[derive(Debug, Clone, Default)]
pub struct AttributeCollection {
    slots: Vec<Option<Attribute>>,
    order: Vec<AttributeHandle>,
}

impl AttributeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, handle: AttributeHandle) -> bool {
        matches!(self.slots.get(handle.0), Some(Some(_)))
    }

    pub fn get(&self, handle: AttributeHandle) -> Option<&Attribute> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, handle: AttributeHandle) -> Option<&mut Attribute> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Value of a live attribute
    pub fn value(&self, handle: AttributeHandle) -> Option<&AttributeValue> {
        self.get(handle).map(Attribute::value)
    }

    pub fn value_mut(&mut self, handle: AttributeHandle) -> Option<&mut AttributeValue> {
        self.get_mut(handle).map(Attribute::value_mut)
    }

    /// Serialization position of a live attribute
    pub fn position(&self, handle: AttributeHandle) -> Option<usize> {
        self.order.iter().position(|h| *h == handle)
    }

    fn alloc(&mut self, attribute: Attribute) -> AttributeHandle {
        let handle = AttributeHandle(self.slots.len());
        self.slots.push(Some(attribute));
        handle
    }

    fn require_position(&self, handle: AttributeHandle) -> Result<usize> {
        self.position(handle)
            .ok_or(Error::InvalidHandle(handle.0))
    }

    pub fn append(&mut self, attribute: Attribute) -> AttributeHandle {
        let handle = self.alloc(attribute);
        self.order.push(handle);
        handle
    }

    pub fn prepend(&mut self, attribute: Attribute) -> AttributeHandle {
        let handle = self.alloc(attribute);
        self.order.insert(0, handle);
        handle
    }

    /// Insert `attribute` immediately before `anchor`.
    pub fn insert_before(
        &mut self,
        attribute: Attribute,
        anchor: AttributeHandle,
    ) -> Result<AttributeHandle> {
        let position = self.require_position(anchor)?;
        let handle = self.alloc(attribute);
        self.order.insert(position, handle);
        Ok(handle)
    }

    /// Insert `attribute` immediately after `anchor`.
    pub fn insert_after(
        &mut self,
        attribute: Attribute,
        anchor: AttributeHandle,
    ) -> Result<AttributeHandle> {
        let position = self.require_position(anchor)?;
        let handle = self.alloc(attribute);
        self.order.insert(position + 1, handle);
        Ok(handle)
    }

    /// Detach an attribute, returning it to the caller.
    pub fn remove(&mut self, handle: AttributeHandle) -> Option<Attribute> {
        let position = self.position(handle)?;
        self.order.remove(position);
        self.slots.get_mut(handle.0).and_then(Option::take)
    }

    /// Handles of every attribute whose name is in `names`, in document order
    pub fn find(&self, names: &[&str]) -> Vec<AttributeHandle> {
        self.iter_handles()
            .filter(|(_, attr)| names.contains(&attr.name()))
            .map(|(handle, _)| handle)
            .collect()
    }

    /// First attribute named `name`
    pub fn first(&self, name: &str) -> Option<AttributeHandle> {
        self.iter_handles()
            .find(|(_, attr)| attr.name() == name)
            .map(|(handle, _)| handle)
    }

    /// Iterate attributes in document order
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.iter_handles().map(|(_, attr)| attr)
    }

    pub fn iter_handles(&self) -> impl Iterator<Item = (AttributeHandle, &Attribute)> + '_ {
        self.order
            .iter()
            .filter_map(move |handle| self.get(*handle).map(|attr| (*handle, attr)))
    }

    /// Insert a batch keeping the given relative order.
    ///
    /// The first item already present anchors the batch; when none is present
    /// the first item is appended. Items before the anchor are then placed
    /// right before their successor and items after it right after their
    /// predecessor. Present items are never moved. Returns one handle per
    /// item, in argument order.
    pub fn insert_with_order(&mut self, items: Vec<OrderedItem>) -> Result<Vec<AttributeHandle>> {
        let mut handles: Vec<Option<AttributeHandle>> = Vec::with_capacity(items.len());
        let mut pending: Vec<Option<Attribute>> = Vec::with_capacity(items.len());

        for item in items {
            match item {
                OrderedItem::Present(handle) if self.contains(handle) => {
                    handles.push(Some(handle));
                    pending.push(None);
                }
                OrderedItem::Present(handle) => return Err(Error::InvalidHandle(handle.0)),
                OrderedItem::New(attribute) => {
                    handles.push(None);
                    pending.push(Some(attribute));
                }
            }
        }

        if handles.is_empty() {
            return Ok(Vec::new());
        }

        let anchor = match handles.iter().position(Option::is_some) {
            Some(index) => index,
            None => {
                if let Some(attribute) = pending[0].take() {
                    handles[0] = Some(self.append(attribute));
                }
                0
            }
        };

        for i in (1..=anchor).rev() {
            if let (Some(attribute), Some(next)) = (pending[i - 1].take(), handles[i]) {
                handles[i - 1] = Some(self.insert_before(attribute, next)?);
            }
        }

        for i in anchor + 1..handles.len() {
            if let (Some(attribute), Some(prev)) = (pending[i].take(), handles[i - 1]) {
                handles[i] = Some(self.insert_after(attribute, prev)?);
            }
        }

        handles
            .into_iter()
            .map(|h| h.ok_or(Error::InvalidHandle(usize::MAX)))
            .collect()
    }

    /// Lines without the `a=` prefix, in document order
    pub fn to_str_list(&self) -> Vec<String> {
        self.iter().map(Attribute::to_string).collect()
    }
}

impl FromIterator<Attribute> for AttributeCollection {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut collection = AttributeCollection::new();
        for attribute in iter {
            collection.append(attribute);
        }
        collection
    }
}

impl PartialEq for AttributeCollection {
    /// Two collections are equal when they serialize identically
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl Eq for AttributeCollection {}
