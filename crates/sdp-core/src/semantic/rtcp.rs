//! RTCP port (RFC 3605) and RTP/RTCP multiplexing (RFC 5761).

use super::{at_most_one, live};
use crate::error::Result;
use crate::raw::attributes::{Rtcp, RtcpAddress};
use crate::raw::{Attribute, AttributeCollection, AttributeHandle, AttributeValue};

#[derive(Debug, Clone, Default)]
pub struct RtcpWrapper {
    handle: Option<AttributeHandle>,
}

impl RtcpWrapper {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        Ok(Self {
            handle: at_most_one(attributes, &["rtcp"])?,
        })
    }

    fn value<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a Rtcp> {
        match attributes.value(self.handle?)? {
            AttributeValue::Rtcp(rtcp) => Some(rtcp),
            _ => None,
        }
    }

    /// The rtcp value, appending `a=rtcp:0` first when absent
    fn value_mut<'a>(&mut self, attributes: &'a mut AttributeCollection) -> Option<&'a mut Rtcp> {
        let handle = match live(&mut self.handle, attributes) {
            Some(handle) => handle,
            None => {
                let handle = attributes.append(Attribute::new("rtcp", AttributeValue::Rtcp(Rtcp::new(0))));
                self.handle = Some(handle);
                handle
            }
        };
        match attributes.value_mut(handle) {
            Some(AttributeValue::Rtcp(rtcp)) => Some(rtcp),
            _ => None,
        }
    }

    pub fn is_present(&self, attributes: &AttributeCollection) -> bool {
        self.value(attributes).is_some()
    }

    pub fn port(&self, attributes: &AttributeCollection) -> Option<u16> {
        self.value(attributes).map(|r| r.port)
    }

    pub fn set_port(&mut self, attributes: &mut AttributeCollection, port: u16) {
        if let Some(rtcp) = self.value_mut(attributes) {
            rtcp.port = port;
        }
    }

    pub fn connection_address<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a str> {
        self.value(attributes)
            .and_then(|r| r.address.as_ref())
            .map(|a| a.address.as_str())
    }

    /// Sets `IN IP4 <address>`; a new attribute starts with port 0.
    pub fn set_connection_address(&mut self, attributes: &mut AttributeCollection, address: &str) {
        if let Some(rtcp) = self.value_mut(attributes) {
            match rtcp.address.as_mut() {
                Some(existing) => existing.address = address.to_string(),
                None => rtcp.address = Some(RtcpAddress::ip4(address)),
            }
        }
    }

    pub fn remove(&mut self, attributes: &mut AttributeCollection) {
        if let Some(handle) = self.handle.take() {
            attributes.remove(handle);
        }
    }
}

/// Presence of `a=rtcp-mux`
#[derive(Debug, Clone, Default)]
pub struct RtcpMux {
    handle: Option<AttributeHandle>,
}

impl RtcpMux {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        Ok(Self {
            handle: at_most_one(attributes, &["rtcp-mux"])?,
        })
    }

    pub fn get(&self, attributes: &AttributeCollection) -> bool {
        self.handle.is_some_and(|h| attributes.contains(h))
    }

    pub fn set(&mut self, attributes: &mut AttributeCollection, enabled: bool) {
        match (live(&mut self.handle, attributes), enabled) {
            (None, true) => {
                self.handle = Some(attributes.append(Attribute::new("rtcp-mux", AttributeValue::RtcpMux)));
            }
            (Some(handle), false) => {
                attributes.remove(handle);
                self.handle = None;
            }
            _ => {}
        }
    }
}
