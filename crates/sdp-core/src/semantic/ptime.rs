use super::{at_most_one, live};
use crate::error::Result;
use crate::raw::attributes::PacketTime;
use crate::raw::{Attribute, AttributeCollection, AttributeHandle, AttributeValue};

/// `a=ptime`, in milliseconds
#[derive(Debug, Clone, Default)]
pub struct Ptime {
    handle: Option<AttributeHandle>,
}

impl Ptime {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        Ok(Self {
            handle: at_most_one(attributes, &["ptime"])?,
        })
    }

    pub fn get(&self, attributes: &AttributeCollection) -> Option<u32> {
        match attributes.value(self.handle?)? {
            AttributeValue::Ptime(PacketTime(ms)) => Some(*ms),
            _ => None,
        }
    }

    pub fn set(&mut self, attributes: &mut AttributeCollection, packet_time: Option<u32>) {
        match (live(&mut self.handle, attributes), packet_time) {
            (Some(handle), Some(ms)) => {
                if let Some(attribute) = attributes.get_mut(handle) {
                    attribute.set_value(AttributeValue::Ptime(PacketTime(ms)));
                }
            }
            (Some(handle), None) => {
                attributes.remove(handle);
                self.handle = None;
            }
            (None, Some(ms)) => {
                let attribute = Attribute::new("ptime", AttributeValue::Ptime(PacketTime(ms)));
                self.handle = Some(attributes.append(attribute));
            }
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ptime() {
        let mut attrs = AttributeCollection::new();
        let mut ptime = Ptime::from_attributes(&attrs).unwrap();
        ptime.set(&mut attrs, Some(20));
        assert_eq!(attrs.to_str_list(), vec!["ptime:20"]);
        assert_eq!(ptime.get(&attrs), Some(20));
        ptime.set(&mut attrs, None);
        assert!(attrs.is_empty());
    }
}
