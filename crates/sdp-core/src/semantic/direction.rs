use super::{at_most_one, live};
use crate::error::Result;
use crate::raw::attributes::SdpDirection;
use crate::raw::{Attribute, AttributeCollection, AttributeHandle};

/// `sendrecv` / `sendonly` / `recvonly` / `inactive` of one media
#[derive(Debug, Clone, Default)]
pub struct Direction {
    handle: Option<AttributeHandle>,
}

impl Direction {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        Ok(Self {
            handle: at_most_one(attributes, &SdpDirection::ATTRIBUTE_NAMES)?,
        })
    }

    /// `sendrecv` when no direction attribute is present
    pub fn get(&self, attributes: &AttributeCollection) -> SdpDirection {
        self.handle
            .and_then(|h| attributes.get(h))
            .and_then(|a| a.name().parse().ok())
            .unwrap_or_default()
    }

    /// Replace the direction attribute in place, or append one.
    pub fn set(&mut self, attributes: &mut AttributeCollection, direction: SdpDirection) -> Result<()> {
        let attribute = Attribute::flag(direction.attribute_name());
        let handle = match live(&mut self.handle, attributes) {
            Some(old) => {
                let new = attributes.insert_after(attribute, old)?;
                attributes.remove(old);
                new
            }
            None => attributes.append(attribute),
        };
        self.handle = Some(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(lines: &[&str]) -> AttributeCollection {
        lines.iter().map(|l| l.parse::<Attribute>().unwrap()).collect()
    }

    #[test]
    fn test_default_is_sendrecv() {
        let attrs = collection(&["rtcp-mux"]);
        let direction = Direction::from_attributes(&attrs).unwrap();
        assert_eq!(direction.get(&attrs), SdpDirection::SendRecv);
    }

    #[test]
    fn test_recvonly_is_not_sendonly() {
        let attrs = collection(&["recvonly"]);
        let direction = Direction::from_attributes(&attrs).unwrap();
        assert_eq!(direction.get(&attrs), SdpDirection::RecvOnly);
    }

    #[test]
    fn test_two_directions_fail() {
        let attrs = collection(&["sendonly", "inactive"]);
        assert!(Direction::from_attributes(&attrs).is_err());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut attrs = collection(&["mid:audio", "sendrecv", "rtcp-mux"]);
        let mut direction = Direction::from_attributes(&attrs).unwrap();
        direction.set(&mut attrs, SdpDirection::RecvOnly).unwrap();
        assert_eq!(attrs.to_str_list(), vec!["mid:audio", "recvonly", "rtcp-mux"]);
        assert_eq!(direction.get(&attrs), SdpDirection::RecvOnly);

        let mut empty = AttributeCollection::new();
        let mut direction = Direction::from_attributes(&empty).unwrap();
        direction.set(&mut empty, SdpDirection::Inactive).unwrap();
        assert_eq!(empty.to_str_list(), vec!["inactive"]);
    }
}
