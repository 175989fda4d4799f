use super::MediaCapability;
use crate::error::{MediaPointError, PointControllerError};
use crate::transport::{DtmfSender, MediaDestination, TranscodingContext};
use std::sync::Arc;
use tracing::debug;

/// Touch-tone symbols: digits, `*`, `#` and `A` to `D`
pub fn is_valid_dtmf(digits: &str) -> bool {
    !digits.is_empty()
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '*' | '#' | 'A' | 'B' | 'C' | 'D'))
}

/// Inband DTMF generator spliced in front of the frontend's destination:
///
/// ```text
/// upstream -> dtmf.sink [dtmf sender] dtmf.src -> frontend.sink
/// ```
#[derive(Debug)]
pub struct DtmfCapability {
    sender: Arc<dyn DtmfSender>,
}

impl DtmfCapability {
    pub fn new(sender: Arc<dyn DtmfSender>) -> Self {
        Self { sender }
    }
}

impl MediaCapability for DtmfCapability {
    fn name(&self) -> &'static str {
        "dtmf"
    }

    fn start(&mut self) {
        self.sender.start();
    }

    fn attach(
        &mut self,
        context: &dyn TranscodingContext,
        destination: MediaDestination,
    ) -> Result<MediaDestination, MediaPointError> {
        context.add(self.sender.element());
        if let Err(err) = context.link(&self.sender.source(), &destination) {
            context.remove(self.sender.element());
            return Err(err.into());
        }
        Ok(self.sender.destination())
    }

    fn detach(&mut self, context: &dyn TranscodingContext) {
        context.remove(self.sender.element());
    }

    fn send_dtmf(&mut self, digits: &str) -> Option<Result<(), PointControllerError>> {
        if !is_valid_dtmf(digits) {
            return Some(Err(PointControllerError::InvalidDtmf(digits.to_string())));
        }
        debug!("Sending DTMF {:?} through {}", digits, self.sender.element());
        Some(self.sender.send_dtmf(digits).map_err(Into::into))
    }

    fn stop(&mut self) {
        self.sender.stop();
    }
}
