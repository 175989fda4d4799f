//! Typed views over the attributes of one SDP scope.
//!
//! A wrapper scans its [`AttributeCollection`] once at construction, fails
//! with [`Error::Semantic`] when the document carries more than one
//! attribute of its kind, and from then on remembers the handle of the
//! attribute it manages. Reads and writes take the collection explicitly;
//! writing a value creates the attribute on demand and writing the "absent"
//! value removes it.

mod crypto;
mod direction;
mod group;
mod ice;
mod mid;
mod ptime;
mod rtcp;
mod silence_supp;
mod stream;

pub use crypto::CryptoWrapper;
pub use direction::Direction;
pub use group::{Group, generate_name};
pub use ice::Ice;
pub use mid::Mid;
pub use ptime::Ptime;
pub use rtcp::{RtcpMux, RtcpWrapper};
pub use silence_supp::SilenceSuppWrapper;
pub use stream::{Stream, StreamCollection};

use crate::error::{Error, Result};
use crate::raw::{AttributeCollection, AttributeHandle};
use rand::Rng;

/// The single attribute named one of `names`, if any
pub(crate) fn at_most_one(
    attributes: &AttributeCollection,
    names: &[&str],
) -> Result<Option<AttributeHandle>> {
    let found = attributes.find(names);
    match found.as_slice() {
        [] => Ok(None),
        [handle] => Ok(Some(*handle)),
        _ => Err(Error::semantic(format!(
            "more than one {} attribute: {}",
            names.join("/"),
            found.len()
        ))),
    }
}

/// Handle still alive in `attributes`, dropping it otherwise
pub(crate) fn live(
    handle: &mut Option<AttributeHandle>,
    attributes: &AttributeCollection,
) -> Option<AttributeHandle> {
    match *handle {
        Some(h) if attributes.contains(h) => Some(h),
        _ => {
            *handle = None;
            None
        }
    }
}

/// Random string of `len` characters drawn from `alphabet`
pub(crate) fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}
