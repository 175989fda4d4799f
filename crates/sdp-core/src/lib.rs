//! # SDP-Core: Session Description Protocol Engine
//!
//! Parsing, typed modelling, serialization and offer/answer negotiation of
//! SDP documents (RFC 4566 and the attribute RFCs used by WebRTC style
//! endpoints).
//!
//! ## Layers
//!
//! - [`raw`]: line parser, field entities and the ordered attribute arena.
//!   Unknown attributes are kept verbatim.
//! - [`semantic`]: wrappers enforcing "at most one" per attribute kind with
//!   typed getters and setters (direction, ICE, crypto, rtcp, mid, ptime,
//!   silenceSupp, group, ssrc streams).
//! - [`codec`]: codec identity, the RFC 3551 static table and dynamic payload
//!   type allocation.
//! - [`SessionDescription`] / [`MediaDescription`]: the facade used by call
//!   control.
//! - [`factory`]: offers from a capability set and answer negotiation.
//!
//! ## Usage
//!
//! ```rust
//! use mediactl_sdp_core::{Cc, Codec, Vv, factory};
//! use serde_json::json;
//!
//! let cc = Cc::from_json(&json!({"audio": ["PCMA/8000", "opus/48000/2"]}))?;
//! let supported = [Codec::audio("PCMA", 8000, 1), Codec::audio("opus", 48000, 2)];
//! let offer = factory::create_offer(&cc, Vv::new(true, false), &supported)?;
//! assert_eq!(offer.audio().map(|a| a.raw().formats.clone()), Some(vec![8, 96]));
//! # Ok::<(), mediactl_sdp_core::Error>(())
//! ```

pub mod capabilities;
pub mod codec;
pub mod error;
pub mod factory;
pub mod media_description;
pub mod media_type;
pub mod raw;
pub mod semantic;
pub mod session_description;

pub use capabilities::{Cc, Vv};
pub use codec::{Codec, PayloadTypePolicy, RtpCodec};
pub use error::{Error, Result};
pub use factory::NegotiatedMedia;
pub use media_description::{MediaDescription, MediaDescriptionMut};
pub use media_type::MediaType;
pub use raw::attributes::{GroupSemantics, SdpDirection};
pub use raw::{Proto, Sdp};
pub use session_description::SessionDescription;
