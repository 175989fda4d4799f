//! # Point-Core: Call Points, Rooms and Media Bridging
//!
//! Drives media sessions from signaling messages. Each call endpoint is a
//! *point*: a local SDP offer built from the peer's capabilities, one RTP
//! frontend per offered media and, once the peer answers, a negotiated
//! sender/receiver pair. Points joined to the same *room* get their media
//! bridged both ways.
//!
//! ## Architecture
//!
//! ```text
//!  bus ──► MediaController task ──► Manager ──► PointController (FSM) ──► Point ──► MediaPoint(s)
//!               ▲    │                 │                                              │
//!               │    └── Outbox ──► MessageTransport                                  │ spawned
//!               │                      └──► Room ──► MediaRoom (2 legs)               │ allocation
//!               └──────────────── FrontendReady ◄─────────────────────────────────────┘
//! ```
//!
//! - [`dispatcher`]: the single task that owns all point and room state.
//! - [`manager`]: point and room registry, room migration rules.
//! - [`controller`]: the per point state machine.
//! - [`point`] / [`media_point`]: media of one point, with DTMF and SRTP key
//!   exchange capabilities.
//! - [`room`]: two party bridges per media type.
//! - [`transport`]: traits implemented by a media pipeline, plus an in-process
//!   recording implementation.
//! - [`config`], [`ports`], [`messaging`]: profiles, port allocation and the
//!   signaling message model.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mediactl_point_core::config::ControllerConfig;
//! use mediactl_point_core::dispatcher::MediaController;
//! use mediactl_point_core::environment::MediaEnvironment;
//! use mediactl_point_core::messaging::{ChannelTransport, Message, MessageType};
//! use mediactl_point_core::transport::recording::{RecordingTranscodingFactory, TransportLog};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn run() -> mediactl_point_core::Result<()> {
//! let factory = Arc::new(RecordingTranscodingFactory::new(TransportLog::new()));
//! let (env, ready) = MediaEnvironment::new(ControllerConfig::default(), factory);
//! let (transport, mut outgoing) = ChannelTransport::new();
//! let (controller, handle) = MediaController::new(env, ready, Arc::new(transport));
//! controller.spawn();
//!
//! handle.send_message(
//!     Message::new(MessageType::CreateMediaPoint)
//!         .with("pointId", "p1")
//!         .with("sender", "sip-gw")
//!         .with("cc", json!({"audio": ["PCMA/8000"]}))
//!         .with("vv", json!([true, false])),
//! )?;
//! let offer = outgoing.recv().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod environment;
pub mod error;
pub mod manager;
pub mod media_point;
pub mod messaging;
pub mod point;
pub mod ports;
pub mod room;
pub mod transport;

pub use config::{ControllerConfig, ControllerSettings, PortRange, Profile};
pub use controller::{PointController, PointEvent, PointState};
pub use dispatcher::{ControllerInput, MediaController, MediaControllerHandle};
pub use environment::MediaEnvironment;
pub use error::{Error, ManagerError, MediaPointError, PointControllerError, ProfileError, Result, TransportError};
pub use manager::Manager;
pub use messaging::{Message, MessageType, Outbox, Outgoing};
pub use point::{Point, Readiness};
pub use room::{MediaRoom, Room};
