//! In-process transport that performs no media work.
//!
//! Every call is appended to a shared [`TransportLog`], which makes the
//! recording transport useful for tests and for running the controller as a
//! pure signaling component. Frontends bind whatever ports the allocator
//! proposes unless a port was marked busy.

use super::{
    DtmfSender, FrontendRequest, KeyExchangeAgent, KeyExchangeStream, MediaDestination, MediaSource, RtpFrontend,
    TranscodingContext, TranscodingFactory, TransportResult,
};
use crate::config::Profile;
use crate::error::TransportError;
use async_trait::async_trait;
use mediactl_sdp_core::{Codec, MediaType, RtpCodec};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// One recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    CreateFrontend { element: String, interface: String, rtp_port: u16, rtcp_port: u16 },
    CreateSender { element: String, codecs: Vec<String>, host: String, rtp_port: u16, rtcp_port: u16 },
    CreateReceiver { element: String, codecs: Vec<String> },
    ForceKeyUnit { element: String },
    StopFrontend { element: String },
    DisposeFrontend { element: String },
    CreateContext { context: String },
    Add { context: String, element: String },
    Remove { context: String, element: String },
    Link { context: String, source: String, destination: String },
    Play { context: String },
    StopContext { context: String },
    CreateDtmfSender { element: String },
    StartDtmfSender { element: String },
    StopDtmfSender { element: String },
    SendDtmf { element: String, digits: String },
    OpenRelay { point_id: String, media_type: MediaType, port: u16 },
    StartStream(KeyExchangeStream),
    Withdraw { point_id: String, media_type: MediaType },
}

/// Shared, append-only call log
#[derive(Debug, Clone, Default)]
pub struct TransportLog {
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

impl TransportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: TransportCall) {
        trace!("transport: {:?}", call);
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }

    /// Calls matching `predicate`, in order
    pub fn filter(&self, predicate: impl Fn(&TransportCall) -> bool) -> Vec<TransportCall> {
        self.calls.lock().iter().filter(|call| predicate(call)).cloned().collect()
    }

    pub fn count(&self, predicate: impl Fn(&TransportCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

fn codec_names(codecs: &[RtpCodec]) -> Vec<String> {
    codecs.iter().map(|codec| codec.to_string()).collect()
}

#[derive(Debug)]
struct RecordingFrontend {
    element: String,
    media_type: MediaType,
    rtp_port: u16,
    rtcp_port: u16,
    ssrc: u32,
    log: TransportLog,
}

impl RtpFrontend for RecordingFrontend {
    fn element(&self) -> &str {
        &self.element
    }

    fn media_type(&self) -> MediaType {
        self.media_type
    }

    fn rtp_port(&self) -> u16 {
        self.rtp_port
    }

    fn rtcp_port(&self) -> u16 {
        self.rtcp_port
    }

    fn ssrc(&self) -> u32 {
        self.ssrc
    }

    fn source(&self) -> MediaSource {
        MediaSource::new(format!("{}.src", self.element))
    }

    fn destination(&self) -> MediaDestination {
        MediaDestination::new(format!("{}.sink", self.element))
    }

    fn create_sender(&self, codecs: &[RtpCodec], host: &str, rtp_port: u16, rtcp_port: u16) -> TransportResult<()> {
        self.log.record(TransportCall::CreateSender {
            element: self.element.clone(),
            codecs: codec_names(codecs),
            host: host.to_string(),
            rtp_port,
            rtcp_port,
        });
        Ok(())
    }

    fn create_receiver(&self, codecs: &[RtpCodec]) -> TransportResult<()> {
        self.log.record(TransportCall::CreateReceiver {
            element: self.element.clone(),
            codecs: codec_names(codecs),
        });
        Ok(())
    }

    fn force_key_unit(&self) {
        self.log.record(TransportCall::ForceKeyUnit { element: self.element.clone() });
    }

    fn stop(&self) {
        self.log.record(TransportCall::StopFrontend { element: self.element.clone() });
    }

    fn dispose(&self) {
        self.log.record(TransportCall::DisposeFrontend { element: self.element.clone() });
    }
}

#[derive(Debug)]
struct RecordingContext {
    name: String,
    media_type: MediaType,
    log: TransportLog,
}

impl TranscodingContext for RecordingContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> MediaType {
        self.media_type
    }

    fn add(&self, element: &str) {
        self.log.record(TransportCall::Add {
            context: self.name.clone(),
            element: element.to_string(),
        });
    }

    fn remove(&self, element: &str) {
        self.log.record(TransportCall::Remove {
            context: self.name.clone(),
            element: element.to_string(),
        });
    }

    fn link(&self, source: &MediaSource, destination: &MediaDestination) -> TransportResult<()> {
        self.log.record(TransportCall::Link {
            context: self.name.clone(),
            source: source.to_string(),
            destination: destination.to_string(),
        });
        Ok(())
    }

    fn play(&self) {
        self.log.record(TransportCall::Play { context: self.name.clone() });
    }

    fn stop(&self) {
        self.log.record(TransportCall::StopContext { context: self.name.clone() });
    }
}

#[derive(Debug)]
struct RecordingDtmfSender {
    element: String,
    log: TransportLog,
}

impl DtmfSender for RecordingDtmfSender {
    fn element(&self) -> &str {
        &self.element
    }

    fn source(&self) -> MediaSource {
        MediaSource::new(format!("{}.src", self.element))
    }

    fn destination(&self) -> MediaDestination {
        MediaDestination::new(format!("{}.sink", self.element))
    }

    fn start(&self) {
        self.log.record(TransportCall::StartDtmfSender { element: self.element.clone() });
    }

    fn stop(&self) {
        self.log.record(TransportCall::StopDtmfSender { element: self.element.clone() });
    }

    fn send_dtmf(&self, digits: &str) -> TransportResult<()> {
        self.log.record(TransportCall::SendDtmf {
            element: self.element.clone(),
            digits: digits.to_string(),
        });
        Ok(())
    }
}

/// Transcoding factory that records calls instead of building pipelines
#[derive(Debug)]
pub struct RecordingTranscodingFactory {
    log: TransportLog,
    supported: Vec<Codec>,
    busy_ports: Mutex<HashSet<u16>>,
    failing_media: Mutex<HashSet<MediaType>>,
    next_id: AtomicU32,
}

impl RecordingTranscodingFactory {
    pub fn new(log: TransportLog) -> Self {
        Self::with_codecs(log, default_supported_codecs())
    }

    pub fn with_codecs(log: TransportLog, supported: Vec<Codec>) -> Self {
        Self {
            log,
            supported,
            busy_ports: Mutex::new(HashSet::new()),
            failing_media: Mutex::new(HashSet::new()),
            next_id: AtomicU32::new(1),
        }
    }

    pub fn log(&self) -> &TransportLog {
        &self.log
    }

    /// Refuse to bind pairs whose rtp port is `rtp_port`
    pub fn mark_busy(&self, rtp_port: u16) {
        self.busy_ports.lock().insert(rtp_port);
    }

    /// Make every frontend of `media_type` fail with a transport error
    pub fn fail_media(&self, media_type: MediaType) {
        self.failing_media.lock().insert(media_type);
    }
}

/// Codecs a typical gateway pipeline handles
pub fn default_supported_codecs() -> Vec<Codec> {
    vec![
        Codec::audio("PCMU", 8000, 1),
        Codec::audio("PCMA", 8000, 1),
        Codec::audio("opus", 48000, 2),
        Codec::audio("G722", 8000, 1),
        Codec::audio("telephone-event", 8000, 1),
        Codec::video("VP8", 90000),
        Codec::video("H264", 90000),
        Codec::video("H263-1998", 90000),
    ]
}

#[async_trait]
impl TranscodingFactory for RecordingTranscodingFactory {
    fn supported_codecs(&self) -> Vec<Codec> {
        self.supported.clone()
    }

    async fn create_rtp_frontend(&self, request: FrontendRequest) -> TransportResult<Arc<dyn RtpFrontend>> {
        if self.failing_media.lock().contains(&request.media_type) {
            return Err(TransportError::failed(format!("cannot build {} frontend", request.media_type)));
        }
        if self.busy_ports.lock().contains(&request.rtp_port) {
            return Err(TransportError::PortInUse {
                interface: request.interface,
                rtp: request.rtp_port,
                rtcp: request.rtcp_port,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let element = format!("rtp-{}-{}", request.point_id, request.media_type);
        self.log.record(TransportCall::CreateFrontend {
            element: element.clone(),
            interface: request.interface.clone(),
            rtp_port: request.rtp_port,
            rtcp_port: request.rtcp_port,
        });
        Ok(Arc::new(RecordingFrontend {
            element,
            media_type: request.media_type,
            rtp_port: request.rtp_port,
            rtcp_port: request.rtcp_port,
            ssrc: 0x1000_0000 + id,
            log: self.log.clone(),
        }))
    }

    fn create_context(&self, media_type: MediaType) -> Arc<dyn TranscodingContext> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-context-{}", media_type, id);
        self.log.record(TransportCall::CreateContext { context: name.clone() });
        Arc::new(RecordingContext {
            name,
            media_type,
            log: self.log.clone(),
        })
    }

    fn create_dtmf_sender(&self, point_id: &str) -> TransportResult<Arc<dyn DtmfSender>> {
        let element = format!("dtmf-{}", point_id);
        self.log.record(TransportCall::CreateDtmfSender { element: element.clone() });
        Ok(Arc::new(RecordingDtmfSender {
            element,
            log: self.log.clone(),
        }))
    }
}

/// Key exchange agent that hands out relay ports from a counter
#[derive(Debug)]
pub struct RecordingKeyExchangeAgent {
    log: TransportLog,
    next_port: AtomicU32,
}

impl RecordingKeyExchangeAgent {
    pub fn new(log: TransportLog, first_port: u16) -> Self {
        Self {
            log,
            next_port: AtomicU32::new(u32::from(first_port)),
        }
    }
}

#[async_trait]
impl KeyExchangeAgent for RecordingKeyExchangeAgent {
    async fn open_relay(&self, point_id: &str, media_type: MediaType, _profile: &Profile) -> TransportResult<u16> {
        let port = self.next_port.fetch_add(2, Ordering::Relaxed);
        let port = u16::try_from(port).map_err(|_| TransportError::failed("relay ports exhausted"))?;
        self.log.record(TransportCall::OpenRelay {
            point_id: point_id.to_string(),
            media_type,
            port,
        });
        Ok(port)
    }

    fn start_stream(&self, stream: KeyExchangeStream) -> TransportResult<()> {
        self.log.record(TransportCall::StartStream(stream));
        Ok(())
    }

    fn withdraw(&self, point_id: &str, media_type: MediaType) {
        self.log.record(TransportCall::Withdraw {
            point_id: point_id.to_string(),
            media_type,
        });
    }
}
