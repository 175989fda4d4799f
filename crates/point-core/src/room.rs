//! Rooms bridge the media of the points joined to them.
//!
//! A [`Room`] keeps one [`MediaRoom`] per media type, created when the first
//! point with that media joins. A media room holds at most two legs and links
//! them both ways once the second one arrives.

use crate::error::{ManagerError, MediaPointError, Result};
use crate::media_point::{MediaLeg, MediaPoint};
use crate::point::Point;
use crate::transport::{TranscodingContext, TranscodingFactory};
use mediactl_sdp_core::MediaType;
use std::sync::Arc;
use tracing::{debug, warn};

/// Two party bridge for one media type
#[derive(Debug)]
pub struct MediaRoom {
    media_type: MediaType,
    context: Arc<dyn TranscodingContext>,
    legs: Vec<MediaLeg>,
}

impl MediaRoom {
    pub const CAPACITY: usize = 2;

    pub fn new(media_type: MediaType, factory: &dyn TranscodingFactory) -> Self {
        Self {
            media_type,
            context: factory.create_context(media_type),
            legs: Vec::with_capacity(Self::CAPACITY),
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn context(&self) -> &Arc<dyn TranscodingContext> {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn contains(&self, point_id: &str) -> bool {
        self.legs.iter().any(|leg| leg.point_id == point_id)
    }

    /// Whether `point_id` could join without exceeding the capacity
    pub fn has_room_for(&self, point_id: &str) -> bool {
        self.contains(point_id) || self.legs.len() < Self::CAPACITY
    }

    pub fn join(&mut self, media_point: &mut MediaPoint) -> Result<()> {
        if self.contains(media_point.point_id()) {
            return Ok(());
        }
        if self.legs.len() >= Self::CAPACITY {
            return Err(ManagerError::MediaRoomFull(self.media_type).into());
        }

        debug!("MediaRoom[{}]: add point {}", self.media_type, media_point.point_id());
        let leg = media_point.join_context(self.context.clone())?;
        self.legs.push(leg);

        if let [a, b] = self.legs.as_slice() {
            let linked = self
                .context
                .link(&a.source, &b.destination)
                .and_then(|()| self.context.link(&b.source, &a.destination));
            if let Err(err) = linked {
                self.legs.pop();
                media_point.leave_context();
                return Err(MediaPointError::from(err).into());
            }
            debug!("MediaRoom[{}]: starting pipeline", self.media_type);
            self.context.play();
            a.frontend.force_key_unit();
            b.frontend.force_key_unit();
        }
        Ok(())
    }

    /// Drop the leg of `point_id`; returns whether it was there.
    pub fn unjoin(&mut self, point_id: &str) -> bool {
        let Some(index) = self.legs.iter().position(|leg| leg.point_id == point_id) else {
            return false;
        };
        if self.legs.len() == Self::CAPACITY {
            debug!("MediaRoom[{}]: stopping pipeline", self.media_type);
            self.context.stop();
        }
        debug!("MediaRoom[{}]: remove point {}", self.media_type, point_id);
        self.legs.remove(index);
        true
    }

    pub fn stop(&mut self) {
        if self.legs.len() == Self::CAPACITY {
            self.context.stop();
        }
        self.legs.clear();
    }
}

/// A named group of points whose media are bridged together
#[derive(Debug)]
pub struct Room {
    room_id: String,
    factory: Arc<dyn TranscodingFactory>,
    points: Vec<String>,
    audio: Option<MediaRoom>,
    video: Option<MediaRoom>,
}

impl Room {
    pub fn new(room_id: impl Into<String>, factory: Arc<dyn TranscodingFactory>) -> Self {
        Self {
            room_id: room_id.into(),
            factory,
            points: Vec::new(),
            audio: None,
            video: None,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn points_count(&self) -> usize {
        self.points.len()
    }

    pub fn point_ids(&self) -> &[String] {
        &self.points
    }

    pub fn contains(&self, point_id: &str) -> bool {
        self.points.iter().any(|id| id == point_id)
    }

    pub fn media_room(&self, media_type: MediaType) -> Option<&MediaRoom> {
        match media_type {
            MediaType::Audio => self.audio.as_ref(),
            MediaType::Video => self.video.as_ref(),
            MediaType::Application => None,
        }
    }

    fn media_room_slot(&mut self, media_type: MediaType) -> Option<&mut Option<MediaRoom>> {
        match media_type {
            MediaType::Audio => Some(&mut self.audio),
            MediaType::Video => Some(&mut self.video),
            MediaType::Application => None,
        }
    }

    /// Fail with `MediaRoomFull` if any media of `point` has no free leg
    pub fn check_join(&self, point: &Point) -> Result<()> {
        for media_type in point.media_types() {
            if let Some(media_room) = self.media_room(media_type) {
                if !media_room.has_room_for(point.point_id()) {
                    return Err(ManagerError::MediaRoomFull(media_type).into());
                }
            }
        }
        Ok(())
    }

    pub fn join(&mut self, point: &mut Point) -> Result<()> {
        if self.contains(point.point_id()) {
            warn!("Attempt to join room {} more than once", self.room_id);
            return Ok(());
        }
        self.check_join(point)?;

        let mut joined = Vec::new();
        let mut created = Vec::new();
        for media_type in point.media_types() {
            let factory = self.factory.clone();
            let Some(slot) = self.media_room_slot(media_type) else {
                continue;
            };
            if slot.is_none() {
                created.push(media_type);
            }
            let media_room = slot.get_or_insert_with(|| MediaRoom::new(media_type, factory.as_ref()));
            let Some(media_point) = point.media_point_mut(media_type) else {
                continue;
            };
            if let Err(err) = media_room.join(media_point) {
                warn!("Point {} cannot join room {}: {}", point.point_id(), self.room_id, err);
                self.rollback(point, &joined, &created);
                return Err(err);
            }
            joined.push(media_type);
        }

        self.points.push(point.point_id().to_string());
        Ok(())
    }

    /// Take `point` back out of the media rooms it joined before a failure
    fn rollback(&mut self, point: &mut Point, joined: &[MediaType], created: &[MediaType]) {
        let point_id = point.point_id().to_string();
        for &media_type in joined {
            if let Some(Some(media_room)) = self.media_room_slot(media_type) {
                media_room.unjoin(&point_id);
            }
            if let Some(media_point) = point.media_point_mut(media_type) {
                media_point.leave_context();
            }
        }
        for &media_type in created {
            if let Some(slot) = self.media_room_slot(media_type) {
                if slot.as_ref().is_some_and(MediaRoom::is_empty) {
                    *slot = None;
                }
            }
        }
    }

    /// Remove `point_id` from every media room. `point` is given when its
    /// media are still alive and must leave the pipelines.
    pub fn unjoin(&mut self, point_id: &str, point: Option<&mut Point>) {
        for media_room in [self.audio.as_mut(), self.video.as_mut()].into_iter().flatten() {
            media_room.unjoin(point_id);
        }
        if let Some(point) = point {
            for media_type in [MediaType::Audio, MediaType::Video] {
                if let Some(media_point) = point.media_point_mut(media_type) {
                    media_point.leave_context();
                }
            }
        }
        self.points.retain(|id| id != point_id);
    }

    pub fn stop(&mut self) {
        for media_room in [self.audio.as_mut(), self.video.as_mut()].into_iter().flatten() {
            media_room.stop();
        }
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::recording::{RecordingTranscodingFactory, TransportCall, TransportLog};
    use crate::transport::FrontendRequest;

    async fn media_point(
        factory: &RecordingTranscodingFactory,
        point_id: &str,
        port: u16,
    ) -> (MediaPoint, crate::media_point::FrontendAllocation) {
        let frontend = factory
            .create_rtp_frontend(FrontendRequest {
                point_id: point_id.into(),
                media_type: MediaType::Audio,
                interface: "0.0.0.0".into(),
                rtp_port: port,
                rtcp_port: port + 1,
            })
            .await
            .unwrap();
        let profile = crate::config::Profile::parse("10.0.0.1:*", "10.0.0.1").unwrap();
        let media_point = MediaPoint::new(
            point_id,
            MediaType::Audio,
            profile,
            None,
            Arc::new(crate::ports::PortAllocator::new()),
        );
        (
            media_point,
            crate::media_point::FrontendAllocation {
                frontend,
                relay_port: None,
            },
        )
    }

    async fn bound(factory: &RecordingTranscodingFactory, point_id: &str, port: u16) -> MediaPoint {
        let (mut media_point, allocation) = media_point(factory, point_id, port).await;
        let mut sdp = mediactl_sdp_core::SessionDescription::new();
        sdp.add_raw_media(mediactl_sdp_core::raw::Media::new(MediaType::Audio)).unwrap();
        let mut local = sdp.audio_mut().unwrap();
        media_point.on_frontend_ready(allocation, &mut local).unwrap();
        media_point
    }

    #[tokio::test]
    async fn test_media_room_bridges_two_legs() {
        let log = TransportLog::new();
        let factory = RecordingTranscodingFactory::new(log.clone());
        let mut room = MediaRoom::new(MediaType::Audio, &factory);
        let mut a = bound(&factory, "a", 40000).await;
        let mut b = bound(&factory, "b", 40002).await;
        let mut c = bound(&factory, "c", 40004).await;

        room.join(&mut a).unwrap();
        assert_eq!(log.count(|call| matches!(call, TransportCall::Play { .. })), 0);
        room.join(&mut a).unwrap();
        assert_eq!(room.len(), 1);

        room.join(&mut b).unwrap();
        assert_eq!(log.count(|call| matches!(call, TransportCall::Link { .. })), 2);
        assert_eq!(log.count(|call| matches!(call, TransportCall::Play { .. })), 1);
        assert_eq!(log.count(|call| matches!(call, TransportCall::ForceKeyUnit { .. })), 2);

        let err = room.join(&mut c).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Manager(ManagerError::MediaRoomFull(MediaType::Audio))
        ));

        assert!(room.unjoin("a"));
        assert!(!room.unjoin("a"));
        assert_eq!(log.count(|call| matches!(call, TransportCall::StopContext { .. })), 1);
        room.join(&mut c).unwrap();
        assert_eq!(room.len(), 2);
    }

    /// Start a point with `medias`, binding frontends only for `bound`
    async fn started_point(
        env: &crate::environment::MediaEnvironment,
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<crate::media_point::FrontendReady>,
        point_id: &str,
        medias: &[MediaType],
        bound: &[MediaType],
    ) -> Point {
        let mut sdp = mediactl_sdp_core::SessionDescription::new();
        for &media_type in medias {
            sdp.add_raw_media(mediactl_sdp_core::raw::Media::new(media_type)).unwrap();
        }
        let profile = crate::config::Profile::new(
            "192.0.2.1",
            crate::config::PortRange::new(40000, 40100).unwrap(),
            "0.0.0.0",
        );
        let mut point = Point::new(point_id, sdp, profile, env.clone());
        point.start();
        for _ in medias {
            let ready = rx.recv().await.unwrap();
            if bound.contains(&ready.media_type) {
                point.on_frontend_ready(ready);
            } else {
                ready.discard(&env.allocator);
            }
        }
        point
    }

    #[tokio::test]
    async fn test_failed_join_leaves_room_untouched() {
        let log = TransportLog::new();
        let factory = Arc::new(RecordingTranscodingFactory::new(log.clone()));
        let (env, mut rx) =
            crate::environment::MediaEnvironment::new(crate::config::ControllerConfig::default(), factory.clone());
        let mut a = started_point(&env, &mut rx, "a", &[MediaType::Audio], &[MediaType::Audio]).await;
        let mut b = started_point(
            &env,
            &mut rx,
            "b",
            &[MediaType::Audio, MediaType::Video],
            &[MediaType::Audio],
        )
        .await;

        let mut room = Room::new("r1", factory);
        room.join(&mut a).unwrap();

        // Audio of "b" bridges, then its unbound video fails the join.
        assert!(room.join(&mut b).is_err());
        assert_eq!(log.count(|call| matches!(call, TransportCall::Play { .. })), 1);
        assert_eq!(log.count(|call| matches!(call, TransportCall::StopContext { .. })), 1);

        assert_eq!(room.points_count(), 1);
        assert!(!room.contains("b"));
        let audio = room.media_room(MediaType::Audio).unwrap();
        assert_eq!(audio.len(), 1);
        assert!(audio.contains("a"));
        assert!(!audio.contains("b"));
        assert!(room.media_room(MediaType::Video).is_none());

        // A later join of another point still finds a free audio leg.
        let mut c = started_point(&env, &mut rx, "c", &[MediaType::Audio], &[MediaType::Audio]).await;
        room.join(&mut c).unwrap();
        assert_eq!(room.media_room(MediaType::Audio).unwrap().len(), 2);
    }
}
