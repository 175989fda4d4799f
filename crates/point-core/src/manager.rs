//! Registry of point controllers and rooms.
//!
//! The manager is owned by the dispatcher task, so none of its maps are
//! locked. A room exists exactly while at least one point is joined to it.

use crate::config::Profile;
use crate::controller::{PointController, PointEvent, PointState};
use crate::environment::MediaEnvironment;
use crate::error::{ManagerError, ProfileError, Result};
use crate::media_point::FrontendReady;
use crate::messaging::{Message, Outbox};
use crate::room::Room;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Manager {
    env: MediaEnvironment,
    points: HashMap<String, PointController>,
    rooms: HashMap<String, Room>,
}

impl Manager {
    pub fn new(env: MediaEnvironment) -> Self {
        Self {
            env,
            points: HashMap::new(),
            rooms: HashMap::new(),
        }
    }

    pub fn env(&self) -> &MediaEnvironment {
        &self.env
    }

    pub fn get_point(&self, point_id: &str) -> Option<&PointController> {
        self.points.get(point_id)
    }

    pub fn get_point_mut(&mut self, point_id: &str) -> Option<&mut PointController> {
        self.points.get_mut(point_id)
    }

    pub fn points_count(&self) -> usize {
        self.points.len()
    }

    pub fn get_room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn rooms_count(&self) -> usize {
        self.rooms.len()
    }

    /// Room the point is joined to
    pub fn room_for_point(&self, point_id: &str) -> Option<&Room> {
        let room_id = self.points.get(point_id)?.room_id()?;
        self.rooms.get(room_id)
    }

    /// Register a controller in `START` for `initiator`
    pub fn create_point(
        &mut self,
        point_id: &str,
        initiator: Message,
    ) -> std::result::Result<&mut PointController, ManagerError> {
        if self.points.contains_key(point_id) {
            return Err(ManagerError::PointExists(point_id.to_string()));
        }
        info!("Creating point {:?}", point_id);
        let controller = PointController::new(point_id, initiator, self.env.clone());
        Ok(self.points.entry(point_id.to_string()).or_insert(controller))
    }

    /// Look up `profile_name` and feed `CREATE_OFFER` to the point
    pub fn create_offer(
        &mut self,
        point_id: &str,
        cc: Value,
        vv: Value,
        profile_name: &str,
        outbox: &mut Outbox,
    ) -> Result<()> {
        let profile: std::result::Result<Profile, ProfileError> = self
            .env
            .config
            .profile(profile_name)
            .cloned()
            .ok_or_else(|| ProfileError::UnknownProfile(profile_name.to_string()));
        self.dispatch(point_id, PointEvent::CreateOffer { cc, vv, profile }, outbox)
    }

    /// Feed one event to a point
    pub fn dispatch(&mut self, point_id: &str, event: PointEvent, outbox: &mut Outbox) -> Result<()> {
        let controller = self
            .points
            .get_mut(point_id)
            .ok_or_else(|| ManagerError::PointNotFound(point_id.to_string()))?;
        let result = controller.handle(event, outbox);
        self.settle(point_id);
        result
    }

    /// Route a frontend allocation result to its point, or clean it up
    pub fn on_frontend_ready(&mut self, ready: FrontendReady, outbox: &mut Outbox) -> Result<()> {
        let point_id = ready.point_id.clone();
        let Some(controller) = self.points.get_mut(&point_id) else {
            debug!("Frontend result for removed point {}", point_id);
            ready.discard(&self.env.allocator);
            return Ok(());
        };
        let result = controller.on_frontend_ready(ready, outbox);
        self.settle(&point_id);
        result
    }

    /// Unjoin, tear down and forget a point
    pub fn remove_point(&mut self, point_id: &str, outbox: &mut Outbox) -> Result<()> {
        let mut controller = self
            .points
            .remove(point_id)
            .ok_or_else(|| ManagerError::PointNotFound(point_id.to_string()))?;
        debug!("Removing point {}", point_id);

        detach(&mut self.rooms, &mut controller);
        if !controller.state().is_terminal() {
            controller.handle(PointEvent::Remove, outbox)?;
        }
        Ok(())
    }

    /// Join `room_id`, leaving the current room first if it is another one
    pub fn join_room(&mut self, point_id: &str, room_id: &str) -> Result<()> {
        let controller = self
            .points
            .get_mut(point_id)
            .ok_or_else(|| ManagerError::PointNotFound(point_id.to_string()))?;

        if controller.room_id() == Some(room_id) {
            return Err(ManagerError::AlreadyInRoom {
                point_id: point_id.to_string(),
                room_id: room_id.to_string(),
            }
            .into());
        }

        let point = controller
            .point()
            .filter(|point| !point.media_types().is_empty())
            .ok_or_else(|| ManagerError::PointNotReady(point_id.to_string()))?;
        if let Some(room) = self.rooms.get(room_id) {
            room.check_join(point)?;
        }

        if controller.room_id().is_some() {
            debug!("Point {} moves to room {}", point_id, room_id);
            detach(&mut self.rooms, controller);
        }

        let room = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Room::new(room_id, self.env.factory.clone()));
        let joined = match controller.point_mut() {
            Some(point) => room.join(point),
            None => Ok(()),
        };
        if let Err(err) = joined {
            if room.points_count() == 0 {
                room.stop();
                self.rooms.remove(room_id);
            }
            return Err(err);
        }
        controller.set_room_id(Some(room_id.to_string()));
        debug!("Room[{}]: joined point {}", room_id, point_id);
        Ok(())
    }

    pub fn unjoin(&mut self, point_id: &str) -> Result<()> {
        let controller = self
            .points
            .get_mut(point_id)
            .ok_or_else(|| ManagerError::PointNotFound(point_id.to_string()))?;
        if controller.room_id().is_none() {
            return Err(ManagerError::NotInRoom(point_id.to_string()).into());
        }
        detach(&mut self.rooms, controller);
        Ok(())
    }

    pub fn on_timer(&mut self, outbox: &mut Outbox) {
        let ids: Vec<String> = self.points.keys().cloned().collect();
        for point_id in ids {
            if let Err(err) = self.dispatch(&point_id, PointEvent::Timer, outbox) {
                debug!("Timer on point {}: {}", point_id, err);
            }
        }
    }

    /// Tear down every point and room
    pub fn shutdown(&mut self, outbox: &mut Outbox) {
        let ids: Vec<String> = self.points.keys().cloned().collect();
        for point_id in ids {
            if let Err(err) = self.remove_point(&point_id, outbox) {
                debug!("Shutdown of point {}: {}", point_id, err);
            }
        }
        for (_, mut room) in self.rooms.drain() {
            room.stop();
        }
    }

    /// Points that reached `ERROR` leave their room
    fn settle(&mut self, point_id: &str) {
        if let Some(controller) = self.points.get_mut(point_id) {
            if controller.state() == PointState::Error && controller.room_id().is_some() {
                detach(&mut self.rooms, controller);
            }
        }
    }
}

/// Take `controller` out of its room and drop the room once empty
fn detach(rooms: &mut HashMap<String, Room>, controller: &mut PointController) {
    let Some(room_id) = controller.room_id().map(str::to_string) else {
        return;
    };
    controller.set_room_id(None);

    let Some(room) = rooms.get_mut(&room_id) else {
        return;
    };
    debug!("Room[{}]: unjoin point {}", room_id, controller.point_id());
    let point_id = controller.point_id().to_string();
    room.unjoin(&point_id, controller.point_mut());

    if room.points_count() == 0 {
        debug!("Removing room {}", room_id);
        room.stop();
        rooms.remove(&room_id);
    }
}
