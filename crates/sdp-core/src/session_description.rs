//! Session level facade over a raw [`Sdp`].
//!
//! [`SessionDescription`] keeps the raw document and the semantic wrappers of
//! every media in step. Structural changes go through it: adding a media
//! while a group is present assigns the media a `mid` and appends it to the
//! group, and enabling a group assigns `mid` values to every unlabeled media.

use crate::codec::PayloadTypePolicy;
use crate::error::{Error, Result};
use crate::media_description::{MediaDescription, MediaDescriptionMut, MediaSemantics};
use crate::media_type::MediaType;
use crate::raw::attributes::{Group as GroupValue, GroupSemantics};
use crate::raw::{ConnectionData, Media, Origin, Sdp};
use crate::semantic::{Group, generate_name};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct SessionDescription {
    raw: Sdp,
    medias: Vec<MediaSemantics>,
    group: Group,
    policy: PayloadTypePolicy,
}

impl Default for SessionDescription {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionDescription {
    /// Empty document with the default origin, session name and timing
    pub fn new() -> Self {
        Self {
            raw: Sdp::new(),
            medias: Vec::new(),
            group: Group::default(),
            policy: PayloadTypePolicy::default(),
        }
    }

    /// Wrap a parsed document, validating every singleton attribute.
    pub fn from_raw(raw: Sdp) -> Result<Self> {
        let medias = raw
            .medias
            .iter()
            .map(MediaSemantics::from_media)
            .collect::<Result<Vec<_>>>()?;
        let group = Group::from_attributes(&raw.attributes)?;
        Ok(Self {
            raw,
            medias,
            group,
            policy: PayloadTypePolicy::default(),
        })
    }

    pub fn with_payload_type_policy(mut self, policy: PayloadTypePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn payload_type_policy(&self) -> PayloadTypePolicy {
        self.policy
    }

    pub fn raw(&self) -> &Sdp {
        &self.raw
    }

    pub fn into_raw(self) -> Sdp {
        self.raw
    }

    pub fn media_count(&self) -> usize {
        self.medias.len()
    }

    pub fn medias(&self) -> impl Iterator<Item = MediaDescription<'_>> + '_ {
        let connection = self.raw.connection.as_ref();
        self.raw
            .medias
            .iter()
            .zip(&self.medias)
            .map(move |(media, semantics)| MediaDescription::new(media, semantics, connection))
    }

    pub fn media(&self, index: usize) -> Option<MediaDescription<'_>> {
        Some(MediaDescription::new(
            self.raw.medias.get(index)?,
            self.medias.get(index)?,
            self.raw.connection.as_ref(),
        ))
    }

    pub fn media_mut(&mut self, index: usize) -> Option<MediaDescriptionMut<'_>> {
        let reserved = self.reserved_payload_types(index);
        Some(MediaDescriptionMut::new(
            self.raw.medias.get_mut(index)?,
            self.medias.get_mut(index)?,
            self.raw.connection.as_ref(),
            reserved,
        ))
    }

    /// First media of `media_type`
    pub fn get_media(&self, media_type: MediaType) -> Option<MediaDescription<'_>> {
        self.media(self.position(media_type)?)
    }

    pub fn get_media_mut(&mut self, media_type: MediaType) -> Option<MediaDescriptionMut<'_>> {
        let index = self.position(media_type)?;
        self.media_mut(index)
    }

    pub fn audio(&self) -> Option<MediaDescription<'_>> {
        self.get_media(MediaType::Audio)
    }

    pub fn video(&self) -> Option<MediaDescription<'_>> {
        self.get_media(MediaType::Video)
    }

    pub fn audio_mut(&mut self) -> Option<MediaDescriptionMut<'_>> {
        self.get_media_mut(MediaType::Audio)
    }

    pub fn video_mut(&mut self) -> Option<MediaDescriptionMut<'_>> {
        self.get_media_mut(MediaType::Video)
    }

    fn position(&self, media_type: MediaType) -> Option<usize> {
        self.raw.medias.iter().position(|m| m.media_type == media_type)
    }

    /// Payload types `index` must not take under the session policy
    fn reserved_payload_types(&self, index: usize) -> Vec<u8> {
        match self.policy {
            PayloadTypePolicy::PerMedia => Vec::new(),
            PayloadTypePolicy::PerSession => self
                .medias
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .flat_map(|(_, m)| m.codecs().iter().map(|c| c.payload_type))
                .collect(),
        }
    }

    fn mids(&self) -> Vec<String> {
        self.medias().filter_map(|m| m.mid().map(str::to_string)).collect()
    }

    /// Append a media and return its index.
    ///
    /// With a group present the media receives a generated `mid` (unless it
    /// already has one) that is appended to the group's tags.
    pub fn add_raw_media(&mut self, media: Media) -> Result<usize> {
        let semantics = MediaSemantics::from_media(&media)?;
        let grouped = self.group.semantics(&self.raw.attributes).is_some();
        let mut reserved = self.mids();

        self.raw.medias.push(media);
        self.medias.push(semantics);
        let index = self.medias.len() - 1;

        if grouped {
            let mut media = self
                .media_mut(index)
                .ok_or_else(|| Error::semantic("media vanished while being added"))?;
            let mid = match media.view().mid() {
                Some(mid) => mid.to_string(),
                None => {
                    let mid = generate_name(media.media_type().as_str(), &mut reserved);
                    media.set_mid(Some(mid.clone()));
                    mid
                }
            };
            self.group.add_tag(&mut self.raw.attributes, mid);
        }
        Ok(index)
    }

    /// Session `c=` address
    pub fn host(&self) -> Option<&str> {
        self.raw.connection.as_ref().map(|c| c.address.as_str())
    }

    pub fn set_host(&mut self, host: Option<&str>) {
        self.raw.connection = host.map(ConnectionData::ip4);
    }

    pub fn origin(&self) -> &Origin {
        &self.raw.origin
    }

    pub fn set_origin_address(&mut self, address: impl Into<String>) {
        self.raw.origin.unicast_address = address.into();
    }

    pub fn session_name(&self) -> &str {
        &self.raw.session_name.0
    }

    pub fn set_session_name(&mut self, name: impl Into<String>) {
        self.raw.session_name.0 = name.into();
    }

    pub fn group_semantics(&self) -> Option<GroupSemantics> {
        self.group.semantics(&self.raw.attributes)
    }

    pub fn group_tags(&self) -> Vec<String> {
        self.group.tags(&self.raw.attributes)
    }

    /// Set or remove the session group.
    ///
    /// Setting assigns a `mid` to every media lacking one, using the media
    /// type as prefix (`video`, `video-1`, ...), and writes the group with all
    /// mids as the first session attribute. `None` removes the group and
    /// leaves the mids in place.
    pub fn set_group_semantics(&mut self, semantics: Option<GroupSemantics>) {
        let Some(semantics) = semantics else {
            self.group.set(&mut self.raw.attributes, None);
            return;
        };

        let mut reserved = self.mids();
        let mut tags = Vec::with_capacity(self.medias.len());
        for (media, wrappers) in self.raw.medias.iter_mut().zip(self.medias.iter_mut()) {
            let mut media = MediaDescriptionMut::new(media, wrappers, None, Vec::new());
            let mid = match media.view().mid() {
                Some(mid) => mid.to_string(),
                None => {
                    let mid = generate_name(media.media_type().as_str(), &mut reserved);
                    media.set_mid(Some(mid.clone()));
                    mid
                }
            };
            tags.push(mid);
        }
        self.group
            .set(&mut self.raw.attributes, Some(GroupValue::new(semantics, tags)));
    }

    pub fn lines(&self) -> Vec<String> {
        self.raw.lines()
    }
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

impl FromStr for SessionDescription {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_raw(s.parse()?)
    }
}
