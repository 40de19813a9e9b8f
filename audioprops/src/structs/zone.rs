//! Rewritable regions and the container fields that point at them.
//!
//! A [`ZoneMap`] is built once per decode attempt with [`ZoneMapBuilder`] and
//! is immutable afterwards. It records:
//!
//! - **Zones**: named byte ranges `[start, start + length)` expected to change
//!   size on write (an embedded tag, typically).
//! - **Size patches**: fields whose stored value moves with a zone's length.
//! - **Index patches**: fields storing a zone's absolute start offset.

use crate::utils::byteorder::ByteOrder;
use crate::utils::errors::ZoneError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub name: String,
    pub start: u64,
    pub length: u64,
}

impl Zone {
    /// Exclusive end offset, saturating at `u64::MAX`.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    Size,
    Index,
}

/// A field elsewhere in the file that must be rewritten when its target zone
/// changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub kind: PatchKind,
    /// Absolute offset of the field.
    pub offset: u64,
    /// Field width in bytes.
    pub width: usize,
    pub byte_order: ByteOrder,
    /// Value stored in the field when the file was decoded. Signed fields
    /// holding a negative "absent" marker are recorded as 0.
    pub value: u64,
    /// Name of the zone the field refers to.
    pub target: String,
}

/// Bytes to store at `offset` after a zone rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchWrite {
    pub offset: u64,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ZoneMapBuilder {
    byte_order: ByteOrder,
    zones: Vec<Zone>,
    patches: Vec<Patch>,
}

impl ZoneMapBuilder {
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            zones: Vec::new(),
            patches: Vec::new(),
        }
    }

    /// Drops every zone and patch registered so far.
    pub fn clear(&mut self) -> &mut Self {
        self.zones.clear();
        self.patches.clear();
        self
    }

    /// Registers `name`, replacing an earlier zone of the same name.
    pub fn zone(&mut self, name: &str, start: u64, length: u64) -> &mut Self {
        let zone = Zone {
            name: name.to_string(),
            start,
            length,
        };

        match self.zones.iter_mut().find(|z| z.name == name) {
            Some(existing) => *existing = zone,
            None => self.zones.push(zone),
        }
        self
    }

    pub fn size_patch(&mut self, target: &str, offset: u64, width: usize, value: u64) -> &mut Self {
        self.patch(PatchKind::Size, target, offset, width, value)
    }

    pub fn index_patch(
        &mut self,
        target: &str,
        offset: u64,
        width: usize,
        value: u64,
    ) -> &mut Self {
        self.patch(PatchKind::Index, target, offset, width, value)
    }

    pub fn get_zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn build(&self) -> ZoneMap {
        ZoneMap {
            zones: self.zones.clone(),
            patches: self.patches.clone(),
        }
    }

    fn patch(
        &mut self,
        kind: PatchKind,
        target: &str,
        offset: u64,
        width: usize,
        value: u64,
    ) -> &mut Self {
        self.patches.push(Patch {
            kind,
            offset,
            width,
            byte_order: self.byte_order,
            value,
            target: target.to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneMap {
    zones: Vec<Zone>,
    patches: Vec<Patch>,
}

impl ZoneMap {
    pub fn get_zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patches_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Patch> + 'a {
        self.patches.iter().filter(move |p| p.target == name)
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty() && self.patches.is_empty()
    }

    /// Computes the field values needed once zone `name` is rewritten to
    /// `new_length` bytes at `new_start`.
    ///
    /// Size fields shift by the length delta. Index fields take the new start,
    /// or 0 when the zone becomes empty.
    pub fn plan(
        &self,
        name: &str,
        new_start: u64,
        new_length: u64,
    ) -> Result<Vec<PatchWrite>, ZoneError> {
        let zone = self
            .get_zone(name)
            .ok_or_else(|| ZoneError::UnknownZone(name.to_string()))?;

        let delta = new_length as i128 - zone.length as i128;

        self.patches_for(name)
            .map(|patch| -> Result<PatchWrite, ZoneError> {
                let value = match patch.kind {
                    PatchKind::Size => patch.value as i128 + delta,
                    PatchKind::Index if new_length == 0 => 0,
                    PatchKind::Index => new_start as i128,
                };

                let bytes = u64::try_from(value)
                    .ok()
                    .and_then(|v| patch.byte_order.encode(v, patch.width))
                    .ok_or(ZoneError::Overflow {
                        offset: patch.offset,
                        width: patch.width,
                        value,
                    })?;

                Ok(PatchWrite {
                    offset: patch.offset,
                    bytes,
                })
            })
            .collect()
    }
}
