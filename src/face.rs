use log::debug;

use crate::error::Error;
use crate::limits::FACE_CB_TABLE_SIZE;
use crate::name::Name;
use crate::packet::{TLV_DATA, TLV_INTEREST};
use crate::tlv::Decoder;

pub type OnData = fn(&[u8]);
pub type OnInterest = fn(&[u8]);
pub type OnTimeout = fn();

/// A callback slot. Interest registrations match by prefix and dispatch
/// incoming interests; pending-data registrations match exactly and
/// dispatch incoming data, so the two cannot be confused.
#[derive(Copy, Clone)]
enum CallbackEntry {
    Interest {
        prefix: Name,
        on_interest: OnInterest,
    },
    PendingData {
        name: Name,
        on_data: OnData,
        on_timeout: Option<OnTimeout>,
    },
}

/// An application face: raw packets in, callbacks out.
///
/// The face holds a bounded table of registrations. It performs no I/O
/// and owns no timers; the caller feeds it received packets through
/// [`DirectFace::dispatch`] and reports expiry through
/// [`DirectFace::expire_pending`].
pub struct DirectFace {
    face_id: u16,
    entries: [Option<CallbackEntry>; FACE_CB_TABLE_SIZE],
}

impl DirectFace {
    pub fn new(face_id: u16) -> Self {
        Self {
            face_id,
            entries: [None; FACE_CB_TABLE_SIZE],
        }
    }

    pub fn face_id(&self) -> u16 {
        self.face_id
    }

    fn insert(&mut self, entry: CallbackEntry) -> Result<(), Error> {
        match self.entries.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(entry);
                Ok(())
            }
            None => {
                debug!("face {}: callback table full", self.face_id);
                Err(Error::CallbackTableFull)
            }
        }
    }

    /// Registers interest in `name`: the next data packet carrying
    /// exactly this name is delivered to `on_data`, once.
    pub fn express_interest(
        &mut self,
        name: &Name,
        on_data: OnData,
        on_timeout: Option<OnTimeout>,
    ) -> Result<(), Error> {
        self.insert(CallbackEntry::PendingData {
            name: *name,
            on_data,
            on_timeout,
        })
    }

    /// Registers a producer prefix: every interest under `prefix` is
    /// delivered to `on_interest`.
    pub fn register_prefix(&mut self, prefix: &Name, on_interest: OnInterest) -> Result<(), Error> {
        self.insert(CallbackEntry::Interest {
            prefix: *prefix,
            on_interest,
        })
    }

    /// Peeks the packet type, decodes the name and dispatches to the
    /// first matching table entry.
    pub fn dispatch(&mut self, packet: &[u8]) -> Result<(), Error> {
        let mut decoder = Decoder::new(packet);
        let typ = decoder.read_type()?;
        let is_interest = match typ {
            TLV_INTEREST => true,
            TLV_DATA => false,
            _ => return Err(Error::WrongTlvType { found: typ }),
        };
        decoder.read_length()?;
        let name = Name::decode(&mut decoder)?;

        for slot in self.entries.iter_mut() {
            match *slot {
                Some(CallbackEntry::PendingData { name: pending, on_data, .. })
                    if !is_interest && pending == name =>
                {
                    *slot = None;
                    on_data(packet);
                    return Ok(());
                }
                Some(CallbackEntry::Interest { prefix, on_interest })
                    if is_interest && prefix.is_prefix_of(&name) =>
                {
                    on_interest(packet);
                    return Ok(());
                }
                _ => {}
            }
        }
        debug!(
            "face {}: no callback matched {:?}",
            self.face_id,
            name
        );
        Err(Error::NoMatchedCallback)
    }

    /// Drops the pending-data registration for `name` and fires its
    /// timeout callback. Returns false when no such registration exists.
    /// The timer driving expiry lives outside the face.
    pub fn expire_pending(&mut self, name: &Name) -> bool {
        for slot in self.entries.iter_mut() {
            if let Some(CallbackEntry::PendingData { name: pending, on_timeout, .. }) = *slot {
                if pending == *name {
                    *slot = None;
                    if let Some(on_timeout) = on_timeout {
                        on_timeout();
                    }
                    return true;
                }
            }
        }
        false
    }
}
