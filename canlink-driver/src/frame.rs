//! Classic CAN frame object

use embedded_can::{ExtendedId, Id};

/// Maximum payload of a classic CAN frame
pub const MAX_DATA_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidLength;

/// Classic CAN frame
///
/// The identifier carries the frame format: [`Id::Standard`] for 11-bit and [`Id::Extended`]
/// for 29-bit identifiers. Remote frames carry a data length code but no payload.
///
/// Payload bytes past the data length are always zero, so the derived equality compares frame
/// content only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    id: Id,
    remote: bool,
    dlc: u8,
    data: [u8; MAX_DATA_LENGTH],
}

impl CanFrame {
    /// Creates a data frame. The data length code equals the payload length.
    pub fn new_data(id: impl Into<Id>, data: &[u8]) -> Result<Self, InvalidLength> {
        if data.len() > MAX_DATA_LENGTH {
            return Err(InvalidLength);
        }
        let mut bytes = [0; MAX_DATA_LENGTH];
        bytes[..data.len()].copy_from_slice(data);

        Ok(Self {
            id: id.into(),
            remote: false,
            dlc: data.len() as u8,
            data: bytes,
        })
    }

    /// Creates a remote transmission request with the requested data length code.
    pub fn new_remote(id: impl Into<Id>, dlc: u8) -> Result<Self, InvalidLength> {
        if usize::from(dlc) > MAX_DATA_LENGTH {
            return Err(InvalidLength);
        }
        Ok(Self {
            id: id.into(),
            remote: true,
            dlc,
            data: [0; MAX_DATA_LENGTH],
        })
    }

    /// Link self-test frame: extended identifier 0, payload `TesTTesT`.
    pub const fn test_pattern() -> Self {
        Self {
            id: Id::Extended(ExtendedId::ZERO),
            remote: false,
            dlc: 8,
            data: *b"TesTTesT",
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Identifier value without the format tag
    pub fn raw_id(&self) -> u32 {
        match self.id {
            Id::Standard(id) => id.as_raw().into(),
            Id::Extended(id) => id.as_raw(),
        }
    }

    pub fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn dlc(&self) -> u8 {
        self.dlc
    }

    /// Payload; empty for remote frames.
    pub fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..usize::from(self.dlc)]
        }
    }
}

impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        Self::new_data(id, data).ok()
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        let dlc = u8::try_from(dlc).ok()?;
        CanFrame::new_remote(id, dlc).ok()
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        usize::from(self.dlc)
    }

    fn data(&self) -> &[u8] {
        CanFrame::data(self)
    }
}

// `embedded_can::Id` has no defmt support, so the identifier is logged through its raw value
#[cfg(feature = "defmt")]
impl defmt::Format for CanFrame {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "CanFrame {{ id: {=u32:#x}, extended: {=bool}, remote: {=bool}, dlc: {=u8}, data: {=[u8]:x} }}",
            self.raw_id(),
            self.is_extended(),
            self.remote,
            self.dlc,
            self.data(),
        )
    }
}
