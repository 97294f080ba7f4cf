//! Hardware acceptance filters

use crate::frame::CanFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidBank;

/// Filter bank number, 0 to 27
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterBank(u8);

impl FilterBank {
    /// Number of filter banks shared by the peripheral
    pub const COUNT: usize = 28;
    pub const FIRST: Self = Self(0);
    pub const LAST: Self = Self(Self::COUNT as u8 - 1);

    pub const fn new(number: u8) -> Option<Self> {
        if (number as usize) < Self::COUNT {
            Some(Self(number))
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }
}

impl From<FilterBank> for usize {
    fn from(value: FilterBank) -> Self {
        value.0.into()
    }
}

impl TryFrom<u8> for FilterBank {
    type Error = InvalidBank;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidBank)
    }
}

/// Identifier/mask acceptance rule
///
/// A frame passes an active filter when its identifier agrees with `id` on every bit set in
/// `mask`. A zero mask accepts every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Filter {
    pub bank: FilterBank,
    pub id: u32,
    pub mask: u32,
    pub active: bool,
}

impl Filter {
    pub const fn new(bank: FilterBank, id: u32, mask: u32, active: bool) -> Self {
        Self {
            bank,
            id,
            mask,
            active,
        }
    }

    pub fn accepts(&self, frame: &CanFrame) -> bool {
        self.active && (frame.raw_id() & self.mask) == (self.id & self.mask)
    }
}
