use crate::filter::{Filter, FilterBank};
use crate::time::Duration;

/// Per-attempt transmit timeout used by default
pub const DEFAULT_TX_TIMEOUT: Duration = Duration::from_millis(100);

/// Acceptance filter installed in bank 0 during link initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitialFilter {
    pub id: u32,
    pub mask: u32,
}

impl InitialFilter {
    /// Zero mask: every frame passes
    pub const ACCEPT_ALL: Self = Self { id: 0, mask: 0 };

    pub(crate) const fn into_filter(self) -> Filter {
        Filter::new(FilterBank::FIRST, self.id, self.mask, true)
    }
}

/// Link config struct
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Filter installed at initialization. Without a filter, nothing is received until one is
    /// configured.
    pub initial_filter: Option<InitialFilter>,
    /// Timeout of a single transmission attempt
    pub tx_timeout: Duration,
    /// Retries of the link self-test transmission
    pub test_retries: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_filter: Some(InitialFilter::ACCEPT_ALL),
            tx_timeout: DEFAULT_TX_TIMEOUT,
            test_retries: 2,
        }
    }
}
