
#[cfg(feature = "defmt")]
use defmt::debug;

#[cfg(not(feature = "defmt"))]
use log::debug;

/// Host-visible state of the storage medium
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature="defmt", derive(defmt::Format))]
pub enum MediaState {
    Present,
    Ejected,
}

/// Media presence tracking, driven by host START STOP UNIT signals
///
/// Only status reporting reads this; the data path stays available in
/// either state.
#[derive(Clone, Debug)]
pub struct Media {
    state: MediaState,
}

impl Default for Media {
    fn default() -> Self {
        Self { state: MediaState::Present }
    }
}

impl Media {
    pub fn new() -> Self {
        Default::default()
    }

    /// Current presence state
    pub fn state(&self) -> MediaState {
        self.state
    }

    pub fn is_present(&self) -> bool {
        self.state == MediaState::Present
    }

    /// Apply a host start-stop signal
    ///
    /// `load_eject` selects a media transition: start loads the medium,
    /// stop ejects it. Without `load_eject` the signal is a pure power
    /// condition notification and the state is unchanged. Start-stop
    /// requests are never rejected, so this always acknowledges.
    pub fn start_stop(&mut self, power_condition: u8, start: bool, load_eject: bool) -> bool {
        if load_eject {
            self.state = if start {
                MediaState::Present
            } else {
                MediaState::Ejected
            };
            debug!("media {} by host", if start { "loaded" } else { "ejected" });
        } else {
            debug!("power condition {} acknowledged", power_condition);
        }

        true
    }
}
