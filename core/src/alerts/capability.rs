//! Hardware capabilities consumed by alert delivery

/// Audible "go" cue.
///
/// Constructed once per process and shared. `attempt_play` may block while
/// the device plays; it is always called off the tick loop.
pub trait AlertCapability: Send + Sync {
    /// Whether the device has been unlocked/initialised for playback
    fn is_ready(&self) -> bool;

    /// Play the cue. `false` means playback was refused or failed.
    fn attempt_play(&self) -> bool;
}

/// Haptic pulse, where the device has one
pub trait Vibrator: Send + Sync {
    /// Pulse with an on/off pattern in ms. `false` when unsupported.
    fn vibrate(&self, pattern: &[u32]) -> bool;
}

/// Capability for headless setups: never ready, so every alert falls back
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlert;

impl AlertCapability for SilentAlert {
    fn is_ready(&self) -> bool {
        false
    }

    fn attempt_play(&self) -> bool {
        false
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoVibration;

impl Vibrator for NoVibration {
    fn vibrate(&self, _pattern: &[u32]) -> bool {
        false
    }
}
