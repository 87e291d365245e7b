//! Host display capabilities engaged at session start.
//!
//! Fullscreen and orientation lock are nice-to-haves: a host that lacks them
//! or refuses them never blocks the session. Failures are logged and
//! forgotten.

use tracing::{debug, warn};

/// A host capability the session requests once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Fullscreen,
    OrientationLock,
}

impl Capability {
    fn name(self) -> &'static str {
        match self {
            Capability::Fullscreen => "fullscreen",
            Capability::OrientationLock => "orientation lock",
        }
    }
}

/// Trait for the host's display capabilities
pub trait CapabilityProvider {
    /// Requests a capability. `None` means the host does not offer it at
    /// all; `Some(Err)` means it was offered but refused.
    fn request(&mut self, capability: Capability) -> Option<std::result::Result<(), String>>;
}

/// Provider for hosts with no display capabilities.
#[derive(Debug, Default)]
pub struct NoCapabilities;

impl CapabilityProvider for NoCapabilities {
    fn request(&mut self, _capability: Capability) -> Option<std::result::Result<(), String>> {
        None
    }
}

/// Requests fullscreen and landscape lock, logging outcomes without failing.
pub fn engage(provider: &mut dyn CapabilityProvider) {
    for capability in [Capability::Fullscreen, Capability::OrientationLock] {
        match provider.request(capability) {
            None => debug!("Host does not offer {}", capability.name()),
            Some(Err(reason)) => warn!("Host refused {}: {}", capability.name(), reason),
            Some(Ok(())) => debug!("Engaged {}", capability.name()),
        }
    }
}
