/// Private interfaces for the canlink core
///
/// Backends should not use this module.
/// Backward-incompatible changes can be made without major version bump.
use crate::frame::CanFrame;

pub trait DynamicEvents {
    fn frame_received(&self, frame: &CanFrame);
    fn transmit_complete(&self);
    fn link_error(&self);
}
