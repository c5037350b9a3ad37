pub mod audio;
pub mod frame_signal;
pub mod shared_slot;

pub use audio::AudioBlockSlot;
pub use frame_signal::FrameSignal;
pub use shared_slot::{ SharedSlot, SlotReader };
