pub mod classifier;
pub mod compact;
pub mod event;
