pub mod events;
pub mod recorder_service;
