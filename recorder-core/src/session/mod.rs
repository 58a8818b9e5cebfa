pub mod recording;
pub mod supervisor;
