pub mod capture_backend;
pub mod process_spawner;
pub mod session_delegate;
