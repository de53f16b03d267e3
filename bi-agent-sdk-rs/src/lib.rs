pub mod agent;
pub mod error;
pub mod events;
pub mod intent;
pub mod logger;
pub mod stream;
pub mod visualization;
