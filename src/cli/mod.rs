pub mod command;
pub mod info;
pub mod key;
pub mod progress;
