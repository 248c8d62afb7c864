pub mod terminal;

pub use terminal::{DriverError, DriverFlow, DriverResult, TerminalDriver};
