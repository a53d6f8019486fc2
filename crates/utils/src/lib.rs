pub mod logging;
pub mod names;
pub mod time;
