pub mod connection;
pub mod launch;
pub mod sessions;

pub use connection::connect_to_browser;
pub use launch::launch_browser;
pub use sessions::ChromeSessions;
