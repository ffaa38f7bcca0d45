pub mod layout;
pub mod server;
