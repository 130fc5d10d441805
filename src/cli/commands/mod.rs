mod command_result;
pub mod extract;
pub mod helper;
pub mod init;
pub mod populate;

pub use command_result::*;
