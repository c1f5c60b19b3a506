pub mod config_cmd;
pub mod doctor;
pub mod init;
pub mod model;
pub mod segment;
pub mod serve;
pub mod status;
