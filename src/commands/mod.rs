pub mod backup;
pub mod init;
