//! Data shapes shared with external collaborators.

pub mod backup_file_info;

pub use backup_file_info::BackupFileInfo;
