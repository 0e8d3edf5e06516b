pub mod types;
pub mod helpers;
pub mod logger;
pub mod structure_parse;
pub mod export_helpers;

use std::error::Error;
use std::fs::create_dir_all;
use std::path::PathBuf;

use app_dirs::{get_app_root, AppDataType, AppInfo};

pub const APP_INFO: AppInfo = AppInfo {
    name: "cyrus-tools",
    author: "cyrus",
};

/// Per-user data directory holding the log file. Created on first use.
pub fn get_create_cyrus_dir() -> Result<PathBuf, Box<dyn Error>> {
    let p = get_app_root(AppDataType::UserData, &APP_INFO)?;
    if !p.exists() {
        create_dir_all(&p)?;
    }
    Ok(p)
}
