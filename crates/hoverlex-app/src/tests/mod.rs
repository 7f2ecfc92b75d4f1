mod controller_tests;

use std::path::PathBuf;

/// Fresh directory under the system temp dir
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hoverlex-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
