use anyhow::Result;
use std::path::PathBuf;

/// Environment variable pointing at a directory of driver binaries
pub const DRIVERS_DIR_ENV: &str = "CARTFLOW_DRIVERS_DIR";

/// Locate a driver binary.
///
/// Search order: `$CARTFLOW_DRIVERS_DIR`, `~/.cartflow-tester/drivers`, then the system PATH.
pub fn find_binary(name: &str) -> Result<PathBuf> {
    let file_name = if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    };

    let mut checked_paths = Vec::new();
    for dir in candidate_dirs() {
        let path = dir.join(&file_name);
        if path.exists() {
            return Ok(path);
        }
        checked_paths.push(path.display().to_string());
    }

    if let Ok(path) = which::which(name) {
        return Ok(path);
    }
    checked_paths.push("system PATH".to_string());

    Err(anyhow::anyhow!(
        "Could not find driver binary '{}'. Checked:\n{}",
        name,
        checked_paths.join("\n")
    ))
}

fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs_list = Vec::new();
    if let Ok(dir) = std::env::var(DRIVERS_DIR_ENV) {
        dirs_list.push(PathBuf::from(dir));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_list.push(home.join(".cartflow-tester").join("drivers"));
    }
    dirs_list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_lists_checked_paths() {
        let err = find_binary("definitely-not-a-real-driver-binary").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("definitely-not-a-real-driver-binary"));
        assert!(msg.contains("system PATH"));
    }
}
