// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fs, path::PathBuf};
use tempfile::TempDir;

use crate::config::transaction::{ensure_writable, read_config, write_if_changed};
use crate::config::{ConfigError, ConfigTransaction};

/// Helper: Creates a temporary config file for testing.
fn create_test_config() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("logind.conf");
    fs::write(&config_path, "[Login]\n#IdleAction=ignore\n").unwrap();
    (temp_dir, config_path)
}

fn leftover_temp_files(dir: &std::path::Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count()
}

// ============================================================================
// ConfigTransaction Tests
// ============================================================================

#[test]
fn test_transaction_basic_flow() {
    let (temp_dir, config_path) = create_test_config();

    let tx = ConfigTransaction::begin(&config_path).unwrap();
    let temp_path = tx.temp_path().to_path_buf();
    assert!(temp_path.exists(), "Temp file should exist during the transaction");

    tx.commit("[Login]\nIdleAction=suspend\n").unwrap();

    assert_eq!(
        fs::read_to_string(&config_path).unwrap(),
        "[Login]\nIdleAction=suspend\n"
    );
    assert!(!temp_path.exists(), "Temp file should be removed after commit");
    assert_eq!(leftover_temp_files(temp_dir.path()), 0);
}

#[test]
fn test_temp_file_next_to_target() {
    let (_temp_dir, config_path) = create_test_config();

    let tx = ConfigTransaction::begin(&config_path).unwrap();
    let expected_dir = fs::canonicalize(config_path.parent().unwrap()).unwrap();

    assert_eq!(tx.temp_path().parent().unwrap(), expected_dir);
}

#[test]
fn test_dropped_transaction_leaves_target_untouched() {
    let (temp_dir, config_path) = create_test_config();

    {
        let _tx = ConfigTransaction::begin(&config_path).unwrap();
    }

    assert_eq!(
        fs::read_to_string(&config_path).unwrap(),
        "[Login]\n#IdleAction=ignore\n"
    );
    assert_eq!(leftover_temp_files(temp_dir.path()), 0);
}

#[test]
fn test_begin_missing_target() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nonexistent.conf");

    let result = ConfigTransaction::begin(&missing);
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[cfg(unix)]
#[test]
fn test_symlink_survives_commit() {
    let temp_dir = TempDir::new().unwrap();
    let real = temp_dir.path().join("real.conf");
    let link = temp_dir.path().join("link.conf");
    fs::write(&real, "old\n").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    ConfigTransaction::begin(&link).unwrap().commit("new\n").unwrap();

    let meta = fs::symlink_metadata(&link).unwrap();
    assert!(meta.file_type().is_symlink(), "Link must not be replaced by a file");
    assert_eq!(fs::read_to_string(&real).unwrap(), "new\n");
}

#[cfg(unix)]
#[test]
fn test_hard_link_and_inode_survive_commit() {
    use std::os::unix::fs::MetadataExt;

    let (temp_dir, config_path) = create_test_config();
    let twin = temp_dir.path().join("twin.conf");
    fs::hard_link(&config_path, &twin).unwrap();
    let inode_before = fs::metadata(&config_path).unwrap().ino();

    ConfigTransaction::begin(&config_path).unwrap().commit("shared\n").unwrap();

    assert_eq!(fs::metadata(&config_path).unwrap().ino(), inode_before);
    assert_eq!(fs::read_to_string(&twin).unwrap(), "shared\n");
}

#[cfg(unix)]
#[test]
fn test_permissions_survive_commit() {
    use std::os::unix::fs::PermissionsExt;

    let (_temp_dir, config_path) = create_test_config();
    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o640)).unwrap();

    ConfigTransaction::begin(&config_path).unwrap().commit("x=1\n").unwrap();

    let mode = fs::metadata(&config_path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}

#[test]
fn test_commit_shorter_content_truncates() {
    let (_temp_dir, config_path) = create_test_config();

    ConfigTransaction::begin(&config_path).unwrap().commit("a\n").unwrap();

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "a\n");
}

// ============================================================================
// Helper Tests
// ============================================================================

#[test]
fn test_write_if_changed_skips_identical_content() {
    let (_temp_dir, config_path) = create_test_config();

    let wrote = write_if_changed(&config_path, "[Login]\n#IdleAction=ignore\n").unwrap();
    assert!(!wrote);

    let wrote = write_if_changed(&config_path, "[Login]\nIdleAction=lock\n").unwrap();
    assert!(wrote);
    assert_eq!(
        fs::read_to_string(&config_path).unwrap(),
        "[Login]\nIdleAction=lock\n"
    );
}

#[test]
fn test_ensure_writable() {
    let (temp_dir, config_path) = create_test_config();

    assert!(ensure_writable(&config_path).is_ok());
    assert!(matches!(
        ensure_writable(&temp_dir.path().join("missing.conf")),
        Err(ConfigError::NotFound(_))
    ));
    assert_eq!(
        fs::read_to_string(&config_path).unwrap(),
        "[Login]\n#IdleAction=ignore\n",
        "Writability check must not truncate"
    );
}

#[test]
fn test_read_config_missing() {
    let temp_dir = TempDir::new().unwrap();

    assert!(matches!(
        read_config(&temp_dir.path().join("missing.conf")),
        Err(ConfigError::NotFound(_))
    ));
}
