//! # Fatal Load
//!
//! `load_or_exit` terminates the process, so the failing load runs in a child
//! copy of this test binary selected by an environment flag.

use std::process::Command;

use protojson_registry::{load_or_exit, ClassPath, NativeCatalog, RegistryConfig};

const CHILD_FLAG: &str = "PROTOJSON_LOAD_OR_EXIT_CHILD";

#[test]
fn failed_load_exits_with_status_one() {
    if std::env::var_os(CHILD_FLAG).is_some() {
        // Nothing on the class path: the bindings table cannot be found.
        let config = RegistryConfig::default().with_class_path(ClassPath::new());
        let _registry = load_or_exit(&config, &NativeCatalog::new());
        // Reaching this line means the process was not terminated.
        std::process::exit(0);
    }

    let exe = std::env::current_exe().unwrap();
    let status = Command::new(exe)
        .args(["--exact", "failed_load_exits_with_status_one", "--test-threads=1"])
        .env(CHILD_FLAG, "1")
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn successful_load_returns_the_registry() {
    let class_path = ClassPath::new()
        .with_embedded("proto-message-types.properties", "")
        .with_embedded("proto-enum-types.properties", "");
    let config = RegistryConfig::default().with_class_path(class_path);
    let registry = load_or_exit(&config, &NativeCatalog::new());
    assert_eq!(registry.message_types().count(), 0);
}
