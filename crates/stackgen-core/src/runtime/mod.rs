//! Runtime detection and dependency installation
//!
//! This module provides:
//! - Node.js / package manager detection
//! - The `PackageInstaller` seam and its child-process implementation

pub mod check;
pub mod install;

pub use check::{check_install_runtimes, check_node, check_package_manager, RuntimeInfo};
pub use install::{CommandInstaller, PackageInstaller, PackageManager, DEFAULT_INSTALL_TIMEOUT};
