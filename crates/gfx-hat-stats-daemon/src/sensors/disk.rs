//! Filesystem usage via statvfs.

use std::ffi::CString;
use std::path::{Path, PathBuf};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Usage summary of one mounted filesystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskSpace {
    /// Used fraction of the space available to unprivileged users, 0-100.
    pub percent: f64,
    /// Used space in GB.
    pub used_gb: f64,
    /// Total space in GB.
    pub total_gb: f64,
}

/// Usage probe for a single mount point.
pub struct MountUsage {
    path: PathBuf,
}

impl MountUsage {
    /// Creates a usage probe for a mount point.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Queries the filesystem. `None` when the path is missing or not a
    /// mounted filesystem worth reporting.
    pub fn usage(&self) -> Option<DiskSpace> {
        let c_path = CString::new(self.path.as_os_str().as_encoded_bytes()).ok()?;

        // SAFETY: statvfs only writes into the zeroed struct we pass, and
        // c_path outlives the call.
        let vfs = unsafe {
            let mut vfs: libc::statvfs = std::mem::zeroed();
            if libc::statvfs(c_path.as_ptr(), &mut vfs) != 0 {
                return None;
            }
            vfs
        };

        compute_usage(
            vfs.f_blocks as u64,
            vfs.f_bfree as u64,
            vfs.f_bavail as u64,
            vfs.f_frsize as u64,
        )
    }
}

/// Turns raw statvfs block counts into a usage summary. Percentage is
/// used / (used + available), so a root reserve does not hide space the
/// operator can never touch.
fn compute_usage(blocks: u64, bfree: u64, bavail: u64, frsize: u64) -> Option<DiskSpace> {
    if blocks == 0 || frsize == 0 {
        return None;
    }
    let total = blocks * frsize;
    let used = blocks.saturating_sub(bfree) * frsize;
    let avail = bavail * frsize;
    if used + avail == 0 {
        return None;
    }
    Some(DiskSpace {
        percent: 100.0 * used as f64 / (used + avail) as f64,
        used_gb: used as f64 / GIB,
        total_gb: total as f64 / GIB,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_usage() {
        // 1000 blocks of 4096 bytes, 400 free, 350 available to users
        let space = compute_usage(1000, 400, 350, 4096).unwrap();
        assert!((space.total_gb - 4096000.0 / GIB).abs() < 1e-9);
        // used = 600 blocks, percent = 600 / (600 + 350)
        assert!((space.percent - 100.0 * 600.0 / 950.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_usage_degenerate() {
        assert!(compute_usage(0, 0, 0, 4096).is_none());
        assert!(compute_usage(1000, 400, 350, 0).is_none());
    }

    #[test]
    fn test_root_is_queryable() {
        // The root filesystem always exists on the platforms we run on
        let usage = MountUsage::new("/").usage().unwrap();
        assert!(usage.total_gb > 0.0);
        assert!(usage.percent >= 0.0 && usage.percent <= 100.0);
    }

    #[test]
    fn test_missing_mount() {
        assert!(MountUsage::new("/definitely/not/mounted/here")
            .usage()
            .is_none());
    }
}
