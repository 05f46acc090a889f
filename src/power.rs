/// Query for the OS low-power-mode flag.
pub trait LowPowerQuery: Send + Sync {
    fn is_enabled(&self) -> bool;
}

/// Reads the flag from `NSProcessInfo` on macOS. Always off elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLowPower;

impl LowPowerQuery for SystemLowPower {
    #[cfg(target_os = "macos")]
    fn is_enabled(&self) -> bool {
        use objc2_foundation::NSProcessInfo;
        NSProcessInfo::processInfo().isLowPowerModeEnabled()
    }

    #[cfg(not(target_os = "macos"))]
    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLowPower;

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_low_power_off_without_macos() {
        assert!(!SystemLowPower.is_enabled());
    }

    #[test]
    fn test_query_reads_current_flag() {
        let fake = FakeLowPower::new(false);
        let query: &dyn LowPowerQuery = &fake;
        assert!(!query.is_enabled());
        fake.set(true);
        assert!(query.is_enabled());
        fake.set(false);
        assert!(!query.is_enabled());
    }
}
