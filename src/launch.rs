use std::path::PathBuf;

use tracing::info;

use crate::error::LaunchError;

/// Per-user LaunchAgent that starts the app at login.
pub struct LaunchAgent {
    label: String,
    plist_path: PathBuf,
    program: PathBuf,
}

impl LaunchAgent {
    pub fn new(label: impl Into<String>, plist_path: PathBuf, program: PathBuf) -> Self {
        Self {
            label: label.into(),
            plist_path,
            program,
        }
    }

    /// Agent for the running executable under ~/Library/LaunchAgents.
    pub fn for_current_exe(label: &str) -> Result<Self, LaunchError> {
        let home = dirs::home_dir().ok_or(LaunchError::NoHomeDir)?;
        let program = std::env::current_exe()?;
        let plist_path = home.join(format!("Library/LaunchAgents/{label}.plist"));
        Ok(Self::new(label, plist_path, program))
    }

    pub fn is_enabled(&self) -> bool {
        self.plist_path.exists()
    }

    /// Write the agent plist. Idempotent.
    pub fn enable(&self) -> Result<(), LaunchError> {
        if self.is_enabled() {
            return Ok(());
        }
        if let Some(parent) = self.plist_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.plist_path, self.plist())?;
        info!(path = %self.plist_path.display(), "launch at login enabled");
        Ok(())
    }

    fn plist(&self) -> String {
        let label = xml_escape(&self.label);
        let program = xml_escape(&self.program.to_string_lossy());
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{label}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{program}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>ProcessType</key>
    <string>Interactive</string>
</dict>
</plist>
"#
        )
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn agent(dir: &Path) -> LaunchAgent {
        LaunchAgent::new(
            "com.ibattery.test",
            dir.join("LaunchAgents/com.ibattery.test.plist"),
            PathBuf::from("/Applications/iBattery & Co.app/Contents/MacOS/ibattery"),
        )
    }

    #[test]
    fn test_enable_writes_plist() {
        let dir = tempfile::tempdir().unwrap();
        let agent = agent(dir.path());
        assert!(!agent.is_enabled());

        agent.enable().unwrap();
        assert!(agent.is_enabled());

        let plist = std::fs::read_to_string(&agent.plist_path).unwrap();
        assert!(plist.contains("<string>com.ibattery.test</string>"));
        assert!(plist.contains("iBattery &amp; Co.app"));
        assert!(plist.contains("<key>RunAtLoad</key>"));
        assert!(!plist.contains("KeepAlive"));
    }

    #[test]
    fn test_enable_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let agent = agent(dir.path());
        agent.enable().unwrap();
        std::fs::write(&agent.plist_path, "custom").unwrap();
        agent.enable().unwrap();
        assert_eq!(std::fs::read_to_string(&agent.plist_path).unwrap(), "custom");
    }

    #[test]
    fn test_enable_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("LaunchAgents");
        std::fs::write(&blocker, "not a directory").unwrap();
        let agent = agent(dir.path());
        assert!(matches!(agent.enable(), Err(LaunchError::Io(_))));
        assert!(!agent.is_enabled());
    }
}
