//! Chrome launcher for headless measurement runs.

use std::path::PathBuf;

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};

/// Launches headless Chrome instances configured for reproducible
/// measurement: fixed window, no first-run noise, no background traffic.
pub struct BrowserLauncher {
    chrome_path: PathBuf,
}

impl BrowserLauncher {
    pub const fn new(chrome_path: PathBuf) -> Self {
        Self { chrome_path }
    }

    /// Launch Chrome and spawn the CDP handler loop.
    ///
    /// The returned handle drives the CDP connection and must stay alive
    /// for the duration of the run; abort it after closing the browser.
    pub async fn launch(&self) -> Result<(Browser, JoinHandle<()>)> {
        // Unique profile dir so concurrent runs never share state.
        let profile_dir =
            std::env::temp_dir().join(format!("ecoscan-profile-{}", uuid::Uuid::new_v4()));

        let config = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(profile_dir)
            .no_sandbox()
            .disable_default_args()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--disable-default-apps")
            .arg("--no-first-run")
            .arg("--window-size=1920,1080")
            .arg("--hide-scrollbars")
            .arg("--mute-audio")
            .viewport(None)
            .build()
            .map_err(AppError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserLaunch(e.to_string()))?;

        log::debug!("[BROWSER] Launched {}", self.chrome_path.display());

        let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok((browser, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_path() {
        let launcher = BrowserLauncher::new(PathBuf::from("/opt/chrome/chrome"));
        assert_eq!(launcher.chrome_path, PathBuf::from("/opt/chrome/chrome"));
    }
}
