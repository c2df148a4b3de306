//! The measurement navigation protocol.
//!
//! Every step here is a methodology requirement, not an optimization: the
//! ordering, the fixed viewport, the cold cache and the fixed settle
//! delays are what make two runs of the same page comparable.

use std::time::Duration;

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, SetCacheDisabledParams,
};
use chromiumoxide::Page;
use url::Url;

use crate::browser::capture::{NetworkCapture, RawCapture};
use crate::error::{AppError, Result};

/// Upper bound on navigation plus load completion.
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(45);
/// Upper bound on waiting for the first paint entry.
pub const FIRST_PAINT_TIMEOUT: Duration = Duration::from_secs(30);
/// Fixed settle delay before and after the scroll. Not content-adaptive.
const SETTLE_DELAY: Duration = Duration::from_secs(3);
const FIRST_PAINT_POLL: Duration = Duration::from_millis(500);

const VIEWPORT_WIDTH: i64 = 1920;
const VIEWPORT_HEIGHT: i64 = 1080;

/// One continuous top-to-bottom scroll sized to the full document height,
/// to trigger lazily-loaded resources.
const SCROLL_JS: &str = "window.scrollTo({ top: Math.max(document.documentElement.scrollHeight, \
                         document.body ? document.body.scrollHeight : 0), left: 0, behavior: 'smooth' })";

/// TTFB straight from the navigation-timing entry. Audit-derived TTFB is
/// unreliable under multi-step navigation, so this is the only source.
const TTFB_JS: &str = "(() => { const nav = performance.getEntriesByType('navigation')[0]; \
                       return nav ? Math.max(nav.responseStart - nav.requestStart, 0) : 0; })()";

const FIRST_PAINT_JS: &str = "performance.getEntriesByType('paint').length > 0";

/// A fully loaded, scroll-stabilized page together with its network log,
/// ready for metric extraction.
pub struct StabilizedPage {
    pub page: Page,
    pub requests: Vec<RawCapture>,
    pub ttfb_ms: f64,
}

/// Drives one browser page through the measurement protocol.
pub struct NavigationController;

impl NavigationController {
    /// Run the full protocol against `url`:
    ///
    /// 1. disable the network cache (cold transfer sizes)
    /// 2. fix the viewport to 1920x1080, scale 1, no mobile emulation
    /// 3. navigate, bounded by the render and first-paint timeouts
    /// 4. settle 3s, scroll to the bottom in one gesture, settle 3s
    /// 5. capture TTFB from navigation timing
    pub async fn run(browser: &Browser, url: &Url) -> Result<StabilizedPage> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::BrowserLaunch(e.to_string()))?;

        page.execute(NetworkEnableParams::default())
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?;
        page.execute(
            SetCacheDisabledParams::builder()
                .cache_disabled(true)
                .build()
                .map_err(AppError::MetricsCollection)?,
        )
        .await
        .map_err(|e| AppError::metrics(e.to_string()))?;

        let capture = NetworkCapture::attach(&page).await?;

        page.execute(
            SetDeviceMetricsOverrideParams::builder()
                .width(VIEWPORT_WIDTH)
                .height(VIEWPORT_HEIGHT)
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(AppError::MetricsCollection)?,
        )
        .await
        .map_err(|e| AppError::metrics(e.to_string()))?;

        log::info!("[NAV] Navigating to {url}");
        Self::navigate(&page, url).await?;
        Self::await_first_paint(&page).await?;

        tokio::time::sleep(SETTLE_DELAY).await;
        page.evaluate(SCROLL_JS)
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?;
        tokio::time::sleep(SETTLE_DELAY).await;

        let ttfb_ms: f64 = page
            .evaluate(TTFB_JS)
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?
            .into_value()
            .map_err(|e| AppError::metrics(e.to_string()))?;

        let requests = capture.finish();
        log::info!(
            "[NAV] Stabilized {url}: {} requests captured, ttfb {ttfb_ms:.0}ms",
            requests.len()
        );

        Ok(StabilizedPage { page, requests, ttfb_ms })
    }

    async fn navigate(page: &Page, url: &Url) -> Result<()> {
        let navigation = async {
            page.goto(url.as_str()).await?;
            page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(RENDER_TIMEOUT, navigation).await {
            Err(_) => Err(AppError::NavigationTimeout {
                phase: "load",
                timeout_ms: RENDER_TIMEOUT.as_millis() as u64,
            }),
            Ok(Err(e)) => Err(AppError::network(e.to_string())),
            Ok(Ok(())) => Ok(()),
        }
    }

    async fn await_first_paint(page: &Page) -> Result<()> {
        let deadline = tokio::time::Instant::now() + FIRST_PAINT_TIMEOUT;
        loop {
            let painted: bool = page
                .evaluate(FIRST_PAINT_JS)
                .await
                .map_err(|e| AppError::metrics(e.to_string()))?
                .into_value()
                .map_err(|e| AppError::metrics(e.to_string()))?;
            if painted {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AppError::NavigationTimeout {
                    phase: "first-paint",
                    timeout_ms: FIRST_PAINT_TIMEOUT.as_millis() as u64,
                });
            }
            tokio::time::sleep(FIRST_PAINT_POLL).await;
        }
    }
}
