//! Connect
//!
//! Asks the provider for a toolbar until one answers with a root id.

use log::{debug, info};

use crate::config::Settings;
use crate::timer;

use super::provider::{BookmarkProvider, Toolbar};

/// Try `connect_attempts` times to fetch the toolbar. `None` when no attempt
/// produced a toolbar with a root id.
pub async fn connect(provider: &dyn BookmarkProvider, settings: &Settings) -> Option<Toolbar> {
    let attempts = settings.connect_attempts.max(1);
    for attempt in 1..=attempts {
        match timer::timeout(settings.connect_timeout(), provider.get_toolbar()).await {
            Ok(Ok(toolbar)) if toolbar.root_id().is_some() => {
                info!("bookmarks provider connected after {} attempt(s)", attempt);
                return Some(toolbar);
            }
            Ok(Ok(_)) => debug!("connect attempt {}: provider has no toolbar", attempt),
            Ok(Err(e)) => debug!("connect attempt {} failed: {}", attempt, e),
            Err(_) => debug!("connect attempt {} timed out", attempt),
        }
        if attempt < attempts {
            timer::sleep(settings.connect_retry_delay()).await;
        }
    }
    None
}
