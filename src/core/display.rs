//! Display entity and its version/diff engine
//!
//! Persisted state lives under `display:{id}:*`:
//! `image` (indexed PNG), `version` (changes only when pixels change),
//! `last_update` (every render attempt) and `next_client_update`.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use epaper_core::constants::{
    DISPLAY_NAMESPACE, SUBKEY_IMAGE, SUBKEY_LAST_UPDATE, SUBKEY_NEXT_CLIENT_UPDATE,
    SUBKEY_VERSION, VERSION_ALPHABET, VERSION_LENGTH,
};
use epaper_core::staleness::max_age_from_secs;
use epaper_core::store::format_timestamp;
use epaper_core::{needs_refresh, BoxedWidget, Clock, KeyValueStore, StoreError, StoreHandle};
use epaper_render::{decode_indexed, encode_indexed, RasterImage, RenderResources};
use epaper_types::{Color, DisplayConfig, GlobalSettings};
use log::{debug, info};
use rand::Rng;
use tokio::sync::Mutex;

use super::pipeline::{draw_frame, fetch_inputs};

/// A fresh random version token
pub fn generate_version() -> String {
    let mut rng = rand::thread_rng();
    (0..VERSION_LENGTH)
        .map(|_| VERSION_ALPHABET[rng.gen_range(0..VERSION_ALPHABET.len())] as char)
        .collect()
}

/// Whether `new` differs from the stored encoded frame.
///
/// Nothing stored, an undecodable image or a palette change all count as
/// different.
pub fn is_different(stored: Option<&[u8]>, new: &RasterImage, palette: &[Color]) -> bool {
    let Some(bytes) = stored else {
        return true;
    };
    match decode_indexed(bytes) {
        Ok((old, old_palette)) => {
            old_palette.as_slice() != palette || old.difference_bbox(new).is_some()
        }
        Err(e) => {
            debug!("Stored image cannot be decoded, treating as changed: {:#}", e);
            true
        }
    }
}

/// Result of one `update()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Whether a new image and version were written
    pub changed: bool,
    /// Version after the update, if any image exists
    pub version: Option<String>,
}

pub struct Display {
    id: String,
    config: DisplayConfig,
    widgets: Vec<BoxedWidget>,
    store: StoreHandle,
    clock: Arc<dyn Clock>,
    resources: Arc<RenderResources>,
    settings: Arc<GlobalSettings>,
    /// Makes read-render-compare-write of this display mutually exclusive
    update_lock: Mutex<()>,
}

impl Display {
    pub fn new(
        id: &str,
        config: DisplayConfig,
        widgets: Vec<BoxedWidget>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        resources: Arc<RenderResources>,
        settings: Arc<GlobalSettings>,
    ) -> Self {
        Self {
            id: id.to_string(),
            config,
            widgets,
            store: StoreHandle::new(store, DISPLAY_NAMESPACE, id),
            clock,
            resources,
            settings,
            update_lock: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn aliases(&self) -> &[String] {
        &self.config.aliases
    }

    pub fn widgets(&self) -> &[BoxedWidget] {
        &self.widgets
    }

    /// Displays with no positive interval render on every request
    pub fn always_stale(&self) -> bool {
        self.config.update_interval_s <= 0
    }

    pub async fn version(&self) -> Result<Option<String>, StoreError> {
        self.store.get_string(SUBKEY_VERSION).await
    }

    pub async fn last_update(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.store.get_timestamp(SUBKEY_LAST_UPDATE).await
    }

    pub async fn next_client_update(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.store.get_timestamp(SUBKEY_NEXT_CLIENT_UPDATE).await
    }

    pub async fn image_bytes(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.store.get(SUBKEY_IMAGE).await
    }

    /// Render the current frame without touching the store
    pub async fn render(&self) -> Result<RasterImage> {
        let inputs = fetch_inputs(&self.id, &self.widgets).await;
        draw_frame(
            &self.id,
            &self.config,
            &self.widgets,
            &inputs,
            &self.resources,
            &self.settings,
            self.clock.now(),
        )
    }

    /// Render and store the frame; the version changes only with the pixels
    pub async fn update(&self) -> Result<UpdateOutcome> {
        let _guard = self.update_lock.lock().await;
        self.update_locked().await
    }

    /// Update when the last render is older than the update interval
    pub async fn update_if_needed(&self) -> Result<Option<UpdateOutcome>> {
        let _guard = self.update_lock.lock().await;
        let last_update = self.last_update().await?;
        let max_age = max_age_from_secs(Some(self.config.update_interval_s));
        if !needs_refresh(last_update, max_age, self.clock.now()) {
            debug!("Display {} is up to date", self.id);
            return Ok(None);
        }
        self.update_locked().await.map(Some)
    }

    async fn update_locked(&self) -> Result<UpdateOutcome> {
        let now = self.clock.now();
        let next_client_update = next_client_update(
            now,
            self.config.update_interval_s,
            self.config.client_update_delay_s,
        )?;
        let stored = self.store.get(SUBKEY_IMAGE).await?;
        let frame = self.render().await?;

        let mut version = None;
        let changed = is_different(stored.as_deref(), &frame, &self.config.colors);
        if changed {
            let new_version = generate_version();
            let encoded = encode_indexed(&frame, &self.config.colors, self.config.bits_per_pixel)?;
            self.store
                .set_many(vec![
                    (SUBKEY_IMAGE, encoded),
                    (SUBKEY_VERSION, new_version.clone().into_bytes()),
                ])
                .await?;
            info!("Display {} changed, new version {}", self.id, new_version);
            version = Some(new_version);
        } else {
            debug!("Display {} unchanged", self.id);
        }

        self.store
            .set_many(vec![
                (SUBKEY_LAST_UPDATE, format_timestamp(now).into_bytes()),
                (
                    SUBKEY_NEXT_CLIENT_UPDATE,
                    format_timestamp(next_client_update).into_bytes(),
                ),
            ])
            .await?;

        if version.is_none() {
            version = self.version().await?;
        }
        Ok(UpdateOutcome { changed, version })
    }
}

/// When a device is expected to fetch the frame rendered at `now`
pub fn next_client_update(
    now: DateTime<Utc>,
    update_interval_s: i64,
    client_update_delay_s: i64,
) -> Result<DateTime<Utc>> {
    update_interval_s
        .checked_add(client_update_delay_s)
        .and_then(Duration::try_seconds)
        .and_then(|wait| now.checked_add_signed(wait))
        .ok_or_else(|| {
            anyhow!(
                "next client update out of range: {} + {}s + {}s",
                now,
                update_interval_s,
                client_update_delay_s
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{display_config, static_source, widget_config, TestEnv};
    use serde_json::json;

    #[test]
    fn test_generate_version() {
        let a = generate_version();
        assert_eq!(a.len(), VERSION_LENGTH);
        assert!(a.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        assert_ne!(a, generate_version());
    }

    #[test]
    fn test_is_different() {
        let palette = vec![Color::WHITE, Color::BLACK];
        let frame = RasterImage::new(4, 4);
        let encoded = encode_indexed(&frame, &palette, 1).unwrap();

        assert!(is_different(None, &frame, &palette));
        assert!(!is_different(Some(&encoded), &frame, &palette));
        assert!(is_different(Some(b"garbage"), &frame, &palette));

        let mut changed = frame.clone();
        changed.set(3, 3, 1);
        assert!(is_different(Some(&encoded), &changed, &palette));

        let other_palette = vec![Color::WHITE, Color::new(255, 0, 0)];
        assert!(is_different(Some(&encoded), &frame, &other_palette));
    }

    #[tokio::test]
    async fn test_rerender_keeps_version_but_advances_last_update() {
        let env = TestEnv::new();
        let source = static_source("ds_text", json!({ "text": "hello" }));
        let display = env.display(
            "ep_a",
            display_config((120, 40), 0.0),
            vec![(widget_config("TextWidget", json!({ "format": "{text}" })), Some(source))],
        );

        let first = display.update().await.unwrap();
        assert!(first.changed);
        let v1 = display.version().await.unwrap().unwrap();
        assert_eq!(first.version.as_deref(), Some(v1.as_str()));
        let t1 = display.last_update().await.unwrap().unwrap();

        env.clock.advance(Duration::seconds(5));
        let second = display.update().await.unwrap();
        assert!(!second.changed);
        assert_eq!(display.version().await.unwrap(), Some(v1.clone()));
        assert_eq!(second.version, Some(v1));
        let t2 = display.last_update().await.unwrap().unwrap();
        assert_eq!(t2 - t1, Duration::seconds(5));

        let next = display.next_client_update().await.unwrap().unwrap();
        assert_eq!(next - t2, Duration::seconds(3600 + 30));
    }

    #[tokio::test]
    async fn test_pixel_change_bumps_version() {
        let env = TestEnv::new();
        let display = env.display(
            "ep_b",
            display_config((120, 40), 0.0),
            vec![(widget_config("DateWidget", json!({ "date_format": "%H:%M:%S" })), None)],
        );
        display.update().await.unwrap();
        let v1 = display.version().await.unwrap();

        env.clock.advance(Duration::seconds(1));
        let outcome = display.update().await.unwrap();
        assert!(outcome.changed);
        assert_ne!(display.version().await.unwrap(), v1);
    }

    #[tokio::test]
    async fn test_update_if_needed_respects_interval() {
        let env = TestEnv::new();
        let mut config = display_config((40, 40), 0.0);
        config.update_interval_s = 60;
        let display = env.display("ep_c", config, vec![]);

        assert!(display.update_if_needed().await.unwrap().is_some());
        env.clock.advance(Duration::seconds(59));
        assert!(display.update_if_needed().await.unwrap().is_none());
        env.clock.advance(Duration::seconds(1));
        assert!(display.update_if_needed().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_interval_is_always_stale() {
        let env = TestEnv::new();
        let mut config = display_config((40, 40), 0.0);
        config.update_interval_s = 0;
        let display = env.display("ep_d", config, vec![]);
        assert!(display.always_stale());
        assert!(display.update_if_needed().await.unwrap().is_some());
        assert!(display.update_if_needed().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_stored_image_is_indexed_png_of_rotated_frame() {
        let env = TestEnv::new();
        let display = env.display("ep_e", display_config((30, 10), 90.0), vec![]);
        display.update().await.unwrap();
        let bytes = display.image_bytes().await.unwrap().unwrap();
        let (frame, palette) = decode_indexed(&bytes).unwrap();
        assert_eq!((frame.width(), frame.height()), (10, 30));
        assert_eq!(palette, display.config().colors);
    }

    #[tokio::test]
    async fn test_oversized_interval_fails_without_panicking() {
        let env = TestEnv::new();
        let now = env.clock.now();
        assert_eq!(
            next_client_update(now, 3600, 30).unwrap() - now,
            Duration::seconds(3630)
        );
        assert!(next_client_update(now, i64::MAX, 30).is_err());
        assert!(next_client_update(now, i64::MAX / 1000, 0).is_err());

        let mut config = display_config((20, 20), 0.0);
        config.update_interval_s = i64::MAX / 1000;
        let display = env.display("ep_far", config, vec![]);
        assert!(display.update().await.is_err());
        assert!(display.next_client_update().await.unwrap().is_none());
        assert!(display.version().await.unwrap().is_none());
    }
}
