//! Per-region inventory collection and record normalization.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use crate::config::Config;
use crate::error::ProviderError;
use crate::model::{ImageRecord, ImageStatus};
use crate::provider::{ImageProvider, RawImage};

const SOURCE_TAG_KEYS: &[&str] = &["SourceAMI", "source-ami"];

/// A region that could not be queried. It contributes no records.
#[derive(Debug)]
pub struct RegionFailure {
    pub region: String,
    pub error: ProviderError,
}

#[derive(Debug, Default)]
pub struct Inventory {
    /// Records from every region that answered, in configured region order.
    pub records: Vec<ImageRecord>,
    pub failures: Vec<RegionFailure>,
    pub regions_queried: usize,
}

impl Inventory {
    /// True when every region failed and nothing was collected.
    pub fn all_regions_failed(&self) -> bool {
        self.regions_queried > 0 && self.failures.len() == self.regions_queried
    }
}

/// Query every configured region once. Region queries run concurrently; a
/// failing region is logged and skipped.
pub async fn collect(provider: &dyn ImageProvider, config: &Config) -> Inventory {
    let queries = config.regions.iter().map(|region| async move {
        let result = provider.list_images(&config.owner, &config.name_filter, region).await;
        (region.as_str(), result)
    });

    let mut inventory = Inventory { regions_queried: config.regions.len(), ..Default::default() };
    for (region, result) in join_all(queries).await {
        match result {
            Ok(images) => {
                tracing::info!(region, count = images.len(), "fetched images");
                inventory
                    .records
                    .extend(images.into_iter().map(|raw| normalize(raw, region)));
            }
            Err(error) => {
                tracing::warn!(region, %error, "failed to fetch images, skipping region");
                inventory.failures.push(RegionFailure { region: region.to_string(), error });
            }
        }
    }
    inventory
}

/// Turn a raw provider image into a record for `region`.
pub fn normalize(raw: RawImage, region: &str) -> ImageRecord {
    let created = raw
        .creation_date
        .as_deref()
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.with_timezone(&Utc));

    let status = if raw.public { ImageStatus::Public } else { ImageStatus::Private };
    let copied_from = source_image(&raw);

    ImageRecord {
        id: raw.image_id,
        name: raw.name.unwrap_or_default(),
        region: region.to_string(),
        created,
        status,
        architecture: raw.architecture.unwrap_or_default(),
        copied_from,
        error: None,
    }
}

/// Origin image from a source tag, falling back to the first `ami-` token
/// in the description.
fn source_image(raw: &RawImage) -> Option<String> {
    let from_tag = raw
        .tags
        .iter()
        .find(|t| SOURCE_TAG_KEYS.contains(&t.key.as_str()))
        .map(|t| t.value.clone());
    if from_tag.is_some() {
        return from_tag;
    }

    raw.description
        .as_deref()?
        .split(' ')
        .find(|part| part.starts_with("ami-"))
        .map(str::to_string)
}
