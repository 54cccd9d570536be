//! Seam between the core and the cloud provider.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;

/// Image as reported by `DescribeImages`, before normalization.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct RawImage {
    #[serde(default)]
    pub image_id: String,
    pub name: Option<String>,
    pub creation_date: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub tags: Vec<RawTag>,
    pub description: Option<String>,
    pub architecture: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct RawTag {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Inventory and permission calls the core depends on.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Images owned by `owner` whose name matches `name_filter` in `region`.
    async fn list_images(
        &self,
        owner: &str,
        name_filter: &str,
        region: &str,
    ) -> Result<Vec<RawImage>, ProviderError>;

    /// Remove the "launch permission for all" grant from an image.
    async fn revoke_public_launch(&self, region: &str, image_id: &str) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_image_deserialize_partial() {
        let json = r#"{"ImageId":"ami-1","Name":"capa-ami-a","Public":true,"Tags":[{"Key":"SourceAMI","Value":"ami-0"}]}"#;
        let image: RawImage = serde_json::from_str(json).unwrap();
        assert_eq!(image.image_id, "ami-1");
        assert_eq!(image.name.as_deref(), Some("capa-ami-a"));
        assert!(image.public);
        assert_eq!(image.tags[0].key, "SourceAMI");
        assert!(image.description.is_none());
        assert!(image.creation_date.is_none());
    }
}
