use std::process::{Command, Stdio};

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ConfigError, ProviderError};
use crate::provider::{ImageProvider, RawImage};

#[derive(Deserialize)]
struct DescribeImagesOutput {
    #[serde(rename = "Images")]
    #[serde(default)]
    images: Vec<RawImage>,
}

/// `ImageProvider` backed by the `aws` command-line tool. Credentials,
/// profiles and endpoints are whatever the CLI resolves.
pub struct AwsCli {
    program: String,
}

impl AwsCli {
    /// Check that the CLI binary runs at all.
    pub fn locate(program: &str) -> Result<Self, ConfigError> {
        let status = Command::new(program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| ConfigError::CliUnavailable { path: program.to_string(), source })?;

        if !status.success() {
            return Err(ConfigError::CliUnavailable {
                path: program.to_string(),
                source: std::io::Error::other(format!("`{} --version` exited with {}", program, status)),
            });
        }
        Ok(Self { program: program.to_string() })
    }

    async fn run(&self, label: &str, args: &[&str]) -> Result<Vec<u8>, ProviderError> {
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .env("AWS_PAGER", "")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ProviderError::Spawn { command: label.to_string(), source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ProviderError::Command { command: label.to_string(), message });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl ImageProvider for AwsCli {
    #[tracing::instrument(skip(self))]
    async fn list_images(
        &self,
        owner: &str,
        name_filter: &str,
        region: &str,
    ) -> Result<Vec<RawImage>, ProviderError> {
        let filter = format!("Name=name,Values={}", name_filter);
        let stdout = self
            .run(
                "aws ec2 describe-images",
                &[
                    "ec2", "describe-images",
                    "--region", region,
                    "--owners", owner,
                    "--filters", &filter,
                    "--output", "json",
                ],
            )
            .await?;
        parse_describe_images(&stdout)
    }

    #[tracing::instrument(skip(self))]
    async fn revoke_public_launch(&self, region: &str, image_id: &str) -> Result<(), ProviderError> {
        self.run(
            "aws ec2 modify-image-attribute",
            &[
                "ec2", "modify-image-attribute",
                "--region", region,
                "--image-id", image_id,
                "--launch-permission", "Remove=[{Group=all}]",
            ],
        )
        .await?;
        Ok(())
    }
}

fn parse_describe_images(stdout: &[u8]) -> Result<Vec<RawImage>, ProviderError> {
    let text = String::from_utf8_lossy(stdout);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let output: DescribeImagesOutput = serde_json::from_str(text.trim()).map_err(|source| {
        ProviderError::Decode { command: "aws ec2 describe-images".to_string(), source }
    })?;
    Ok(output.images)
}
