use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistent setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_submission()?;
        self.validate_transcode()?;
        self.validate_delivery()?;

        if self.queue.topic.trim().is_empty() {
            anyhow::bail!("queue.topic must not be empty");
        }

        Ok(())
    }

    fn validate_submission(&self) -> anyhow::Result<()> {
        let submission = &self.submission;

        if submission.poll_interval.is_zero() {
            anyhow::bail!("submission.poll_interval must be greater than 0");
        }

        if submission.poll_interval > submission.wait_timeout {
            anyhow::bail!("submission.poll_interval must not exceed submission.wait_timeout");
        }

        if submission.job_timeout.is_zero() {
            anyhow::bail!("submission.job_timeout must be greater than 0");
        }

        if submission.max_text_length == 0 {
            anyhow::bail!("submission.max_text_length must be greater than 0");
        }

        Ok(())
    }

    fn validate_transcode(&self) -> anyhow::Result<()> {
        let transcode = &self.transcode;

        if transcode.sample_rate == 0 {
            anyhow::bail!("transcode.sample_rate must be greater than 0");
        }

        if transcode.channels == 0 {
            anyhow::bail!("transcode.channels must be greater than 0");
        }

        if transcode.extension.is_empty() || transcode.extension.contains(['.', '/']) {
            anyhow::bail!("transcode.extension must be a bare extension such as \"gsm\"");
        }

        Ok(())
    }

    fn validate_delivery(&self) -> anyhow::Result<()> {
        let Some(ref delivery) = self.delivery else {
            return Ok(());
        };

        if delivery.host.is_empty() {
            anyhow::bail!("delivery.host must not be empty");
        }

        if !delivery.remote_dir.starts_with('/') {
            anyhow::bail!("delivery.remote_dir must be an absolute path");
        }

        Ok(())
    }
}
