use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::image::{ContainerImageList, ImageIdentifier};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Seconds between periodic checks.
    pub interval_secs: u64,
    /// Serve `/webhook/generic`.
    pub webhook_enabled: bool,
    pub webhook_port: u16,
    pub images: Vec<ImageIdentifier>,
    /// Also match the registry when looking for running images.
    pub strict_registry: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: 120,
            webhook_enabled: true,
            webhook_port: 8080,
            images: Vec::new(),
            strict_registry: false,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("image-updater.toml"))
                .merge(Json::file("image-updater.json"))
                .merge(Env::prefixed("IMAGE_UPDATER_")),
        )
    }

    fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Config = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        if config.interval_secs == 0 {
            anyhow::bail!("interval_secs must be greater than zero");
        }

        Ok(config)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The port to serve the webhook on, if it is enabled.
    pub fn webhook_port(&self) -> Option<u16> {
        self.webhook_enabled.then_some(self.webhook_port)
    }

    pub fn watched_images(&self) -> ContainerImageList {
        self.images.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::from_figment(defaults()).unwrap();
        assert_eq!(config.interval(), Duration::from_secs(120));
        assert_eq!(config.webhook_port(), Some(8080));
        assert!(config.watched_images().is_empty());
        assert!(!config.strict_registry);
    }

    #[test]
    fn toml_overrides_defaults() {
        let figment = defaults().merge(Toml::string(
            r#"
            interval_secs = 30
            webhook_port = 9000
            strict_registry = true
            images = ["nginx:1.25", "app=gcr.io/team/app@sha256:abc"]
            "#,
        ));
        let config = Config::from_figment(figment).unwrap();

        assert_eq!(config.interval(), Duration::from_secs(30));
        assert_eq!(config.webhook_port(), Some(9000));
        assert!(config.strict_registry);

        let images = config.watched_images();
        assert_eq!(images.len(), 2);
        assert_eq!(images.to_string(), "nginx:1.25,app=gcr.io/team/app@sha256:abc");
    }

    #[test]
    fn webhook_can_be_disabled() {
        let figment = defaults().merge(Toml::string(
            r#"
            webhook_enabled = false
            webhook_port = 9000
            "#,
        ));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.webhook_port(), None);

        let figment = defaults().merge(Json::string(r#"{ "webhook_enabled": false }"#));
        assert_eq!(Config::from_figment(figment).unwrap().webhook_port(), None);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let figment = defaults().merge(Toml::string("interval_secs = 0"));
        assert!(Config::from_figment(figment).is_err());
    }
}
