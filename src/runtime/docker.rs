use super::ContainerRuntime;
use crate::image::{ContainerImageList, ImageIdentifier};
use anyhow::Result;
use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::models::ContainerSummary;
use bollard::Docker;
use log::{debug, warn};

#[derive(Default)]
pub struct DockerRuntime;

impl DockerRuntime {
    pub fn new() -> Self {
        Self
    }

    fn connect() -> Result<Docker> {
        // Connect to the local Docker daemon using default settings.
        // This handles unix socket on Linux.
        Docker::connect_with_local_defaults().map_err(Into::into)
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn running_images(&self) -> Result<ContainerImageList> {
        let docker = Self::connect()?;
        let opts = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let containers = docker.list_containers(Some(opts)).await?;
        debug!("Docker reports {} running containers", containers.len());

        Ok(images_of(&containers))
    }
}

fn images_of(containers: &[ContainerSummary]) -> ContainerImageList {
    containers
        .iter()
        .filter_map(|c| match c.image.as_deref() {
            Some(image) if !image.is_empty() => Some(ImageIdentifier::parse(image)),
            _ => {
                warn!(
                    "Container {} has no image reference",
                    c.id.as_deref().unwrap_or("<unknown>")
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(id: &str, image: Option<&str>) -> ContainerSummary {
        ContainerSummary {
            id: Some(id.to_string()),
            image: image.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn images_are_parsed_from_summaries() {
        let containers = vec![
            container("1", Some("gcr.io/team/app:1.0")),
            container("2", None),
            container("3", Some("")),
            container("4", Some("nginx@sha256:abc")),
        ];

        let images = images_of(&containers);
        assert_eq!(images.originals(), vec!["gcr.io/team/app:1.0", "nginx@sha256:abc"]);
        assert_eq!(images.iter().next().unwrap().registry_url(), Some("gcr.io"));
    }
}
