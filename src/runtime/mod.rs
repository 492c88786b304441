use crate::image::ContainerImageList;
use anyhow::Result;
use async_trait::async_trait;

pub mod docker;
pub use docker::DockerRuntime;

#[async_trait]
pub trait ContainerRuntime {
    /// List the images of all currently running containers.
    async fn running_images(&self) -> Result<ContainerImageList>;
}
