//! Poll loop driven by the update trigger.
//!
//! On every pulse the loop asks the container runtime which images are
//! running and compares them with the watched images.

use log::{error, info, warn};

use crate::image::{ContainerImageList, ImageIdentifier};
use crate::runtime::ContainerRuntime;
use crate::trigger::Listener;

/// Outcome of checking one watched image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCheck {
    /// No running container uses the image.
    NotRunning { watched: ImageIdentifier },
    /// A running container uses the watched version.
    UpToDate { watched: ImageIdentifier },
    /// A running container uses another tag, digest or registry.
    Outdated {
        watched: ImageIdentifier,
        running: ImageIdentifier,
    },
}

/// Classifies every watched image against the running ones.
///
/// A watched image without a tag accepts any running version. Registries
/// are compared when both images name one.
pub fn check_images(
    watched: &ContainerImageList,
    running: &ContainerImageList,
    strict: bool,
) -> Vec<ImageCheck> {
    watched
        .iter()
        .map(|image| match running.contains_image(image, strict) {
            None => ImageCheck::NotRunning {
                watched: image.clone(),
            },
            Some(current) if image.tag().is_some() && image.differs_from(current, true) => {
                ImageCheck::Outdated {
                    watched: image.clone(),
                    running: current.clone(),
                }
            }
            Some(_) => ImageCheck::UpToDate {
                watched: image.clone(),
            },
        })
        .collect()
}

/// Runs until `listener` ends.
pub async fn run_poll_loop<R>(
    watched: ContainerImageList,
    runtime: R,
    mut listener: Listener,
    strict: bool,
) where
    R: ContainerRuntime + Send + Sync,
{
    info!("Watching {} images: {}", watched.len(), watched);

    while listener.recv().await.is_some() {
        let running = match runtime.running_images().await {
            Ok(running) => running,
            Err(e) => {
                error!("Failed to list running images: {}", e);
                continue;
            }
        };

        for check in check_images(&watched, &running, strict) {
            match check {
                ImageCheck::NotRunning { watched } => {
                    info!("Image {} is not running", watched.full_name_without_tag());
                }
                ImageCheck::UpToDate { watched } => {
                    info!("Image {} is up to date", watched.full_name_with_tag());
                }
                ImageCheck::Outdated { watched, running } => {
                    warn!(
                        "Image {} is running as {}",
                        watched.full_name_with_tag(),
                        running.full_name_with_tag()
                    );
                }
            }
        }
    }

    info!("Update trigger closed, poll loop shutting down");
}
