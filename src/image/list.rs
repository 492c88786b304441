use std::fmt;

use super::ImageIdentifier;

/// An ordered collection of images, typically the ones currently running.
///
/// Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerImageList(Vec<ImageIdentifier>);

impl ContainerImageList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, image: ImageIdentifier) {
        self.0.push(image);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageIdentifier> {
        self.0.iter()
    }

    /// Returns the first image naming the same repository as `candidate`.
    ///
    /// Tags, digests and aliases are ignored. In `strict` mode the registry
    /// must match too.
    pub fn contains_image(
        &self,
        candidate: &ImageIdentifier,
        strict: bool,
    ) -> Option<&ImageIdentifier> {
        self.0.iter().find(|image| {
            image.name() == candidate.name()
                && (!strict || image.registry_url() == candidate.registry_url())
        })
    }

    /// The raw strings every image was parsed from.
    pub fn originals(&self) -> Vec<&str> {
        self.0.iter().map(ImageIdentifier::original).collect()
    }
}

impl fmt::Display for ContainerImageList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, image) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", image)?;
        }
        Ok(())
    }
}

impl FromIterator<ImageIdentifier> for ContainerImageList {
    fn from_iter<I: IntoIterator<Item = ImageIdentifier>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ImageIdentifier> for ContainerImageList {
    fn extend<I: IntoIterator<Item = ImageIdentifier>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ContainerImageList {
    type Item = ImageIdentifier;
    type IntoIter = std::vec::IntoIter<ImageIdentifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ContainerImageList {
    type Item = &'a ImageIdentifier;
    type IntoIter = std::slice::Iter<'a, ImageIdentifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(names: &[&str]) -> ContainerImageList {
        names.iter().copied().map(ImageIdentifier::parse).collect()
    }

    #[test]
    fn contains_image_ignores_tag_and_alias() {
        let images = list(&["a/a:0.1", "a/b:1.2", "x/y=foo.bar/a/c:0.23"]);

        let found = images
            .contains_image(&ImageIdentifier::parse("a/a:9.9"), false)
            .expect("same name, different tag");
        assert_eq!(found.original(), "a/a:0.1");

        assert!(images
            .contains_image(&ImageIdentifier::parse("a/b:1.2"), false)
            .is_some());
        assert!(images
            .contains_image(&ImageIdentifier::parse("x/y=foo.bar/a/c:0.23"), false)
            .is_some());
        assert!(images
            .contains_image(&ImageIdentifier::parse("a/c@sha256:abc"), false)
            .is_some());
        assert!(images
            .contains_image(&ImageIdentifier::parse("foo/bar"), false)
            .is_none());
    }

    #[test]
    fn strict_mode_compares_registry() {
        let images = list(&["foo.bar/a/c:0.23", "a/a:0.1"]);

        assert!(images
            .contains_image(&ImageIdentifier::parse("a/c"), false)
            .is_some());
        assert!(images
            .contains_image(&ImageIdentifier::parse("a/c"), true)
            .is_none());
        assert!(images
            .contains_image(&ImageIdentifier::parse("foo.bar/a/c:1.0"), true)
            .is_some());
        assert!(images
            .contains_image(&ImageIdentifier::parse("a/a:0.2"), true)
            .is_some());
    }

    #[test]
    fn first_match_wins() {
        let images = list(&["a/a:0.1", "a/a:0.2"]);
        let found = images
            .contains_image(&ImageIdentifier::parse("a/a"), false)
            .unwrap();
        assert_eq!(found.original(), "a/a:0.1");
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn display_and_originals() {
        let images = list(&["a/a:0.1", "invalid==foo"]);
        assert_eq!(images.originals(), vec!["a/a:0.1", "invalid==foo"]);
        assert_eq!(images.to_string(), "a/a:0.1,invalid==foo");
        assert_eq!(ContainerImageList::new().to_string(), "");
    }
}
