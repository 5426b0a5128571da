use crate::audio::MediaItem;
use crate::error::CatalogError;
use std::path::{Path, PathBuf};

/// Ordered, index-addressed media for the session.
/// Built once per scan and replaced wholesale on refresh, never edited in place.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<MediaItem>,
    names: Vec<String>,
}

impl Catalog {
    /// `roots` are the scanned directories, used to shorten untagged names
    pub fn new(items: Vec<MediaItem>, roots: &[PathBuf]) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        let names = items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("[{}] {}", i + 1, item.display_name(roots)))
            .collect();

        Ok(Self { items, names })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Numbered playlist label for each item
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.items.iter().position(|item| item.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MediaMetadata;

    #[test]
    fn test_empty_catalog_is_rejected() {
        assert!(matches!(Catalog::new(Vec::new(), &[]), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_names_are_numbered_from_one() {
        let roots = vec![PathBuf::from("/m")];
        let tagged = MediaItem::new(PathBuf::from("/m/x.mp3")).with_metadata(MediaMetadata {
            artist: Some("Air".into()),
            title: Some("La Femme d'Argent".into()),
            ..Default::default()
        });
        let plain = MediaItem::new(PathBuf::from("/m/sub/y.ogg"));

        let catalog = Catalog::new(vec![tagged, plain], &roots).unwrap();
        assert_eq!(catalog.names(), ["[1] Air - La Femme d'Argent", "[2] sub/y.ogg"]);
        assert_eq!(catalog.position_of(Path::new("/m/sub/y.ogg")), Some(1));
        assert_eq!(catalog.position_of(Path::new("/m/z.ogg")), None);
    }
}
