use super::{default_extensions, MediaFormat, MediaItem, MediaMetadata};
use crate::error::{CatalogError, MetadataError, ScanError};
use crate::playback::Catalog;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use lofty::TaggedFileExt;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct MediaScanner {
    supported_extensions: Vec<String>,
}

impl MediaScanner {
    pub fn new() -> Self {
        Self::with_extensions(&default_extensions())
    }

    pub fn with_extensions(extensions: &[String]) -> Self {
        Self {
            supported_extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Walk one root in file-name order. Hidden files and directories are skipped.
    /// Only an unreadable root is an error; anything unreadable below it is logged and skipped.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<MediaItem>, ScanError> {
        let root = root.as_ref();
        let mut items = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) if source.depth() == 0 => {
                    return Err(ScanError::Unreadable {
                        path: root.to_path_buf(),
                        source,
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_supported_file(entry.path()) {
                items.push(self.create_item_from_file(entry.path()));
            }
        }

        debug!("Scanned {}: {} media files", root.display(), items.len());
        Ok(items)
    }

    /// Scan every root that exists and merge the results in root order
    pub fn scan_directories(&self, roots: &[PathBuf]) -> Result<Vec<MediaItem>, ScanError> {
        let mut all_items = Vec::new();

        for root in roots {
            if !root.exists() {
                warn!("Media directory {} does not exist, skipping", root.display());
                continue;
            }
            let mut items = self.scan_directory(root)?;
            all_items.append(&mut items);
        }

        Ok(all_items)
    }

    /// Scan and wrap the result as a catalog; zero playable items is an error
    pub fn build_catalog(&self, roots: &[PathBuf]) -> Result<Catalog, CatalogError> {
        let items = self.scan_directories(roots)?;
        let catalog = Catalog::new(items, roots)?;
        info!("Catalog built: {} items from {} roots", catalog.len(), roots.len());
        Ok(catalog)
    }

    fn is_supported_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let normalized = ext.to_ascii_lowercase();
                self.supported_extensions.contains(&normalized)
            })
            .unwrap_or(false)
    }

    fn create_item_from_file(&self, path: &Path) -> MediaItem {
        let item = MediaItem::new(path.to_path_buf());

        match read_metadata(path, item.format) {
            Ok(Some(metadata)) => item.with_metadata(metadata),
            Ok(None) => item,
            Err(e) => {
                // Keep the file; it is listed under its filename instead
                warn!("{}", e);
                item
            }
        }
    }
}

impl Default for MediaScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Read tags for formats we have a reader for. `Ok(None)` means the file simply has no tags.
pub fn read_metadata(path: &Path, format: MediaFormat) -> Result<Option<MediaMetadata>, MetadataError> {
    match format {
        MediaFormat::Mp3 => id3_metadata(path, id3::Tag::read_from_path(path)),
        MediaFormat::Wav => id3_metadata(path, id3::Tag::read_from_wav_path(path)),
        MediaFormat::M4a | MediaFormat::Mp4 | MediaFormat::Mov => match mp4ameta::Tag::read_from_path(path) {
            Ok(tag) => Ok(Some(MediaMetadata::from_mp4_tag(&tag))),
            Err(e) => Err(MetadataError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        },
        MediaFormat::Flac | MediaFormat::Ogg => vorbis_metadata(path),
        _ => Ok(None),
    }
}

// Only the tags are wanted here; stream properties come from the decoder at play time
fn vorbis_metadata(path: &Path) -> Result<Option<MediaMetadata>, MetadataError> {
    let error = |e: lofty::error::LoftyError| MetadataError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let tagged_file = lofty::Probe::open(path)
        .map_err(error)?
        .options(lofty::ParseOptions::new().read_properties(false))
        .read()
        .map_err(error)?;

    Ok(tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .map(MediaMetadata::from_lofty_tag))
}

fn id3_metadata(path: &Path, tag: id3::Result<id3::Tag>) -> Result<Option<MediaMetadata>, MetadataError> {
    match tag {
        Ok(tag) => Ok(Some(MediaMetadata::from_id3_tag(&tag))),
        Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => Ok(None),
        Err(e) => Err(MetadataError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"not really media").unwrap();
    }

    #[test]
    fn test_scan_filters_extensions_and_hidden_entries() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.mp3"));
        touch(&root.join("a.FLAC"));
        touch(&root.join("notes.txt"));
        touch(&root.join(".hidden.mp3"));
        touch(&root.join(".cache/inside.mp3"));
        touch(&root.join("videos/clip.mkv"));

        let items = MediaScanner::new().scan_directory(root).unwrap();
        let names: Vec<String> = items.iter().map(|i| i.file_name()).collect();

        assert_eq!(names, vec!["a.FLAC", "b.mp3", "clip.mkv"]);
        assert!(items[2].is_video());
    }

    #[test]
    fn test_unreadable_tags_fall_back_to_filename() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("broken.m4a"));

        let items = MediaScanner::new().scan_directory(dir.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].metadata.is_none());
        assert_eq!(items[0].display_name(&[dir.path().to_path_buf()]), "broken.m4a");
    }

    // Smallest FLAC lofty accepts: STREAMINFO plus a final VORBIS_COMMENT block, no frames
    fn flac_with_comments(comments: &[&str]) -> Vec<u8> {
        let mut bytes = b"fLaC".to_vec();
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 34]);
        bytes.extend_from_slice(&[0x10, 0x00, 0x10, 0x00]); // 4096-sample blocks
        bytes.extend_from_slice(&[0; 6]); // frame sizes unknown
        bytes.extend_from_slice(&[0x0A, 0xC4, 0x42, 0xF0, 0, 0, 0, 0]); // 44.1 kHz, stereo, 16 bit
        bytes.extend_from_slice(&[0; 16]); // MD5

        let vendor = b"tunedeck";
        let mut block = Vec::new();
        block.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        block.extend_from_slice(vendor);
        block.extend_from_slice(&(comments.len() as u32).to_le_bytes());
        for comment in comments {
            block.extend_from_slice(&(comment.len() as u32).to_le_bytes());
            block.extend_from_slice(comment.as_bytes());
        }

        let len = block.len() as u32;
        bytes.push(0x84); // last block, VORBIS_COMMENT
        bytes.extend_from_slice(&len.to_be_bytes()[1..]);
        bytes.extend_from_slice(&block);
        bytes
    }

    #[test]
    fn test_flac_vorbis_comments_are_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("track.flac");
        fs::write(
            &path,
            flac_with_comments(&[
                "ARTIST=Boards of Canada",
                "TITLE=Roygbiv",
                "ALBUM=Music Has the Right to Children",
                "TRACKNUMBER=11",
                "GENRE=Electronic",
            ]),
        )
        .unwrap();

        let metadata = read_metadata(&path, MediaFormat::Flac).unwrap().unwrap();
        assert_eq!(metadata.artist.as_deref(), Some("Boards of Canada"));
        assert_eq!(metadata.title.as_deref(), Some("Roygbiv"));
        assert_eq!(metadata.album.as_deref(), Some("Music Has the Right to Children"));
        assert_eq!(metadata.track, Some(11));
        assert_eq!(metadata.genre.as_deref(), Some("Electronic"));
        assert_eq!(metadata.lyrics, None);

        let items = MediaScanner::new().scan_directory(dir.path()).unwrap();
        assert_eq!(items[0].display_name(&[dir.path().to_path_buf()]), "Boards of Canada - Roygbiv");
    }

    #[test]
    fn test_flac_without_comments_uses_filename() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bare.flac"), flac_with_comments(&[])).unwrap();

        let items = MediaScanner::new().scan_directory(dir.path()).unwrap();
        assert!(items[0].metadata.is_none());
        assert_eq!(items[0].display_name(&[dir.path().to_path_buf()]), "bare.flac");
    }

    #[test]
    fn test_missing_root_is_a_scan_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = MediaScanner::new().scan_directory(&missing);
        assert!(matches!(result, Err(ScanError::Unreadable { .. })));
    }

    #[test]
    fn test_build_catalog_merges_roots_and_rejects_empty() {
        let music = tempdir().unwrap();
        let videos = tempdir().unwrap();
        touch(&music.path().join("song.mp3"));
        touch(&videos.path().join("film.mp4"));

        let scanner = MediaScanner::new();
        let roots = vec![
            music.path().to_path_buf(),
            videos.path().to_path_buf(),
            music.path().join("does-not-exist"),
        ];
        let catalog = scanner.build_catalog(&roots).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.get(0).unwrap().is_video());
        assert!(catalog.get(1).unwrap().is_video());

        let empty = tempdir().unwrap();
        let result = scanner.build_catalog(&[empty.path().to_path_buf()]);
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn test_custom_extensions() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.mp3"));
        touch(&dir.path().join("b.wav"));

        let scanner = MediaScanner::with_extensions(&[".WAV".to_string()]);
        let items = scanner.scan_directory(dir.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].file_name(), "b.wav");
    }
}
