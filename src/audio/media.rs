use super::MediaFormat;
use id3::TagLike;
use lofty::Accessor;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub path: PathBuf,
    pub format: MediaFormat,
    pub metadata: Option<MediaMetadata>,
}

/// Tag fields as read from the file. A missing field is `None`, never an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaMetadata {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub track: Option<u32>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub lyrics: Option<String>,
}

impl MediaItem {
    pub fn new(path: PathBuf) -> Self {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(MediaFormat::from_extension)
            .unwrap_or(MediaFormat::Unknown);

        Self {
            path,
            format,
            metadata: None,
        }
    }

    /// Attach tags; a record with every field absent is treated as no tags at all
    pub fn with_metadata(mut self, metadata: MediaMetadata) -> Self {
        self.metadata = if metadata.is_empty() { None } else { Some(metadata) };
        self
    }

    pub fn is_video(&self) -> bool {
        self.format.is_video()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.title.as_deref())
    }

    pub fn artist(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.artist.as_deref())
    }

    /// Playlist label: "Artist - Title", "Title", or the path relative to the
    /// scan root it was found under.
    pub fn display_name(&self, roots: &[PathBuf]) -> String {
        match (self.artist(), self.title()) {
            (Some(artist), Some(title)) => format!("{} - {}", artist, title),
            (None, Some(title)) => title.to_string(),
            _ => self.relative_path(roots),
        }
    }

    fn relative_path(&self, roots: &[PathBuf]) -> String {
        roots
            .iter()
            .find_map(|root| self.path.strip_prefix(root).ok())
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(|rel| rel.display().to_string())
            .unwrap_or_else(|| self.file_name())
    }
}

impl MediaMetadata {
    pub fn is_empty(&self) -> bool {
        self == &MediaMetadata::default()
    }

    pub fn from_id3_tag(tag: &id3::Tag) -> Self {
        Self {
            artist: non_empty(tag.artist()),
            title: non_empty(tag.title()),
            album: non_empty(tag.album()),
            track: tag.track(),
            year: tag.year(),
            genre: non_empty(tag.genre_parsed().as_deref()),
            lyrics: tag
                .lyrics()
                .map(|lyrics| lyrics.text.trim())
                .find(|text| !text.is_empty())
                .map(str::to_string),
        }
    }

    pub fn from_mp4_tag(tag: &mp4ameta::Tag) -> Self {
        Self {
            artist: non_empty(tag.artist()),
            title: non_empty(tag.title()),
            album: non_empty(tag.album()),
            track: tag.track_number().map(u32::from),
            year: tag.year().and_then(|y| y.get(..4)).and_then(|y| y.parse().ok()),
            genre: non_empty(tag.genre()),
            lyrics: non_empty(tag.lyrics()),
        }
    }

    pub fn from_lofty_tag(tag: &lofty::Tag) -> Self {
        Self {
            artist: non_empty(tag.artist().as_deref()),
            title: non_empty(tag.title().as_deref()),
            album: non_empty(tag.album().as_deref()),
            track: tag.track(),
            year: tag.year().and_then(|y| i32::try_from(y).ok()),
            genre: non_empty(tag.genre().as_deref()),
            lyrics: non_empty(tag.get_string(&lofty::ItemKey::Lyrics)),
        }
    }
}

// Tag readers hand back "" for frames that exist but carry nothing
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(artist: Option<&str>, title: Option<&str>) -> MediaMetadata {
        MediaMetadata {
            artist: artist.map(String::from),
            title: title.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_name_prefers_tags() {
        let roots = vec![PathBuf::from("/music")];
        let item = MediaItem::new(PathBuf::from("/music/a/01.mp3"))
            .with_metadata(tagged(Some("Linkin Park"), Some("Numb")));
        assert_eq!(item.display_name(&roots), "Linkin Park - Numb");

        let item = MediaItem::new(PathBuf::from("/music/a/01.mp3")).with_metadata(tagged(None, Some("Numb")));
        assert_eq!(item.display_name(&roots), "Numb");
    }

    #[test]
    fn test_display_name_falls_back_to_relative_path() {
        let roots = vec![PathBuf::from("/home/me/Music"), PathBuf::from("/home/me/Videos")];
        let item = MediaItem::new(PathBuf::from("/home/me/Videos/trip/clip.mkv"));
        assert_eq!(item.display_name(&roots), "trip/clip.mkv");

        // artist without title is not enough to build a label
        let item = MediaItem::new(PathBuf::from("/elsewhere/song.mp3")).with_metadata(tagged(Some("X"), None));
        assert_eq!(item.display_name(&roots), "song.mp3");
    }

    #[test]
    fn test_empty_metadata_is_absent() {
        let item = MediaItem::new(PathBuf::from("/m/a.flac")).with_metadata(MediaMetadata::default());
        assert!(item.metadata.is_none());
        assert_eq!(non_empty(Some("   ")), None);
    }

    #[test]
    fn test_video_flag_follows_extension() {
        assert!(MediaItem::new(PathBuf::from("/v/movie.webm")).is_video());
        assert!(!MediaItem::new(PathBuf::from("/m/song.ogg")).is_video());
    }
}
