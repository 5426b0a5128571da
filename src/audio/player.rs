use super::{BackendEvent, MediaItem, PlaybackTicket, PlayerBackend};
use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use rodio::source::EmptyCallback;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// In-process audio playback through rodio.
///
/// The output stream is opened on first use so a machine without a sound
/// device can still browse the catalog and play video.
pub struct AudioPlayer {
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    volume: f32, // 0.0 to 1.0
    event_sender: mpsc::UnboundedSender<BackendEvent>,
}

impl AudioPlayer {
    pub fn new(volume_percent: u8, event_sender: mpsc::UnboundedSender<BackendEvent>) -> Self {
        Self {
            output: None,
            sink: None,
            volume: percent_to_gain(volume_percent),
            event_sender,
        }
    }

    fn output_handle(&mut self) -> BackendResult<&OutputStreamHandle> {
        if self.output.is_none() {
            let output = OutputStream::try_default().map_err(|e| BackendError::AudioDevice(e.to_string()))?;
            info!("Opened default audio output");
            self.output = Some(output);
        }

        match &self.output {
            Some((_, handle)) => Ok(handle),
            None => Err(BackendError::AudioDevice("output stream not initialised".to_string())),
        }
    }

    fn open_source(path: &Path) -> BackendResult<Decoder<BufReader<File>>> {
        let file = File::open(path).map_err(|source| BackendError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Decoder::new(BufReader::new(file)).map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[async_trait(?Send)]
impl PlayerBackend for AudioPlayer {
    async fn start(&mut self, item: &MediaItem, ticket: PlaybackTicket) -> BackendResult<u32> {
        self.stop().await?;

        let source = Self::open_source(&item.path)?;
        let duration = source
            .total_duration()
            .or_else(|| probe_duration(&item.path))
            .map(whole_seconds)
            .unwrap_or(0);

        let volume = self.volume;
        let handle = self.output_handle()?;
        let sink = Sink::try_new(handle).map_err(|e| BackendError::AudioDevice(e.to_string()))?;
        sink.set_volume(volume);
        sink.append(source);

        // Runs once the decoder above is exhausted; the ticket tells the
        // controller whether this sink is still the current one
        let sender = self.event_sender.clone();
        sink.append(EmptyCallback::<f32>::new(Box::new(move || {
            let _ = sender.send(BackendEvent::Finished(ticket));
        })));

        self.sink = Some(sink);
        debug!("Audio started: {} ({}s)", item.path.display(), duration);
        Ok(duration)
    }

    async fn stop(&mut self) -> BackendResult<()> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn set_volume(&mut self, percent: u8) {
        self.volume = percent_to_gain(percent);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn seek(&mut self, position_secs: u32) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.try_seek(Duration::from_secs(u64::from(position_secs))) {
                warn!("Seek to {}s not supported for this stream: {}", position_secs, e);
            }
        }
    }
}

/// Partial seconds round up so the 1 s clock never ends a track before the sink drains
fn whole_seconds(duration: Duration) -> u32 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

fn percent_to_gain(percent: u8) -> f32 {
    f32::from(percent.min(100)) / 100.0
}

/// Feature-gated duration probing using symphonia codec
#[cfg(feature = "probe")]
fn probe_duration(path: &Path) -> Option<Duration> {
    use symphonia::core::codecs::CODEC_TYPE_NULL;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let file = File::open(path).ok()?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .ok()?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)?;

    let time_base = track.codec_params.time_base?;
    let n_frames = track.codec_params.n_frames?;
    let time = time_base.calc_time(n_frames);
    Some(Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac))
}

#[cfg(not(feature = "probe"))]
fn probe_duration(_path: &Path) -> Option<Duration> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_gain() {
        assert_eq!(percent_to_gain(0), 0.0);
        assert_eq!(percent_to_gain(100), 1.0);
        assert_eq!(percent_to_gain(250), 1.0);
        assert!((percent_to_gain(35) - 0.35).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_seconds_round_up() {
        assert_eq!(whole_seconds(Duration::from_secs(180)), 180);
        assert_eq!(whole_seconds(Duration::from_millis(179_200)), 180);
        assert_eq!(whole_seconds(Duration::from_millis(400)), 1);
        assert_eq!(whole_seconds(Duration::ZERO), 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_reported_without_touching_output() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut player = AudioPlayer::new(100, tx);
        let item = MediaItem::new("/definitely/not/here.mp3".into());

        let result = player.start(&item, PlaybackTicket::default()).await;
        assert!(matches!(result, Err(BackendError::Open { .. })));
        assert!(player.output.is_none());
        assert!(player.stop().await.is_ok());
    }
}
