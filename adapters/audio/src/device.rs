//! Playback through the default rodio output stream.

use std::io::Cursor;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::{AudioError, PlaybackDevice, SoundData};

/// Default system output opened through rodio.
pub struct RodioDevice {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioDevice {
    /// Opens the default output device.
    pub fn open_default() -> Result<Self, AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|_| AudioError::DeviceUnavailable)?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

impl PlaybackDevice for RodioDevice {
    fn play(&mut self, key: &str, sound: &SoundData) -> Result<(), AudioError> {
        let failure = |reason: String| AudioError::Playback {
            key: key.to_owned(),
            reason,
        };
        let source = Decoder::new(Cursor::new(sound.bytes().to_vec()))
            .map_err(|error| failure(error.to_string()))?;
        let sink = Sink::try_new(&self.handle).map_err(|error| failure(error.to_string()))?;
        sink.append(source);
        sink.detach();
        Ok(())
    }
}
