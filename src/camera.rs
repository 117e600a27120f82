use colored::*;
use image::RgbImage;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    Denied(String),
    #[error("no camera available")]
    NoDevice,
    #[error("camera backend error: {0}")]
    Backend(String),
    #[error("failed to read frame: {0}")]
    Frame(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    User,
}

/// What the screen asks the host for: one video stream, never audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing: Facing,
    pub audio: bool,
    pub index: u32,
}

impl StreamRequest {
    pub fn front_camera(index: u32) -> Self {
        Self {
            facing: Facing::User,
            audio: false,
            index,
        }
    }
}

pub trait VideoTrack {
    fn label(&self) -> String;
    fn resolution(&self) -> (u32, u32);
    fn read_frame(&mut self) -> Result<RgbImage, CameraError>;
    fn stop(&mut self);
    fn is_live(&self) -> bool;
}

pub struct MediaStream {
    tracks: Vec<Box<dyn VideoTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Box<dyn VideoTrack>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Box<dyn VideoTrack>] {
        &self.tracks
    }

    /// Stops every live track and returns how many were stopped.
    pub fn stop_all(&mut self) -> usize {
        let mut stopped = 0;
        for track in self.tracks.iter_mut().filter(|t| t.is_live()) {
            track.stop();
            stopped += 1;
        }
        stopped
    }
}

/// Host side of the capture boundary.
pub trait CaptureDevice {
    fn acquire(&mut self, request: &StreamRequest) -> Result<MediaStream, CameraError>;
}

/// Exclusively owns the stream acquired for one mount of the scan screen.
/// Tracks are stopped on `release` or drop, whichever comes first.
pub struct CameraSession {
    stream: Option<MediaStream>,
    active: bool,
    mirror: bool,
    failure: Option<CameraError>,
}

impl CameraSession {
    /// Requests the stream once. Failure leaves the session inactive; it is
    /// logged and never retried.
    pub fn open(device: &mut dyn CaptureDevice, request: &StreamRequest, mirror: bool) -> Self {
        // A grant without tracks has nothing to show.
        let acquired = device.acquire(request).and_then(|stream| {
            if stream.tracks().is_empty() {
                Err(CameraError::NoDevice)
            } else {
                Ok(stream)
            }
        });
        match acquired {
            Ok(stream) => {
                if let Some(track) = stream.tracks().first() {
                    let (w, h) = track.resolution();
                    println!("{}", format!("Opened camera: {} ({}x{})", track.label(), w, h).green());
                }
                Self {
                    stream: Some(stream),
                    active: true,
                    mirror,
                    failure: None,
                }
            }
            Err(e) => {
                match &e {
                    CameraError::Denied(_) | CameraError::NoDevice => log::warn!("Camera unavailable: {}", e),
                    _ => log::error!("Camera acquisition failed: {}", e),
                }
                Self {
                    stream: None,
                    active: false,
                    mirror,
                    failure: Some(e),
                }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirror
    }

    pub fn failure(&self) -> Option<&CameraError> {
        self.failure.as_ref()
    }

    pub fn resolution(&self) -> Option<(u32, u32)> {
        self.stream
            .as_ref()
            .and_then(|s| s.tracks().first())
            .map(|t| t.resolution())
    }

    /// Next frame from the first live track, flipped horizontally when mirrored.
    pub fn frame(&mut self) -> Option<RgbImage> {
        if !self.active {
            return None;
        }
        let track = self.stream.as_mut()?.tracks.iter_mut().find(|t| t.is_live())?;
        match track.read_frame() {
            Ok(mut frame) => {
                if self.mirror {
                    image::imageops::flip_horizontal_in_place(&mut frame);
                }
                Some(frame)
            }
            Err(e) => {
                log::debug!("Dropped frame: {}", e);
                None
            }
        }
    }

    /// Stops every acquired track. Safe to call any number of times; returns
    /// the number of tracks stopped by this call.
    pub fn release(&mut self) -> usize {
        self.active = false;
        match self.stream.take() {
            Some(mut stream) => {
                let stopped = stream.stop_all();
                log::debug!("Released camera session ({} track(s) stopped)", stopped);
                stopped
            }
            None => 0,
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

pub struct NokhwaTrack {
    camera: Camera,
    live: bool,
}

impl VideoTrack for NokhwaTrack {
    fn label(&self) -> String {
        self.camera.info().human_name()
    }

    fn resolution(&self) -> (u32, u32) {
        let res = self.camera.resolution();
        (res.width(), res.height())
    }

    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        let frame = self.camera.frame().map_err(|e| CameraError::Frame(e.to_string()))?;
        frame
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Frame(e.to_string()))
    }

    fn stop(&mut self) {
        if !self.live {
            return;
        }
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Failed to stop camera stream: {}", e);
        }
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

/// Desktop capture through nokhwa. Desktop cameras have no facing mode, so
/// the configured index stands in for the front camera.
#[derive(Default)]
pub struct NokhwaDevice;

impl CaptureDevice for NokhwaDevice {
    fn acquire(&mut self, request: &StreamRequest) -> Result<MediaStream, CameraError> {
        let cameras = nokhwa::query(ApiBackend::Auto).map_err(|e| classify(e.to_string()))?;
        if cameras.is_empty() {
            return Err(CameraError::NoDevice);
        }

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(request.index), requested)
            .map_err(|e| classify(e.to_string()))?;
        camera.open_stream().map_err(|e| classify(e.to_string()))?;
        log::info!("Format: {}", camera.camera_format());

        Ok(MediaStream::new(vec![Box::new(NokhwaTrack { camera, live: true })]))
    }
}

fn classify(message: String) -> CameraError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized") {
        CameraError::Denied(message)
    } else {
        CameraError::Backend(message)
    }
}

/// (index, name) for every camera the host reports.
pub fn list_devices() -> anyhow::Result<Vec<(String, String)>> {
    let cameras = nokhwa::query(ApiBackend::Auto)?;
    Ok(cameras
        .into_iter()
        .map(|cam| (cam.index().to_string(), cam.human_name()))
        .collect())
}
