use crate::config::CameraConfig;
use opencv::{
    core::{self, Mat},
    highgui, imgproc,
    prelude::*,
    videoio,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    OpenCameraFailed(opencv::Error),
    #[error("Could not open webcam at device index {0}")]
    NotOpened(i32),
    #[error("Failed to read frame: {0}")]
    ReadFrameFailed(opencv::Error),
    #[error("OpenCV error: {0}")]
    OpenCvError(opencv::Error),
}

impl From<opencv::Error> for CameraError {
    fn from(err: opencv::Error) -> Self {
        CameraError::OpenCvError(err)
    }
}

pub const OVERLAY_ORIGIN: (i32, i32) = (50, 50);

pub fn overlay_text(estimate_kg: f64) -> String {
    format!("Estimated Weight: {:.2} kg", estimate_kg)
}

/// Draws the estimate in green at the top left of the frame.
pub fn draw_estimate(frame: &mut Mat, estimate_kg: f64) -> Result<(), CameraError> {
    imgproc::put_text(
        frame,
        &overlay_text(estimate_kg),
        core::Point::new(OVERLAY_ORIGIN.0, OVERLAY_ORIGIN.1),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        core::Scalar::new(0.0, 255.0, 0.0, 0.0),
        2,
        imgproc::LINE_AA,
        false,
    )?;
    Ok(())
}

/// Owns the video device and the preview window. Both are released on drop.
pub struct Camera {
    capture: videoio::VideoCapture,
    window_title: String,
    quit_key: char,
}

impl Camera {
    pub fn open(config: &CameraConfig) -> Result<Self, CameraError> {
        let capture = videoio::VideoCapture::new(config.device_index, videoio::CAP_ANY)
            .map_err(CameraError::OpenCameraFailed)?;
        if !capture.is_opened().map_err(CameraError::OpenCameraFailed)? {
            return Err(CameraError::NotOpened(config.device_index));
        }

        tracing::info!("Opened camera at device index {}", config.device_index);

        Ok(Self {
            capture,
            window_title: config.window_title.clone(),
            quit_key: config.quit_key,
        })
    }

    /// `Ok(None)` when the device delivered no frame.
    pub fn capture_frame(&mut self) -> Result<Option<Mat>, CameraError> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .map_err(CameraError::ReadFrameFailed)?;
        if !grabbed || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }

    pub fn show(&self, frame: &Mat) -> Result<(), CameraError> {
        highgui::imshow(&self.window_title, frame)?;
        Ok(())
    }

    /// Polls the window for one millisecond and reports whether the quit key
    /// was pressed.
    pub fn quit_requested(&self) -> Result<bool, CameraError> {
        let key = highgui::wait_key(1)?;
        Ok(is_quit_key(key, self.quit_key))
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            tracing::warn!("Failed to release camera: {}", e);
        }
        if let Err(e) = highgui::destroy_all_windows() {
            tracing::warn!("Failed to close windows: {}", e);
        }
    }
}

fn is_quit_key(key: i32, quit_key: char) -> bool {
    key >= 0 && (key & 0xFF) as u32 == u32::from(quit_key)
}
