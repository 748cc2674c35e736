//! Camera / video-file front end for the proximity classifier.

use crate::{
    classifier::ProximityClassifier,
    config::Config,
    debounce::ProximityState,
    error::{Error, Result},
    pipeline::{self, RunSummary},
    segmentation::MotionSegmenter,
    source::{Measurement, MeasurementSource},
};
use log::{info, warn};
use opencv::{
    core::{Mat, Point, Rect, Scalar},
    highgui::{self, WINDOW_NORMAL},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use std::time::{Duration, Instant};

/// Consecutive failed camera reads tolerated before the stream is treated as ended
const MAX_READ_RETRIES: u32 = 5;

/// Video source type
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Frames from a capture device, segmented into measurements
pub struct SegmentedVideo {
    source: VideoSource,
    capture: VideoCapture,
    segmenter: MotionSegmenter,
}

impl SegmentedVideo {
    /// Open the video source and prepare the segmenter
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or the segmentation
    /// configuration is invalid
    pub fn open(source: VideoSource, config: &Config) -> Result<Self> {
        let capture = match &source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;
                cap.set(CAP_PROP_FRAME_WIDTH, f64::from(config.display.frame_width))?;
                cap.set(CAP_PROP_FRAME_HEIGHT, f64::from(config.display.frame_height))?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        if !capture.is_opened()? {
            return Err(Error::SourceError(match &source {
                VideoSource::Camera(index) => format!("Failed to open camera {index}"),
                VideoSource::File(path) => format!("Failed to open video file: {path}"),
            }));
        }

        let segmenter = MotionSegmenter::new(&config.segmentation)?;

        Ok(Self {
            source,
            capture,
            segmenter,
        })
    }

    /// Read and segment the next frame, `None` at end of stream
    ///
    /// # Errors
    ///
    /// Returns an error if an `OpenCV` operation fails
    pub fn next_frame(&mut self) -> Result<Option<(Mat, Measurement)>> {
        let mut failures = 0;
        loop {
            let mut frame = Mat::default();
            if self.capture.read(&mut frame)? && !frame.empty() {
                let measurement = self.segmenter.segment(&frame)?;
                return Ok(Some((frame, measurement)));
            }

            if matches!(self.source, VideoSource::File(_)) {
                info!("End of video file reached");
                return Ok(None);
            }

            failures += 1;
            if failures >= MAX_READ_RETRIES {
                warn!("Camera stopped delivering frames after {failures} attempts");
                return Ok(None);
            }
            warn!("Failed to read frame, retrying...");
        }
    }
}

impl MeasurementSource for SegmentedVideo {
    fn next_measurement(&mut self) -> Result<Option<Measurement>> {
        Ok(self.next_frame()?.map(|(_, measurement)| measurement))
    }
}

/// Main application struct
pub struct ProximityApp {
    config: Config,
    video: SegmentedVideo,
    classifier: ProximityClassifier,
}

impl ProximityApp {
    /// Create a new proximity monitoring application
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the video source
    /// cannot be opened
    pub fn new(config: Config, source: VideoSource) -> Result<Self> {
        info!("Initializing proximity monitor");
        config.validate()?;

        let classifier = config.create_classifier()?;
        let video = SegmentedVideo::open(source, &config)?;

        if config.display.gui {
            highgui::named_window(&config.display.window_name, WINDOW_NORMAL)?;
        }

        Ok(Self {
            config,
            video,
            classifier,
        })
    }

    /// Run until end of stream or until the user quits
    ///
    /// # Errors
    ///
    /// Returns an error if capture, segmentation or rendering fails
    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Starting main application loop");

        if !self.config.display.gui {
            return pipeline::run(&mut self.video, &mut self.classifier);
        }

        let mut transitions = Vec::new();
        let mut frame_count: u64 = 0;
        let start_time = Instant::now();
        let mut last_fps_update = Instant::now();
        let mut fps = 0.0;

        while let Some((frame, measurement)) = self.video.next_frame()? {
            let outcome = self.classifier.observe(&measurement)?;
            if let Some(transition) = outcome.transition {
                transitions.push(transition);
            }

            frame_count += 1;
            if last_fps_update.elapsed() >= Duration::from_secs(1) {
                fps = frame_count as f64 / start_time.elapsed().as_secs_f64();
                last_fps_update = Instant::now();
            }

            self.display(&frame, &measurement, outcome.state, fps)?;

            let key = highgui::wait_key(1)?;
            if key == 27 || key == i32::from(b'q') {
                info!("Exit requested by user");
                break;
            }
        }

        info!("Application shutting down");
        Ok(RunSummary {
            ticks: self.classifier.ticks(),
            transitions,
            final_state: self.classifier.current_state(),
        })
    }

    fn display(&self, frame: &Mat, measurement: &Measurement, state: ProximityState, fps: f64) -> Result<()> {
        let mut display_frame = frame.clone();
        let color = state_color(state);

        if let Some(region) = measurement.region {
            imgproc::rectangle(
                &mut display_frame,
                Rect::new(region.x, region.y, region.width, region.height),
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                LINE_8,
                0,
            )?;
        }

        imgproc::put_text(
            &mut display_frame,
            &state.to_string(),
            Point::new(10, 30),
            FONT_HERSHEY_SIMPLEX,
            1.0,
            color,
            2,
            LINE_8,
            false,
        )?;

        let info_text = format!("Extent: {:.0}  FPS: {:.1}", measurement.extent, fps);
        imgproc::put_text(
            &mut display_frame,
            &info_text,
            Point::new(10, 60),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            Scalar::new(255.0, 255.0, 255.0, 0.0),
            1,
            LINE_8,
            false,
        )?;

        highgui::imshow(&self.config.display.window_name, &display_frame)?;
        Ok(())
    }
}

/// Caption colour per state (BGR)
fn state_color(state: ProximityState) -> Scalar {
    match state {
        ProximityState::Stable => Scalar::new(0.0, 255.0, 255.0, 0.0),      // Yellow
        ProximityState::Approaching => Scalar::new(0.0, 0.0, 255.0, 0.0),   // Red
        ProximityState::Receding => Scalar::new(0.0, 255.0, 0.0, 0.0),      // Green
    }
}

impl Drop for ProximityApp {
    fn drop(&mut self) {
        if self.config.display.gui {
            if let Err(e) = highgui::destroy_all_windows() {
                warn!("Failed to close windows: {}", e);
            }
        }
    }
}
