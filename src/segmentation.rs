//! Motion segmentation producing one region measurement per video frame.
//!
//! The frame is converted to grayscale and blurred, a foreground mask is
//! extracted (MOG2 background subtraction or differencing against a stored
//! background frame), thresholded, cleaned with a morphological opening,
//! and the largest external contour is taken as the tracked region.

use log::debug;
use opencv::{
    core::{self, Mat, Point, Ptr, Size, Vector},
    imgproc,
    prelude::*,
    video,
};

use crate::config::{SegmentationConfig, SegmentationMethod};
use crate::source::{Measurement, Region};
use crate::utils::{region_extent, square_region};
use crate::Result;

enum Backend {
    Mog2(Ptr<video::BackgroundSubtractorMOG2>),
    FrameDifference {
        background: Option<Mat>,
        frames_since_refresh: u32,
    },
}

/// Foreground region extractor
pub struct MotionSegmenter {
    config: SegmentationConfig,
    backend: Backend,
    kernel: Mat,
}

impl MotionSegmenter {
    /// Create a segmenter from validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or `OpenCV` cannot
    /// create the background subtractor
    pub fn new(config: &SegmentationConfig) -> Result<Self> {
        config.validate()?;

        let backend = match config.method {
            SegmentationMethod::Mog2 => Backend::Mog2(video::create_background_subtractor_mog2(
                config.history,
                config.var_threshold,
                config.detect_shadows,
            )?),
            SegmentationMethod::FrameDifference => Backend::FrameDifference {
                background: None,
                frames_since_refresh: 0,
            },
        };

        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(config.morph_kernel, config.morph_kernel),
            Point::new(-1, -1),
        )?;

        Ok(Self {
            config: config.clone(),
            backend,
            kernel,
        })
    }

    /// Measure the largest moving region in a BGR frame
    ///
    /// # Errors
    ///
    /// Returns an error if any `OpenCV` operation fails
    pub fn segment(&mut self, frame: &Mat) -> Result<Measurement> {
        let gray = self.preprocess(frame)?;

        let Some(foreground) = self.foreground(gray)? else {
            return Ok(Measurement::absent());
        };

        let mut mask = Mat::default();
        imgproc::threshold(
            &foreground,
            &mut mask,
            self.config.binary_threshold,
            255.0,
            imgproc::THRESH_BINARY,
        )?;

        let mut cleaned = Mat::default();
        imgproc::morphology_ex(
            &mask,
            &mut cleaned,
            imgproc::MORPH_OPEN,
            &self.kernel,
            Point::new(-1, -1),
            self.config.morph_iterations,
            core::BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )?;

        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours_def(
            &cleaned,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
        )?;

        let mut largest: Option<(f64, Vector<Point>)> = None;
        for contour in contours.iter() {
            let area = imgproc::contour_area_def(&contour)?;
            if largest.as_ref().map_or(true, |(best, _)| area > *best) {
                largest = Some((area, contour));
            }
        }

        match largest {
            Some((area, contour)) if area > self.config.min_region_area => {
                let rect = imgproc::bounding_rect(&contour)?;
                let raw = Region::new(rect.x, rect.y, rect.width, rect.height);
                let region = if self.config.square_box {
                    square_region(raw, frame.cols(), frame.rows())
                } else {
                    raw
                };
                let extent = region_extent(raw, self.config.square_box);
                debug!("Largest region area {area:.0}, extent {extent:.0}");
                Ok(Measurement::with_region(extent, region))
            }
            _ => Ok(Measurement::absent()),
        }
    }

    fn preprocess(&self, frame: &Mat) -> Result<Mat> {
        let mut gray = Mat::default();
        imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;

        if self.config.blur_kernel == 0 {
            return Ok(gray);
        }

        let mut blurred = Mat::default();
        imgproc::gaussian_blur_def(
            &gray,
            &mut blurred,
            Size::new(self.config.blur_kernel, self.config.blur_kernel),
            0.0,
        )?;
        Ok(blurred)
    }

    /// Foreground mask for this frame, `None` while no background is known
    fn foreground(&mut self, gray: Mat) -> Result<Option<Mat>> {
        let refresh_every = self.config.background_refresh_frames;

        match &mut self.backend {
            Backend::Mog2(subtractor) => {
                let mut mask = Mat::default();
                subtractor.apply(&gray, &mut mask, -1.0)?;
                Ok(Some(mask))
            }
            Backend::FrameDifference {
                background,
                frames_since_refresh,
            } => {
                let Some(reference) = background.as_ref() else {
                    *background = Some(gray);
                    *frames_since_refresh = 0;
                    return Ok(None);
                };

                let mut diff = Mat::default();
                core::absdiff(reference, &gray, &mut diff)?;

                *frames_since_refresh += 1;
                if *frames_since_refresh >= refresh_every {
                    *background = Some(gray);
                    *frames_since_refresh = 0;
                }
                Ok(Some(diff))
            }
        }
    }
}
