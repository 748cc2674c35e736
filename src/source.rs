//! Measurement sources feeding the classifier one extent per tick.
//!
//! Video capture and segmentation live behind the [`MeasurementSource`]
//! trait; the classifier only ever sees the scalar extent. Replay sources
//! here make the pipeline usable without a camera.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use crate::{Error, Result};

/// Axis-aligned region geometry in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    #[must_use]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Area in square pixels
    #[must_use]
    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }
}

/// One tick worth of segmentation output
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    /// Size of the tracked region, `0.0` when nothing was detected
    pub extent: f64,
    /// Region geometry, kept for visualization only
    pub region: Option<Region>,
}

impl Measurement {
    #[must_use]
    pub fn new(extent: f64) -> Self {
        Self { extent, region: None }
    }

    #[must_use]
    pub fn with_region(extent: f64, region: Region) -> Self {
        Self {
            extent,
            region: Some(region),
        }
    }

    /// Nothing detected this tick
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.region.is_none() && self.extent == 0.0
    }
}

/// Producer of one measurement per tick
pub trait MeasurementSource {
    /// Poll the next measurement; `Ok(None)` signals end of stream
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input cannot be read or parsed
    fn next_measurement(&mut self) -> Result<Option<Measurement>>;
}

/// In-memory sequence of extents
pub struct ReplaySource {
    measurements: std::vec::IntoIter<Measurement>,
}

impl ReplaySource {
    /// Replay the given extents in order
    pub fn new<I>(extents: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let measurements: Vec<Measurement> = extents.into_iter().map(Measurement::new).collect();
        Self::from_measurements(measurements)
    }

    #[must_use]
    pub fn from_measurements(measurements: Vec<Measurement>) -> Self {
        Self {
            measurements: measurements.into_iter(),
        }
    }

    /// Measurements not yet replayed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.measurements.len()
    }
}

impl MeasurementSource for ReplaySource {
    fn next_measurement(&mut self) -> Result<Option<Measurement>> {
        Ok(self.measurements.next())
    }
}

/// Line-oriented text stream of extents
///
/// Each line is either a bare extent or `extent,x,y,width,height`. Blank
/// lines and lines starting with `#` are skipped; `-` or `none` marks a
/// tick with no detection.
pub struct ExtentFileSource<R> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl ExtentFileSource<BufReader<File>> {
    /// Open an extent file from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening extent file: {}", path.display());
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ExtentFileSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }

    fn parse_line(line: &str, line_number: usize) -> Result<Measurement> {
        if line.eq_ignore_ascii_case("none") || line == "-" {
            return Ok(Measurement::absent());
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let extent = fields[0].parse::<f64>().map_err(|_| {
            Error::SourceError(format!("line {line_number}: invalid extent '{}'", fields[0]))
        })?;

        match fields.len() {
            1 => Ok(Measurement::new(extent)),
            5 => {
                let mut coords = [0i32; 4];
                for (slot, raw) in coords.iter_mut().zip(&fields[1..]) {
                    *slot = raw.parse::<i32>().map_err(|_| {
                        Error::SourceError(format!("line {line_number}: invalid coordinate '{raw}'"))
                    })?;
                }
                let [x, y, width, height] = coords;
                Ok(Measurement::with_region(extent, Region::new(x, y, width, height)))
            }
            n => Err(Error::SourceError(format!(
                "line {line_number}: expected 1 or 5 fields, got {n}"
            ))),
        }
    }
}

impl<R: BufRead> MeasurementSource for ExtentFileSource<R> {
    fn next_measurement(&mut self) -> Result<Option<Measurement>> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return Self::parse_line(line, self.line_number).map(Some);
        }
    }
}
