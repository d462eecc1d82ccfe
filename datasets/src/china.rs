//! Colour pixels of a landscape photograph: the dense, low-dimensional regime.
//!
//! Every pixel is one observation with three features (red, green, blue) scaled to `[0, 1]`.
//! Pixels come either from a headerless CSV file with one `r,g,b` row of 8-bit values per
//! pixel, or from a procedurally drawn 427×640 scene that mimics the colour distribution of a
//! photograph (sky gradient, tiled roof, foliage).
use std::path::PathBuf;

use ndarray::{Array2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use tracing::debug;

use crate::dataset::array_from_path;
use crate::error::{DatasetError, Result};

/// Height of the built-in picture, in pixels
pub const HEIGHT: usize = 427;
/// Width of the built-in picture, in pixels
pub const WIDTH: usize = 640;
/// Number of colour channels per pixel
pub const N_CHANNELS: usize = 3;

// The scene is fixed, only the row order depends on the caller's seed.
const SCENE_SEED: u64 = 8;
const SENSOR_NOISE: f64 = 8.;

/// Where the pixels are read from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChinaSource {
    /// The procedurally drawn scene
    Synthetic,
    /// A CSV file (optionally gzipped) with one `r,g,b` row per pixel
    Csv(PathBuf),
}

impl Default for ChinaSource {
    fn default() -> Self {
        ChinaSource::Synthetic
    }
}

/// Load the pixel matrix with shape `(n_samples, 3)`.
///
/// Rows are shuffled with `seed` before keeping the first `n_samples` of them, all rows are
/// kept when `n_samples` is `None`.
pub fn china(source: &ChinaSource, n_samples: Option<usize>, seed: u64) -> Result<Array2<f64>> {
    let pixels = match source {
        ChinaSource::Synthetic => synthetic_scene(),
        ChinaSource::Csv(path) => {
            debug!(path = %path.display(), "reading pixels");
            let pixels = array_from_path(path)?;
            validate_pixels(&pixels)?;
            pixels
        }
    };

    let pixels = pixels.mapv(|v| v / 255.);
    shuffle_rows(pixels, n_samples, seed)
}

fn validate_pixels(pixels: &Array2<f64>) -> Result<()> {
    if pixels.nrows() == 0 {
        return Err(DatasetError::Empty("pixel file has no rows".into()));
    }
    if pixels.ncols() != N_CHANNELS {
        return Err(DatasetError::Channels {
            expected: N_CHANNELS,
            found: pixels.ncols(),
        });
    }
    match pixels.iter().find(|v| !(0. ..=255.).contains(*v)) {
        Some(v) => Err(DatasetError::PixelRange(*v)),
        None => Ok(()),
    }
}

fn shuffle_rows(pixels: Array2<f64>, n_samples: Option<usize>, seed: u64) -> Result<Array2<f64>> {
    let available = pixels.nrows();
    let mut indices: Vec<usize> = (0..available).collect();
    let mut rng = Isaac64Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    if let Some(requested) = n_samples {
        if requested > available {
            return Err(DatasetError::TooManySamples {
                requested,
                available,
            });
        }
        indices.truncate(requested);
    }

    Ok(pixels.select(Axis(0), &indices))
}

fn synthetic_scene() -> Array2<f64> {
    let mut rng = Isaac64Rng::seed_from_u64(SCENE_SEED);
    let noise = Uniform::new_inclusive(-SENSOR_NOISE, SENSOR_NOISE);

    let mut pixels = Array2::zeros((HEIGHT * WIDTH, N_CHANNELS));
    for (idx, mut pixel) in pixels.axis_iter_mut(Axis(0)).enumerate() {
        let base = scene_colour(idx / WIDTH, idx % WIDTH);
        for (channel, value) in pixel.iter_mut().zip(base.iter()) {
            *channel = (value + noise.sample(&mut rng)).round().clamp(0., 255.);
        }
    }
    pixels
}

/// Noise-free colour of the scene at `(row, col)`
fn scene_colour(row: usize, col: usize) -> [f64; N_CHANNELS] {
    let y = row as f64 / HEIGHT as f64;
    let x = col as f64 / WIDTH as f64;

    if y < 0.35 {
        // brighter towards the horizon
        let t = y / 0.35;
        [150. + 45. * t, 185. + 30. * t, 225. + 15. * t]
    } else if y < 0.8 && (0.2..0.8).contains(&x) {
        if (row / 6 + col / 10) % 2 == 0 {
            [165., 55., 40.]
        } else {
            [110., 40., 35.]
        }
    } else {
        let shade = ((x * 7.).sin() * (y * 11.).cos() + 1.) * 0.5;
        [40. + 50. * shade, 90. + 60. * shade, 35. + 35. * shade]
    }
}
