use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use ndarray::prelude::*;
use ndarray_csv::{Array2Reader, ReadError};

use crate::error::Result;

/// Convert Gzipped CSV bytes into 2D array
pub fn array_from_gz_csv<R: Read>(
    gz: R,
    has_headers: bool,
    separator: u8,
) -> std::result::Result<Array2<f64>, ReadError> {
    // unzip file
    let file = GzDecoder::new(gz);
    array_from_csv(file, has_headers, separator)
}

/// Convert CSV bytes into 2D array
pub fn array_from_csv<R: Read>(
    csv: R,
    has_headers: bool,
    separator: u8,
) -> std::result::Result<Array2<f64>, ReadError> {
    // parse CSV
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .delimiter(separator)
        .from_reader(csv);

    // extract ndarray
    reader.deserialize_array2_dynamic()
}

/// Read a headerless, comma separated file into a 2D array. Files ending in `.gz` are
/// decompressed on the fly.
pub fn array_from_path(path: &Path) -> Result<Array2<f64>> {
    let file = BufReader::new(File::open(path)?);
    let gzipped = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    let array = if gzipped {
        array_from_gz_csv(file, false, b',')?
    } else {
        array_from_csv(file, false, b',')?
    };

    Ok(array)
}
