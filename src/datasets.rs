//! Dataset provider handed to every suite `setup`.
//!
//! Loading and vectorizing is far more expensive than a single benchmark call, so every
//! dataset is built at most once per [`Datasets`] and then shared read-only between the
//! combinations of a run.
use std::sync::{Arc, Mutex, PoisonError};

use linfa_bench_datasets::{china, newsgroups, TextDataset};
use ndarray::Array2;
use tracing::info;

use crate::config::HarnessValidParams;
use crate::error::Result;

/// Sparse posts together with the dense copy handed to the clustering routines
#[derive(Debug)]
pub struct TextRecords {
    pub sparse: TextDataset,
    pub dense: Array2<f64>,
}

#[derive(Debug)]
pub struct Datasets {
    params: HarnessValidParams,
    china: Mutex<Option<Arc<Array2<f64>>>>,
    newsgroups: Mutex<Option<Arc<TextRecords>>>,
}

fn memoized<T>(
    slot: &Mutex<Option<Arc<T>>>,
    load: impl FnOnce() -> Result<T>,
) -> Result<Arc<T>> {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(value) = slot.as_ref() {
        return Ok(Arc::clone(value));
    }
    let value = Arc::new(load()?);
    *slot = Some(Arc::clone(&value));
    Ok(value)
}

impl Datasets {
    pub fn new(params: HarnessValidParams) -> Self {
        Datasets {
            params,
            china: Mutex::new(None),
            newsgroups: Mutex::new(None),
        }
    }

    /// Colour pixels with shape `(n_samples, 3)`
    pub fn china(&self) -> Result<Arc<Array2<f64>>> {
        memoized(&self.china, || {
            let pixels = china(
                &self.params.china_source(),
                self.params.china_samples(),
                self.params.seed(),
            )?;
            info!(samples = pixels.nrows(), "loaded china pixels");
            Ok(pixels)
        })
    }

    /// TF-IDF vectors of the posts
    pub fn newsgroups(&self) -> Result<Arc<TextRecords>> {
        memoized(&self.newsgroups, || {
            let sparse = newsgroups(
                &self.params.newsgroups_source(),
                Some(self.params.newsgroups_documents()),
                self.params.seed(),
            )?;
            info!(
                documents = sparse.nsamples(),
                terms = sparse.nfeatures(),
                density = sparse.density(),
                "loaded newsgroups posts"
            );
            let dense = sparse.to_dense();
            Ok(TextRecords { sparse, dense })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessParams;
    use linfa::ParamGuard;

    fn small() -> Datasets {
        Datasets::new(
            HarnessParams::new()
                .china_samples(Some(500))
                .newsgroups_documents(40)
                .check_unwrap(),
        )
    }

    #[test]
    fn datasets_are_loaded_once() {
        let datasets = small();
        let first = datasets.china().unwrap();
        let second = datasets.china().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.dim(), (500, 3));
    }

    #[test]
    fn dense_copy_matches_the_sparse_shape() {
        let datasets = small();
        let records = datasets.newsgroups().unwrap();
        assert_eq!(records.dense.nrows(), records.sparse.nsamples());
        assert_eq!(records.dense.ncols(), records.sparse.nfeatures());
        assert!(Arc::ptr_eq(&records, &datasets.newsgroups().unwrap()));
    }
}
