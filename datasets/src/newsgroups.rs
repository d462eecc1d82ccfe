//! Usenet posts from twenty discussion groups: the sparse, high-dimensional regime.
//!
//! Documents are turned into TF-IDF vectors over a unigram vocabulary and every row is scaled
//! to unit euclidean norm. The posts are read from a directory with one sub-directory per
//! group (the layout of the `20news-bydate` archives) or generated from a synthetic corpus in
//! which every group has its own skewed vocabulary on top of a shared one.
use std::fs;
use std::path::{Path, PathBuf};

use linfa_preprocessing::tf_idf_vectorization::TfIdfVectorizer;
use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, Uniform};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use sprs::CsMat;
use tracing::debug;

use crate::error::{DatasetError, Result};

/// Names of the twenty groups of the synthetic corpus
pub const CATEGORIES: [&str; 20] = [
    "alt.atheism",
    "comp.graphics",
    "comp.os.ms-windows.misc",
    "comp.sys.ibm.pc.hardware",
    "comp.sys.mac.hardware",
    "comp.windows.x",
    "misc.forsale",
    "rec.autos",
    "rec.motorcycles",
    "rec.sport.baseball",
    "rec.sport.hockey",
    "sci.crypt",
    "sci.electronics",
    "sci.med",
    "sci.space",
    "soc.religion.christian",
    "talk.politics.guns",
    "talk.politics.mideast",
    "talk.politics.misc",
    "talk.religion.misc",
];

/// Number of documents generated when the synthetic corpus is not truncated
pub const DEFAULT_DOCUMENTS: usize = 2000;

const COMMON_VOCABULARY: usize = 1000;
const TOPIC_VOCABULARY: usize = 200;
const TOPICAL_RATIO: f64 = 0.35;
const MIN_WORDS: usize = 40;
const MAX_WORDS: usize = 160;

const SYLLABLES: [&str; 16] = [
    "ba", "ko", "ri", "mu", "ne", "ta", "lo", "vi", "sa", "de", "gu", "pe", "zo", "fi", "ha", "ju",
];

/// Where the posts are read from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewsgroupsSource {
    /// The generated corpus
    Synthetic,
    /// A directory with one sub-directory of plain text posts per group
    Directory(PathBuf),
}

impl Default for NewsgroupsSource {
    fn default() -> Self {
        NewsgroupsSource::Synthetic
    }
}

/// Vectorized posts together with the group each of them belongs to
#[derive(Clone, Debug)]
pub struct TextDataset {
    /// TF-IDF matrix in CSR layout with shape `(n_documents, n_terms)`
    pub tfidf: CsMat<f64>,
    /// Index into `categories` for every document
    pub targets: Array1<usize>,
    pub categories: Vec<String>,
}

impl TextDataset {
    pub fn nsamples(&self) -> usize {
        self.tfidf.rows()
    }

    pub fn nfeatures(&self) -> usize {
        self.tfidf.cols()
    }

    pub fn nnz(&self) -> usize {
        self.tfidf.nnz()
    }

    /// Fraction of stored entries
    pub fn density(&self) -> f64 {
        let cells = self.nsamples() * self.nfeatures();
        if cells == 0 {
            0.
        } else {
            self.nnz() as f64 / cells as f64
        }
    }

    /// Dense copy of the TF-IDF matrix
    pub fn to_dense(&self) -> Array2<f64> {
        self.tfidf.to_dense()
    }
}

struct Corpus {
    documents: Vec<String>,
    targets: Vec<usize>,
    categories: Vec<String>,
}

/// Load and vectorize the posts.
///
/// Posts are shuffled with `seed` before keeping the first `n_documents`. The synthetic corpus
/// generates [`DEFAULT_DOCUMENTS`] posts when `n_documents` is `None`, a directory source
/// keeps all of its posts.
pub fn newsgroups(
    source: &NewsgroupsSource,
    n_documents: Option<usize>,
    seed: u64,
) -> Result<TextDataset> {
    let mut corpus = match source {
        NewsgroupsSource::Synthetic => {
            synthetic_corpus(n_documents.unwrap_or(DEFAULT_DOCUMENTS), seed)
        }
        NewsgroupsSource::Directory(root) => corpus_from_dir(root)?,
    };

    let mut order: Vec<usize> = (0..corpus.documents.len()).collect();
    order.shuffle(&mut Isaac64Rng::seed_from_u64(seed));
    if let Some(n) = n_documents {
        order.truncate(n);
    }
    if order.is_empty() {
        return Err(DatasetError::Empty("no documents to vectorize".into()));
    }

    let documents: Array1<String> = order
        .iter()
        .map(|&i| std::mem::take(&mut corpus.documents[i]))
        .collect();
    let targets: Array1<usize> = order.iter().map(|&i| corpus.targets[i]).collect();

    let vectorizer = TfIdfVectorizer::default().fit(&documents)?;
    let mut tfidf = vectorizer.transform(&documents);
    l2_normalize_rows(&mut tfidf);
    debug!(
        documents = tfidf.rows(),
        terms = tfidf.cols(),
        nnz = tfidf.nnz(),
        "vectorized posts"
    );

    Ok(TextDataset {
        tfidf,
        targets,
        categories: corpus.categories,
    })
}

/// Scale every row to unit norm, empty rows stay empty
fn l2_normalize_rows(tfidf: &mut CsMat<f64>) {
    if tfidf.is_csc() {
        *tfidf = tfidf.to_other_storage();
    }

    let rows: Vec<(usize, f64)> = tfidf
        .outer_iterator()
        .map(|row| {
            let norm = row.data().iter().map(|v| v * v).sum::<f64>().sqrt();
            (row.nnz(), norm)
        })
        .collect();

    let data = tfidf.data_mut();
    let mut offset = 0;
    for (nnz, norm) in rows {
        if norm > 0. {
            data[offset..offset + nnz].iter_mut().for_each(|v| *v /= norm);
        }
        offset += nnz;
    }
}

fn corpus_from_dir(root: &Path) -> Result<Corpus> {
    let mut groups = fs::read_dir(root)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    groups.retain(|path| path.is_dir());
    groups.sort();

    let mut corpus = Corpus {
        documents: Vec::new(),
        targets: Vec::new(),
        categories: Vec::with_capacity(groups.len()),
    };

    for (label, group) in groups.iter().enumerate() {
        let mut posts = fs::read_dir(group)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        posts.retain(|path| path.is_file());
        posts.sort();

        for post in posts {
            let bytes = fs::read(&post)?;
            corpus
                .documents
                .push(String::from_utf8_lossy(&bytes).into_owned());
            corpus.targets.push(label);
        }

        let name = group
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        corpus.categories.push(name);
    }

    debug!(
        root = %root.display(),
        groups = corpus.categories.len(),
        posts = corpus.documents.len(),
        "read posts"
    );
    Ok(corpus)
}

fn synthetic_corpus(n_documents: usize, seed: u64) -> Corpus {
    let mut rng = Isaac64Rng::seed_from_u64(seed);
    let length = Uniform::new_inclusive(MIN_WORDS, MAX_WORDS);

    let mut documents = Vec::with_capacity(n_documents);
    let mut targets = Vec::with_capacity(n_documents);
    for doc in 0..n_documents {
        let category = doc % CATEGORIES.len();
        let n_words = length.sample(&mut rng);

        let words = (0..n_words)
            .map(|_| {
                if rng.gen_bool(TOPICAL_RATIO) {
                    let rank = skewed_rank(&mut rng, TOPIC_VOCABULARY);
                    pseudo_word(COMMON_VOCABULARY + category * TOPIC_VOCABULARY + rank)
                } else {
                    pseudo_word(skewed_rank(&mut rng, COMMON_VOCABULARY))
                }
            })
            .collect::<Vec<_>>();

        documents.push(words.join(" "));
        targets.push(category);
    }

    Corpus {
        documents,
        targets,
        categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
    }
}

/// Rank in `0..size` where low ranks are much more frequent than high ones
fn skewed_rank(rng: &mut impl Rng, size: usize) -> usize {
    let u: f64 = rng.gen();
    ((u * u * u * size as f64) as usize).min(size - 1)
}

/// Spell `index` with syllables, distinct indices give distinct words
fn pseudo_word(mut index: usize) -> String {
    let mut word = String::new();
    loop {
        word.push_str(SYLLABLES[index % SYLLABLES.len()]);
        index /= SYLLABLES.len();
        if index == 0 {
            break word;
        }
    }
}
