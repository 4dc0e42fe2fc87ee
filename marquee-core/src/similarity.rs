//! Pairwise cosine similarity between term vectors.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::vectorize::TermMatrix;

/// Square similarity matrix, row-major.
///
/// Entry (i, j) is the cosine of the angle between the term vectors of
/// movies i and j. Symmetric; the diagonal is 1.0 for non-zero vectors and
/// rows of all-zero vectors are all zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSimilarityMatrix")]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

/// Unchecked wire form; converted through [`SimilarityMatrix::from_values`].
#[derive(Deserialize)]
struct RawSimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl TryFrom<RawSimilarityMatrix> for SimilarityMatrix {
    type Error = String;

    fn try_from(raw: RawSimilarityMatrix) -> Result<Self, Self::Error> {
        Self::from_values(raw.size, raw.values)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl SimilarityMatrix {
    /// Compute the full N x N matrix. Rows are computed in parallel; each
    /// entry depends only on its two vectors, so the result is deterministic.
    pub fn from_terms(terms: &TermMatrix) -> Self {
        let n = terms.rows();
        let norms: Vec<f32> = (0..n)
            .map(|i| {
                let row = terms.row(i);
                dot(row, row).sqrt()
            })
            .collect();

        let norms = &norms;
        let values: Vec<f32> = (0..n)
            .into_par_iter()
            .flat_map_iter(move |i| {
                (0..n).map(move |j| {
                    if norms[i] == 0.0 || norms[j] == 0.0 {
                        0.0
                    } else if i == j {
                        1.0
                    } else {
                        let sim = dot(terms.row(i), terms.row(j)) / (norms[i] * norms[j]);
                        sim.min(1.0)
                    }
                })
            })
            .collect();

        Self { size: n, values }
    }

    /// Wrap row-major `values`; fails unless there are exactly
    /// `size * size` of them.
    pub fn from_values(size: usize, values: Vec<f32>) -> Result<Self, String> {
        match size.checked_mul(size) {
            Some(expected) if expected == values.len() => Ok(Self { size, values }),
            _ => Err(format!(
                "similarity matrix of size {} cannot hold {} values",
                size,
                values.len()
            )),
        }
    }

    /// Number of movies (rows and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry (i, j), `None` when either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.row(i)?.get(j).copied()
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.size {
            return None;
        }
        self.values.get(i * self.size..(i + 1) * self.size)
    }

    /// Indices of the `k` movies most similar to `i`, excluding `i` itself.
    /// Ties are broken by index; empty when `i` is out of range.
    pub fn most_similar(&self, i: usize, k: usize) -> Vec<(usize, f32)> {
        let Some(row) = self.row(i) else {
            return Vec::new();
        };
        let mut ranked: Vec<(usize, f32)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorize::CountVectorizer;
    use approx::assert_relative_eq;

    fn matrix(docs: &[&str]) -> SimilarityMatrix {
        let terms = CountVectorizer::new().fit_transform(docs).unwrap();
        SimilarityMatrix::from_terms(&terms)
    }

    #[test]
    fn test_symmetric_with_unit_diagonal() {
        let sim = matrix(&["action hero space", "hero space drama", "romance drama", "action action"]);
        assert_eq!(sim.size(), 4);
        for i in 0..4 {
            assert_eq!(sim.get(i, i), Some(1.0));
            for j in 0..4 {
                assert_eq!(sim.get(i, j), sim.get(j, i));
                assert!(sim.get(i, j) <= sim.get(i, i));
            }
        }
    }

    #[test]
    fn test_known_values() {
        let sim = matrix(&["aa bb", "aa cc", "dd ee"]);
        assert_relative_eq!(sim.get(0, 1).unwrap(), 0.5, epsilon = 1e-6);
        assert_eq!(sim.get(0, 2), Some(0.0));
    }

    #[test]
    fn test_zero_vector_row() {
        let mut cv = CountVectorizer::new();
        cv.fit(&["hero"]).unwrap();
        let terms = cv.transform(&["hero", "unknown"]).unwrap();
        let sim = SimilarityMatrix::from_terms(&terms);
        assert_eq!(sim.row(1), Some(&[0.0, 0.0][..]));
        assert_eq!(sim.get(0, 0), Some(1.0));
    }

    #[test]
    fn test_most_similar() {
        let sim = matrix(&["space hero", "space hero", "space", "romance"]);
        let top = sim.most_similar(0, 2);
        assert_eq!(top[0].0, 1);
        assert_eq!(top[1].0, 2);
        assert!(sim.most_similar(3, 10).iter().all(|&(j, _)| j != 3));
        assert!(sim.most_similar(4, 10).is_empty());
    }

    #[test]
    fn test_out_of_range_index_is_none() {
        let sim = matrix(&["space hero", "space drama", "romance"]);
        assert_eq!(sim.size(), 3);
        assert_eq!(sim.get(0, 3), None);
        assert_eq!(sim.get(3, 0), None);
        assert!(sim.row(3).is_none());
        assert!(sim.get(1, 0).is_some());
    }

    #[test]
    fn test_rejects_mismatched_values() {
        let err = serde_json::from_str::<SimilarityMatrix>(r#"{"size":3,"values":[1.0,0.5]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("size 3"));
        assert!(SimilarityMatrix::from_values(usize::MAX, vec![]).is_err());

        let sim: SimilarityMatrix =
            serde_json::from_str(r#"{"size":2,"values":[1.0,0.5,0.5,1.0]}"#).unwrap();
        assert_eq!(sim.get(1, 0), Some(0.5));
    }
}
