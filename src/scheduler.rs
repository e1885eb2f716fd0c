//! Block assignment and coefficient selection.
//!
//! Decides which 8x8 block and which mid-frequency coefficient carries each
//! coded-bit sample. Embedder and extractor build the schedule from the same
//! seeded generator and drain it in the same order, so both sides land on
//! identical positions without exchanging any side information.

use crate::prng::SeededXorShift;

/// Mid-frequency coefficient positions `(u, v)` eligible to carry a sample.
///
/// The table order matters: the per-sample draw indexes into it. Positions
/// sit in the block interior where JPEG quantization is gentle enough to
/// keep a forced sign but the eye does not notice the nudge.
pub const COEFFICIENTS: [(usize, usize); 15] = [
    (1, 2),
    (2, 1),
    (2, 2),
    (3, 1),
    (1, 3),
    (3, 2),
    (2, 3),
    (3, 3),
    (4, 1),
    (1, 4),
    (4, 2),
    (2, 4),
    (4, 3),
    (3, 4),
    (4, 4),
];

/// A planned mapping from coded-bit samples to blocks.
///
/// When every sample fits in a distinct block, the plan holds a truncated
/// Fisher-Yates permutation of the block indices. Otherwise block indices
/// are drawn from the generator one sample at a time, repeats allowed.
pub struct BlockSchedule {
    blocks_per_bit: usize,
    total_blocks: usize,
    assignments: Option<Vec<usize>>,
    cursor: usize,
}

impl BlockSchedule {
    /// Plan the schedule for `encoded_len` coded bits over `total_blocks`
    /// blocks.
    ///
    /// Consumes generator output only in the permutation case; the fallback
    /// defers its draws to [`next_sample`](Self::next_sample).
    pub fn plan(prng: &mut SeededXorShift, total_blocks: usize, encoded_len: usize) -> Self {
        let blocks_per_bit = (total_blocks / encoded_len).max(1);

        let assignments = if blocks_per_bit * encoded_len > total_blocks {
            None
        } else {
            let mut indices: Vec<usize> = (0..total_blocks).collect();
            for i in (1..total_blocks).rev() {
                let j = (prng.next() * (i + 1) as f64).floor() as usize;
                indices.swap(i, j.min(i));
            }
            indices.truncate(blocks_per_bit * encoded_len);
            Some(indices)
        };

        Self {
            blocks_per_bit,
            total_blocks,
            assignments,
            cursor: 0,
        }
    }

    /// Samples carried per coded bit.
    pub fn blocks_per_bit(&self) -> usize {
        self.blocks_per_bit
    }

    /// Whether the plan holds a materialized permutation.
    pub fn is_permutation(&self) -> bool {
        self.assignments.is_some()
    }

    /// Draw the next `(block index, coefficient)` pair.
    ///
    /// Callers iterate bit-major: all samples of coded bit 0, then bit 1,
    /// and so on. Every call consumes one coefficient draw, and in fallback
    /// mode one block draw before it, keeping the generator stream aligned
    /// between embed and extract.
    pub fn next_sample(&mut self, prng: &mut SeededXorShift) -> (usize, (usize, usize)) {
        let block = match &self.assignments {
            Some(list) => {
                let block = list[self.cursor];
                self.cursor += 1;
                block
            }
            None => prng.next_int(self.total_blocks),
        };
        let coeff = COEFFICIENTS[prng.next_int(COEFFICIENTS.len())];
        (block, coeff)
    }
}
