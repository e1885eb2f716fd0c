//! Embedding and extraction of the fingerprint in the DCT domain.
//!
//! The embedder spreads 192 coded bits (the 64-bit fingerprint under 3x
//! repetition) over the image's 8x8 block grid. Each sample forces the sign
//! of one scheduled mid-frequency coefficient, with a magnitude floor so the
//! sign survives re-encoding. The extractor replays the identical schedule
//! and reads coefficient signs as soft votes.
//!
//! Sign is the statistic, not magnitude: after JPEG or WebP re-quantization
//! the magnitudes of selected coefficients vary widely and outliers would
//! dominate a weighted average, while the forced sign persists.

use tracing::debug;

use crate::dct::{BlockDct, BLOCK_AREA, BLOCK_SIZE};
use crate::ecc;
use crate::fingerprint::{self, DIGEST_BYTES};
use crate::pixels::PixelBuffer;
use crate::prng::SeededXorShift;
use crate::scheduler::BlockSchedule;

/// Magnitude floor forced onto a selected coefficient at embed time.
///
/// Calibration, not wire format: raising it trades visibility for
/// robustness. The value must stay large enough that the sign survives
/// rounding the luminance delta back to 8-bit channels.
pub const EMBEDDING_STRENGTH: f32 = 12.0;

/// Number of coded bits spread over the block grid.
const ENCODED_BITS: usize = fingerprint::PAYLOAD_BITS * ecc::REPETITION_FACTOR;

/// Embed a fingerprint into a pixel buffer.
///
/// Returns a new buffer with the same dimensions and layout. Images smaller
/// than one block in either dimension come back unchanged; partial blocks at
/// the right and bottom edges are never modified.
pub fn embed_digest(pixels: &PixelBuffer, digest: &[u8; DIGEST_BYTES]) -> PixelBuffer {
    let width = pixels.width() as usize;
    let height = pixels.height() as usize;
    let blocks_x = width / BLOCK_SIZE;
    let blocks_y = height / BLOCK_SIZE;
    let total_blocks = blocks_x * blocks_y;

    if total_blocks == 0 {
        debug!(width, height, "image smaller than one block, nothing to embed");
        return pixels.clone();
    }

    let coded = ecc::encode(&fingerprint::digest_to_bits(digest));
    let mut prng = SeededXorShift::from_seed(digest);
    let mut schedule = BlockSchedule::plan(&mut prng, total_blocks, coded.len());
    debug!(
        total_blocks,
        blocks_per_bit = schedule.blocks_per_bit(),
        permutation = schedule.is_permutation(),
        "planned embedding schedule"
    );

    // Drain the schedule up front and bucket samples by block, so each
    // block is transformed exactly once no matter how many samples hit it.
    let mut buckets: Vec<Vec<(usize, u8)>> = vec![Vec::new(); total_blocks];
    for &bit in &coded {
        for _ in 0..schedule.blocks_per_bit() {
            let (block_idx, (u, v)) = schedule.next_sample(&mut prng);
            buckets[block_idx].push((u * BLOCK_SIZE + v, bit));
        }
    }

    let original_y = pixels.luminance();
    let mut processed_y = original_y.clone();
    let dct = BlockDct::new();
    let mut block = [0.0f32; BLOCK_AREA];

    for (block_idx, samples) in buckets.iter().enumerate() {
        if samples.is_empty() {
            continue;
        }
        let bx = block_idx % blocks_x;
        let by = block_idx / blocks_x;

        copy_block(&original_y, width, height, bx, by, &mut block);
        dct.forward(&mut block);

        // Samples can collide on a coefficient position when blocks repeat;
        // the position then carries the majority bit, with `1` needing a
        // strict majority.
        let mut ones = [0u16; BLOCK_AREA];
        let mut totals = [0u16; BLOCK_AREA];
        for &(coeff, bit) in samples {
            ones[coeff] += bit as u16;
            totals[coeff] += 1;
        }
        for coeff in 0..BLOCK_AREA {
            if totals[coeff] == 0 {
                continue;
            }
            let magnitude = block[coeff].abs() + EMBEDDING_STRENGTH;
            block[coeff] = if 2 * ones[coeff] > totals[coeff] {
                magnitude
            } else {
                -magnitude
            };
        }

        dct.inverse(&mut block);
        write_block(&mut processed_y, width, height, bx, by, &block);
    }

    pixels.with_luma_delta(&original_y, &processed_y)
}

/// Read the fingerprint bits back from a pixel buffer.
///
/// `seed_digest` must be the digest the schedule was (or would have been)
/// seeded with at embed time; a different seed reads unrelated positions.
/// Returns the 64 recovered bits and a confidence in `[0, 1]`.
pub fn extract_digest(pixels: &PixelBuffer, seed_digest: &[u8; DIGEST_BYTES]) -> (Vec<u8>, f32) {
    let width = pixels.width() as usize;
    let height = pixels.height() as usize;
    let blocks_x = width / BLOCK_SIZE;
    let blocks_y = height / BLOCK_SIZE;
    let total_blocks = blocks_x * blocks_y;

    if total_blocks == 0 {
        // Every scheduled read would land outside the grid and see a zero
        // coefficient, which votes low on all positions.
        debug!(width, height, "image smaller than one block, reading zeroes");
        return ecc::decode_soft(&[0.0f32; ENCODED_BITS]);
    }

    let luma = pixels.luminance();
    let mut prng = SeededXorShift::from_seed(seed_digest);
    let mut schedule = BlockSchedule::plan(&mut prng, total_blocks, ENCODED_BITS);
    let dct = BlockDct::new();
    let mut block = [0.0f32; BLOCK_AREA];

    let mut soft = Vec::with_capacity(ENCODED_BITS);
    for _ in 0..ENCODED_BITS {
        let mut vote_sum = 0.0f32;
        for _ in 0..schedule.blocks_per_bit() {
            let (block_idx, (u, v)) = schedule.next_sample(&mut prng);
            let bx = block_idx % blocks_x;
            let by = block_idx / blocks_x;

            copy_block(&luma, width, height, bx, by, &mut block);
            dct.forward(&mut block);

            vote_sum += if block[u * BLOCK_SIZE + v] > 0.0 {
                1.0
            } else {
                -1.0
            };
        }
        let avg_vote = vote_sum / schedule.blocks_per_bit() as f32;
        soft.push((avg_vote + 1.0) / 2.0);
    }

    let (bits, confidence) = ecc::decode_soft(&soft);
    debug!(confidence, "fingerprint read complete");
    (bits, confidence)
}

/// Copy one 8x8 block out of the luminance plane, zero-filling any sample
/// that falls outside the image.
fn copy_block(
    plane: &[f32],
    width: usize,
    height: usize,
    bx: usize,
    by: usize,
    block: &mut [f32; BLOCK_AREA],
) {
    let x0 = bx * BLOCK_SIZE;
    let y0 = by * BLOCK_SIZE;
    for y in 0..BLOCK_SIZE {
        for x in 0..BLOCK_SIZE {
            let px = x0 + x;
            let py = y0 + y;
            block[y * BLOCK_SIZE + x] = if px < width && py < height {
                plane[py * width + px]
            } else {
                0.0
            };
        }
    }
}

/// Write an 8x8 block back into the luminance plane, skipping samples that
/// fall outside the image.
fn write_block(
    plane: &mut [f32],
    width: usize,
    height: usize,
    bx: usize,
    by: usize,
    block: &[f32; BLOCK_AREA],
) {
    let x0 = bx * BLOCK_SIZE;
    let y0 = by * BLOCK_SIZE;
    for y in 0..BLOCK_SIZE {
        for x in 0..BLOCK_SIZE {
            let px = x0 + x;
            let py = y0 + y;
            if px < width && py < height {
                plane[py * width + px] = block[y * BLOCK_SIZE + x];
            }
        }
    }
}
