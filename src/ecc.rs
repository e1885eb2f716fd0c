//! Repetition coding with soft majority voting.
//!
//! Each fingerprint bit is emitted three times consecutively. On extraction
//! the three soft reads of a bit are averaged; the distance of that mean from
//! 0.5 doubles as a per-bit confidence, and the overall confidence is the
//! mean across all decoded bits.

/// Copies emitted per fingerprint bit.
pub const REPETITION_FACTOR: usize = 3;

/// Repeat each input bit [`REPETITION_FACTOR`] times consecutively.
pub fn encode(bits: &[u8]) -> Vec<u8> {
    let mut coded = Vec::with_capacity(bits.len() * REPETITION_FACTOR);
    for &bit in bits {
        for _ in 0..REPETITION_FACTOR {
            coded.push(bit);
        }
    }
    coded
}

/// Decode soft values in `[0, 1]` back to hard bits.
///
/// Returns the decoded bits and an overall confidence in `[0, 1]`. A group
/// mean above 0.5 decodes as 1; an exact tie decodes as 0. Trailing values
/// that do not fill a group are dropped.
pub fn decode_soft(soft: &[f32]) -> (Vec<u8>, f32) {
    let group_count = soft.len() / REPETITION_FACTOR;
    let mut bits = Vec::with_capacity(group_count);
    let mut confidence_sum = 0.0f32;

    for group in soft.chunks_exact(REPETITION_FACTOR) {
        let mean = group.iter().sum::<f32>() / REPETITION_FACTOR as f32;
        bits.push(if mean > 0.5 { 1 } else { 0 });
        confidence_sum += (mean - 0.5).abs() * 2.0;
    }

    let confidence = if group_count == 0 {
        0.0
    } else {
        confidence_sum / group_count as f32
    };
    (bits, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_triples_every_bit() {
        let coded = encode(&[1, 0, 1]);
        assert_eq!(coded, vec![1, 1, 1, 0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn clean_round_trip_has_full_confidence() {
        let bits: Vec<u8> = (0..64).map(|i| (i % 3 == 0) as u8).collect();
        let soft: Vec<f32> = encode(&bits).iter().map(|&b| b as f32).collect();
        let (decoded, confidence) = decode_soft(&soft);
        assert_eq!(decoded, bits);
        assert!((confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn noisy_groups_decode_by_majority() {
        let soft = [0.9, 0.8, 0.95, 0.1, 0.2, 0.05];
        let (bits, confidence) = decode_soft(&soft);
        assert_eq!(bits, vec![1, 0]);
        assert!(confidence > 0.5);
    }

    #[test]
    fn all_half_means_no_confidence() {
        let soft = [0.5f32; 6];
        let (bits, confidence) = decode_soft(&soft);
        assert_eq!(bits.len(), 2);
        assert!(confidence < 0.1);
    }

    #[test]
    fn exact_tie_decodes_to_zero() {
        // Mean of 0.5 exactly.
        let soft = [1.0, 0.5, 0.0];
        let (bits, _) = decode_soft(&soft);
        assert_eq!(bits, vec![0]);
    }

    #[test]
    fn single_flipped_copy_is_corrected() {
        let bits = vec![1u8, 0, 1, 1];
        let mut soft: Vec<f32> = encode(&bits).iter().map(|&b| b as f32).collect();
        soft[0] = 0.0;
        soft[4] = 1.0;
        let (decoded, confidence) = decode_soft(&soft);
        assert_eq!(decoded, bits);
        assert!(confidence > 0.0 && confidence < 1.0);
    }

    #[test]
    fn empty_input() {
        let (bits, confidence) = decode_soft(&[]);
        assert!(bits.is_empty());
        assert_eq!(confidence, 0.0);
    }
}
