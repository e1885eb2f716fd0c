//! # veilmark
//!
//! Invisible digital watermarking for raster images. A short fingerprint
//! derived from an arbitrary payload is spread across the mid-frequency DCT
//! coefficients of the luminance channel, invisible at normal viewing, and
//! recoverable from a re-encoded copy together with a confidence score.
//!
//! The pipeline: salted SHA-256 fingerprint (64 bits), 3x repetition coding
//! (192 bits), a seeded scheduler that maps coded bits to 8x8 blocks and
//! coefficients, sign-forced embedding with a magnitude floor, and a
//! sign-voting extractor with majority decoding. Embedder and extractor are
//! deterministic in their inputs and share the whole schedule through the
//! fingerprint alone.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use veilmark::{watermark, verify, WatermarkOptions, VerifyOptions};
//!
//! let input = std::fs::read("photo.png")?;
//! let marked = watermark(&input, "order-7731", &WatermarkOptions::default())?;
//! let report = verify(&marked.bytes, "order-7731", &VerifyOptions::default())?;
//! assert!(report.is_match);
//! ```

pub mod codec;
pub mod dct;
pub mod ecc;
pub mod error;
pub mod fingerprint;
pub mod image_handler;
pub mod pixels;
pub mod prng;
pub mod scheduler;
pub mod visible;

pub use codec::EMBEDDING_STRENGTH;
pub use dct::BLOCK_SIZE;
pub use ecc::REPETITION_FACTOR;
pub use error::{Result, VeilmarkError};
pub use fingerprint::{MODULE_SALT, PAYLOAD_BITS};
pub use image_handler::{OutputFormat, JPEG_QUALITY};
pub use pixels::PixelBuffer;
pub use scheduler::COEFFICIENTS;
pub use visible::{OverlayAnchor, VisibleOverlay};

/// Default confidence threshold for a positive match.
pub const MATCH_THRESHOLD: f32 = 0.85;

/// Knobs for [`watermark`].
#[derive(Debug, Clone, Default)]
pub struct WatermarkOptions {
    pub format: OutputFormat,
    /// JPEG quality in `[0, 1]`; ignored by the other formats. Zero falls
    /// back to [`JPEG_QUALITY`].
    pub jpeg_quality: f32,
    /// Optional cosmetic stamp; never read back by verification.
    pub visible: Option<VisibleOverlay>,
}

/// A watermarked image ready to hand back to the caller.
#[derive(Debug, Clone)]
pub struct WatermarkedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
}

/// Knobs for [`verify`].
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Minimum confidence for a positive match, in `[0, 1]`.
    pub threshold: f32,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            threshold: MATCH_THRESHOLD,
        }
    }
}

/// Outcome of a verification pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub is_match: bool,
    pub confidence: f32,
    pub recovered_digest_hex: String,
}

/// Outcome of a diagnostic extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub digest_hex: String,
    pub confidence: f32,
}

/// Embed the fingerprint of `payload` into an image.
///
/// Decodes `image` from any supported container, embeds, optionally stamps
/// the visible overlay, and re-encodes to the requested format.
pub fn watermark(image: &[u8], payload: &str, opts: &WatermarkOptions) -> Result<WatermarkedImage> {
    let pixels = image_handler::decode(image)?;
    let digest = fingerprint::derive_digest(payload);

    let mut marked = codec::embed_digest(&pixels, &digest);
    if let Some(overlay) = &opts.visible {
        visible::stamp(&mut marked, overlay);
    }

    let quality = if opts.jpeg_quality > 0.0 {
        opts.jpeg_quality
    } else {
        JPEG_QUALITY
    };
    let bytes = image_handler::encode(&marked, opts.format, quality)?;
    Ok(WatermarkedImage {
        bytes,
        width: marked.width(),
        height: marked.height(),
        mime_type: opts.format.mime_type(),
    })
}

/// Check whether an image carries the fingerprint of `payload`.
///
/// A match requires both the confidence to reach the threshold and the
/// recovered digest to equal the payload's digest byte for byte. An image
/// without a watermark reports a negative match; only an undecodable input
/// is an error.
pub fn verify(image: &[u8], payload: &str, opts: &VerifyOptions) -> Result<Verification> {
    let pixels = image_handler::decode(image)?;
    let expected = fingerprint::derive_digest(payload);

    let (bits, confidence) = codec::extract_digest(&pixels, &expected);
    let recovered = fingerprint::bits_to_digest(&bits);
    Ok(Verification {
        is_match: confidence >= opts.threshold && recovered == expected,
        confidence,
        recovered_digest_hex: hex::encode(recovered),
    })
}

/// Diagnostic read of an image's sign pattern.
///
/// The scheduler needs the embedded payload's fingerprint to find the right
/// positions; this entry point seeds it from the fixed literal `"dummy"`
/// instead, so the digest it reports is whatever the signs under that seed
/// happen to spell. It cannot recover bits embedded under a real payload.
/// Useful for eyeballing determinism and confidence behavior, nothing more.
pub fn extract(image: &[u8]) -> Result<Extraction> {
    let pixels = image_handler::decode(image)?;
    let seed = fingerprint::derive_digest("dummy");

    let (bits, confidence) = codec::extract_digest(&pixels, &seed);
    Ok(Extraction {
        digest_hex: hex::encode(fingerprint::bits_to_digest(&bits)),
        confidence,
    })
}
