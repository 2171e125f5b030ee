//! Container layout detection
//!
//! The file extension seeds the layout guess. If the hinted layout does not
//! produce a plausible header, or there is no hint, every layout is decoded
//! and scored, and the best-scoring one wins. Scoring is pluggable through
//! [`LayoutScorer`].

use super::interleave;
use super::{ContainerKind, MIN_ROM_SIZE, RomImage};
use crate::error::{FormatError, RomResult};
use crate::header::{compute_checksum_raw, has_valid_signature, stored_checksum_raw};
use tracing::debug;

/// Scores how plausible a linear buffer is as a ROM image
pub trait LayoutScorer {
    /// Higher is more plausible; zero means "no evidence"
    fn score(&self, linear: &[u8]) -> u32;

    /// Whether a score is good enough to accept a layout without comparison
    fn is_plausible(&self, score: u32) -> bool {
        score > 0
    }
}

/// Default scorer: console signature at 0x100 and a matching checksum
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPlausibility;

impl HeaderPlausibility {
    /// Points for a recognized console signature
    pub const SIGNATURE_POINTS: u32 = 2;
    /// Points for a stored checksum matching the computed one
    pub const CHECKSUM_POINTS: u32 = 1;
}

impl LayoutScorer for HeaderPlausibility {
    fn score(&self, linear: &[u8]) -> u32 {
        if linear.len() < MIN_ROM_SIZE {
            return 0;
        }

        let mut score = 0;
        if has_valid_signature(linear) {
            score += Self::SIGNATURE_POINTS;
        }
        if stored_checksum_raw(linear) == Some(compute_checksum_raw(linear)) {
            score += Self::CHECKSUM_POINTS;
        }
        score
    }

    /// A checksum match alone is weak evidence (zeroed headers match too)
    fn is_plausible(&self, score: u32) -> bool {
        score >= Self::SIGNATURE_POINTS
    }
}

/// Turns raw dumps into linear [`RomImage`]s
#[derive(Debug, Clone, Default)]
pub struct Normalizer<S = HeaderPlausibility> {
    scorer: S,
}

impl Normalizer<HeaderPlausibility> {
    /// Normalizer with the default header-plausibility scorer
    pub fn new() -> Self {
        Self {
            scorer: HeaderPlausibility,
        }
    }
}

impl<S: LayoutScorer> Normalizer<S> {
    /// Normalizer with a custom scoring strategy
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    /// Detect the layout of `raw` and return it in linear order
    ///
    /// Errors from the hinted layout (odd length, misaligned blocks) are
    /// returned as-is; layouts tried speculatively are skipped when they fail.
    pub fn normalize(&self, raw: &[u8], hint: Option<ContainerKind>) -> RomResult<RomImage> {
        if raw.len() < MIN_ROM_SIZE {
            return Err(FormatError::TooSmall {
                len: raw.len(),
                min: MIN_ROM_SIZE,
            }
            .into());
        }

        let hinted = match hint {
            Some(kind) => {
                let decoded = decode_layout(raw, kind)?;
                let score = self.scorer.score(&decoded.0);
                if self.scorer.is_plausible(score) {
                    debug!(?kind, score, "hinted layout accepted");
                    return RomImage::from_parts(decoded.0, kind, decoded.1);
                }
                Some((kind, score, decoded))
            }
            None => None,
        };

        let mut best: Option<(ContainerKind, u32, Decoded)> = None;
        for kind in ContainerKind::ALL {
            if Some(kind) == hint {
                continue;
            }
            let Ok(decoded) = decode_layout(raw, kind) else {
                continue;
            };
            let score = self.scorer.score(&decoded.0);
            if best.as_ref().is_none_or(|(_, best_score, _)| score > *best_score) {
                best = Some((kind, score, decoded));
            }
        }

        let chosen = match (hinted, best) {
            (Some(hinted), Some(candidate))
                if self.scorer.is_plausible(candidate.1) && candidate.1 > hinted.1 =>
            {
                debug!(hint = ?hinted.0, chosen = ?candidate.0, score = candidate.1, "layout hint overridden");
                candidate
            }
            (Some(hinted), _) => hinted,
            (None, Some(candidate)) if self.scorer.is_plausible(candidate.1) => candidate,
            (None, _) => {
                debug!("no plausible header in any layout, assuming linear");
                (ContainerKind::Linear, 0, (raw.to_vec(), None))
            }
        };

        let (kind, score, (data, copier_header)) = chosen;
        debug!(?kind, score, len = data.len(), "layout selected");
        RomImage::from_parts(data, kind, copier_header)
    }
}

type Decoded = (Vec<u8>, Option<Vec<u8>>);

fn decode_layout(raw: &[u8], kind: ContainerKind) -> Result<Decoded, FormatError> {
    match kind {
        ContainerKind::Linear => Ok((raw.to_vec(), None)),
        ContainerKind::InterleavedHalves => Ok((interleave::deinterleave_halves(raw)?, None)),
        ContainerKind::SmdBlocks => {
            let (header, payload) = interleave::split_copier_header(raw);
            if header.is_some() {
                debug!(
                    signed = interleave::has_copier_signature(raw),
                    "SMD copier header split off"
                );
            }
            let linear = interleave::deinterleave_smd(payload)?;
            Ok((linear, header.map(<[u8]>::to_vec)))
        }
    }
}
