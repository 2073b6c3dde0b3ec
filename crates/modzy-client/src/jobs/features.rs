use modzy_api::schemas::FeaturesResponse;
use once_cell::sync::Lazy;
use regex::Regex;

use super::api::JobApi;

/// Chunk size used when the service does not advertise a usable one (1 MiB).
pub const DEFAULT_INPUT_CHUNK_MAXIMUM_SIZE: u64 = 1024 * 1024;

/// Feature holding the largest chunk accepted by the input upload endpoint.
pub const INPUT_CHUNK_MAXIMUM_SIZE: &str = "inputChunkMaximumSize";

static SIZE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)(?:\.(\d+))?([a-zA-Z]{0,2})$").expect("Should be able to compile size regex.")
});

/// Magnitude suffix of a human readable size.
///
/// `KB`, `MB`, `GB` and `TB` are binary multiples, like the service reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataUnit {
    Bytes,
    Kilo,
    Mega,
    Giga,
    Tera,
    Kibi,
    Mebi,
    Gibi,
    Tebi,
}

impl DataUnit {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix {
            "" | "i" => DataUnit::Bytes,
            "K" => DataUnit::Kilo,
            "M" => DataUnit::Mega,
            "G" => DataUnit::Giga,
            "T" => DataUnit::Tera,
            "Ki" | "KB" => DataUnit::Kibi,
            "Mi" | "MB" => DataUnit::Mebi,
            "Gi" | "GB" => DataUnit::Gibi,
            "Ti" | "TB" => DataUnit::Tebi,
            _ => return None,
        };
        Some(unit)
    }

    pub fn multiplier(&self) -> u64 {
        match self {
            DataUnit::Bytes => 1,
            DataUnit::Kilo => 1000,
            DataUnit::Mega => 1000u64.pow(2),
            DataUnit::Giga => 1000u64.pow(3),
            DataUnit::Tera => 1000u64.pow(4),
            DataUnit::Kibi => 1024,
            DataUnit::Mebi => 1024u64.pow(2),
            DataUnit::Gibi => 1024u64.pow(3),
            DataUnit::Tebi => 1024u64.pow(4),
        }
    }
}

/// Parse sizes such as `"1Mi"`, `"500KB"` or `"1.5M"` into a byte count.
///
/// Fractional results are truncated to whole bytes.
pub fn parse_human_size(size: &str) -> Option<u64> {
    let captures = SIZE_PATTERN.captures(size.trim())?;
    let unit = DataUnit::from_suffix(captures.get(3).map_or("", |m| m.as_str()))?;
    let multiplier = unit.multiplier();

    let whole = captures.get(1)?.as_str().parse::<u64>().ok()?;
    let fraction = captures
        .get(2)
        .map_or(0, |digits| scaled_fraction(digits.as_str(), multiplier));
    whole.checked_mul(multiplier)?.checked_add(fraction)
}

/// `floor(0.<digits> * multiplier)` in exact integer arithmetic.
fn scaled_fraction(digits: &str, multiplier: u64) -> u64 {
    // Folding from the last digit keeps every step below `multiplier`.
    digits
        .bytes()
        .rev()
        .fold(0, |carry, digit| (u64::from(digit - b'0') * multiplier + carry) / 10)
}

/// Read the chunk size limit from a features payload, falling back to the default.
pub fn chunk_size_from_features(features: &FeaturesResponse) -> u64 {
    let Some(value) = features.get(INPUT_CHUNK_MAXIMUM_SIZE) else {
        log::warn!(
            "{INPUT_CHUNK_MAXIMUM_SIZE} missing from job features, using {DEFAULT_INPUT_CHUNK_MAXIMUM_SIZE} bytes"
        );
        return DEFAULT_INPUT_CHUNK_MAXIMUM_SIZE;
    };

    match value.as_str().and_then(parse_human_size) {
        Some(size) if size > 0 => size,
        _ => {
            log::warn!(
                "Unexpected {INPUT_CHUNK_MAXIMUM_SIZE} value {value}, using {DEFAULT_INPUT_CHUNK_MAXIMUM_SIZE} bytes"
            );
            DEFAULT_INPUT_CHUNK_MAXIMUM_SIZE
        }
    }
}

/// Ask the service for the largest accepted input chunk.
///
/// The limit only shapes the upload, so any failure degrades to
/// [`DEFAULT_INPUT_CHUNK_MAXIMUM_SIZE`] instead of failing the submission.
pub async fn negotiate_chunk_size<A: JobApi + ?Sized>(api: &A) -> u64 {
    match api.get_features().await {
        Ok(features) => {
            let size = chunk_size_from_features(&features);
            log::debug!("Negotiated input chunk size of {size} bytes");
            size
        }
        Err(e) => {
            log::warn!(
                "Failed to fetch job features ({e}), using {DEFAULT_INPUT_CHUNK_MAXIMUM_SIZE} bytes"
            );
            DEFAULT_INPUT_CHUNK_MAXIMUM_SIZE
        }
    }
}
