//! QR module-matrix provider.

use qrcode::bits;
use qrcode::types::QrError;
use qrcode::{Color, QrCode, Version};
use relief_types::{EcLevel, ModuleMatrix};
use tracing::{debug, instrument};

use crate::types::ReliefError;

/// Byte-mode capacity of a version 40 symbol at `level`.
///
/// Only reported alongside `DataTooLong`. Whether data fits is decided by
/// [`fits`], which lets numeric and alphanumeric runs pack tighter.
pub fn byte_capacity(level: EcLevel) -> usize {
    match level {
        EcLevel::L => 2953,
        EcLevel::M => 2331,
        EcLevel::Q => 1663,
        EcLevel::H => 1273,
    }
}

/// Modules per side of a standard symbol, without quiet zone.
pub fn symbol_width(version: i16) -> usize {
    17 + 4 * version.max(1) as usize
}

pub(crate) fn to_qr_level(level: EcLevel) -> qrcode::EcLevel {
    match level {
        EcLevel::L => qrcode::EcLevel::L,
        EcLevel::M => qrcode::EcLevel::M,
        EcLevel::Q => qrcode::EcLevel::Q,
        EcLevel::H => qrcode::EcLevel::H,
    }
}

/// Whether some version 1-40 holds `data` at `level` with optimal segmentation.
pub fn fits(data: &str, level: EcLevel) -> bool {
    bits::encode_auto(data.as_bytes(), to_qr_level(level)).is_ok()
}

/// The highest level below `level` that holds `data`.
pub fn lower_level_that_fits(data: &str, level: EcLevel) -> Option<EcLevel> {
    std::iter::successors(level.lower(), EcLevel::lower).find(|l| fits(data, *l))
}

/// An encoded symbol and the parameters the encoder settled on.
#[derive(Debug, Clone, PartialEq)]
pub struct QrSymbol {
    pub matrix: ModuleMatrix,
    pub version: i16,
    pub ec_level: EcLevel,
}

/// Encode `data` at the smallest version that holds it at `level`.
#[instrument(skip(data), fields(len = data.len()))]
pub fn encode(data: &str, level: EcLevel, border: u32) -> Result<QrSymbol, ReliefError> {
    if data.is_empty() {
        return Err(ReliefError::EmptyPayload);
    }
    let code = QrCode::with_error_correction_level(data.as_bytes(), to_qr_level(level)).map_err(
        |e| match e {
            QrError::DataTooLong => ReliefError::DataTooLong {
                len: data.len(),
                capacity: byte_capacity(level),
                level,
                fits_at: lower_level_that_fits(data, level),
            },
            other => ReliefError::invalid("data", other.to_string()),
        },
    )?;

    let version = match code.version() {
        Version::Normal(v) | Version::Micro(v) => v,
    };
    let width = code.width();
    let cells = code
        .to_colors()
        .into_iter()
        .map(|c| c == Color::Dark)
        .collect();
    let matrix = ModuleMatrix::from_cells(width, border as usize, cells)
        .ok_or_else(|| ReliefError::invalid("data", "encoder returned a non-square grid"))?;

    debug!(version, width, dark = matrix.dark_count(), "qr encoded");
    Ok(QrSymbol {
        matrix,
        version,
        ec_level: level,
    })
}
