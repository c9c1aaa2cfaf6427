//! Symbol matrix and the encoder boundary.
//!
//! Encoding bytes into modules is delegated to an external library behind
//! [`SymbolEncoder`]; this crate only consumes the resulting grid.

use qrcodegen::{QrCode, QrCodeEcc};
use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// Side length of a finder pattern, in modules.
pub const FINDER_SIZE: usize = 7;

/// Error correction level requested for every render. Quartile leaves room
/// for frame overlays without losing scannability.
pub const SYMBOL_EC_LEVEL: EcLevel = EcLevel::Quartile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcLevel {
    Low,
    Medium,
    Quartile,
    High,
}

/// Square grid of dark (`true`) and light modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix {
    size: usize,
    modules: Vec<bool>,
}

impl Matrix {
    /// Build from row-major rows. Returns `None` unless the rows form a
    /// non-empty square.
    pub fn from_rows(rows: &[Vec<bool>]) -> Option<Self> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self { size, modules: rows.concat() })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Module at column `x`, row `y`; out-of-range coordinates are light.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.size || y >= self.size {
            return false;
        }
        self.modules[y * self.size + x]
    }

    /// Top-left corners of the three finder patterns (TL, TR, BL).
    pub fn finder_origins(&self) -> [(usize, usize); 3] {
        let far = self.size.saturating_sub(FINDER_SIZE);
        [(0, 0), (far, 0), (0, far)]
    }

    /// Whether `(x, y)` falls inside one of the three fixed finder regions.
    pub fn is_finder_module(&self, x: usize, y: usize) -> bool {
        self.finder_origins()
            .iter()
            .any(|&(fx, fy)| x >= fx && x < fx + FINDER_SIZE && y >= fy && y < fy + FINDER_SIZE)
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }
}

/// The external encoder: `encode(payload, level) -> matrix`.
pub trait SymbolEncoder {
    fn encode(&self, payload: &str, level: EcLevel) -> Result<Matrix, EncodeError>;
}

/// [`SymbolEncoder`] backed by the `qrcodegen` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeGenEncoder;

impl SymbolEncoder for QrCodeGenEncoder {
    fn encode(&self, payload: &str, level: EcLevel) -> Result<Matrix, EncodeError> {
        if payload.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }
        let ecc = match level {
            EcLevel::Low => QrCodeEcc::Low,
            EcLevel::Medium => QrCodeEcc::Medium,
            EcLevel::Quartile => QrCodeEcc::Quartile,
            EcLevel::High => QrCodeEcc::High,
        };
        let qr = QrCode::encode_text(payload, ecc)
            .map_err(|e| EncodeError::Rejected(format!("{:?}", e)))?;

        let size = qr.size();
        let rows: Vec<Vec<bool>> = (0..size)
            .map(|y| (0..size).map(|x| qr.get_module(x, y)).collect())
            .collect();
        Matrix::from_rows(&rows)
            .ok_or_else(|| EncodeError::Rejected("encoder produced an empty grid".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_non_square() {
        assert!(Matrix::from_rows(&[]).is_none());
        assert!(Matrix::from_rows(&[vec![true, false]]).is_none());
        assert!(Matrix::from_rows(&[vec![true]]).is_some());
    }

    #[test]
    fn test_get_out_of_range_is_light() {
        let m = Matrix::from_rows(&[vec![true, true], vec![true, true]]).unwrap();
        assert!(m.get(1, 1));
        assert!(!m.get(-1, 0));
        assert!(!m.get(0, 2));
    }

    #[test]
    fn test_finder_regions_use_fixed_corner_offsets() {
        let rows = vec![vec![false; 21]; 21];
        let m = Matrix::from_rows(&rows).unwrap();
        assert_eq!(m.finder_origins(), [(0, 0), (14, 0), (0, 14)]);
        assert!(m.is_finder_module(0, 0));
        assert!(m.is_finder_module(6, 6));
        assert!(!m.is_finder_module(7, 7));
        assert!(m.is_finder_module(20, 0));
        assert!(m.is_finder_module(0, 20));
        assert!(!m.is_finder_module(20, 20));
    }

    #[test]
    fn test_qrcodegen_encoder_produces_version_sized_grid() {
        let m = QrCodeGenEncoder.encode("HELLO WORLD", SYMBOL_EC_LEVEL).unwrap();
        assert_eq!((m.size() - 17) % 4, 0);
        // Finder corners are always dark.
        assert!(m.get(0, 0));
        assert!(m.get(m.size() as i64 - 1, 0));
        assert!(m.get(0, m.size() as i64 - 1));
    }

    #[test]
    fn test_encoder_rejects_empty_and_oversized() {
        assert_eq!(
            QrCodeGenEncoder.encode("", SYMBOL_EC_LEVEL),
            Err(EncodeError::EmptyPayload)
        );
        let huge = "x".repeat(5000);
        assert!(matches!(
            QrCodeGenEncoder.encode(&huge, SYMBOL_EC_LEVEL),
            Err(EncodeError::Rejected(_))
        ));
    }
}
