use serde::{Deserialize, Serialize};
use std::fmt;

use crate::frame::FaceId;

/// QR error-correction tier, from least to most redundant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl EcLevel {
    pub const ALL: [EcLevel; 4] = [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H];

    /// The next less redundant tier, if any.
    pub fn lower(&self) -> Option<EcLevel> {
        match self {
            EcLevel::L => None,
            EcLevel::M => Some(EcLevel::L),
            EcLevel::Q => Some(EcLevel::M),
            EcLevel::H => Some(EcLevel::Q),
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        };
        f.write_str(s)
    }
}

/// Raised (fused onto the face) or recessed (cut into it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReliefMode {
    Emboss,
    Deboss,
}

/// Parameters for the layered logo deboss. Lengths in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoParams {
    pub diameter: f64,
    pub total_depth: f64,
    pub mountain_fraction: f64,
    pub trail_fraction: f64,
    pub bolt_fraction: f64,
    pub offset_u: f64,
    pub offset_v: f64,
    /// In-plane rotation in degrees, counter-clockwise about the face normal.
    pub rotation_deg: f64,
}

impl Default for LogoParams {
    fn default() -> Self {
        Self {
            diameter: 18.0,
            total_depth: 0.8,
            mountain_fraction: 0.55,
            trail_fraction: 0.30,
            bolt_fraction: 0.15,
            offset_u: 0.0,
            offset_v: 0.0,
            rotation_deg: 0.0,
        }
    }
}

/// Parameters for a QR-code emboss/deboss. Lengths in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrParams {
    pub data: String,
    /// Side length of the whole symbol including quiet zone.
    pub size: f64,
    /// Protrusion height (emboss) or recess depth (deboss).
    pub height: f64,
    pub mode: ReliefMode,
    pub ec_level: EcLevel,
    /// Quiet-zone width in modules.
    pub border: u32,
    pub offset_u: f64,
    pub offset_v: f64,
}

impl Default for QrParams {
    fn default() -> Self {
        Self {
            data: String::new(),
            size: 20.0,
            height: 0.5,
            mode: ReliefMode::Emboss,
            ec_level: EcLevel::M,
            border: 2,
            offset_u: 0.0,
            offset_v: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReliefParams {
    Logo(LogoParams),
    Qr(QrParams),
}

/// Everything needed to rebuild a relief: the face it sits on and its parameters.
/// The host stores this alongside the result and hands it back on re-edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliefRecord {
    pub face: FaceId,
    pub params: ReliefParams,
}
