//! Pure parameter checks, run before any geometry is built.
//!
//! Every rule is evaluated; all violations are returned together.

use relief_types::{DepthPlan, LogoParams, QrParams};

use crate::config::{Limits, Range};
use crate::qr::{byte_capacity, fits, lower_level_that_fits};
use crate::types::Violation;

/// Parameters that passed every check, plus soft-check warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub params: T,
    pub warnings: Vec<String>,
}

fn check_range(field: &'static str, value: f64, range: Range, out: &mut Vec<Violation>) {
    if !value.is_finite() {
        out.push(Violation::NotFinite { field, value });
    } else if !range.contains(value) {
        out.push(Violation::OutOfRange {
            field,
            value,
            min: range.min,
            max: range.max,
        });
    }
}

fn check_finite(field: &'static str, value: f64, out: &mut Vec<Violation>) {
    if !value.is_finite() {
        out.push(Violation::NotFinite { field, value });
    }
}

/// Wrap an angle in degrees into [-180, 180).
pub fn wrap_rotation(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

pub fn validate_logo(
    params: &LogoParams,
    limits: &Limits,
) -> Result<Validated<LogoParams>, Vec<Violation>> {
    let mut violations = Vec::new();
    check_range("diameter", params.diameter, limits.diameter, &mut violations);
    check_range("total_depth", params.total_depth, limits.total_depth, &mut violations);
    check_range(
        "mountain_fraction",
        params.mountain_fraction,
        limits.mountain_fraction,
        &mut violations,
    );
    check_range(
        "trail_fraction",
        params.trail_fraction,
        limits.trail_fraction,
        &mut violations,
    );
    check_range(
        "bolt_fraction",
        params.bolt_fraction,
        limits.bolt_fraction,
        &mut violations,
    );
    check_range("offset_u", params.offset_u, limits.offset, &mut violations);
    check_range("offset_v", params.offset_v, limits.offset, &mut violations);
    check_finite("rotation_deg", params.rotation_deg, &mut violations);

    if !violations.is_empty() {
        return Err(violations);
    }

    let mut warnings = Vec::new();
    let (m, t, b) = (
        params.mountain_fraction,
        params.trail_fraction,
        params.bolt_fraction,
    );
    if !DepthPlan::logo(params.total_depth, m, t, b).is_staircase() {
        warnings.push(format!(
            "layer fractions are not ordered mountain > trail > bolt ({m} / {t} / {b}); \
             overlaps still follow the shallowest layer"
        ));
    }

    Ok(Validated {
        params: LogoParams {
            rotation_deg: wrap_rotation(params.rotation_deg),
            ..params.clone()
        },
        warnings,
    })
}

/// Surrounding whitespace is dropped from the data before any check, and the
/// trimmed string is what gets encoded and recorded.
pub fn validate_qr(params: &QrParams, limits: &Limits) -> Result<Validated<QrParams>, Vec<Violation>> {
    let mut violations = Vec::new();

    let data = params.data.trim();
    if data.is_empty() {
        violations.push(Violation::EmptyPayload);
    } else if !fits(data, params.ec_level) {
        violations.push(Violation::DataTooLong {
            len: data.len(),
            capacity: byte_capacity(params.ec_level),
            level: params.ec_level,
            fits_at: lower_level_that_fits(data, params.ec_level),
        });
    }

    check_range("size", params.size, limits.qr_size, &mut violations);
    check_range("height", params.height, limits.qr_height, &mut violations);
    if params.border > limits.max_border {
        violations.push(Violation::OutOfRange {
            field: "border",
            value: f64::from(params.border),
            min: 0.0,
            max: f64::from(limits.max_border),
        });
    }
    check_range("offset_u", params.offset_u, limits.offset, &mut violations);
    check_range("offset_v", params.offset_v, limits.offset, &mut violations);

    if !violations.is_empty() {
        return Err(violations);
    }
    Ok(Validated {
        params: QrParams {
            data: data.to_string(),
            ..params.clone()
        },
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_types::EcLevel;

    #[test]
    fn test_wrap_rotation() {
        assert_eq!(wrap_rotation(0.0), 0.0);
        assert_eq!(wrap_rotation(180.0), -180.0);
        assert_eq!(wrap_rotation(-180.0), -180.0);
        assert_eq!(wrap_rotation(270.0), -90.0);
        assert_eq!(wrap_rotation(-190.0), 170.0);
        assert_eq!(wrap_rotation(725.0), 5.0);
    }

    #[test]
    fn test_all_logo_violations_collected() {
        let params = LogoParams {
            diameter: 2.0,
            total_depth: f64::NAN,
            bolt_fraction: 0.9,
            ..LogoParams::default()
        };
        let violations = validate_logo(&params, &Limits::default()).unwrap_err();
        assert_eq!(violations.len(), 3);
        assert!(matches!(
            violations[1],
            Violation::NotFinite {
                field: "total_depth",
                ..
            }
        ));
    }

    #[test]
    fn test_unordered_fractions_only_warn() {
        let params = LogoParams {
            mountain_fraction: 0.2,
            trail_fraction: 0.5,
            bolt_fraction: 0.1,
            ..LogoParams::default()
        };
        let v = validate_logo(&params, &Limits::default()).unwrap();
        assert_eq!(v.warnings.len(), 1);
    }

    #[test]
    fn test_lower_level_suggestion() {
        let data = "x".repeat(2400);
        let params = QrParams {
            data,
            ec_level: EcLevel::M,
            ..QrParams::default()
        };
        let violations = validate_qr(&params, &Limits::default()).unwrap_err();
        assert_eq!(
            violations,
            vec![Violation::DataTooLong {
                len: 2400,
                capacity: 2331,
                level: EcLevel::M,
                fits_at: Some(EcLevel::L),
            }]
        );
    }

    #[test]
    fn test_numeric_payload_past_byte_capacity_is_accepted() {
        let params = QrParams {
            data: "7".repeat(3000),
            ec_level: EcLevel::L,
            ..QrParams::default()
        };
        assert!(validate_qr(&params, &Limits::default()).is_ok());
    }

    #[test]
    fn test_qr_data_is_trimmed() {
        let blank = QrParams {
            data: " \t\n ".to_string(),
            ..QrParams::default()
        };
        assert_eq!(
            validate_qr(&blank, &Limits::default()).unwrap_err(),
            vec![Violation::EmptyPayload]
        );

        let padded = QrParams {
            data: "  https://trailcurrent.com\n".to_string(),
            ..QrParams::default()
        };
        let v = validate_qr(&padded, &Limits::default()).unwrap();
        assert_eq!(v.params.data, "https://trailcurrent.com");
    }

    #[test]
    fn test_border_limit() {
        let params = QrParams {
            data: "hi".to_string(),
            border: 9,
            ..QrParams::default()
        };
        let violations = validate_qr(&params, &Limits::default()).unwrap_err();
        assert!(matches!(
            violations[0],
            Violation::OutOfRange { field: "border", .. }
        ));
    }
}
