//! Length conversions between configuration units and DOCX units.
//!
//! DOCX measures page geometry, spacing, and indents in twips (1/20 point)
//! and font sizes in half-points. Border widths are in eighths of a point;
//! drawing extents are in EMU.

/// Twips per point.
pub const TWIPS_PER_POINT: f32 = 20.0;

/// Twips per centimetre (1440 per inch).
pub const TWIPS_PER_CM: f32 = 1440.0 / 2.54;

/// English Metric Units per inch (DrawingML extents).
pub const EMU_PER_INCH: u32 = 914_400;

/// Line value of single spacing when the line rule is `auto`.
pub const SINGLE_LINE: f32 = 240.0;

/// Convert centimetres to twips, rounding to the nearest twip.
pub fn cm_to_twips(cm: f32) -> i32 {
    (cm * TWIPS_PER_CM).round() as i32
}

/// Convert twips to centimetres.
pub fn twips_to_cm(twips: i32) -> f32 {
    twips as f32 / TWIPS_PER_CM
}

/// Convert points to twips.
pub fn pt_to_twips(pt: f32) -> u32 {
    (pt * TWIPS_PER_POINT).round().max(0.0) as u32
}

/// Convert a point size to half-points.
pub fn pt_to_half_points(pt: f32) -> u32 {
    (pt * 2.0).round().max(0.0) as u32
}

/// Convert a line-spacing multiplier to an `auto` line value.
pub fn line_multiple(multiplier: f32) -> u32 {
    (multiplier * SINGLE_LINE).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cm_to_twips() {
        assert_eq!(cm_to_twips(2.54), 1440);
        assert_eq!(cm_to_twips(1.27), 720);
        assert_eq!(cm_to_twips(21.59), 12240);
        assert_eq!(cm_to_twips(27.94), 15840);
        assert_eq!(cm_to_twips(-1.27), -720);
    }

    #[test]
    fn test_point_units() {
        assert_eq!(pt_to_twips(12.0), 240);
        assert_eq!(pt_to_half_points(10.5), 21);
        assert_eq!(line_multiple(2.0), 480);
        assert_eq!(line_multiple(1.5), 360);
    }
}
