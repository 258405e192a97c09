//! Unit conversion utilities.
//!
//! The content model measures lengths in points; WordprocessingML stores them
//! in twips (1/20 pt) and font sizes in half-points.

pub const TWIPS_PER_PT: f64 = 20.0;
pub const HALF_POINTS_PER_PT: f64 = 2.0;

#[inline]
pub fn pt_to_twip_i64(pt: f64) -> i64 {
    (pt * TWIPS_PER_PT).round() as i64
}

#[inline]
pub fn twip_to_pt_f64(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_PT
}

#[inline]
pub fn pt_to_half_points_u32(pt: f64) -> u32 {
    (pt * HALF_POINTS_PER_PT).round().max(0.0) as u32
}

#[inline]
pub fn half_points_to_pt_f64(half_points: u32) -> f64 {
    half_points as f64 / HALF_POINTS_PER_PT
}
