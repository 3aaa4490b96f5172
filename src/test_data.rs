use crate::arrayops::PeakSequence;

pub const REFERENCE_POSITIONS: [f64; 16] = [
    101.0, 104.2, 109.7, 115.1, 118.0, 126.4, 131.3, 138.9, 145.2, 151.6, 152.4, 160.0, 171.8,
    177.3, 186.5, 198.1,
];

pub const REFERENCE_INTENSITIES: [f64; 16] = [
    12.0, 40.5, 7.25, 88.0, 3.0, 51.0, 19.5, 64.0, 33.0, 120.0, 14.0, 9.0, 72.5, 41.0, 26.0, 5.5,
];

pub const SHIFTED_POSITIONS: [f64; 15] = [
    100.6, 104.5, 110.9, 115.0, 126.9, 130.8, 132.0, 139.3, 145.0, 151.9, 160.7, 165.0, 172.4,
    186.1, 199.0,
];

pub const SHIFTED_INTENSITIES: [f64; 15] = [
    10.0, 44.0, 6.0, 80.0, 47.5, 22.0, 8.0, 60.0, 35.0, 110.0, 12.0, 30.0, 70.0, 20.0, 4.0,
];

pub fn reference_spectrum() -> PeakSequence {
    PeakSequence::new(REFERENCE_POSITIONS.to_vec(), REFERENCE_INTENSITIES.to_vec())
        .expect("reference arrays have equal length")
}

/// The reference spectrum with jittered positions, a few peaks dropped and a few added
pub fn shifted_spectrum() -> PeakSequence {
    PeakSequence::new(SHIFTED_POSITIONS.to_vec(), SHIFTED_INTENSITIES.to_vec())
        .expect("shifted arrays have equal length")
}

/// Compare with a relative tolerance of `1e-5` and an absolute tolerance of `1e-8`
pub fn isclose(x: f64, y: f64) -> bool {
    (x - y).abs() <= 1e-8 + 1e-5 * y.abs()
}
