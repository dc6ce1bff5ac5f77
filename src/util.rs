
use std::fmt::Debug;

#[cfg(target_arch = "x86_64")]
cpufeatures::new!(cpuid_avx2, "avx2");

/// Returns `true` if the running CPU supports AVX2.
#[cfg(target_arch = "x86_64")]
#[must_use]
pub fn has_avx2() -> bool {
    cpuid_avx2::get()
}

#[cfg(not(target_arch = "x86_64"))]
#[must_use]
pub fn has_avx2() -> bool {
    false
}

/// A scalar value stored in a [`Grid`](crate::grid::Grid) that can be resampled.
///
/// Resampling accumulates weighted sums in `f64` and converts back to the
/// storage type only once per destination cell, so that repeated halving does
/// not compound rounding error from narrow storage types.
pub trait Sample: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    #[must_use]
    fn to_f64(self) -> f64;

    #[must_use]
    fn from_f64(value: f64) -> Self;
}

impl Sample for f32 {
    #[inline(always)]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value
    }
}

/// Rounds an accumulated channel value to the nearest integer and saturates it
/// to the 8-bit range. NaN maps to 0.
#[inline(always)]
#[must_use]
pub fn clamp_u8(value: f32) -> u8 {
    // `as` saturates float-to-int conversions and maps NaN to 0.
    value.round() as u8
}

/// Rounded average of two 8-bit channels, `(a + b + 1) / 2`.
///
/// This matches the rounding of `_mm256_avg_epu8`, so the scalar and SIMD
/// halving kernels agree bit for bit.
#[inline(always)]
#[must_use]
pub fn average_u8(a: u8, b: u8) -> u8 {
    ((u16::from(a) + u16::from(b) + 1) >> 1) as u8
}
