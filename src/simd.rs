//! SIMD lane abstraction.
//!
//! The DP kernels score one read per SIMD lane and are generic over the
//! vector shape: 8- or 16-bit signed lanes, 8/16/32 lanes per vector. This
//! module hides the concrete vector types behind the [`SimdVec`] trait so a
//! single kernel monomorphizes to every shape.
//!
//! The backing types come from the `wide` crate, which lowers to
//! SSE/AVX2/NEON when the target supports them and to portable code
//! otherwise. Two properties of the backend are load-bearing for the DP:
//!
//! - `saturating_add`/`saturating_sub` clamp at the signed range instead of
//!   wrapping. Local-mode scores ride on a bias equal to the lane minimum, so
//!   saturation at the low end *is* the zero floor of local alignment.
//! - Comparisons produce a full-width all-ones/all-zeros mask per lane,
//!   suitable for `blend` and for scalar inspection via [`SimdVec::extract`].
//!
//! Buffers of vectors (`Vec<V>`) are aligned to the vector type itself, so no
//! custom allocator is needed for aligned loads.

use std::fmt::Debug;

/// Scalar element of a SIMD lane: `i8` or `i16`.
pub trait SimdLane: Copy + Clone + PartialEq + Eq + PartialOrd + Ord + Debug + Send + Sync {
    const MIN: Self;
    const MAX: Self;
    const ZERO: Self;

    fn to_i32(self) -> i32;

    /// Convert from a wide accumulator, clamping to the representable range.
    /// Mirrors the saturating semantics of the vector arithmetic.
    fn from_i32_saturating(v: i32) -> Self;

    /// Width of the representable range, `MAX - MIN`, as a wide integer.
    #[inline]
    fn dynamic_range() -> i32 {
        Self::MAX.to_i32() - Self::MIN.to_i32()
    }
}

impl SimdLane for i8 {
    const MIN: Self = i8::MIN;
    const MAX: Self = i8::MAX;
    const ZERO: Self = 0;

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn from_i32_saturating(v: i32) -> Self {
        v.clamp(i8::MIN as i32, i8::MAX as i32) as i8
    }
}

impl SimdLane for i16 {
    const MIN: Self = i16::MIN;
    const MAX: Self = i16::MAX;
    const ZERO: Self = 0;

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn from_i32_saturating(v: i32) -> Self {
        v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

/// A vector of `LANES` signed integers with saturating arithmetic.
///
/// Comparison methods return a mask vector (all ones in lanes where the
/// predicate holds). The derived comparisons (`cmp_lt`, `cmp_ne`, `cmp_ge`,
/// `cmp_le`) are default-implemented from `cmp_gt`/`cmp_eq` plus `not`, so
/// backends only supply the two primitive predicates.
pub trait SimdVec: Copy + Clone + Debug + Send + Sync + 'static {
    type Lane: SimdLane;

    /// Lane count; also the number of reads scored per batch group.
    const LANES: usize;

    /// Broadcast a scalar into every lane.
    fn splat(v: Self::Lane) -> Self;

    /// Lane-wise saturating add.
    fn saturating_add(self, o: Self) -> Self;

    /// Lane-wise saturating subtract.
    fn saturating_sub(self, o: Self) -> Self;

    /// Lane-wise signed maximum.
    fn max(self, o: Self) -> Self;

    /// Lane-wise equality mask.
    fn cmp_eq(self, o: Self) -> Self;

    /// Lane-wise signed greater-than mask.
    fn cmp_gt(self, o: Self) -> Self;

    /// Bitwise complement.
    fn not(self) -> Self;

    /// Bitwise AND.
    fn and(self, o: Self) -> Self;

    /// Bitwise OR.
    fn or(self, o: Self) -> Self;

    /// Per-lane select: lanes where `self` (a mask) is set take `t`,
    /// the rest take `f`.
    fn blend(self, t: Self, f: Self) -> Self;

    /// Horizontal test: true if any lane is non-zero.
    fn any(self) -> bool;

    /// Read a single lane.
    fn extract(self, lane: usize) -> Self::Lane;

    /// Return a copy with a single lane replaced.
    #[must_use]
    fn insert(self, lane: usize, v: Self::Lane) -> Self;

    /// `self & !o`.
    #[inline]
    fn and_not(self, o: Self) -> Self {
        self.and(o.not())
    }

    /// Lane-wise signed less-than mask.
    #[inline]
    fn cmp_lt(self, o: Self) -> Self {
        o.cmp_gt(self)
    }

    /// Lane-wise inequality mask.
    #[inline]
    fn cmp_ne(self, o: Self) -> Self {
        self.cmp_eq(o).not()
    }

    /// Lane-wise signed greater-or-equal mask.
    #[inline]
    fn cmp_ge(self, o: Self) -> Self {
        self.cmp_lt(o).not()
    }

    /// Lane-wise signed less-or-equal mask.
    #[inline]
    fn cmp_le(self, o: Self) -> Self {
        self.cmp_gt(o).not()
    }

    /// Vector with every lane at the representable minimum.
    #[inline]
    fn min_value() -> Self {
        Self::splat(<Self::Lane>::MIN)
    }

    /// True in `lane` if the mask bit for that lane is set.
    #[inline]
    fn test_lane(self, lane: usize) -> bool {
        self.extract(lane) != <Self::Lane>::ZERO
    }
}

macro_rules! impl_simd_vec {
    ($vec:ty, $lane:ty, $lanes:expr) => {
        impl SimdVec for $vec {
            type Lane = $lane;
            const LANES: usize = $lanes;

            #[inline(always)]
            fn splat(v: Self::Lane) -> Self {
                <$vec>::splat(v)
            }

            #[inline(always)]
            fn saturating_add(self, o: Self) -> Self {
                <$vec>::saturating_add(self, o)
            }

            #[inline(always)]
            fn saturating_sub(self, o: Self) -> Self {
                <$vec>::saturating_sub(self, o)
            }

            #[inline(always)]
            fn max(self, o: Self) -> Self {
                <$vec>::max(self, o)
            }

            #[inline(always)]
            fn cmp_eq(self, o: Self) -> Self {
                wide::CmpEq::cmp_eq(self, o)
            }

            #[inline(always)]
            fn cmp_gt(self, o: Self) -> Self {
                wide::CmpGt::cmp_gt(self, o)
            }

            #[inline(always)]
            fn not(self) -> Self {
                !self
            }

            #[inline(always)]
            fn and(self, o: Self) -> Self {
                self & o
            }

            #[inline(always)]
            fn or(self, o: Self) -> Self {
                self | o
            }

            #[inline(always)]
            fn blend(self, t: Self, f: Self) -> Self {
                <$vec>::blend(self, t, f)
            }

            #[inline(always)]
            fn any(self) -> bool {
                self.to_array().iter().any(|&v| v != 0)
            }

            #[inline(always)]
            fn extract(self, lane: usize) -> Self::Lane {
                self.to_array()[lane]
            }

            #[inline(always)]
            fn insert(self, lane: usize, v: Self::Lane) -> Self {
                let mut arr = self.to_array();
                arr[lane] = v;
                Self::from(arr)
            }
        }
    };
}

impl_simd_vec!(wide::i8x16, i8, 16);
impl_simd_vec!(wide::i8x32, i8, 32);
impl_simd_vec!(wide::i16x8, i16, 8);
impl_simd_vec!(wide::i16x16, i16, 16);

/// Widest 8-bit-lane vector: 32 reads per group.
pub type Int8Fast = wide::i8x32;

/// Widest 16-bit-lane vector: 16 reads per group.
pub type Int16Fast = wide::i16x16;
