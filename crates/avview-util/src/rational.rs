//! Numerator/denominator pairs copied out of native records.

use std::fmt;

use ffmpeg_the_third::ffi::{av_reduce, AVRational};

/// A fraction used for frame rates, time bases and aspect ratios.
///
/// Copied by value; a native field that was never set reads as `0/0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Returns the value as a float, or `None` when the denominator is zero.
    pub fn to_f64(self) -> Option<f64> {
        if self.den == 0 {
            None
        } else {
            Some(self.num as f64 / self.den as f64)
        }
    }

    /// True when both terms are non-zero.
    pub const fn is_valid(self) -> bool {
        self.num != 0 && self.den != 0
    }

    pub const fn invert(self) -> Self {
        Self {
            num: self.den,
            den: self.num,
        }
    }

    /// Reduce the fraction with `av_reduce`, keeping both terms within `max`.
    ///
    /// Returns the reduced value and whether the reduction was exact.
    pub fn reduce(self, max: i64) -> (Self, bool) {
        let mut num = 0;
        let mut den = 0;
        let exact =
            unsafe { av_reduce(&mut num, &mut den, self.num as i64, self.den as i64, max) };
        (Self::new(num, den), exact != 0)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<AVRational> for Rational {
    fn from(r: AVRational) -> Self {
        Self::new(r.num, r.den)
    }
}

impl From<Rational> for AVRational {
    fn from(r: Rational) -> Self {
        AVRational {
            num: r.num,
            den: r.den,
        }
    }
}

impl From<ffmpeg_the_third::Rational> for Rational {
    fn from(r: ffmpeg_the_third::Rational) -> Self {
        Self::new(r.numerator(), r.denominator())
    }
}

impl From<Rational> for ffmpeg_the_third::Rational {
    fn from(r: Rational) -> Self {
        ffmpeg_the_third::Rational::new(r.num, r.den)
    }
}
