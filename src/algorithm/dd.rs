//! Double-double extended precision arithmetic.
//!
//! A [`DD`] holds an unevaluated sum `hi + lo` of two `f64`s with
//! `|lo| <= 0.5 * ulp(hi)`, giving roughly 106 bits of mantissa using only
//! native double arithmetic. The operations use the classic error-free
//! transformations: Knuth's two-sum for addition and Dekker's splitting for
//! multiplication and division.
//!
//! Only the operations needed by the robust predicates and the
//! intersection refinement are provided.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use float_next_after::NextAfter;

/// Dekker split constant, `2^27 + 1`.
const SPLIT: f64 = 134_217_729.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DD {
    hi: f64,
    lo: f64,
}

impl DD {
    pub const ZERO: DD = DD { hi: 0.0, lo: 0.0 };
    pub const ONE: DD = DD { hi: 1.0, lo: 0.0 };

    /// Creates a value from its components. The caller is responsible for
    /// `hi` and `lo` being normalized.
    #[inline]
    pub const fn new(hi: f64, lo: f64) -> Self {
        DD { hi, lo }
    }

    #[inline]
    pub fn hi(&self) -> f64 {
        self.hi
    }

    #[inline]
    pub fn lo(&self) -> f64 {
        self.lo
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.hi + self.lo
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        self.hi.is_nan()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.hi == 0.0 && self.lo == 0.0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.hi < 0.0 || (self.hi == 0.0 && self.lo < 0.0)
    }

    /// Whether `lo` is within half an ulp of `hi`.
    pub fn is_normalized(&self) -> bool {
        if !self.hi.is_finite() {
            return true;
        }
        let mag = self.hi.abs();
        let ulp = mag.next_after(f64::INFINITY) - mag;
        self.lo.abs() <= 0.5 * ulp
    }

    /// Sign of the value: `1`, `-1` or `0`.
    pub fn signum(&self) -> i32 {
        if self.hi > 0.0 {
            return 1;
        }
        if self.hi < 0.0 {
            return -1;
        }
        if self.lo > 0.0 {
            return 1;
        }
        if self.lo < 0.0 {
            return -1;
        }
        0
    }

    pub fn abs(self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }

    pub fn sqr(self) -> Self {
        self * self
    }

    fn add_parts(self, yhi: f64, ylo: f64) -> Self {
        let s_hi = self.hi + yhi;
        let t_hi = self.lo + ylo;
        let e = s_hi - self.hi;
        let f = t_hi - self.lo;
        let s = s_hi - e;
        let t = t_hi - f;
        let s = (yhi - e) + (self.hi - s);
        let t = (ylo - f) + (self.lo - t);
        let e = s + t_hi;
        let h = s_hi + e;
        let h_lo = e + (s_hi - h);
        let e = t + h_lo;

        let zhi = h + e;
        let zlo = e + (h - zhi);
        DD { hi: zhi, lo: zlo }
    }

    fn mul_parts(self, yhi: f64, ylo: f64) -> Self {
        let c_big = SPLIT * self.hi;
        let hx = c_big - self.hi;
        let c = SPLIT * yhi;
        let hx = c_big - hx;
        let tx = self.hi - hx;
        let hy = c - yhi;
        let c_big = self.hi * yhi;
        let hy = c - hy;
        let ty = yhi - hy;
        let c = ((((hx * hy - c_big) + hx * ty) + tx * hy) + tx * ty) + (self.hi * ylo + self.lo * yhi);
        let zhi = c_big + c;
        let hx = c_big - zhi;
        let zlo = c + hx;
        DD { hi: zhi, lo: zlo }
    }

    fn div_parts(self, yhi: f64, ylo: f64) -> Self {
        let c_big = self.hi / yhi;
        let c = SPLIT * c_big;
        let hc = c - c_big;
        let u = SPLIT * yhi;
        let hc = c - hc;
        let tc = c_big - hc;
        let hy = u - yhi;
        let u_big = c_big * yhi;
        let hy = u - hy;
        let ty = yhi - hy;
        let u = (((hc * hy - u_big) + hc * ty) + tc * hy) + tc * ty;
        let c = ((((self.hi - u_big) - u) + self.lo) - c_big * ylo) / yhi;
        let u = c_big + c;
        DD {
            hi: u,
            lo: (c_big - u) + c,
        }
    }

    /// `1 / self`.
    pub fn reciprocal(self) -> Self {
        let c_big = 1.0 / self.hi;
        let c = SPLIT * c_big;
        let hc = c - c_big;
        let u = SPLIT * self.hi;
        let hc = c - hc;
        let tc = c_big - hc;
        let hy = u - self.hi;
        let u_big = c_big * self.hi;
        let hy = u - hy;
        let ty = self.hi - hy;
        let u = (((hc * hy - u_big) + hc * ty) + tc * hy) + tc * ty;
        let c = ((1.0 - u_big) - u - c_big * self.lo) / self.hi;

        let zhi = c_big + c;
        let zlo = (c_big - zhi) + c;
        DD { hi: zhi, lo: zlo }
    }

    /// Largest integer value not greater than `self`.
    pub fn floor(self) -> Self {
        if self.is_nan() {
            return DD::new(f64::NAN, f64::NAN);
        }
        let fhi = self.hi.floor();
        let flo = if fhi == self.hi { self.lo.floor() } else { 0.0 };
        DD { hi: fhi, lo: flo }
    }

    /// Smallest integer value not less than `self`.
    pub fn ceil(self) -> Self {
        if self.is_nan() {
            return DD::new(f64::NAN, f64::NAN);
        }
        let fhi = self.hi.ceil();
        let flo = if fhi == self.hi { self.lo.ceil() } else { 0.0 };
        DD { hi: fhi, lo: flo }
    }

    /// Exact-to-DD-precision value of the 2x2 determinant
    /// `| x1 y1 |`
    /// `| x2 y2 |`.
    pub fn determinant(x1: DD, y1: DD, x2: DD, y2: DD) -> DD {
        x1 * y2 - y1 * x2
    }

    pub fn determinant_f64(x1: f64, y1: f64, x2: f64, y2: f64) -> DD {
        DD::determinant(x1.into(), y1.into(), x2.into(), y2.into())
    }
}

impl From<f64> for DD {
    #[inline]
    fn from(v: f64) -> Self {
        DD { hi: v, lo: 0.0 }
    }
}

impl Neg for DD {
    type Output = DD;
    #[inline]
    fn neg(self) -> DD {
        if self.is_nan() {
            return self;
        }
        DD {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Add for DD {
    type Output = DD;
    fn add(self, y: DD) -> DD {
        self.add_parts(y.hi, y.lo)
    }
}

impl Add<f64> for DD {
    type Output = DD;
    fn add(self, y: f64) -> DD {
        self.add_parts(y, 0.0)
    }
}

impl Sub for DD {
    type Output = DD;
    fn sub(self, y: DD) -> DD {
        self.add_parts(-y.hi, -y.lo)
    }
}

impl Sub<f64> for DD {
    type Output = DD;
    fn sub(self, y: f64) -> DD {
        self.add_parts(-y, 0.0)
    }
}

impl Mul for DD {
    type Output = DD;
    fn mul(self, y: DD) -> DD {
        self.mul_parts(y.hi, y.lo)
    }
}

impl Mul<f64> for DD {
    type Output = DD;
    fn mul(self, y: f64) -> DD {
        self.mul_parts(y, 0.0)
    }
}

impl Div for DD {
    type Output = DD;
    fn div(self, y: DD) -> DD {
        self.div_parts(y.hi, y.lo)
    }
}

impl Div<f64> for DD {
    type Output = DD;
    fn div(self, y: f64) -> DD {
        self.div_parts(y, 0.0)
    }
}

impl fmt::Display for DD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e} + {:e}", self.hi, self.lo)
    }
}
