//! This module defines shared traits used across different kernels and decoders.

use chrono::{DateTime, Utc};

use crate::error::{RawBlockError, Result};
use crate::types::{Precision, Timestamp};

//==================================================================================
// 1. Signed/Unsigned Pairing (used by the zig-zag kernel)
//==================================================================================

/// A trait that maps a signed integer type to its unsigned counterpart.
pub trait HasUnsigned {
    type Unsigned;
}

/// A trait that maps an unsigned integer type to its signed counterpart.
pub trait HasSigned {
    type Signed;
}

// Implement the traits for all primitive integer types.
macro_rules! impl_signed_unsigned_pair {
    ($S:ty, $U:ty) => {
        impl HasUnsigned for $S {
            type Unsigned = $U;
        }
        impl HasSigned for $U {
            type Signed = $S;
        }
    };
}

impl_signed_unsigned_pair!(i8, u8);
impl_signed_unsigned_pair!(i16, u16);
impl_signed_unsigned_pair!(i32, u32);
impl_signed_unsigned_pair!(i64, u64);

//==================================================================================
// 2. Timestamp Conversion Strategy
//==================================================================================

/// Converts an epoch tick count into the caller's preferred temporal type.
///
/// The block decoders are generic over this trait, so the decoded `Value<T>`
/// carries whatever `Output` the caller picks. The precision is whatever the
/// caller passed to the decoder; cells carry no precision of their own.
pub trait TimestampConverter {
    type Output: Clone;

    fn convert(&self, ticks: i64, precision: Precision) -> Result<Self::Output>;
}

/// Default strategy: converts ticks to a `chrono::DateTime<Utc>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoConverter;

impl TimestampConverter for ChronoConverter {
    type Output = DateTime<Utc>;

    fn convert(&self, ticks: i64, precision: Precision) -> Result<DateTime<Utc>> {
        let per_second = precision.ticks_per_second();
        let secs = ticks.div_euclid(per_second);
        let nanos = ticks.rem_euclid(per_second) * (1_000_000_000 / per_second);
        DateTime::from_timestamp(secs, nanos as u32)
            .ok_or(RawBlockError::TimestampOutOfRange { ticks, precision })
    }
}

/// Keeps the raw tick count, tagged with its precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTicks;

impl TimestampConverter for RawTicks {
    type Output = Timestamp;

    fn convert(&self, ticks: i64, precision: Precision) -> Result<Timestamp> {
        Ok(Timestamp { ticks, precision })
    }
}

/// Any plain closure `Fn(i64, Precision) -> T` works as an infallible converter.
impl<F, T> TimestampConverter for F
where
    F: Fn(i64, Precision) -> T,
    T: Clone,
{
    type Output = T;

    fn convert(&self, ticks: i64, precision: Precision) -> Result<T> {
        Ok(self(ticks, precision))
    }
}
