// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

/// Point in time representation for Query protocol services.
///
/// # Examples
/// ```
/// # use cloud_sdk_wkt::{Timestamp, TimestampError};
/// let ts = Timestamp::try_from("2015-01-25T08:00:00Z")?;
/// assert_eq!(ts.seconds(), 1422172800);
/// assert_eq!(ts.to_query_string()?, "2015-01-25T08:00:00Z");
/// # Ok::<(), TimestampError>(())
/// ```
///
/// A Timestamp represents a point in time independent of any time zone or local
/// calendar, encoded as a count of seconds and fractions of seconds at
/// nanosecond resolution. The count is relative to an epoch at UTC midnight on
/// January 1, 1970.
///
/// The range is from 0001-01-01T00:00:00Z to 9999-12-31T23:59:59.999999999Z.
///
/// # Wire format
///
/// Requests carry timestamps in UTC with second resolution, as
/// `{year}-{month}-{day}T{hour}:{min}:{sec}Z`. Any fractional seconds are
/// truncated. Responses may include fractional seconds, they are preserved
/// when parsing.
///
/// The default value (the Unix epoch) means "unset". Query protocol requests
/// omit unset timestamps unless the field is explicitly optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub struct Timestamp {
    /// Seconds of UTC time since Unix epoch 1970-01-01T00:00:00Z.
    seconds: i64,

    /// Non-negative fractions of a second at nanosecond resolution. Must be
    /// from 0 to 999,999,999 inclusive.
    nanos: i32,
}

/// Represent failures in converting or creating [Timestamp] instances.
///
/// Examples
/// ```
/// # use cloud_sdk_wkt::{Timestamp, TimestampError};
/// let ts = Timestamp::new(Timestamp::MAX_SECONDS + 2, 0);
/// assert!(matches!(ts, Err(TimestampError::OutOfRange)));
///
/// let ts = Timestamp::try_from("invalid");
/// assert!(matches!(ts, Err(TimestampError::Deserialize(_))));
/// ```
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum TimestampError {
    /// One of the components (seconds and/or nanoseconds) was out of range.
    #[error("seconds and/or nanoseconds out of range")]
    OutOfRange,

    /// There was a problem parsing a timestamp.
    #[error("cannot deserialize timestamp, source={0}")]
    Deserialize(#[source] BoxedError),

    /// There was a problem formatting a timestamp.
    #[error("cannot serialize timestamp, source={0}")]
    Serialize(#[source] BoxedError),
}

type BoxedError = Box<dyn std::error::Error + Send + Sync>;
type Error = TimestampError;

const NS: i128 = 1_000_000_000;

impl Timestamp {
    // Obtained via: `date +%s --date='0001-01-01T00:00:00Z'`
    /// The minimum value for the `seconds` component. Corresponds to '0001-01-01T00:00:00Z'.
    pub const MIN_SECONDS: i64 = -62135596800;

    // Obtained via: `date +%s --date='9999-12-31T23:59:59Z'`
    /// The maximum value for the `seconds` component. Corresponds to '9999-12-31T23:59:59Z'.
    pub const MAX_SECONDS: i64 = 253402300799;

    /// The minimum value for the `nanos` component.
    pub const MIN_NANOS: i32 = 0;

    /// The maximum value for the `nanos` component.
    pub const MAX_NANOS: i32 = 999_999_999;

    /// Creates a new [Timestamp] from the seconds and nanoseconds.
    ///
    /// If either value is out of range it returns an error.
    ///
    /// # Examples
    /// ```
    /// # use cloud_sdk_wkt::{Timestamp, TimestampError};
    /// let ts = Timestamp::new(1422172800, 0)?;
    /// assert_eq!(ts.to_query_string()?, "2015-01-25T08:00:00Z");
    ///
    /// let ts = Timestamp::new(1422172800, 2_000_000_000);
    /// assert!(matches!(ts, Err(TimestampError::OutOfRange)));
    /// # Ok::<(), TimestampError>(())
    /// ```
    pub fn new(seconds: i64, nanos: i32) -> Result<Self, Error> {
        if !(Self::MIN_SECONDS..=Self::MAX_SECONDS).contains(&seconds) {
            return Err(Error::OutOfRange);
        }
        if !(Self::MIN_NANOS..=Self::MAX_NANOS).contains(&nanos) {
            return Err(Error::OutOfRange);
        }
        Ok(Self { seconds, nanos })
    }

    /// Seconds of UTC time since Unix epoch (1970-01-01T00:00:00Z).
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Non-negative fractions of a second at nanosecond resolution.
    pub fn nanos(&self) -> i32 {
        self.nanos
    }

    /// Returns true for the default value.
    ///
    /// # Example
    /// ```
    /// # use cloud_sdk_wkt::Timestamp;
    /// assert!(Timestamp::default().is_unset());
    /// ```
    pub fn is_unset(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    /// Formats the timestamp as used in Query protocol requests.
    ///
    /// The result is in UTC, with second resolution.
    ///
    /// # Example
    /// ```
    /// # use cloud_sdk_wkt::{Timestamp, TimestampError};
    /// let ts = Timestamp::new(1422172800, 500_000_000)?;
    /// assert_eq!(ts.to_query_string()?, "2015-01-25T08:00:00Z");
    /// # Ok::<(), TimestampError>(())
    /// ```
    pub fn to_query_string(&self) -> Result<String, Error> {
        let odt = time::OffsetDateTime::from_unix_timestamp(self.seconds)
            .map_err(|e| Error::Serialize(e.into()))?;
        odt.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
        ))
        .map_err(|e| Error::Serialize(e.into()))
    }
}

/// Converts the string representation of a timestamp to [Timestamp].
///
/// The input must be in [RFC 3339](https://www.ietf.org/rfc/rfc3339.txt)
/// format, fractional seconds are optional.
///
/// # Example
/// ```
/// # use cloud_sdk_wkt::{Timestamp, TimestampError};
/// let ts = Timestamp::try_from("2015-01-25T08:00:00.500Z")?;
/// assert_eq!(ts.seconds(), 1422172800);
/// assert_eq!(ts.nanos(), 500_000_000);
/// # Ok::<(), TimestampError>(())
/// ```
impl TryFrom<&str> for Timestamp {
    type Error = TimestampError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let odt = time::OffsetDateTime::parse(value, &Rfc3339)
            .map_err(|e| TimestampError::Deserialize(e.into()))?;
        Timestamp::try_from(odt)
    }
}

/// Convert from [time::OffsetDateTime] to [Timestamp].
///
/// This conversion may fail if the [time::OffsetDateTime] value is out of range.
///
/// # Examples
/// ```
/// # use cloud_sdk_wkt::Timestamp;
/// use time::macros::datetime;
/// let ts = Timestamp::try_from(datetime!(2015-01-25 08:00:00 UTC))?;
/// assert_eq!(ts.to_query_string()?, "2015-01-25T08:00:00Z");
/// # Ok::<(), anyhow::Error>(())
/// ```
impl TryFrom<time::OffsetDateTime> for Timestamp {
    type Error = TimestampError;

    fn try_from(value: time::OffsetDateTime) -> Result<Self, Self::Error> {
        let nanos_since_epoch = value.unix_timestamp_nanos();
        let seconds = nanos_since_epoch.div_euclid(NS);
        let nanos = nanos_since_epoch.rem_euclid(NS);
        let seconds = i64::try_from(seconds).map_err(|_| Error::OutOfRange)?;
        let nanos = i32::try_from(nanos).map_err(|_| Error::OutOfRange)?;
        Timestamp::new(seconds, nanos)
    }
}

/// Convert from [Timestamp] to [OffsetDateTime][time::OffsetDateTime].
///
/// # Examples
/// ```
/// # use cloud_sdk_wkt::Timestamp;
/// use time::{macros::datetime, OffsetDateTime};
/// let ts = Timestamp::try_from("2015-01-25T08:00:00Z")?;
/// let dt = OffsetDateTime::try_from(ts)?;
/// assert_eq!(dt, datetime!(2015-01-25 08:00:00 UTC));
/// # Ok::<(), anyhow::Error>(())
/// ```
impl TryFrom<Timestamp> for time::OffsetDateTime {
    type Error = time::error::ComponentRange;
    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        time::OffsetDateTime::from_unix_timestamp_nanos(
            value.seconds as i128 * NS + value.nanos as i128,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use time::macros::datetime;
    type Result = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn unix_epoch() -> Result {
        let ts = Timestamp::default();
        assert!(ts.is_unset(), "{ts:?}");
        assert_eq!(ts.to_query_string()?, "1970-01-01T00:00:00Z");
        Ok(())
    }

    #[test_case(Timestamp::MIN_SECONDS - 1, 0; "seconds below range")]
    #[test_case(Timestamp::MAX_SECONDS + 1, 0; "seconds above range")]
    #[test_case(0, -1; "nanos below range")]
    #[test_case(0, 1_000_000_000; "nanos above range")]
    fn new_out_of_range(seconds: i64, nanos: i32) -> Result {
        let t = Timestamp::new(seconds, nanos);
        assert!(matches!(t, Err(Error::OutOfRange)), "{t:?}");
        Ok(())
    }

    #[test_case(1422172800, 0, "2015-01-25T08:00:00Z")]
    #[test_case(1422172800, 999_999_999, "2015-01-25T08:00:00Z"; "truncates nanos")]
    #[test_case(Timestamp::MIN_SECONDS, 0, "0001-01-01T00:00:00Z"; "min")]
    #[test_case(Timestamp::MAX_SECONDS, 0, "9999-12-31T23:59:59Z"; "max")]
    #[test_case(-1, 0, "1969-12-31T23:59:59Z"; "before epoch")]
    fn query_string(seconds: i64, nanos: i32, want: &str) -> Result {
        let ts = Timestamp::new(seconds, nanos)?;
        assert_eq!(ts.to_query_string()?, want);
        Ok(())
    }

    #[test_case("2015-01-25T08:00:00Z", 1422172800, 0)]
    #[test_case("2015-01-25T08:00:00.123Z", 1422172800, 123_000_000)]
    #[test_case("2015-01-25T09:00:00+01:00", 1422172800, 0; "with offset")]
    #[test_case("1969-12-31T23:59:59.5Z", -1, 500_000_000; "before epoch")]
    fn parse(input: &str, seconds: i64, nanos: i32) -> Result {
        let ts = Timestamp::try_from(input)?;
        assert_eq!(ts, Timestamp::new(seconds, nanos)?);
        Ok(())
    }

    #[test_case(""; "empty")]
    #[test_case("2015-01-25"; "date only")]
    #[test_case("2015-01-25T08:00:00"; "missing offset")]
    #[test_case("not a timestamp"; "garbage")]
    fn parse_error(input: &str) {
        let got = Timestamp::try_from(input);
        assert!(matches!(got, Err(Error::Deserialize(_))), "{got:?}");
    }

    #[test]
    fn offset_date_time() -> Result {
        let dt = datetime!(2015-01-25 08:00:00.25 UTC);
        let ts = Timestamp::try_from(dt)?;
        assert_eq!(ts, Timestamp::new(1422172800, 250_000_000)?);
        let back = time::OffsetDateTime::try_from(ts)?;
        assert_eq!(back, dt);
        Ok(())
    }

    #[test]
    fn offset_date_time_out_of_range() {
        let dt = datetime!(-0001-01-01 00:00:00 UTC);
        let got = Timestamp::try_from(dt);
        assert!(matches!(got, Err(Error::OutOfRange)), "{got:?}");
    }
}
