use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Modified Julian Date representation.
/// MJD 0 = 1858-11-17 00:00:00 UTC
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ModifiedJulianDate(qtty::Days);

impl ModifiedJulianDate {
    /// Create a new MJD value.
    pub fn new<V: Into<qtty::Days>>(v: V) -> Self {
        Self(v.into())
    }

    /// Raw MJD value as f64.
    pub fn value(&self) -> f64 {
        self.0.value()
    }

    /// Convert to Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn to_unix_timestamp(&self) -> f64 {
        (self.value() - 40587.0) * 86400.0
    }

    /// Create from Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn from_unix_timestamp(timestamp: f64) -> Self {
        Self::new(timestamp / 86400.0 + 40587.0)
    }

    /// Convert to chrono DateTime<Utc>.
    pub fn to_datetime(&self) -> chrono::DateTime<chrono::Utc> {
        let secs = self.to_unix_timestamp();
        let secs_i64 = secs.floor() as i64;
        let nanos = ((secs - secs.floor()) * 1e9) as u32;
        chrono::DateTime::from_timestamp(secs_i64, nanos)
            .unwrap_or_else(|| chrono::DateTime::UNIX_EPOCH)
    }

    /// Create from chrono DateTime<Utc>.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self::from_unix_timestamp(dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9)
    }
}

impl From<f64> for ModifiedJulianDate {
    fn from(v: f64) -> Self {
        ModifiedJulianDate::new(v)
    }
}

impl Add<qtty::Days> for ModifiedJulianDate {
    type Output = ModifiedJulianDate;

    fn add(self, rhs: qtty::Days) -> Self::Output {
        ModifiedJulianDate(self.0 + rhs)
    }
}

impl Sub<ModifiedJulianDate> for ModifiedJulianDate {
    type Output = qtty::Days;

    fn sub(self, rhs: ModifiedJulianDate) -> Self::Output {
        self.0 - rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::ModifiedJulianDate;
    use qtty::{Day, Minutes, Quantity};

    #[test]
    fn test_mjd_new() {
        let mjd = ModifiedJulianDate::new(50000.0);
        assert_eq!(mjd.value(), 50000.0);
    }

    #[test]
    fn test_mjd_from_f64() {
        let mjd: ModifiedJulianDate = 58849.0.into();
        assert_eq!(mjd.value(), 58849.0);
    }

    #[test]
    fn test_mjd_ordering() {
        let mjd1 = ModifiedJulianDate::new(50000.0);
        let mjd2 = ModifiedJulianDate::new(51000.0);

        assert!(mjd1 < mjd2);
        assert!(mjd2 > mjd1);
    }

    #[test]
    fn test_mjd_to_unix_timestamp() {
        // MJD 40587.0 corresponds to Unix epoch (1970-01-01)
        let mjd = ModifiedJulianDate::new(40587.0);
        assert!((mjd.to_unix_timestamp()).abs() < 1.0);
    }

    #[test]
    fn test_mjd_datetime_round_trip() {
        let mjd = ModifiedJulianDate::new(60676.25);
        let back = ModifiedJulianDate::from_datetime(mjd.to_datetime());
        assert!((back.value() - mjd.value()).abs() < 1e-6);
    }

    #[test]
    fn test_mjd_add_days() {
        let mjd = ModifiedJulianDate::new(60676.0);
        let later = mjd + qtty::Days::new(0.5);
        assert_eq!(later.value(), 60676.5);
    }

    #[test]
    fn test_mjd_add_shadow_minutes() {
        // A 40-minute shadow window expressed in days.
        let mjd = ModifiedJulianDate::new(60676.0);
        let shadow: Quantity<Day> = Minutes::new(40.0).to::<Day>();
        let later = mjd + shadow;
        assert!((later.value() - (60676.0 + 40.0 / 1440.0)).abs() < 1e-12);
    }

    #[test]
    fn test_mjd_difference() {
        let a = ModifiedJulianDate::new(60676.0);
        let b = ModifiedJulianDate::new(60677.5);
        assert_eq!((b - a).value(), 1.5);
    }
}
