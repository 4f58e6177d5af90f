//! Status records sent by browser clients
//!
//! A record is decoded from the JSON body of a single request and lives
//! only as long as that request. Two client generations exist in the wild,
//! one without `tabCount`; both decode into the same [`StatusRecord`].

use crate::error::DecodeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One battery status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    /// Reporting client, used as the `instance` label
    #[serde(rename = "hostname")]
    pub instance_id: String,
    /// Whether the battery is charging
    #[serde(default)]
    pub charging: bool,
    /// Seconds until fully charged
    #[serde(default, deserialize_with = "null_as_zero")]
    pub charging_time: i64,
    /// Seconds until empty
    #[serde(default, deserialize_with = "null_as_zero")]
    pub discharging_time: i64,
    /// Charge level in percent
    #[serde(default)]
    pub level: i8,
    /// Open browser tabs; older clients omit it
    #[serde(default)]
    pub tab_count: u32,
}

/// Browsers report an unknown duration as `Infinity`, which serializes to `null`.
fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

impl StatusRecord {
    /// Decode and validate a record from a raw request body.
    pub fn from_json(raw: &[u8]) -> Result<Self, DecodeError> {
        let record: StatusRecord = serde_json::from_slice(raw)?;
        record.validate()?;
        Ok(record)
    }

    /// Check the constraints JSON typing alone cannot express.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.instance_id.is_empty() {
            return Err(DecodeError::EmptyHostname);
        }
        if !(0..=100).contains(&self.level) {
            return Err(DecodeError::LevelOutOfRange(self.level));
        }
        Ok(())
    }

    /// Gauge values for this record, stamped with `now` (unix seconds).
    pub fn readings(&self, now: i64) -> Readings {
        Readings {
            charging: if self.charging { 1.0 } else { 0.0 },
            charging_time: self.charging_time as f64,
            discharging_time: self.discharging_time as f64,
            level: f64::from(self.level),
            tab_count: f64::from(self.tab_count),
            last_updated: now as f64,
        }
    }
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}% +{}/-{} t:{}",
            self.instance_id, self.level, self.charging_time, self.discharging_time, self.tab_count
        )
    }
}

/// The six gauge values written for one instance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readings {
    /// 1.0 while charging, 0.0 otherwise
    pub charging: f64,
    pub charging_time: f64,
    pub discharging_time: f64,
    pub level: f64,
    pub tab_count: f64,
    /// Unix seconds of the accepted submission
    pub last_updated: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_record() {
        let raw = br#"{"hostname":"h1","charging":true,"chargingTime":120,"dischargingTime":0,"level":85,"tabCount":7}"#;
        let record = StatusRecord::from_json(raw).unwrap();

        assert_eq!(record.instance_id, "h1");
        assert!(record.charging);
        assert_eq!(record.charging_time, 120);
        assert_eq!(record.discharging_time, 0);
        assert_eq!(record.level, 85);
        assert_eq!(record.tab_count, 7);
    }

    #[test]
    fn test_decode_legacy_record_without_tab_count() {
        let raw = br#"{"hostname":"old","charging":false,"chargingTime":0,"dischargingTime":5400,"level":40}"#;
        let record = StatusRecord::from_json(raw).unwrap();
        assert_eq!(record.tab_count, 0);
        assert_eq!(record.discharging_time, 5400);
    }

    #[test]
    fn test_null_durations_decode_as_zero() {
        let raw = br#"{"hostname":"h","charging":true,"chargingTime":null,"dischargingTime":null,"level":100}"#;
        let record = StatusRecord::from_json(raw).unwrap();
        assert_eq!(record.charging_time, 0);
        assert_eq!(record.discharging_time, 0);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let raw = br#"{"hostname":"h","level":3,"browser":"chrome"}"#;
        assert!(StatusRecord::from_json(raw).is_ok());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = StatusRecord::from_json(b"{\"hostname\":");
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_missing_hostname_rejected() {
        let result = StatusRecord::from_json(br#"{"level":50}"#);
        match result {
            Err(DecodeError::Json(msg)) => assert!(msg.contains("hostname")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_hostname_rejected() {
        let result = StatusRecord::from_json(br#"{"hostname":"","level":50}"#);
        assert_eq!(result, Err(DecodeError::EmptyHostname));
    }

    #[test]
    fn test_level_bounds() {
        assert_eq!(
            StatusRecord::from_json(br#"{"hostname":"h","level":101}"#),
            Err(DecodeError::LevelOutOfRange(101))
        );
        assert_eq!(
            StatusRecord::from_json(br#"{"hostname":"h","level":-1}"#),
            Err(DecodeError::LevelOutOfRange(-1))
        );
        // Does not fit the wire type at all
        assert!(matches!(
            StatusRecord::from_json(br#"{"hostname":"h","level":300}"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_fractional_level_rejected() {
        let result = StatusRecord::from_json(br#"{"hostname":"h","level":56.5}"#);
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_negative_tab_count_rejected() {
        let result = StatusRecord::from_json(br#"{"hostname":"h","level":5,"tabCount":-2}"#);
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_readings() {
        let record = StatusRecord {
            instance_id: "h1".to_string(),
            charging: true,
            charging_time: 120,
            discharging_time: 0,
            level: 85,
            tab_count: 7,
        };
        let readings = record.readings(1_700_000_000);

        assert_eq!(readings.charging, 1.0);
        assert_eq!(readings.charging_time, 120.0);
        assert_eq!(readings.level, 85.0);
        assert_eq!(readings.tab_count, 7.0);
        assert_eq!(readings.last_updated, 1_700_000_000.0);
    }

    #[test]
    fn test_display_summary() {
        let record = StatusRecord {
            instance_id: "laptop".to_string(),
            charging: false,
            charging_time: 0,
            discharging_time: 3600,
            level: 42,
            tab_count: 12,
        };
        assert_eq!(record.to_string(), "laptop: 42% +0/-3600 t:12");
    }
}
