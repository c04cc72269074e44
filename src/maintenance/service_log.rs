//! Service Logger: validates a service event and produces the updated record
//!
//! `apply_service` never mutates its input. The only clock it consults is
//! the processing date used to reject future-dated events, so applying the
//! same event to the same record always gives the same result.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::config::{defaults, FleetConfig};
use crate::types::{ServiceEvent, ServiceType, UnitRecord};

/// Why a submitted service event was rejected.
///
/// Messages are operator-facing: they are shown next to the service form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("service event is for unit '{event_unit}' but was submitted against unit '{record_unit}'")]
    UnitMismatch {
        event_unit: String,
        record_unit: String,
    },

    #[error("service date {date} is in the future (today is {today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },

    #[error("unrecognized service type '{0}'")]
    UnrecognizedServiceType(String),

    #[error("notes are required when the service type is 'Other'")]
    MissingNotes,

    #[error("interval of {0} hours is invalid, it must be a positive number")]
    InvalidInterval(f64),
}

/// Applies service events using a label → hours interval table.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLogger {
    intervals: BTreeMap<String, f64>,
    /// Site time zone for "today"; host local time when unset
    utc_offset: Option<FixedOffset>,
}

impl Default for ServiceLogger {
    fn default() -> Self {
        Self::new(
            defaults::DEFAULT_SERVICE_INTERVALS
                .iter()
                .map(|&(label, hours)| (label.to_string(), hours)),
        )
    }
}

impl ServiceLogger {
    pub fn new(intervals: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            intervals: intervals.into_iter().collect(),
            utc_offset: None,
        }
    }

    pub fn from_config(config: &FleetConfig) -> Self {
        let logger = Self::new(config.service_intervals.clone());
        match config.fleet.utc_offset() {
            Some(offset) => logger.with_utc_offset(offset),
            None => logger,
        }
    }

    /// Judge service dates against the calendar at `offset` instead of the
    /// host's local time zone.
    #[must_use]
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = Some(offset);
        self
    }

    /// Calendar date at the site for the instant `now`.
    pub fn site_date(&self, now: DateTime<Utc>) -> NaiveDate {
        match self.utc_offset {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => now.with_timezone(&Local).date_naive(),
        }
    }

    /// Recognized interval labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.intervals.keys().map(String::as_str)
    }

    pub fn interval_hours(&self, label: &str) -> Option<f64> {
        self.intervals.get(label).copied()
    }

    /// Apply `event` to `record`, rejecting events dated after today at the site.
    pub fn apply_service(
        &self,
        record: &UnitRecord,
        event: &ServiceEvent,
    ) -> Result<UnitRecord, ValidationError> {
        self.apply_service_on(record, event, self.site_date(Utc::now()))
    }

    /// Apply `event` to `record` with an explicit processing date.
    ///
    /// Checks run in order: unit routing, date, service type.
    pub fn apply_service_on(
        &self,
        record: &UnitRecord,
        event: &ServiceEvent,
        today: NaiveDate,
    ) -> Result<UnitRecord, ValidationError> {
        if event.unit_id != record.id {
            return Err(ValidationError::UnitMismatch {
                event_unit: event.unit_id.clone(),
                record_unit: record.id.clone(),
            });
        }

        if event.date > today {
            return Err(ValidationError::FutureDate {
                date: event.date,
                today,
            });
        }

        let serviced_at = record.current_meter;
        let next_due = |hours: f64| {
            let due = serviced_at + hours;
            if due.is_finite() {
                Ok(due)
            } else {
                Err(ValidationError::InvalidInterval(hours))
            }
        };

        let due_at_meter = match &event.service_type {
            ServiceType::Scheduled(label) => {
                let hours = self
                    .interval_hours(label)
                    .ok_or_else(|| ValidationError::UnrecognizedServiceType(label.clone()))?;
                next_due(hours)?
            }
            ServiceType::Other => {
                if event.trimmed_notes().is_none() {
                    return Err(ValidationError::MissingNotes);
                }
                match event.interval_hours {
                    Some(hours) if !hours.is_finite() || hours <= 0.0 => {
                        return Err(ValidationError::InvalidInterval(hours));
                    }
                    Some(hours) => next_due(hours)?,
                    // Keep the existing due point unless it now sits below the service point
                    None => record.due_at_meter.max(serviced_at),
                }
            }
        };

        debug!(
            unit = %record.id,
            service = %event.service_type,
            serviced_at,
            due_at_meter,
            "Service applied"
        );

        Ok(UnitRecord {
            last_service_meter: serviced_at,
            last_service_type: Some(event.service_type.label().to_string()),
            last_service_date: Some(event.date),
            due_at_meter,
            ..record.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn tipper() -> UnitRecord {
        UnitRecord {
            last_service_type: Some("1000hrs".to_string()),
            ..UnitRecord::new("T3", "TIPPEG-6 - APSYM/CSF2", 1757.0, 2759.0, 1025.0)
                .unwrap()
                .with_filter("Q1", true)
        }
    }

    fn scheduled(label: &str) -> ServiceEvent {
        ServiceEvent::new("T3", ServiceType::Scheduled(label.to_string()), today())
    }

    #[test]
    fn test_1000hr_service_resets_meter_and_due() {
        let logger = ServiceLogger::default();
        let before = UnitRecord::new("T3", "x", 0.0, 1000.0, 1025.0).unwrap();
        let after = logger
            .apply_service_on(&before, &scheduled("1000hrs"), today())
            .unwrap();

        assert_eq!(after.last_service_meter, 1025.0);
        assert_eq!(after.due_at_meter, 2025.0);
        assert_eq!(after.current_meter, 1025.0);
        assert_eq!(after.remaining_hours(), 1000.0);
        assert_eq!(after.last_service_type.as_deref(), Some("1000hrs"));
        assert_eq!(after.last_service_date, Some(today()));
    }

    #[test]
    fn test_2500hr_service_uses_table() {
        let logger = ServiceLogger::default();
        let after = logger
            .apply_service_on(&tipper(), &scheduled("2500hrs"), today())
            .unwrap();
        assert_eq!(after.due_at_meter, 3525.0);
        // Untouched fields carry over
        assert_eq!(after.label, "TIPPEG-6 - APSYM/CSF2");
        assert_eq!(after.filter_flags.get("Q1"), Some(&true));
    }

    #[test]
    fn test_long_form_label_is_recognized() {
        let logger = ServiceLogger::default();
        let event = ServiceEvent::new("T3", ServiceType::parse("1000hrs Service"), today());
        let after = logger.apply_service_on(&tipper(), &event, today()).unwrap();
        assert_eq!(after.due_at_meter, 2025.0);
    }

    #[test]
    fn test_misrouted_event_rejected_and_input_unchanged() {
        let logger = ServiceLogger::default();
        let record = tipper();
        let snapshot = record.clone();
        let event = ServiceEvent::new("T9", ServiceType::Scheduled("1000hrs".into()), today());

        let err = logger.apply_service_on(&record, &event, today()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnitMismatch {
                event_unit: "T9".to_string(),
                record_unit: "T3".to_string(),
            }
        );
        assert_eq!(record, snapshot);
    }

    #[test]
    fn test_future_date_rejected() {
        let logger = ServiceLogger::default();
        let mut event = scheduled("1000hrs");
        event.date = today().succ_opt().unwrap();
        let err = logger.apply_service_on(&tipper(), &event, today()).unwrap_err();
        assert!(matches!(err, ValidationError::FutureDate { .. }));
    }

    #[test]
    fn test_future_date_rejected_against_wall_clock() {
        let logger = ServiceLogger::default();
        let mut event = scheduled("1000hrs");
        event.date = Utc::now().date_naive() + chrono::Days::new(30);
        assert!(matches!(
            logger.apply_service(&tipper(), &event),
            Err(ValidationError::FutureDate { .. })
        ));
    }

    #[test]
    fn test_same_day_is_accepted() {
        let logger = ServiceLogger::default();
        assert!(logger.apply_service_on(&tipper(), &scheduled("1000hrs"), today()).is_ok());
    }

    #[test]
    fn test_unknown_label_rejected() {
        let logger = ServiceLogger::default();
        let err = logger
            .apply_service_on(&tipper(), &scheduled("750hrs"), today())
            .unwrap_err();
        assert_eq!(err, ValidationError::UnrecognizedServiceType("750hrs".to_string()));
    }

    #[test]
    fn test_other_requires_notes() {
        let logger = ServiceLogger::default();
        let event = ServiceEvent::new("T3", ServiceType::Other, today()).with_notes("  ");
        let err = logger.apply_service_on(&tipper(), &event, today()).unwrap_err();
        assert_eq!(err, ValidationError::MissingNotes);
    }

    #[test]
    fn test_other_without_interval_keeps_due_point() {
        let logger = ServiceLogger::default();
        let event =
            ServiceEvent::new("T3", ServiceType::Other, today()).with_notes("Replaced tail light");
        let after = logger.apply_service_on(&tipper(), &event, today()).unwrap();
        assert_eq!(after.last_service_meter, 1025.0);
        assert_eq!(after.due_at_meter, 2759.0);
        assert_eq!(after.last_service_type.as_deref(), Some("Other"));
    }

    #[test]
    fn test_other_without_interval_never_drops_due_below_service() {
        let logger = ServiceLogger::default();
        let overdue = UnitRecord::new("T3", "x", 0.0, 1000.0, 2817.0).unwrap();
        let event = ServiceEvent::new("T3", ServiceType::Other, today()).with_notes("Brake check");
        let after = logger.apply_service_on(&overdue, &event, today()).unwrap();
        assert_eq!(after.due_at_meter, 2817.0);
        assert!(after.validate().is_ok());
    }

    #[test]
    fn test_other_with_interval() {
        let logger = ServiceLogger::default();
        let event = ServiceEvent::new("T3", ServiceType::Other, today())
            .with_notes("Gearbox rebuild")
            .with_interval_hours(500.0);
        let after = logger.apply_service_on(&tipper(), &event, today()).unwrap();
        assert_eq!(after.due_at_meter, 1525.0);

        let bad = event.with_interval_hours(-10.0);
        assert_eq!(
            logger.apply_service_on(&tipper(), &bad, today()),
            Err(ValidationError::InvalidInterval(-10.0))
        );
    }

    #[test]
    fn test_interval_overflowing_meter_rejected() {
        let logger = ServiceLogger::default();
        let worn = UnitRecord::new("T3", "x", 0.0, 1000.0, 1.7e308).unwrap();
        let event = ServiceEvent::new("T3", ServiceType::Other, today())
            .with_notes("x")
            .with_interval_hours(1.7e308);
        assert_eq!(
            logger.apply_service_on(&worn, &event, today()),
            Err(ValidationError::InvalidInterval(1.7e308))
        );

        let huge_table = ServiceLogger::new([("forever".to_string(), f64::MAX)]);
        assert!(matches!(
            huge_table.apply_service_on(&worn, &scheduled("forever"), today()),
            Err(ValidationError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_site_date_follows_offset_across_midnight() {
        // 23:00 UTC on the 16th is 07:00 on the 17th in Perth
        let now = DateTime::parse_from_rfc3339("2025-05-16T23:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let perth = ServiceLogger::default().with_utc_offset(FixedOffset::east_opt(8 * 3600).unwrap());
        let utc = ServiceLogger::default().with_utc_offset(FixedOffset::east_opt(0).unwrap());

        let the_17th = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
        assert_eq!(perth.site_date(now), the_17th);
        assert_eq!(utc.site_date(now), NaiveDate::from_ymd_opt(2025, 5, 16).unwrap());

        let event = ServiceEvent::new("T3", ServiceType::parse("1000hrs"), the_17th);
        assert!(perth.apply_service_on(&tipper(), &event, perth.site_date(now)).is_ok());
        assert!(matches!(
            utc.apply_service_on(&tipper(), &event, utc.site_date(now)),
            Err(ValidationError::FutureDate { .. })
        ));
    }

    #[test]
    fn test_from_config_picks_up_site_offset() {
        let config = FleetConfig::from_toml_str("[fleet]\nutc_offset_minutes = -300\n").unwrap();
        let logger = ServiceLogger::from_config(&config);
        let now = DateTime::parse_from_rfc3339("2025-05-17T02:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(logger.site_date(now), NaiveDate::from_ymd_opt(2025, 5, 16).unwrap());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let logger = ServiceLogger::default();
        let record = tipper();
        let event = scheduled("1000hrs");
        let first = logger.apply_service_on(&record, &event, today()).unwrap();
        let second = logger.apply_service_on(&record, &event, today()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_interval_table() {
        let logger = ServiceLogger::new([("250hrs".to_string(), 250.0)]);
        assert_eq!(logger.labels().collect::<Vec<_>>(), vec!["250hrs"]);
        let after = logger
            .apply_service_on(&tipper(), &scheduled("250hrs"), today())
            .unwrap();
        assert_eq!(after.due_at_meter, 1275.0);
        assert!(logger
            .apply_service_on(&tipper(), &scheduled("1000hrs"), today())
            .is_err());
    }
}
