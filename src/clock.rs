use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        now_utc()
    }
}

pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub fn format_timestamp(value: OffsetDateTime) -> String {
    value
        .format(&Rfc3339)
        .expect("RFC3339 formatting for UTC timestamp should never fail")
}

pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(raw, &Rfc3339)
}


#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_timestamp};
    use time::macros::datetime;

    #[test]
    fn timestamps_round_trip_with_subsecond_precision() {
        let instant = datetime!(2026-10-14 09:15:30.123456789 UTC);
        let formatted = format_timestamp(instant);
        assert_eq!(formatted, "2026-10-14T09:15:30.123456789Z");
        assert_eq!(parse_timestamp(&formatted).expect("should parse"), instant);
    }

    #[test]
    fn rejects_non_rfc3339_text() {
        assert!(parse_timestamp("yesterday").is_err());
    }
}
