use chrono::NaiveDate;

/// A stay needs both dates and at least one night.
pub fn validate_dates(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> bool {
    matches!((check_in, check_out), (Some(check_in), Some(check_out)) if check_in < check_out)
}

/// At least one guest and no more than the room holds.
pub fn validate_guests(guests: u32, capacity: u32) -> bool {
    guests > 0 && guests <= capacity
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};

    use super::*;

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    #[test]
    fn test_validate_dates_ordered() {
        let check_in = today() + Duration::days(1);
        assert!(validate_dates(Some(check_in), Some(check_in + Duration::days(2))));
    }

    #[test]
    fn test_validate_dates_rejects_zero_nights_and_reversed() {
        assert!(!validate_dates(Some(today()), Some(today())));
        assert!(!validate_dates(
            Some(today() + Duration::days(3)),
            Some(today() + Duration::days(1))
        ));
    }

    #[test]
    fn test_validate_dates_rejects_missing() {
        assert!(!validate_dates(None, Some(today())));
        assert!(!validate_dates(Some(today()), None));
        assert!(!validate_dates(None, None));
    }

    #[test]
    fn test_validate_guests() {
        assert!(validate_guests(2, 4));
        assert!(validate_guests(4, 4));
        assert!(!validate_guests(5, 4));
        assert!(!validate_guests(0, 4));
        assert!(!validate_guests(1, 0));
    }
}
