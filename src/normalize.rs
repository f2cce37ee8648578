use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::models::{Amount, ListingRecord, MoneyField, NormalizedListing};
use crate::parsers::{format_kor_money_from_thousand, THOUSAND_TO_MAN};

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Attach 만-unit amounts, display strings and a parsed creation time to
/// every record, keeping source order.
pub fn normalize_listings(records: Vec<ListingRecord>) -> Vec<NormalizedListing> {
    records.into_iter().map(normalize_listing).collect()
}

pub fn normalize_listing(record: ListingRecord) -> NormalizedListing {
    let amounts: Vec<_> = MoneyField::ALL
        .iter()
        .map(|field| (*field, normalize_amount(field.raw(&record))))
        .collect();
    let created_at = record.created_date_utc.as_deref().and_then(parse_created_at);

    let mut listing = NormalizedListing::new(record);
    for (field, amount) in amounts {
        listing.set_amount(field, amount);
    }
    listing.created_at = created_at;
    listing
}

/// A missing amount normalizes to `0.0` / `"0"`.
pub fn normalize_amount(raw: Option<f64>) -> Amount {
    match raw {
        Some(value) if value.is_finite() => Amount {
            man: value / THOUSAND_TO_MAN,
            display: format_kor_money_from_thousand(Some(value)),
        },
        _ => Amount::default(),
    }
}

/// Parse a listing timestamp. Values without an offset are taken as UTC.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Some(midnight.and_utc());
    }

    debug!("Unrecognised createdDateUtc value: {}", raw);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn record(deposit: Option<f64>, monthly_rent: Option<f64>) -> ListingRecord {
        ListingRecord {
            deposit,
            monthly_rent,
            ..Default::default()
        }
    }

    #[test]
    fn derives_man_and_display_columns() {
        let listing = normalize_listing(record(Some(135000.0), Some(1700.0)));

        let deposit = listing.amount(MoneyField::Deposit);
        assert_eq!(deposit.man, 13500.0);
        assert_eq!(deposit.display, "1억 3,500만");

        let rent = listing.amount(MoneyField::MonthlyRent);
        assert_eq!(rent.man, 170.0);
        assert_eq!(rent.display, "170만");
    }

    #[test]
    fn missing_amounts_default_to_zero() {
        let listing = normalize_listing(record(None, Some(1700.0)));
        for field in [MoneyField::Deposit, MoneyField::Premium, MoneyField::MaintenanceFee] {
            assert_eq!(listing.amount(field), Amount::default());
        }
    }

    #[test]
    fn keeps_source_order() {
        let listings = normalize_listings(vec![
            record(Some(1.0), None),
            record(Some(2.0), None),
            record(Some(3.0), None),
        ]);
        let deposits: Vec<_> = listings.iter().map(|l| l.record.deposit).collect();
        assert_eq!(deposits, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn parses_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_created_at("2024-05-01T09:30:00Z"), Some(expected));
        assert_eq!(parse_created_at("2024-05-01T18:30:00+09:00"), Some(expected));
        assert_eq!(parse_created_at("2024-05-01T09:30:00"), Some(expected));
        assert_eq!(parse_created_at("2024-05-01 09:30:00"), Some(expected));
        assert_eq!(
            parse_created_at("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn bad_timestamp_is_absent() {
        assert_eq!(parse_created_at(""), None);
        assert_eq!(parse_created_at("yesterday"), None);

        let listing = normalize_listing(ListingRecord {
            created_date_utc: Some("not a date".to_string()),
            ..Default::default()
        });
        assert_eq!(listing.created_at, None);
    }
}
