use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::parsers::parse_amount;

/// One listing as it appears in the source payload or the `items` table.
///
/// Amounts are in thousand-won units. Deserialization is lenient: values of
/// the wrong shape degrade to `None` (or an empty list) instead of failing
/// the whole record. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub near_subway_station: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub business_middle_code_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub price_type_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub deposit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_rent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub premium: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub maintenance_fee: Option<f64>,

    #[serde(default, deserialize_with = "lenient_integer")]
    pub floor: Option<i64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub size: Option<f64>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub created_date_utc: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub preview_photo_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_url_list")]
    pub origin_photo_urls: Vec<String>,
    #[serde(default, deserialize_with = "lenient_url_list")]
    pub sub_photo_urls: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Monetary columns that get a 만-unit number and a display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoneyField {
    Deposit,
    MonthlyRent,
    Premium,
    MaintenanceFee,
}

impl MoneyField {
    pub const ALL: [MoneyField; 4] = [
        MoneyField::Deposit,
        MoneyField::MonthlyRent,
        MoneyField::Premium,
        MoneyField::MaintenanceFee,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MoneyField::Deposit => "deposit",
            MoneyField::MonthlyRent => "monthlyRent",
            MoneyField::Premium => "premium",
            MoneyField::MaintenanceFee => "maintenanceFee",
        }
    }

    pub fn raw(&self, record: &ListingRecord) -> Option<f64> {
        match self {
            MoneyField::Deposit => record.deposit,
            MoneyField::MonthlyRent => record.monthly_rent,
            MoneyField::Premium => record.premium,
            MoneyField::MaintenanceFee => record.maintenance_fee,
        }
    }
}

/// A normalized amount: the value in 만 units and its display string.
#[derive(Debug, Clone, PartialEq)]
pub struct Amount {
    pub man: f64,
    pub display: String,
}

impl Default for Amount {
    fn default() -> Self {
        Self {
            man: 0.0,
            display: "0".to_string(),
        }
    }
}

/// A listing with derived amount columns and a parsed creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedListing {
    #[serde(flatten)]
    pub record: ListingRecord,

    #[serde(rename = "deposit_man")]
    deposit_man: f64,
    #[serde(rename = "deposit_fmt")]
    deposit_fmt: String,
    #[serde(rename = "monthlyRent_man")]
    monthly_rent_man: f64,
    #[serde(rename = "monthlyRent_fmt")]
    monthly_rent_fmt: String,
    #[serde(rename = "premium_man")]
    premium_man: f64,
    #[serde(rename = "premium_fmt")]
    premium_fmt: String,
    #[serde(rename = "maintenanceFee_man")]
    maintenance_fee_man: f64,
    #[serde(rename = "maintenanceFee_fmt")]
    maintenance_fee_fmt: String,

    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NormalizedListing {
    /// Wrap a record with every amount at its default.
    pub fn new(record: ListingRecord) -> Self {
        let zero = Amount::default();
        Self {
            record,
            deposit_man: zero.man,
            deposit_fmt: zero.display.clone(),
            monthly_rent_man: zero.man,
            monthly_rent_fmt: zero.display.clone(),
            premium_man: zero.man,
            premium_fmt: zero.display.clone(),
            maintenance_fee_man: zero.man,
            maintenance_fee_fmt: zero.display,
            created_at: None,
        }
    }

    pub fn amount(&self, field: MoneyField) -> Amount {
        let (man, display) = match field {
            MoneyField::Deposit => (self.deposit_man, &self.deposit_fmt),
            MoneyField::MonthlyRent => (self.monthly_rent_man, &self.monthly_rent_fmt),
            MoneyField::Premium => (self.premium_man, &self.premium_fmt),
            MoneyField::MaintenanceFee => (self.maintenance_fee_man, &self.maintenance_fee_fmt),
        };
        Amount {
            man,
            display: display.clone(),
        }
    }

    pub fn set_amount(&mut self, field: MoneyField, amount: Amount) {
        let (man, display) = match field {
            MoneyField::Deposit => (&mut self.deposit_man, &mut self.deposit_fmt),
            MoneyField::MonthlyRent => (&mut self.monthly_rent_man, &mut self.monthly_rent_fmt),
            MoneyField::Premium => (&mut self.premium_man, &mut self.premium_fmt),
            MoneyField::MaintenanceFee => {
                (&mut self.maintenance_fee_man, &mut self.maintenance_fee_fmt)
            }
        };
        *man = amount.man;
        *display = amount.display;
    }
}

fn text_from_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(text_from_value))
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| parse_amount(&v)))
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn lenient_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    })
}

fn lenient_url_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}
