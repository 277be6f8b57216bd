//! Transaction features accepted by the scorer
//!
//! [`TransactionFeatures`] is the typed input of [`crate::RiskScorer`]: every
//! field is optional and an absent field is scored with a neutral default.
//! [`RawFeatures`] is the wire form, where values arrive as strings or
//! numbers and blank strings mean "not supplied". Numeric fields are read
//! from their leading numeric text; a value with no numeric prefix is still
//! supplied and is scored as [`Reading::Unreadable`].

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One named scoring input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    /// Card number
    CardNumber,
    /// Transaction amount
    Amount,
    /// Transaction time, Unix seconds
    UnixTime,
    /// Population of the merchant city
    CityPopulation,
    /// Postal code
    PostalCode,
    /// Account number
    AccountNumber,
}

impl Feature {
    /// All features, in scoring order
    pub const ALL: [Feature; 6] = [
        Feature::CardNumber,
        Feature::Amount,
        Feature::UnixTime,
        Feature::CityPopulation,
        Feature::PostalCode,
        Feature::AccountNumber,
    ];

    /// camelCase name used on the wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            Feature::CardNumber => "cardNumber",
            Feature::Amount => "amount",
            Feature::UnixTime => "unixTime",
            Feature::CityPopulation => "cityPopulation",
            Feature::PostalCode => "postalCode",
            Feature::AccountNumber => "accountNumber",
        }
    }

    /// Dataset column id, accepted as an alias of the wire name
    pub fn field_id(&self) -> &'static str {
        match self {
            Feature::CardNumber => "cc_num",
            Feature::Amount => "amt",
            Feature::UnixTime => "unix_time",
            Feature::CityPopulation => "city_pop",
            Feature::PostalCode => "zip",
            Feature::AccountNumber => "acct_num",
        }
    }

    /// Look a feature up by wire name or dataset column id
    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL
            .into_iter()
            .find(|f| f.wire_name() == name || f.field_id() == name)
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Feature::CardNumber => "Card number",
            Feature::Amount => "Amount",
            Feature::UnixTime => "Time",
            Feature::CityPopulation => "City population",
            Feature::PostalCode => "Postal code",
            Feature::AccountNumber => "Account number",
        }
    }

    /// One-line input hint
    pub fn help_text(&self) -> &'static str {
        match self {
            Feature::CardNumber => "Credit card number (16 digits)",
            Feature::Amount => "Transaction amount in Saudi riyals",
            Feature::UnixTime => "Transaction time (Unix timestamp)",
            Feature::CityPopulation => "Population of the city",
            Feature::PostalCode => "Postal code of the location",
            Feature::AccountNumber => "Bank account number",
        }
    }

    /// Example input
    pub fn placeholder(&self) -> &'static str {
        match self {
            Feature::CardNumber => "1234567890123456",
            Feature::Amount => "1500.00",
            _ => "Enter a value...",
        }
    }

    /// Suggested values for pick lists
    ///
    /// Timestamps count back hourly from `now` (Unix seconds).
    pub fn sample_values(&self, now: i64) -> Vec<String> {
        match self {
            Feature::AccountNumber => [
                "ACC123456789",
                "ACC987654321",
                "ACC456789123",
                "ACC789123456",
                "ACC321654987",
                "ACC654987321",
                "ACC147258369",
                "ACC963852741",
                "ACC258741963",
                "ACC741852963",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            Feature::CityPopulation => [
                50_000u64, 100_000, 250_000, 500_000, 750_000, 1_000_000, 1_500_000, 2_000_000,
                3_000_000, 5_000_000,
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            Feature::PostalCode => [
                "11564", "12345", "21589", "31452", "41236", "51478", "61234", "71589", "81456",
                "91357",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            Feature::UnixTime => (0..10).map(|i| (now - i * 3600).to_string()).collect(),
            Feature::CardNumber | Feature::Amount => Vec::new(),
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A supplied numeric value, or the text of one that held no number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading<T> {
    /// Parsed value
    Value(T),
    /// Non-blank text with no leading number
    Unreadable(String),
}

impl<T> Reading<T> {
    /// Parsed value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::Unreadable(_) => None,
        }
    }
}

/// Typed scoring input; `None` means the feature was not supplied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFeatures {
    /// Card number
    pub card_number: Option<String>,

    /// Amount
    pub amount: Option<Reading<Decimal>>,

    /// Unix seconds
    pub unix_time: Option<Reading<i64>>,

    /// City population
    pub city_population: Option<Reading<u64>>,

    /// Postal code
    pub postal_code: Option<String>,

    /// Account number
    pub account_number: Option<String>,
}

impl TransactionFeatures {
    /// Empty feature set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set card number; blank values are dropped
    pub fn with_card_number(mut self, card_number: impl Into<String>) -> Self {
        self.card_number = non_blank(card_number.into());
        self
    }

    /// Set amount
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(Reading::Value(amount));
        self
    }

    /// Set transaction time
    pub fn with_unix_time(mut self, unix_time: i64) -> Self {
        self.unix_time = Some(Reading::Value(unix_time));
        self
    }

    /// Set city population
    pub fn with_city_population(mut self, population: u64) -> Self {
        self.city_population = Some(Reading::Value(population));
        self
    }

    /// Set postal code; blank values are dropped
    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = non_blank(postal_code.into());
        self
    }

    /// Set account number; blank values are dropped
    pub fn with_account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = non_blank(account_number.into());
        self
    }

    /// Whether a feature carries a non-blank value
    pub fn is_supplied(&self, feature: Feature) -> bool {
        fn filled(s: &Option<String>) -> bool {
            s.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        match feature {
            Feature::CardNumber => filled(&self.card_number),
            Feature::Amount => self.amount.is_some(),
            Feature::UnixTime => self.unix_time.is_some(),
            Feature::CityPopulation => self.city_population.is_some(),
            Feature::PostalCode => filled(&self.postal_code),
            Feature::AccountNumber => filled(&self.account_number),
        }
    }

    /// Number of supplied features
    pub fn features_used(&self) -> usize {
        Feature::ALL.iter().filter(|f| self.is_supplied(**f)).count()
    }

    /// True when no feature is supplied
    pub fn is_empty(&self) -> bool {
        self.features_used() == 0
    }
}

/// Wire value: JSON string or number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// String value
    Text(String),
    /// Numeric value
    Number(serde_json::Number),
}

impl RawValue {
    /// Trimmed textual form, `None` when blank
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Text(s) => non_blank(s.clone()),
            RawValue::Number(n) => Some(n.to_string()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

/// Wire form of [`TransactionFeatures`]
///
/// Keys are camelCase; the dataset column ids (`cc_num`, `amt`, `unix_time`,
/// `city_pop`, `zip`, `acct_num`) are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeatures {
    /// Card number
    #[serde(default, alias = "cc_num")]
    pub card_number: Option<RawValue>,

    /// Amount
    #[serde(default, alias = "amt")]
    pub amount: Option<RawValue>,

    /// Unix seconds
    #[serde(default, alias = "unix_time")]
    pub unix_time: Option<RawValue>,

    /// City population
    #[serde(default, alias = "city_pop")]
    pub city_population: Option<RawValue>,

    /// Postal code
    #[serde(default, alias = "zip")]
    pub postal_code: Option<RawValue>,

    /// Account number
    #[serde(default, alias = "acct_num")]
    pub account_number: Option<RawValue>,
}

impl RawFeatures {
    /// Convert into typed features
    ///
    /// Amounts take the leading decimal literal (`"12abc"` reads 12, values
    /// beyond the decimal range saturate). Times and populations take the
    /// leading integer, so `"1700000000.0"` reads 1700000000; negative
    /// populations read as zero.
    pub fn into_features(self) -> TransactionFeatures {
        let text = |v: &Option<RawValue>| v.as_ref().and_then(RawValue::as_text);

        TransactionFeatures {
            card_number: text(&self.card_number),
            amount: text(&self.amount).map(|t| read(t, parse_amount)),
            unix_time: text(&self.unix_time).map(|t| read(t, parse_integer)),
            city_population: text(&self.city_population).map(|t| {
                read(t, |s| {
                    parse_integer(s).map(|n| u64::try_from(n).unwrap_or_default())
                })
            }),
            postal_code: text(&self.postal_code),
            account_number: text(&self.account_number),
        }
    }
}

impl From<RawFeatures> for TransactionFeatures {
    fn from(raw: RawFeatures) -> Self {
        raw.into_features()
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read<T>(text: String, parse: impl FnOnce(&str) -> Option<T>) -> Reading<T> {
    match parse(&text) {
        Some(value) => Reading::Value(value),
        None => Reading::Unreadable(text),
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

fn count_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Leading `[sign] digits [. digits] [e [sign] digits]`, at least one digit
/// in the mantissa
fn decimal_prefix(s: &str) -> Option<&str> {
    let (_, unsigned) = split_sign(s);
    let sign_len = s.len() - unsigned.len();

    let int_digits = count_digits(unsigned);
    let mut end = int_digits;
    let mut mantissa_digits = int_digits;
    if unsigned[end..].starts_with('.') {
        let frac_digits = count_digits(&unsigned[end + 1..]);
        mantissa_digits += frac_digits;
        end += 1 + frac_digits;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if unsigned[end..].starts_with(['e', 'E']) {
        let (_, exponent) = split_sign(&unsigned[end + 1..]);
        let exp_sign_len = unsigned.len() - end - 1 - exponent.len();
        let exp_digits = count_digits(exponent);
        if exp_digits > 0 {
            end += 1 + exp_sign_len + exp_digits;
        }
    }

    Some(&s[..sign_len + end])
}

fn saturated(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

fn parse_amount(s: &str) -> Option<Decimal> {
    let (negative, unsigned) = split_sign(s);
    if unsigned.starts_with("Infinity") {
        return Some(saturated(negative));
    }

    let literal = decimal_prefix(s)?;
    let exact = Decimal::from_str(literal).or_else(|_| Decimal::from_scientific(literal));
    match exact {
        Ok(amount) => Some(amount),
        Err(_) => {
            let float = literal.parse::<f64>().ok()?;
            Some(Decimal::from_f64(float).unwrap_or_else(|| saturated(negative)))
        }
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    let (negative, unsigned) = split_sign(s);
    if let Some(hex) = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
        let digits = hex.bytes().take_while(u8::is_ascii_hexdigit).count();
        if digits == 0 {
            return None;
        }
        let value = i64::from_str_radix(&hex[..digits], 16).unwrap_or(i64::MAX);
        return Some(if negative { -value } else { value });
    }

    let digits = count_digits(unsigned);
    if digits == 0 {
        return None;
    }

    let literal = &s[..s.len() - unsigned.len() + digits];
    Some(
        literal
            .parse::<i64>()
            .unwrap_or(if negative { i64::MIN } else { i64::MAX }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_blank_values_are_absent() {
        let raw: RawFeatures = serde_json::from_value(serde_json::json!({
            "cardNumber": "6579025485362680",
            "amount": "",
            "unixTime": "   ",
            "cityPopulation": null,
            "postalCode": "",
            "accountNumber": ""
        }))
        .unwrap();

        let features = raw.into_features();
        assert_eq!(features.card_number.as_deref(), Some("6579025485362680"));
        assert_eq!(features.amount, None);
        assert_eq!(features.unix_time, None);
        assert_eq!(features.features_used(), 1);
    }

    #[test]
    fn test_dataset_aliases() {
        let raw: RawFeatures = serde_json::from_value(serde_json::json!({
            "cc_num": "4111 1111 1111 1111",
            "amt": 1500.5,
            "unix_time": 1700000000,
            "city_pop": "250000",
            "zip": 11564,
            "acct_num": "ACC123456789"
        }))
        .unwrap();

        let features = TransactionFeatures::from(raw);
        assert_eq!(features.amount, Some(Reading::Value(dec!(1500.5))));
        assert_eq!(features.unix_time, Some(Reading::Value(1_700_000_000)));
        assert_eq!(features.city_population, Some(Reading::Value(250_000)));
        assert_eq!(features.postal_code.as_deref(), Some("11564"));
        assert_eq!(features.features_used(), 6);
    }

    #[test]
    fn test_float_numbers_truncate_to_integers() {
        let raw: RawFeatures = serde_json::from_value(serde_json::json!({
            "unixTime": 1700000000.0,
            "cityPopulation": 250000.9
        }))
        .unwrap();

        let features = raw.into_features();
        assert_eq!(features.unix_time, Some(Reading::Value(1_700_000_000)));
        assert_eq!(features.city_population, Some(Reading::Value(250_000)));
    }

    #[test]
    fn test_leading_numeric_text() {
        assert_eq!(parse_amount("12abc"), Some(dec!(12)));
        assert_eq!(parse_amount("  "), None);
        assert_eq!(parse_amount("1.5e3 SAR"), Some(dec!(1500)));
        assert_eq!(parse_amount("-7.25"), Some(dec!(-7.25)));
        assert_eq!(parse_amount(".5"), Some(dec!(0.5)));
        assert_eq!(parse_amount("12e"), Some(dec!(12)));
        assert_eq!(parse_amount("1e400"), Some(Decimal::MAX));
        assert_eq!(parse_amount("-Infinity"), Some(Decimal::MIN));
        assert_eq!(parse_amount("lots"), None);
        assert_eq!(parse_amount("."), None);

        assert_eq!(parse_integer("1700000000.0"), Some(1_700_000_000));
        assert_eq!(parse_integer("1e400"), Some(1));
        assert_eq!(parse_integer("+42 people"), Some(42));
        assert_eq!(parse_integer("-5"), Some(-5));
        assert_eq!(parse_integer("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_integer("noon"), None);
        assert_eq!(parse_integer("0x1A"), Some(26));
        assert_eq!(parse_integer("0x"), None);
    }

    #[test]
    fn test_unreadable_values_count_as_supplied() {
        let raw = RawFeatures {
            amount: Some(RawValue::from("lots")),
            unix_time: Some(RawValue::from("noon")),
            city_population: Some(RawValue::from("-5")),
            ..Default::default()
        };

        let features = raw.into_features();
        assert_eq!(features.amount, Some(Reading::Unreadable("lots".to_string())));
        assert_eq!(features.unix_time, Some(Reading::Unreadable("noon".to_string())));
        assert_eq!(features.city_population, Some(Reading::Value(0)));
        assert_eq!(features.amount.as_ref().and_then(Reading::value), None);
        assert_eq!(features.features_used(), 3);
    }

    #[test]
    fn test_builder_drops_blank_strings() {
        let features = TransactionFeatures::new()
            .with_card_number("  ")
            .with_postal_code("")
            .with_account_number("ACC1");
        assert!(features.card_number.is_none());
        assert!(features.postal_code.is_none());
        assert_eq!(features.features_used(), 1);
        assert!(TransactionFeatures::new().is_empty());
    }

    #[test]
    fn test_catalog() {
        assert_eq!(Feature::from_name("city_pop"), Some(Feature::CityPopulation));
        assert_eq!(Feature::from_name("cityPopulation"), Some(Feature::CityPopulation));
        assert_eq!(Feature::from_name("ssn"), None);

        let times = Feature::UnixTime.sample_values(36_000);
        assert_eq!(times.len(), 10);
        assert_eq!(times[0], "36000");
        assert_eq!(times[1], "32400");
        assert!(Feature::CardNumber.sample_values(0).is_empty());
        assert_eq!(Feature::AccountNumber.sample_values(0).len(), 10);
    }
}
