//! Form validation helpers.
//!
//! Pure predicates over strings plus a record-level validator. None of these
//! functions fail or panic; invalid input simply yields `false`.
//!
//! ```
//! use tensura_core::validation::{validate_credit_card, validate_email, validate_zip_code};
//!
//! assert!(validate_email("a@b.co"));
//! assert!(validate_zip_code("12345-6789"));
//! assert!(!validate_credit_card("4111111111111112"));
//! ```

use std::collections::{BTreeSet, HashMap};
use std::hash::BuildHasher;
use std::sync::LazyLock;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::constants::{error_messages, regex_patterns, validation_rules};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(regex_patterns::EMAIL).expect("Invalid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(regex_patterns::PHONE).expect("Invalid regex"));
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(regex_patterns::ZIP_CODE).expect("Invalid regex"));

/// Symbols accepted (and one of which is required) in passwords.
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

const CARD_MIN_DIGITS: usize = 13;
const CARD_MAX_DIGITS: usize = 19;

/// Check for a loose `local@domain.tld` shape. Not RFC 5322.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Check password strength.
///
/// At least 8 characters, drawn only from ASCII letters, digits and
/// [`PASSWORD_SYMBOLS`], with at least one lowercase letter, one uppercase
/// letter, one digit and one symbol.
#[must_use]
pub fn validate_password(password: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c);

    password.chars().count() >= validation_rules::PASSWORD_MIN_LENGTH
        && password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// Check a phone number against a loose international pattern.
///
/// Whitespace is ignored; `+`, parentheses, dashes and dots are tolerated.
#[must_use]
pub fn validate_phone_number(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_RE.is_match(&compact)
}

/// Check that the input parses as an absolute URL.
#[must_use]
pub fn validate_url(url: &str) -> bool {
    url::Url::parse(url).is_ok()
}

/// Check for a US ZIP (`12345`) or ZIP+4 (`12345-6789`) code.
#[must_use]
pub fn validate_zip_code(zip_code: &str) -> bool {
    ZIP_RE.is_match(zip_code)
}

/// Check that the value has non-whitespace content.
#[must_use]
pub fn is_not_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Check that the value's length in characters is within `min..=max`.
#[must_use]
pub fn validate_length(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

/// Check a card number with the Luhn checksum.
///
/// Non-digit characters are ignored; 13 to 19 digits must remain.
#[must_use]
pub fn validate_credit_card(card_number: &str) -> bool {
    let digits: Vec<u32> = card_number.chars().filter_map(|c| c.to_digit(10)).collect();

    if !(CARD_MIN_DIGITS..=CARD_MAX_DIGITS).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(position, &digit)| {
            if position % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

// =============================================================================
// Record-level validation
// =============================================================================

/// A field predicate for [`validate_form`].
///
/// Receives `None` when the field is absent from the submitted data.
pub type Rule<'a, V> = &'a dyn Fn(Option<&V>) -> bool;

/// Fields that failed validation.
///
/// Serializes as a map of field name to `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeSet<String>);

impl FormErrors {
    /// Returns `true` if every rule passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if `field` failed its rule.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    /// Failing field names, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Serialize for FormErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in &self.0 {
            map.serialize_entry(field, &true)?;
        }
        map.end()
    }
}

/// Validate a record against a list of field rules.
///
/// Returns exactly the fields whose rule returned `false`. Fields present in
/// `data` without a rule are ignored.
///
/// ```
/// use std::collections::HashMap;
/// use tensura_core::validation::{validate_email, validate_form, Rule};
///
/// let data = HashMap::from([("email".to_string(), "nope".to_string())]);
/// let email: Rule<'_, String> = &|v| v.is_some_and(|v| validate_email(v));
/// let name: Rule<'_, String> = &|v| v.is_some();
///
/// let errors = validate_form(&data, &[("email", email), ("name", name)]);
/// assert!(errors.contains("email"));
/// assert!(errors.contains("name"));
/// ```
#[must_use]
pub fn validate_form<V, S: BuildHasher>(
    data: &HashMap<String, V, S>,
    rules: &[(&str, Rule<'_, V>)],
) -> FormErrors {
    FormErrors(
        rules
            .iter()
            .filter(|(field, rule)| !rule(data.get(*field)))
            .map(|(field, _)| (*field).to_owned())
            .collect(),
    )
}

/// Named rules for string form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRule {
    Required,
    Email,
    Password,
    Phone,
    Url,
    ZipCode,
    CreditCard,
}

impl FieldRule {
    /// Apply the rule to a value.
    #[must_use]
    pub fn check(&self, value: &str) -> bool {
        match self {
            Self::Required => is_not_empty(value),
            Self::Email => validate_email(value),
            Self::Password => validate_password(value),
            Self::Phone => validate_phone_number(value),
            Self::Url => validate_url(value),
            Self::ZipCode => validate_zip_code(value),
            Self::CreditCard => validate_credit_card(value),
        }
    }

    /// Message to show when the rule fails.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Required => error_messages::FIELD_REQUIRED,
            Self::Email => error_messages::INVALID_EMAIL,
            Self::Password => error_messages::INVALID_PASSWORD,
            Self::Phone => error_messages::INVALID_PHONE,
            Self::Url => error_messages::INVALID_URL,
            Self::ZipCode => error_messages::INVALID_ZIP,
            Self::CreditCard => error_messages::INVALID_CREDIT_CARD,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co"));
        assert!(validate_email("user.name+tag@example.co.uk"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a b@c.de"));
        assert!(!validate_email("a@@b.co"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Abcdef1!"));
        assert!(validate_password("Str0ng&Longer?"));
        assert!(!validate_password("abcdefgh"));
        assert!(!validate_password("Abcde1!"));
        assert!(!validate_password("ABCDEF1!"));
        assert!(!validate_password("Abcdefg!"));
        assert!(!validate_password("Abcdefg1"));
        // '#' is outside the accepted symbol set
        assert!(!validate_password("Abcdef1#"));
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("555-123-4567"));
        assert!(validate_phone_number("(555) 123-4567"));
        assert!(validate_phone_number("+44 20 7946 0958"));
        assert!(validate_phone_number("555.123.4567"));
        assert!(!validate_phone_number("phone"));
        assert!(!validate_phone_number("12345678901234567890"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://tensura.store/products?id=1"));
        assert!(validate_url("mailto:rimuru@tempest.gov"));
        assert!(!validate_url("tensura.store"));
        assert!(!validate_url("http://"));
        assert!(!validate_url(""));
    }

    #[test]
    fn test_validate_zip_code() {
        assert!(validate_zip_code("12345"));
        assert!(validate_zip_code("12345-6789"));
        assert!(!validate_zip_code("1234"));
        assert!(!validate_zip_code("123456"));
        assert!(!validate_zip_code("12345-678"));
        assert!(!validate_zip_code("abcde"));
    }

    #[test]
    fn test_is_not_empty_and_length() {
        assert!(is_not_empty(" x "));
        assert!(!is_not_empty("   "));
        assert!(validate_length("abc", 3, 32));
        assert!(!validate_length("ab", 3, 32));
        assert!(!validate_length(&"a".repeat(33), 3, 32));
        // counted in characters, not bytes
        assert!(validate_length("ミリム", 3, 3));
    }

    #[test]
    fn test_validate_credit_card() {
        assert!(validate_credit_card("4111111111111111"));
        assert!(validate_credit_card("4111 1111 1111 1111"));
        assert!(validate_credit_card("4111-1111-1111-1111"));
        assert!(validate_credit_card("5500005555555559"));
        assert!(!validate_credit_card("4111111111111112"));
        // Luhn-valid but too short
        assert!(!validate_credit_card("79927398713"));
        assert!(!validate_credit_card("41111111111111111111"));
        assert!(!validate_credit_card(""));
    }

    #[test]
    fn test_validate_form_returns_failing_fields() {
        let data = HashMap::from([
            ("email".to_string(), "rimuru@tempest.gov".to_string()),
            ("zip".to_string(), "1234".to_string()),
            ("phone".to_string(), "555-123-4567".to_string()),
        ]);
        let email: Rule<'_, String> = &|v| v.is_some_and(|v| validate_email(v));
        let zip: Rule<'_, String> = &|v| v.is_some_and(|v| validate_zip_code(v));
        let phone: Rule<'_, String> = &|v| v.is_some_and(|v| validate_phone_number(v));
        let card: Rule<'_, String> = &|v| v.is_some_and(|v| validate_credit_card(v));

        let errors = validate_form(
            &data,
            &[("email", email), ("zip", zip), ("phone", phone), ("card", card)],
        );

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["card", "zip"]);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"card": true, "zip": true})
        );
    }

    #[test]
    fn test_validate_form_all_pass() {
        let data = HashMap::from([("qty".to_string(), 3_u32)]);
        let positive: Rule<'_, u32> = &|v| v.is_some_and(|v| *v > 0);

        let errors = validate_form(&data, &[("qty", positive)]);
        assert!(errors.is_empty());
        assert_eq!(serde_json::to_string(&errors).unwrap(), "{}");
    }

    #[test]
    fn test_validate_form_without_rules() {
        let data: HashMap<String, String> = HashMap::new();
        assert!(validate_form(&data, &[]).is_empty());
    }

    #[test]
    fn test_field_rules() {
        assert!(FieldRule::Required.check("Rimuru"));
        assert!(!FieldRule::Required.check(" "));
        assert!(FieldRule::CreditCard.check("4111111111111111"));
        assert!(!FieldRule::ZipCode.check("1234"));
        assert_eq!(FieldRule::ZipCode.message(), error_messages::INVALID_ZIP);
        assert_eq!(FieldRule::Required.message(), "This field is required");
    }
}
