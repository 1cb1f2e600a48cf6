//! Regional parameters for the contact form.
//!
//! The workshop site ships in more than one regional flavour: a Venezuelan
//! cuatro maker and a Spanish guitar maker. The only behaviour that differs
//! between them is captured here:
//!
//! - the phone number pattern (and its error message)
//! - the instrument catalog offered in the contact form
//! - the budget bands offered in the contact form
//! - currency and phone display formatting
//!
//! Everything else (field lengths, name characters, messages) is shared by
//! [`crate::contact`]. Pick a built-in table with [`LocaleConfig::for_code`]
//! or build a custom one by filling in the public fields.
//!
//! ```text
//! locale = "VE"   →  +58/0 mobile and landline prefixes, cuatro catalog, $ bands
//! locale = "ES"   →  +34 9-digit numbers, guitar catalog, € bands
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static VE_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+58|0)(4\d{2}|2\d{2}|5\d{2})[\s-]?\d{3}[\s-]?\d{4}$")
        .expect("built-in VE phone pattern must compile")
});

static ES_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+34|0034)?[6789]\d{2}-?\d{3}-?\d{3}$")
        .expect("built-in ES phone pattern must compile")
});

/// Built-in regional tables, selected by `locale = "VE" | "ES"` in `site.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocaleCode {
    #[default]
    #[serde(rename = "VE")]
    Venezuela,
    #[serde(rename = "ES")]
    Spain,
}

impl LocaleCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocaleCode::Venezuela => "VE",
            LocaleCode::Spain => "ES",
        }
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a `<select>`: the submitted value and its visible label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Where the currency symbol goes relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `$1,500`
    Prefix,
    /// `1.500 €`
    Suffix,
}

/// Whole-unit currency formatting (no decimals, grouped thousands).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub position: SymbolPosition,
    pub thousands_separator: char,
}

/// How a valid phone number is grouped for display.
///
/// `groups` splits the national significant number, e.g. `[3, 3, 4]` turns
/// `4141234567` into `414 123 4567`. A `trunk_prefix` (Venezuela's leading
/// `0`) is glued to the first group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneFormat {
    pub country_code: String,
    pub trunk_prefix: Option<char>,
    pub groups: Vec<usize>,
}

/// Region-specific validation and formatting parameters.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// Short region code shown in CLI output (`VE`, `ES`).
    pub code: String,
    /// BCP 47 tag for `<html lang>`.
    pub html_lang: String,
    /// Open Graph locale (`es_VE`).
    pub og_locale: String,
    /// Matched against the phone field after all whitespace is removed.
    pub phone_pattern: Regex,
    pub phone_error: String,
    pub phone_format: PhoneFormat,
    pub instruments: Vec<SelectOption>,
    pub budgets: Vec<SelectOption>,
    pub currency: CurrencyFormat,
}

impl LocaleConfig {
    pub fn for_code(code: LocaleCode) -> Self {
        match code {
            LocaleCode::Venezuela => Self::venezuela(),
            LocaleCode::Spain => Self::spain(),
        }
    }

    /// Venezuelan cuatro workshop.
    pub fn venezuela() -> Self {
        Self {
            code: "VE".to_string(),
            html_lang: "es-VE".to_string(),
            og_locale: "es_VE".to_string(),
            phone_pattern: VE_PHONE.clone(),
            phone_error: "Formato de teléfono venezolano inválido".to_string(),
            phone_format: PhoneFormat {
                country_code: "58".to_string(),
                trunk_prefix: Some('0'),
                groups: vec![3, 3, 4],
            },
            instruments: vec![
                SelectOption::new("cuatro-tradicional", "Cuatro Tradicional"),
                SelectOption::new("cuatro-concierto", "Cuatro de Concierto"),
                SelectOption::new("cuatro-personalizado", "Cuatro Personalizado"),
                SelectOption::new("reparacion", "Reparación/Restauración"),
                SelectOption::new("consultoria", "Consultoría"),
                SelectOption::new("otro", "Otro"),
            ],
            budgets: vec![
                SelectOption::new("500-1000", "$500 - $1,000"),
                SelectOption::new("1000-2000", "$1,000 - $2,000"),
                SelectOption::new("2000-3000", "$2,000 - $3,000"),
                SelectOption::new("3000+", "$3,000+"),
                SelectOption::new("consultar", "Prefiero consultar"),
            ],
            currency: CurrencyFormat {
                symbol: "$".to_string(),
                position: SymbolPosition::Prefix,
                thousands_separator: ',',
            },
        }
    }

    /// Spanish guitar workshop.
    pub fn spain() -> Self {
        Self {
            code: "ES".to_string(),
            html_lang: "es-ES".to_string(),
            og_locale: "es_ES".to_string(),
            phone_pattern: ES_PHONE.clone(),
            phone_error: "Formato de teléfono español inválido".to_string(),
            phone_format: PhoneFormat {
                country_code: "34".to_string(),
                trunk_prefix: None,
                groups: vec![3, 3, 3],
            },
            instruments: vec![
                SelectOption::new("guitarra-clasica", "Guitarra Clásica"),
                SelectOption::new("guitarra-flamenca", "Guitarra Flamenca"),
                SelectOption::new("guitarra-personalizada", "Guitarra Personalizada"),
                SelectOption::new("reparacion", "Reparación/Restauración"),
                SelectOption::new("consultoria", "Consultoría"),
                SelectOption::new("otro", "Otro"),
            ],
            budgets: vec![
                SelectOption::new("1000-2000", "1.000 € - 2.000 €"),
                SelectOption::new("2000-3500", "2.000 € - 3.500 €"),
                SelectOption::new("3500-5000", "3.500 € - 5.000 €"),
                SelectOption::new("5000+", "5.000 €+"),
                SelectOption::new("consultar", "Prefiero consultar"),
            ],
            currency: CurrencyFormat {
                symbol: "€".to_string(),
                position: SymbolPosition::Suffix,
                thousands_separator: '.',
            },
        }
    }

    /// Whether `value` is one of the instrument catalog values.
    pub fn is_instrument(&self, value: &str) -> bool {
        self.instruments.iter().any(|o| o.value == value)
    }

    /// Whether `value` is one of the budget band values.
    pub fn is_budget(&self, value: &str) -> bool {
        self.budgets.iter().any(|o| o.value == value)
    }

    /// Check a phone number against the regional pattern.
    ///
    /// Whitespace is ignored, so `0414 123 4567` and `04141234567` are the same.
    pub fn phone_matches(&self, phone: &str) -> bool {
        let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
        self.phone_pattern.is_match(&compact)
    }

    /// Format a whole amount in the local currency.
    ///
    /// - VE: `1500` → `$1,500`
    /// - ES: `1500` → `1.500 €`
    pub fn format_price(&self, amount: u64) -> String {
        let digits = amount.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.currency.thousands_separator);
            }
            grouped.push(c);
        }
        match self.currency.position {
            SymbolPosition::Prefix => format!("{}{}", self.currency.symbol, grouped),
            SymbolPosition::Suffix => format!("{} {}", grouped, self.currency.symbol),
        }
    }

    /// Format a phone number for display.
    ///
    /// Non-digits are dropped before grouping. Numbers that don't have the
    /// expected digit count are returned unchanged.
    ///
    /// - VE: `+58 4141234567` → `+58 414 123 4567`, `04141234567` → `0414 123 4567`
    /// - ES: `+34612345678` → `+34 612 345 678`, `612345678` → `612 345 678`
    pub fn format_phone(&self, phone: &str) -> String {
        let fmt = &self.phone_format;
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        let national_len: usize = fmt.groups.iter().sum();

        let international = phone.trim_start().starts_with('+') || fmt.trunk_prefix.is_some();
        if let Some(national) = digits.strip_prefix(fmt.country_code.as_str()) {
            if international && national.len() == national_len {
                return format!("+{} {}", fmt.country_code, group_digits(national, &fmt.groups));
            }
        }

        match fmt.trunk_prefix {
            Some(trunk) => {
                if let Some(national) = digits.strip_prefix(trunk) {
                    if national.len() == national_len {
                        return format!("{}{}", trunk, group_digits(national, &fmt.groups));
                    }
                }
            }
            None => {
                if digits.len() == national_len {
                    return group_digits(&digits, &fmt.groups);
                }
            }
        }

        phone.to_string()
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::for_code(LocaleCode::default())
    }
}

/// Split an ASCII digit string into space-separated groups.
fn group_digits(digits: &str, groups: &[usize]) -> String {
    let mut parts = Vec::with_capacity(groups.len());
    let mut start = 0;
    for &len in groups {
        parts.push(&digits[start..start + len]);
        start += len;
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venezuela_accepts_local_phone_formats() {
        let ve = LocaleConfig::venezuela();
        assert!(ve.phone_matches("0414 123 4567"));
        assert!(ve.phone_matches("04141234567"));
        assert!(ve.phone_matches("+58 412-123-4567"));
        assert!(ve.phone_matches("0212 555 1234"));
    }

    #[test]
    fn venezuela_rejects_foreign_and_malformed_phones() {
        let ve = LocaleConfig::venezuela();
        assert!(!ve.phone_matches("+34 612 345 678"));
        assert!(!ve.phone_matches("612345678"));
        assert!(!ve.phone_matches("0414 123 456"));
        assert!(!ve.phone_matches("0314 123 4567"));
    }

    #[test]
    fn spain_accepts_mobile_and_landline() {
        let es = LocaleConfig::spain();
        assert!(es.phone_matches("+34 612 345 678"));
        assert!(es.phone_matches("912345678"));
        assert!(es.phone_matches("0034 712 345 678"));
    }

    #[test]
    fn spain_rejects_venezuelan_numbers() {
        let es = LocaleConfig::spain();
        assert!(!es.phone_matches("0414 123 4567"));
        assert!(!es.phone_matches("+58 412 123 4567"));
        assert!(!es.phone_matches("512345678"));
    }

    #[test]
    fn catalogs_differ_per_region() {
        let ve = LocaleConfig::for_code(LocaleCode::Venezuela);
        let es = LocaleConfig::for_code(LocaleCode::Spain);
        assert!(ve.is_instrument("cuatro-concierto"));
        assert!(!es.is_instrument("cuatro-concierto"));
        assert!(es.is_instrument("guitarra-flamenca"));
        assert!(ve.is_budget("3000+"));
        assert!(!es.is_budget("3000+"));
        // shared values
        assert!(ve.is_instrument("reparacion") && es.is_instrument("reparacion"));
        assert!(ve.is_budget("consultar") && es.is_budget("consultar"));
    }

    #[test]
    fn empty_value_is_not_a_catalog_entry() {
        let ve = LocaleConfig::venezuela();
        assert!(!ve.is_instrument(""));
        assert!(!ve.is_budget(""));
    }

    #[test]
    fn format_price_groups_thousands() {
        let ve = LocaleConfig::venezuela();
        assert_eq!(ve.format_price(500), "$500");
        assert_eq!(ve.format_price(1500), "$1,500");
        assert_eq!(ve.format_price(1_234_567), "$1,234,567");

        let es = LocaleConfig::spain();
        assert_eq!(es.format_price(1500), "1.500 €");
        assert_eq!(es.format_price(999), "999 €");
    }

    #[test]
    fn format_phone_venezuela() {
        let ve = LocaleConfig::venezuela();
        assert_eq!(ve.format_phone("+584141234567"), "+58 414 123 4567");
        assert_eq!(ve.format_phone("04141234567"), "0414 123 4567");
        assert_eq!(ve.format_phone("0414-123-4567"), "0414 123 4567");
        assert_eq!(ve.format_phone("12345"), "12345");
    }

    #[test]
    fn format_phone_spain() {
        let es = LocaleConfig::spain();
        assert_eq!(es.format_phone("+34612345678"), "+34 612 345 678");
        assert_eq!(es.format_phone("612345678"), "612 345 678");
        assert_eq!(es.format_phone("61234"), "61234");
    }

    #[test]
    fn locale_code_round_trips_through_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            locale: LocaleCode,
        }
        let w: Wrapper = toml::from_str(r#"locale = "ES""#).unwrap();
        assert_eq!(w.locale, LocaleCode::Spain);
        assert_eq!(w.locale.to_string(), "ES");
    }
}
