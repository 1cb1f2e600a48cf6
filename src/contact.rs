//! Contact form validation.
//!
//! The contact form is checked against a small declarative schema: each field
//! has an ordered list of [`Rule`]s and the first rule a value breaks produces
//! that field's message. Fields short-circuit independently, so a form with a
//! short name and a broken email yields exactly two messages.
//!
//! ```text
//! name            2..=50 chars, letters/spaces/accented letters
//! email           required, <= 100 chars, valid address
//! phone           optional, regional pattern (see [`crate::locale`])
//! subject         5..=100 chars
//! message         10..=1000 chars
//! instrumentType  optional, regional instrument catalog
//! budget          optional, regional budget bands
//! ```
//!
//! All values are trimmed before checking, and the trimmed values are what end
//! up in the [`ContactSubmission`]. Empty optional fields become `None` and are
//! never an error.
//!
//! A [`ContactSubmission`] can only be obtained from [`ContactValidator::validate`],
//! which is how the submission pipeline guarantees that nothing invalid is
//! ever handed to a sender.

use crate::locale::LocaleConfig;
use email_address::{EmailAddress, Options};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static NAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s]+$").expect("name pattern must compile")
});

/// Bare `local@domain.tld` only: no display name, no `[ip]` literal, and a
/// dotted domain.
const EMAIL_OPTIONS: Options = Options {
    minimum_sub_domains: 2,
    allow_domain_literal: false,
    allow_display_text: false,
};

/// Longest text [`sanitize_input`] keeps.
const SANITIZE_MAX_CHARS: usize = 1000;

/// The form exactly as the visitor typed it.
///
/// Missing keys deserialize as empty strings / `None`, so a partially filled
/// JSON document still reaches validation and gets per-field messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawFormInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub instrument_type: Option<String>,
    pub budget: Option<String>,
}

/// Contact form fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Subject,
    Message,
    InstrumentType,
    Budget,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Subject,
        Field::Message,
        Field::InstrumentType,
        Field::Budget,
    ];

    /// Form key, as used in the JSON input and the HTML `name` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Subject => "subject",
            Field::Message => "message",
            Field::InstrumentType => "instrumentType",
            Field::Budget => "budget",
        }
    }

    /// Optional fields skip all rules when left empty.
    pub fn is_optional(&self) -> bool {
        matches!(self, Field::Phone | Field::InstrumentType | Field::Budget)
    }

    fn rules(&self) -> &'static [Rule] {
        match self {
            Field::Name => NAME_RULES,
            Field::Email => EMAIL_RULES,
            Field::Phone => PHONE_RULES,
            Field::Subject => SUBJECT_RULES,
            Field::Message => MESSAGE_RULES,
            Field::InstrumentType => INSTRUMENT_RULES,
            Field::Budget => BUDGET_RULES,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One check in a field's schema. Lengths count characters, not bytes.
#[derive(Debug)]
enum Rule {
    Required(&'static str),
    MinChars(usize, &'static str),
    MaxChars(usize, &'static str),
    Letters(&'static str),
    Email(&'static str),
    /// Message comes from the locale.
    Phone,
    Instrument(&'static str),
    Budget(&'static str),
}

const NAME_RULES: &[Rule] = &[
    Rule::MinChars(2, "El nombre debe tener al menos 2 caracteres"),
    Rule::MaxChars(50, "El nombre no puede exceder 50 caracteres"),
    Rule::Letters("El nombre solo debe contener letras y espacios"),
];

const EMAIL_RULES: &[Rule] = &[
    Rule::Required("El email es requerido"),
    Rule::MaxChars(100, "El email es demasiado largo"),
    Rule::Email("Por favor ingresa un email válido"),
];

const PHONE_RULES: &[Rule] = &[Rule::Phone];

const SUBJECT_RULES: &[Rule] = &[
    Rule::MinChars(5, "El asunto debe tener al menos 5 caracteres"),
    Rule::MaxChars(100, "El asunto no puede exceder 100 caracteres"),
];

const MESSAGE_RULES: &[Rule] = &[
    Rule::MinChars(10, "El mensaje debe tener al menos 10 caracteres"),
    Rule::MaxChars(1000, "El mensaje no puede exceder 1000 caracteres"),
];

const INSTRUMENT_RULES: &[Rule] = &[Rule::Instrument(
    "Por favor selecciona un tipo de instrumento válido",
)];

const BUDGET_RULES: &[Rule] = &[Rule::Budget(
    "Por favor selecciona un rango de presupuesto válido",
)];

/// Field-keyed validation messages, one per invalid field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Invalid fields in form order.
    pub fn fields(&self) -> Vec<Field> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, msg)| format!("{field}: {msg}")).collect();
        write!(f, "invalid contact form ({})", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// A contact form that passed validation, with every value trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    subject: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instrument_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget: Option<String>,
}

impl ContactSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn instrument_type(&self) -> Option<&str> {
        self.instrument_type.as_deref()
    }

    pub fn budget(&self) -> Option<&str> {
        self.budget.as_deref()
    }
}

/// Validates contact forms against the shared schema and one locale's tables.
#[derive(Debug, Clone, Default)]
pub struct ContactValidator {
    locale: LocaleConfig,
}

impl ContactValidator {
    pub fn new(locale: LocaleConfig) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> &LocaleConfig {
        &self.locale
    }

    /// Validate a whole form.
    ///
    /// Returns the trimmed submission, or every invalid field with the message
    /// of the first rule it broke.
    pub fn validate(&self, input: &RawFormInput) -> Result<ContactSubmission, FieldErrors> {
        let mut errors = BTreeMap::new();
        for field in Field::ALL {
            if let Some(msg) = self.check_field(field, raw_value(input, field)) {
                errors.insert(field, msg);
            }
        }

        if !errors.is_empty() {
            tracing::debug!(fields = errors.len(), "contact form rejected");
            return Err(FieldErrors(errors));
        }

        Ok(ContactSubmission {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: non_empty(input.phone.as_deref()),
            subject: input.subject.trim().to_string(),
            message: input.message.trim().to_string(),
            instrument_type: non_empty(input.instrument_type.as_deref()),
            budget: non_empty(input.budget.as_deref()),
        })
    }

    /// Check a single field as the visitor types (the form validates on change).
    ///
    /// Returns the message of the first rule `value` breaks, or `None`.
    pub fn check_field(&self, field: Field, value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() && field.is_optional() {
            return None;
        }
        field
            .rules()
            .iter()
            .find(|rule| !self.passes(rule, value))
            .map(|rule| self.message(rule))
    }

    fn passes(&self, rule: &Rule, value: &str) -> bool {
        match rule {
            Rule::Required(_) => !value.is_empty(),
            Rule::MinChars(min, _) => value.chars().count() >= *min,
            Rule::MaxChars(max, _) => value.chars().count() <= *max,
            Rule::Letters(_) => NAME_CHARS.is_match(value),
            Rule::Email(_) => is_valid_email(value),
            Rule::Phone => self.locale.phone_matches(value),
            Rule::Instrument(_) => self.locale.is_instrument(value),
            Rule::Budget(_) => self.locale.is_budget(value),
        }
    }

    fn message(&self, rule: &Rule) -> String {
        match rule {
            Rule::Phone => self.locale.phone_error.clone(),
            Rule::Required(msg)
            | Rule::MinChars(_, msg)
            | Rule::MaxChars(_, msg)
            | Rule::Letters(msg)
            | Rule::Email(msg)
            | Rule::Instrument(msg)
            | Rule::Budget(msg) => (*msg).to_string(),
        }
    }
}

fn raw_value(input: &RawFormInput, field: Field) -> &str {
    match field {
        Field::Name => &input.name,
        Field::Email => &input.email,
        Field::Phone => input.phone.as_deref().unwrap_or(""),
        Field::Subject => &input.subject,
        Field::Message => &input.message,
        Field::InstrumentType => input.instrument_type.as_deref().unwrap_or(""),
        Field::Budget => input.budget.as_deref().unwrap_or(""),
    }
}

/// Whether `value` is a plain mailbox address such as `ana@example.com`.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::parse_with_options(value, EMAIL_OPTIONS).is_ok()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Clean free text before it is echoed anywhere: trim, drop angle brackets,
/// and cap the length at 1000 characters.
pub fn sanitize_input(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(SANITIZE_MAX_CHARS)
        .collect()
}

/// SHA-256 fingerprint of a submission, as a hex string.
///
/// Identical submissions share a key, which lets a sender recognise a
/// visitor pressing "send" twice for the same message.
pub fn submission_key(submission: &ContactSubmission) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"contact\0");
    for value in [
        Some(submission.name()),
        Some(submission.email()),
        submission.phone(),
        Some(submission.subject()),
        Some(submission.message()),
        submission.instrument_type(),
        submission.budget(),
    ] {
        match value {
            Some(v) => {
                hasher.update(b"\x01");
                hasher.update(v.as_bytes());
            }
            None => hasher.update(b"\x00"),
        }
        hasher.update(b"\0");
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::valid_form;

    fn validator() -> ContactValidator {
        ContactValidator::new(LocaleConfig::venezuela())
    }

    #[test]
    fn valid_form_passes() {
        let submission = validator().validate(&valid_form()).unwrap();
        assert_eq!(submission.name(), "Ana Pérez");
        assert_eq!(submission.email(), "ana@example.com");
        assert_eq!(submission.subject(), "Encargo cuatro");
        assert_eq!(submission.phone(), None);
    }

    #[test]
    fn values_are_trimmed() {
        let input = RawFormInput {
            name: "  Ana Pérez ".into(),
            email: " ana@example.com\n".into(),
            phone: Some(" 0414 123 4567 ".into()),
            subject: "\tEncargo cuatro ".into(),
            message: " Quisiera un cuatro de concierto  ".into(),
            instrument_type: Some(" cuatro-concierto".into()),
            budget: Some("1000-2000 ".into()),
        };
        let s = validator().validate(&input).unwrap();
        assert_eq!(s.name(), "Ana Pérez");
        assert_eq!(s.email(), "ana@example.com");
        assert_eq!(s.phone(), Some("0414 123 4567"));
        assert_eq!(s.subject(), "Encargo cuatro");
        assert_eq!(s.message(), "Quisiera un cuatro de concierto");
        assert_eq!(s.instrument_type(), Some("cuatro-concierto"));
        assert_eq!(s.budget(), Some("1000-2000"));
    }

    #[test]
    fn one_char_name_fails_on_name_only() {
        let input = RawFormInput {
            name: "A".into(),
            email: "x@y.com".into(),
            subject: "Hello there".into(),
            message: "1234567890".into(),
            ..Default::default()
        };
        let errors = validator().validate(&input).unwrap_err();
        assert_eq!(errors.fields(), vec![Field::Name]);
        assert_eq!(
            errors.get(Field::Name),
            Some("El nombre debe tener al menos 2 caracteres")
        );
    }

    #[test]
    fn email_rejects_display_names_literals_and_bare_hosts() {
        let v = validator();
        for email in [
            "Ana <ana@example.com>",
            "Ana Pérez <ana@example.com>",
            "ana@localhost",
            "ana@[127.0.0.1]",
        ] {
            let input = RawFormInput {
                email: email.into(),
                ..valid_form()
            };
            let errors = v.validate(&input).unwrap_err();
            assert_eq!(errors.fields(), vec![Field::Email], "{email}");
        }
        assert!(is_valid_email("ana.perez@taller.com.ve"));
    }

    #[test]
    fn bad_email_fails_on_email_only() {
        let input = RawFormInput {
            name: "Ana Pérez".into(),
            email: "not-an-email".into(),
            subject: "Encargo cuatro".into(),
            message: "Quisiera un cuatro de concierto".into(),
            ..Default::default()
        };
        let errors = validator().validate(&input).unwrap_err();
        assert_eq!(errors.fields(), vec![Field::Email]);
        assert_eq!(errors.get(Field::Email), Some("Por favor ingresa un email válido"));
    }

    #[test]
    fn each_single_violation_reports_only_that_field() {
        let cases: Vec<(Field, RawFormInput)> = vec![
            (Field::Name, RawFormInput { name: "Ana123".into(), ..valid_form() }),
            (Field::Email, RawFormInput { email: "".into(), ..valid_form() }),
            (Field::Phone, RawFormInput { phone: Some("12345".into()), ..valid_form() }),
            (Field::Subject, RawFormInput { subject: "Hola".into(), ..valid_form() }),
            (Field::Message, RawFormInput { message: "corto".into(), ..valid_form() }),
            (
                Field::InstrumentType,
                RawFormInput { instrument_type: Some("violin".into()), ..valid_form() },
            ),
            (Field::Budget, RawFormInput { budget: Some("gratis".into()), ..valid_form() }),
        ];
        for (field, input) in cases {
            let errors = validator().validate(&input).unwrap_err();
            assert_eq!(errors.fields(), vec![field], "case {field}");
        }
    }

    #[test]
    fn first_failing_rule_wins() {
        let v = validator();
        // too long AND contains digits: length rule comes first
        let long_digits = "1".repeat(51);
        assert_eq!(
            v.check_field(Field::Name, &long_digits).as_deref(),
            Some("El nombre no puede exceder 50 caracteres")
        );
        // empty email is "required", not "invalid"
        assert_eq!(
            v.check_field(Field::Email, "").as_deref(),
            Some("El email es requerido")
        );
    }

    #[test]
    fn multiple_invalid_fields_each_get_one_message() {
        let input = RawFormInput {
            name: "A".into(),
            email: "nope".into(),
            subject: "Hi".into(),
            message: "short".into(),
            ..Default::default()
        };
        let errors = validator().validate(&input).unwrap_err();
        assert_eq!(
            errors.fields(),
            vec![Field::Name, Field::Email, Field::Subject, Field::Message]
        );
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn empty_optionals_are_absent_not_errors() {
        let input = RawFormInput {
            phone: Some("   ".into()),
            instrument_type: Some("".into()),
            budget: Some("".into()),
            ..valid_form()
        };
        let s = validator().validate(&input).unwrap();
        assert_eq!(s.phone(), None);
        assert_eq!(s.instrument_type(), None);
        assert_eq!(s.budget(), None);
    }

    #[test]
    fn length_limits_count_characters() {
        let v = validator();
        // 50 accented characters are 100 bytes but still within the limit
        let name = "á".repeat(50);
        assert_eq!(v.check_field(Field::Name, &name), None);
        assert!(v.check_field(Field::Name, &"á".repeat(51)).is_some());
        assert_eq!(v.check_field(Field::Message, &"x".repeat(1000)), None);
        assert!(v.check_field(Field::Message, &"x".repeat(1001)).is_some());
    }

    #[test]
    fn phone_message_comes_from_locale() {
        let es = ContactValidator::new(LocaleConfig::spain());
        assert_eq!(
            es.check_field(Field::Phone, "0414 123 4567").as_deref(),
            Some("Formato de teléfono español inválido")
        );
        assert_eq!(es.check_field(Field::Phone, "+34 612 345 678"), None);
    }

    #[test]
    fn catalogs_follow_locale() {
        let es = ContactValidator::new(LocaleConfig::spain());
        let input = RawFormInput {
            instrument_type: Some("cuatro-concierto".into()),
            ..valid_form()
        };
        let errors = es.validate(&input).unwrap_err();
        assert!(errors.contains(Field::InstrumentType));
    }

    #[test]
    fn raw_input_deserializes_camel_case_with_missing_keys() {
        let input: RawFormInput =
            serde_json::from_str(r#"{"name": "Ana", "instrumentType": "otro"}"#).unwrap();
        assert_eq!(input.name, "Ana");
        assert_eq!(input.email, "");
        assert_eq!(input.instrument_type.as_deref(), Some("otro"));
        assert_eq!(input.budget, None);
    }

    #[test]
    fn field_errors_serialize_by_form_key() {
        let input = RawFormInput {
            instrument_type: Some("violin".into()),
            ..valid_form()
        };
        let errors = validator().validate(&input).unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert!(json.get("instrumentType").is_some());
        assert!(errors.to_string().contains("instrumentType"));
    }

    #[test]
    fn sanitize_strips_brackets_and_caps_length() {
        assert_eq!(sanitize_input("  <b>hola</b> "), "bhola/b");
        assert_eq!(sanitize_input(&"x".repeat(1500)).chars().count(), 1000);
    }

    #[test]
    fn submission_key_is_stable_and_content_sensitive() {
        let v = validator();
        let a = v.validate(&valid_form()).unwrap();
        let b = v.validate(&valid_form()).unwrap();
        assert_eq!(submission_key(&a), submission_key(&b));
        assert_eq!(submission_key(&a).len(), 64);

        let other = v
            .validate(&RawFormInput {
                phone: Some("0414 123 4567".into()),
                ..valid_form()
            })
            .unwrap();
        assert_ne!(submission_key(&a), submission_key(&other));
    }
}
