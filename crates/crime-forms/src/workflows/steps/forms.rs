use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::values::{Coded, YesNo};

/// Largest duration, in hours, any step accepts.
pub const MAX_HOURS: i64 = 10_000;
/// Largest count of items, letters or calls any step accepts.
pub const MAX_ITEMS: i64 = 1_000_000;
/// Largest unit price or mileage any step accepts: 1,000,000.00.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Submitted form fields, flattened to trimmed strings.
///
/// Scalars are stringified, arrays become comma separated lists and nested
/// objects are ignored, mirroring what an HTML form post can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct FormParams(BTreeMap<String, String>);

impl From<BTreeMap<String, Value>> for FormParams {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let fields = raw
            .into_iter()
            .filter_map(|(key, value)| scalar_text(&value).map(|text| (key, text)))
            .collect();
        Self(fields)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Null | Value::Object(_) => None,
    }
}

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<String>) {
        self.0.insert(field.to_string(), value.into().trim().to_string());
    }

    /// Present, non-blank value for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    pub fn list(&self, field: &str) -> Vec<String> {
        self.get(field)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checkbox semantics: only an explicit truthy value counts.
    pub fn flag(&self, field: &str) -> bool {
        matches!(self.get(field), Some("true" | "1" | "yes" | "on"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Blank,
    Invalid,
    Inclusion,
    NotANumber,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    Accepted,
    FutureDate,
}

impl ErrorKind {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Blank => "can't be blank",
            Self::Invalid => "is invalid",
            Self::Inclusion => "is not included in the list",
            Self::NotANumber => "is not a number",
            Self::GreaterThan => "must be greater than the minimum",
            Self::GreaterThanOrEqualTo => "must not be below the minimum",
            Self::LessThan => "must be less than the maximum",
            Self::LessThanOrEqualTo => "must not exceed the maximum",
            Self::Accepted => "must be accepted",
            Self::FutureDate => "can't be in the future",
        }
    }
}

/// Field-scoped validation failures for one step submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<ErrorKind>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, kind: ErrorKind) {
        let kinds = self.0.entry(field.to_string()).or_default();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn of_kind(&self, field: &str, kind: ErrorKind) -> bool {
        self.0
            .get(field)
            .map(|kinds| kinds.contains(&kind))
            .unwrap_or(false)
    }

    pub fn on(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, kinds) in other.0 {
            for kind in kinds {
                self.add(&field, kind);
            }
        }
    }

    /// Human readable messages keyed by field, for rendering.
    pub fn messages(&self) -> BTreeMap<String, Vec<&'static str>> {
        self.0
            .iter()
            .map(|(field, kinds)| (field.clone(), kinds.iter().map(|k| k.message()).collect()))
            .collect()
    }
}

/// Typecasts raw parameters, recording a failure for every field it rejects.
///
/// Presence rules belong to the form's `validate`; the checker only reports
/// values that were supplied but could not be read.
pub struct Checker<'a> {
    params: &'a FormParams,
    errors: &'a mut FormErrors,
}

impl<'a> Checker<'a> {
    pub fn new(params: &'a FormParams, errors: &'a mut FormErrors) -> Self {
        Self { params, errors }
    }

    pub fn text(&self, field: &str) -> Option<String> {
        self.params.text(field)
    }

    pub fn flag(&self, field: &str) -> bool {
        self.params.flag(field)
    }

    pub fn list(&self, field: &str) -> Vec<String> {
        self.params.list(field)
    }

    pub fn code<T: Coded>(&mut self, field: &str) -> Option<T> {
        let raw = self.params.get(field)?;
        let parsed = T::from_code(raw);
        if parsed.is_none() {
            self.errors.add(field, ErrorKind::Inclusion);
        }
        parsed
    }

    pub fn codes<T: Coded + PartialEq>(&mut self, field: &str) -> Vec<T> {
        let mut parsed = Vec::new();
        for raw in self.params.list(field) {
            match T::from_code(&raw) {
                Some(value) if !parsed.contains(&value) => parsed.push(value),
                Some(_) => {}
                None => self.errors.add(field, ErrorKind::Inclusion),
            }
        }
        parsed
    }

    pub fn yes_no(&mut self, field: &str) -> Option<YesNo> {
        self.code::<YesNo>(field)
    }

    pub fn integer(&mut self, field: &str) -> Option<i64> {
        let raw = self.params.get(field)?;
        match raw.parse::<i64>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.add(field, ErrorKind::NotANumber);
                None
            }
        }
    }

    pub fn decimal(&mut self, field: &str) -> Option<Decimal> {
        let raw = self.params.get(field)?;
        match Decimal::from_str(&raw.replace(',', "")) {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.add(field, ErrorKind::NotANumber);
                None
            }
        }
    }

    pub fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let raw = self.params.get(field)?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.add(field, ErrorKind::Invalid);
                None
            }
        }
    }
}

/// Presence and range rules evaluated against already typecast values.
pub mod rules {
    use super::*;

    pub fn present<T>(errors: &mut FormErrors, field: &str, value: &Option<T>) {
        if value.is_none() {
            errors.add(field, ErrorKind::Blank);
        }
    }

    pub fn present_text(errors: &mut FormErrors, field: &str, value: &Option<String>) {
        if value.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            errors.add(field, ErrorKind::Blank);
        }
    }

    pub fn past_date(errors: &mut FormErrors, field: &str, value: Option<NaiveDate>) {
        match value {
            None => errors.add(field, ErrorKind::Blank),
            Some(date) if date > today() => errors.add(field, ErrorKind::FutureDate),
            Some(_) => {}
        }
    }

    pub fn at_least(errors: &mut FormErrors, field: &str, value: Option<i64>, minimum: i64) {
        match value {
            None => errors.add(field, ErrorKind::Blank),
            Some(number) if number < minimum => errors.add(field, ErrorKind::GreaterThanOrEqualTo),
            Some(_) => {}
        }
    }

    pub fn between(errors: &mut FormErrors, field: &str, value: Option<i64>, min: i64, max: i64) {
        match value {
            None => errors.add(field, ErrorKind::Blank),
            Some(number) if number < min => errors.add(field, ErrorKind::GreaterThanOrEqualTo),
            Some(number) if number > max => errors.add(field, ErrorKind::LessThanOrEqualTo),
            Some(_) => {}
        }
    }

    pub fn positive(errors: &mut FormErrors, field: &str, value: Option<Decimal>) {
        match value {
            None => errors.add(field, ErrorKind::Blank),
            Some(amount) if amount <= Decimal::ZERO => errors.add(field, ErrorKind::GreaterThan),
            Some(_) => {}
        }
    }

    /// A positive amount no larger than [`MAX_AMOUNT`].
    pub fn amount(errors: &mut FormErrors, field: &str, value: Option<Decimal>) {
        match value {
            Some(amount) if amount > MAX_AMOUNT => errors.add(field, ErrorKind::LessThanOrEqualTo),
            _ => positive(errors, field, value),
        }
    }

    pub fn matches(errors: &mut FormErrors, field: &str, value: &Option<String>, pattern: &Regex) {
        match value {
            None => errors.add(field, ErrorKind::Blank),
            Some(text) if !pattern.is_match(text) => errors.add(field, ErrorKind::Invalid),
            Some(_) => {}
        }
    }

    pub fn accepted(errors: &mut FormErrors, field: &str, value: bool) {
        if !value {
            errors.add(field, ErrorKind::Accepted);
        }
    }

    /// Unique file number: `DDMMYY/NNN`, dated no later than today.
    pub fn ufn(errors: &mut FormErrors, field: &str, value: &Option<String>) {
        static UFN: OnceLock<Regex> = OnceLock::new();
        let Some(text) = value else {
            errors.add(field, ErrorKind::Blank);
            return;
        };
        if !pattern(&UFN, r"^\d{6}/\d{3}$").is_match(text) {
            errors.add(field, ErrorKind::Invalid);
            return;
        }
        match NaiveDate::parse_from_str(&text[..6], "%d%m%y") {
            Ok(date) if date > today() => errors.add(field, ErrorKind::FutureDate),
            Ok(_) => {}
            Err(_) => errors.add(field, ErrorKind::Invalid),
        }
    }

    pub fn email(errors: &mut FormErrors, field: &str, value: &Option<String>) {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        matches(errors, field, value, pattern(&EMAIL, r"^[^@\s]+@[^@\s]+\.[^@\s]+$"));
    }

    pub fn postcode(errors: &mut FormErrors, field: &str, value: &Option<String>) {
        static POSTCODE: OnceLock<Regex> = OnceLock::new();
        matches(
            errors,
            field,
            value,
            pattern(&POSTCODE, r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$"),
        );
    }

    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Compile a fixed validation pattern once.
pub fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static validation pattern compiles"))
}

/// Split duration fields, read as `(hours, minutes)`.
pub fn duration(checker: &mut Checker<'_>, prefix: &str) -> (Option<i64>, Option<i64>) {
    let hours = checker.integer(&format!("{prefix}_hours"));
    let minutes = checker.integer(&format!("{prefix}_minutes"));
    (hours, minutes)
}

/// Validate split duration fields and combine them into minutes.
pub fn validate_duration(
    errors: &mut FormErrors,
    prefix: &str,
    hours: Option<i64>,
    minutes: Option<i64>,
) {
    let hours_field = format!("{prefix}_hours");
    let minutes_field = format!("{prefix}_minutes");
    rules::between(errors, &hours_field, hours, 0, MAX_HOURS);
    rules::between(errors, &minutes_field, minutes, 0, 59);
    if hours == Some(0) && minutes == Some(0) {
        errors.add(prefix, ErrorKind::GreaterThan);
    }
}

/// `hours × 60 + minutes`, or `None` when either part is missing or the
/// total does not fit.
pub fn total_minutes(hours: Option<i64>, minutes: Option<i64>) -> Option<i64> {
    hours?.checked_mul(60)?.checked_add(minutes?)
}

/// Which record a step submission addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordRef {
    Application,
    New,
    Existing(String),
}

impl RecordRef {
    pub fn from_segment(segment: Option<&str>) -> Self {
        match segment {
            None | Some("") => Self::Application,
            Some("new") => Self::New,
            Some(id) => Self::Existing(id.to_string()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Existing(id) => Some(id),
            Self::Application | Self::New => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} '{id}' not found")]
pub struct RecordMissing {
    pub kind: &'static str,
    pub id: String,
}

impl RecordMissing {
    pub fn new(kind: &'static str, record: &RecordRef) -> Self {
        Self {
            kind,
            id: record.id().unwrap_or("new").to_string(),
        }
    }
}

/// One step's form object over an application of type `A`.
pub trait StepForm<A>: Sized {
    /// Typecast submitted parameters.
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self;

    /// Business rules, evaluated against the current application state.
    fn validate(&self, application: &A, errors: &mut FormErrors);

    /// Write the form into the application, returning the record it touched.
    fn persist(self, application: &mut A, record: &RecordRef) -> Result<RecordRef, RecordMissing>;

    fn is_valid(&self, application: &A) -> bool {
        let mut errors = FormErrors::default();
        self.validate(application, &mut errors);
        errors.is_empty()
    }
}

/// Parse, validate and persist in one pass; nothing is written on failure.
pub fn run_step<A, F: StepForm<A>>(
    params: &FormParams,
    application: &mut A,
    record: &RecordRef,
) -> Result<Result<RecordRef, FormErrors>, RecordMissing> {
    let mut errors = FormErrors::default();
    let form = F::parse(params, &mut errors);
    form.validate(application, &mut errors);
    if !errors.is_empty() {
        return Ok(Err(errors));
    }
    form.persist(application, record).map(Ok)
}
