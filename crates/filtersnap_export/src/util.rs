//! Stateless helpers: collation, file names, JSON scalar rendering, locale/time formatting.

use std::cmp::Ordering;
use std::fmt::Display;

use chrono::{DateTime, Locale, TimeZone};
use filtersnap_xlsx::EnumCellValue;
use filtersnap_xlsx::conf::TUP_EXCEL_ILLEGAL;
use pure_rust_locales::locale_match;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::conf::{
    C_FILE_NAME_REPLACEMENT, C_FILE_NAME_STEM_FALLBACK, C_LOCALE_FALLBACK,
    TUP_FMT_FULL_FIELD_UPGRADES, TUP_LOCALE_ENV_VARS,
};

////////////////////////////////////////////////////////////////////////////////
// #region Collation

/// Base letters only: decomposed, combining marks dropped, case-folded.
fn derive_collation_key(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-like order: base letters first, then accents, then lowercase before
/// uppercase.
pub fn compare_collated(a: &str, b: &str) -> Ordering {
    derive_collation_key(a)
        .cmp(&derive_collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Sort strings in place with [`compare_collated`].
pub fn sort_collated(values: &mut [String]) {
    values.sort_by(|a, b| compare_collated(a, b));
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileNames

fn is_file_name_char_illegal(ch: char) -> bool {
    ch.is_control()
        || TUP_EXCEL_ILLEGAL
            .iter()
            .any(|c_illegal| c_illegal.chars().eq([ch]))
}

/// Make `name` safe as a single path component inside the output directory.
///
/// Path separators, `..`, control characters and sheet-name illegal characters
/// become `_`.
pub fn sanitize_file_name_stem(name: &str) -> String {
    let mut c_stem = String::with_capacity(name.len());
    for ch in name.chars() {
        if is_file_name_char_illegal(ch) {
            c_stem.push_str(C_FILE_NAME_REPLACEMENT);
        } else {
            c_stem.push(ch);
        }
    }
    while c_stem.contains("..") {
        c_stem = c_stem.replace("..", C_FILE_NAME_REPLACEMENT);
    }

    let c_stem = c_stem.trim();
    if c_stem.is_empty() || c_stem == "." {
        return C_FILE_NAME_STEM_FALLBACK.to_string();
    }
    c_stem.to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region JsonScalars

/// Render a JSON scalar as display text. `null` renders empty.
pub fn derive_json_scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

/// Convert a raw summary-data value into a workbook cell.
pub fn convert_json_to_cell(value: &Value) -> EnumCellValue {
    match value {
        Value::Null => EnumCellValue::String(String::new()),
        Value::Bool(b) => EnumCellValue::Boolean(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) => EnumCellValue::Number(x),
            None => EnumCellValue::String(n.to_string()),
        },
        Value::String(s) => EnumCellValue::String(s.clone()),
        _ => EnumCellValue::String(value.to_string()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LocaleAndTime

/// Parse a POSIX locale tag (`de_DE.UTF-8`, `fr_FR@euro`) into a chrono locale.
pub fn parse_locale_tag(tag: &str) -> Option<Locale> {
    let c_tag = tag
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace('-', "_");
    if c_tag.is_empty() || c_tag == "C" || c_tag == "POSIX" {
        return None;
    }
    Locale::try_from(c_tag.as_str()).ok()
}

/// Resolve the time locale from `LC_ALL`, `LC_TIME`, `LANG`; fall back to `en_US`.
pub fn resolve_locale_from_env() -> Locale {
    TUP_LOCALE_ENV_VARS
        .iter()
        .filter_map(|c_key| std::env::var(c_key).ok())
        .find_map(|c_val| parse_locale_tag(&c_val))
        .unwrap_or_else(derive_fallback_locale)
}

fn derive_fallback_locale() -> Locale {
    Locale::try_from(C_LOCALE_FALLBACK).unwrap_or(Locale::POSIX)
}

/// Date-time pattern of `locale` with full weekday/month names and a time zone.
///
/// Field order comes from the locale's `LC_TIME` date-time format.
pub fn derive_extraction_time_pattern(locale: Locale) -> String {
    let c_pattern_locale: &str = locale_match!(locale => LC_TIME::D_T_FMT);
    let mut c_pattern = TUP_FMT_FULL_FIELD_UPGRADES.iter().fold(
        c_pattern_locale.to_string(),
        |c_acc, &(c_from, c_to)| c_acc.replace(c_from, c_to),
    );
    if !c_pattern.contains("%Z") && !c_pattern.contains("%z") {
        c_pattern.push_str(" %Z");
    }
    c_pattern
}

/// Format an instant with full date style and long time style in `locale`.
pub fn format_extraction_time<Tz>(dt: &DateTime<Tz>, locale: Locale) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format_localized(&derive_extraction_time_pattern(locale), locale)
        .to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
