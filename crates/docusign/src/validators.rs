//! Predicates and assertions over user-supplied fields.
//!
//! `is_valid_*` functions answer yes/no; `validate_*` functions fail with a
//! [`DocuSignError::Validation`] whose message names the offending field.
//! Everything here runs before a request is built, so a rejected item never
//! reaches the network.

use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use url::{Host, Url};
use uuid::Uuid;

use crate::error::{DocuSignError, Result};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    )
    .unwrap();
    static ref BASE64_REGEX: Regex = Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").unwrap();
}

/// Hosts that must never receive a request on a user's behalf.
const DENIED_HOSTNAMES: &[&str] = &["localhost"];
const DENIED_IPV4: &[Ipv4Addr] = &[Ipv4Addr::LOCALHOST];
/// The cloud metadata service; covered by the link-local check but named
/// so the intent is visible.
const METADATA_IPV4: Ipv4Addr = Ipv4Addr::new(169, 254, 169, 254);

/// The kinds of constraint [`validate_field`] can check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Uuid,
    Url,
    IsoDate,
    Base64,
    PositiveNumber,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Canonical 8-4-4-4-12 form only; version and variant are not checked.
pub fn is_valid_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::try_parse(value).is_ok()
}

/// Absolute `http`/`https` URL whose host is not loopback or link-local.
pub fn is_valid_url(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        Some(host) => !is_denied_host(&host),
        None => false,
    }
}

fn is_denied_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.');
            DENIED_HOSTNAMES.iter().any(|d| domain.eq_ignore_ascii_case(d))
        }
        Host::Ipv4(ip) => is_denied_ipv4(ip),
        // `to_ipv4` covers both the mapped (::ffff:a.b.c.d) and the
        // compatible (::a.b.c.d) embeddings.
        Host::Ipv6(ip) => {
            ip.is_loopback()
                || is_ipv6_link_local(ip)
                || ip.to_ipv4().is_some_and(|v4| is_denied_ipv4(&v4))
        }
    }
}

fn is_denied_ipv4(ip: &Ipv4Addr) -> bool {
    DENIED_IPV4.contains(ip) || *ip == METADATA_IPV4 || ip.is_link_local()
}

/// `fe80::/10`
fn is_ipv6_link_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xffc0 == 0xfe80
}

/// ISO 8601 date (`2026-10-18`) or date-time with optional fraction and
/// optional `Z`/offset.
pub fn is_valid_iso_date(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
}

/// Non-empty, length a multiple of 4, standard alphabet, at most two
/// trailing `=`.  Embedded line breaks are ignored.
pub fn is_valid_base64(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    !compact.is_empty() && compact.len() % 4 == 0 && BASE64_REGEX.is_match(&compact)
}

/// Finite and strictly greater than zero.  Accepts JSON numbers and
/// numeric strings (DocuSign sends amounts as strings).
pub fn is_positive_number(value: &Value) -> bool {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.is_some_and(|n| n.is_finite() && n > 0.0)
}

/// True for absent, `null`, blank strings, and empty arrays/objects.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

/// Fails with `"<field> is required"` when the value is blank.
pub fn validate_required(value: Option<&Value>, field: &str) -> Result<()> {
    if is_blank(value) {
        return Err(DocuSignError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Checks a required value against `kind`.
///
/// Blank values fail as "required"; everything else fails with a
/// kind-specific message.  A URL that parses but targets a denied host
/// fails as [`DocuSignError::SsrfRejected`], which reads the same as any
/// other invalid URL.
pub fn validate_field(value: Option<&Value>, kind: FieldKind, field: &str) -> Result<()> {
    if kind == FieldKind::PositiveNumber {
        // Zero and non-numeric input get the same message as a missing value.
        return match value {
            Some(v) if is_positive_number(v) => Ok(()),
            _ => Err(DocuSignError::validation(format!(
                "{field} must be a positive number"
            ))),
        };
    }

    validate_required(value, field)?;
    let text = match value {
        Some(Value::String(s)) => s.trim(),
        _ => return Err(invalid(kind, field)),
    };

    let ok = match kind {
        FieldKind::Email => is_valid_email(text),
        FieldKind::Uuid => is_valid_uuid(text),
        FieldKind::IsoDate => is_valid_iso_date(text),
        FieldKind::Base64 => is_valid_base64(text),
        FieldKind::Url => {
            if is_valid_url(text) {
                true
            } else if parses_as_web_url(text) {
                return Err(DocuSignError::SsrfRejected {
                    field: field.to_owned(),
                });
            } else {
                false
            }
        }
        FieldKind::PositiveNumber => is_positive_number(&Value::String(text.to_owned())),
    };

    if ok {
        Ok(())
    } else {
        Err(invalid(kind, field))
    }
}

/// `validate_field` for optional values: blank passes.
pub fn validate_optional(value: Option<&Value>, kind: FieldKind, field: &str) -> Result<()> {
    if is_blank(value) {
        return Ok(());
    }
    validate_field(value, kind, field)
}

fn parses_as_web_url(text: &str) -> bool {
    Url::parse(text)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

fn invalid(kind: FieldKind, field: &str) -> DocuSignError {
    let expected = match kind {
        FieldKind::Email => "a valid email",
        FieldKind::Uuid => "a valid UUID",
        FieldKind::Url => "a valid URL",
        FieldKind::IsoDate => "a valid ISO 8601 date",
        FieldKind::Base64 => "valid base64",
        FieldKind::PositiveNumber => "a positive number",
    };
    DocuSignError::validation(format!("{field} must be {expected}"))
}
