//! Builders for the JSON sub-objects DocuSign expects.
//!
//! Every builder is pure: it takes already-validated primitives and returns
//! a typed value that serialises to DocuSign's wire shape.  Numeric-looking
//! wire fields (`routingOrder`, `pageNumber`, positions, amounts) stay
//! strings because the API is string-typed for them.

use base64::{engine::general_purpose, Engine as _};
use nodes::BinaryHelper;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocuSignError, Result};
use crate::validators::{is_valid_base64, validate_field, FieldKind};

pub const DEFAULT_ROUTING_ORDER: &str = "1";
pub const DEFAULT_X_POSITION: &str = "100";
pub const DEFAULT_Y_POSITION: &str = "100";
pub const DEFAULT_PAGE_NUMBER: &str = "1";

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// A placed field on a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub document_id: String,
    pub page_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_x_offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_y_offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
}

/// Where a tab goes: an anchor string, or absolute coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabPlacement {
    pub document_id: String,
    pub page_number: Option<String>,
    pub x_position: Option<String>,
    pub y_position: Option<String>,
    pub anchor_string: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl TabPlacement {
    /// Anchor placement wins over coordinates: when an anchor is given the
    /// coordinates are dropped, otherwise missing ones default to (100, 100).
    fn place(&self) -> Tab {
        let mut tab = Tab {
            document_id: self.document_id.clone(),
            page_number: non_blank(self.page_number.as_deref())
                .unwrap_or_else(|| DEFAULT_PAGE_NUMBER.to_owned()),
            ..Default::default()
        };
        match non_blank(self.anchor_string.as_deref()) {
            Some(anchor) => {
                tab.anchor_string = Some(anchor);
                tab.anchor_units = Some("pixels".to_owned());
                tab.anchor_x_offset = Some("0".to_owned());
                tab.anchor_y_offset = Some("0".to_owned());
            }
            None => {
                tab.x_position = Some(
                    non_blank(self.x_position.as_deref())
                        .unwrap_or_else(|| DEFAULT_X_POSITION.to_owned()),
                );
                tab.y_position = Some(
                    non_blank(self.y_position.as_deref())
                        .unwrap_or_else(|| DEFAULT_Y_POSITION.to_owned()),
                );
            }
        }
        tab
    }
}

pub fn build_sign_here_tab(
    document_id: &str,
    page_number: &str,
    x_position: Option<&str>,
    y_position: Option<&str>,
    anchor_string: Option<&str>,
) -> Tab {
    TabPlacement {
        document_id: document_id.to_owned(),
        page_number: Some(page_number.to_owned()),
        x_position: x_position.map(str::to_owned),
        y_position: y_position.map(str::to_owned),
        anchor_string: anchor_string.map(str::to_owned),
    }
    .place()
}

pub fn build_initial_here_tab(placement: &TabPlacement) -> Tab {
    placement.place()
}

pub fn build_date_signed_tab(placement: &TabPlacement) -> Tab {
    placement.place()
}

pub fn build_text_tab(placement: &TabPlacement, label: &str, value: Option<&str>, required: bool) -> Tab {
    Tab {
        tab_label: Some(label.to_owned()),
        value: non_blank(value),
        required: Some(required.to_string()),
        ..placement.place()
    }
}

pub fn build_checkbox_tab(placement: &TabPlacement, label: &str, selected: bool) -> Tab {
    Tab {
        tab_label: Some(label.to_owned()),
        selected: Some(selected.to_string()),
        ..placement.place()
    }
}

/// Tab collections keyed the way DocuSign groups them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tabs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sign_here_tabs: Vec<Tab>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_here_tabs: Vec<Tab>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub date_signed_tabs: Vec<Tab>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_tabs: Vec<Tab>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkbox_tabs: Vec<Tab>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formula_tabs: Vec<Tab>,
}

impl Tabs {
    pub fn is_empty(&self) -> bool {
        self.sign_here_tabs.is_empty()
            && self.initial_here_tabs.is_empty()
            && self.date_signed_tabs.is_empty()
            && self.text_tabs.is_empty()
            && self.checkbox_tabs.is_empty()
            && self.formula_tabs.is_empty()
    }

    /// `None` when empty, so the key is left out of the body.
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

// ---------------------------------------------------------------------------
// Recipients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    pub email: String,
    pub name: String,
    pub recipient_id: String,
    pub routing_order: String,
    /// Set for embedded (in-app) signing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Tabs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonCopy {
    pub email: String,
    pub name: String,
    pub recipient_id: String,
    pub routing_order: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InPersonSigner {
    pub host_email: String,
    pub host_name: String,
    pub signer_name: String,
    pub recipient_id: String,
    pub routing_order: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Tabs>,
}

fn routing_order_or_default(routing_order: Option<&str>) -> String {
    non_blank(routing_order).unwrap_or_else(|| DEFAULT_ROUTING_ORDER.to_owned())
}

pub fn build_signer(
    email: &str,
    name: &str,
    recipient_id: &str,
    routing_order: Option<&str>,
    tabs: Option<Tabs>,
) -> Signer {
    Signer {
        email: email.to_owned(),
        name: name.to_owned(),
        recipient_id: recipient_id.to_owned(),
        routing_order: routing_order_or_default(routing_order),
        client_user_id: None,
        tabs: tabs.and_then(Tabs::non_empty),
    }
}

pub fn build_carbon_copy(
    email: &str,
    name: &str,
    recipient_id: &str,
    routing_order: Option<&str>,
) -> CarbonCopy {
    CarbonCopy {
        email: email.to_owned(),
        name: name.to_owned(),
        recipient_id: recipient_id.to_owned(),
        routing_order: routing_order_or_default(routing_order),
    }
}

/// Certified delivery recipients must open the envelope but not sign;
/// the wire shape matches a carbon copy.
pub fn build_certified_delivery(
    email: &str,
    name: &str,
    recipient_id: &str,
    routing_order: Option<&str>,
) -> CarbonCopy {
    build_carbon_copy(email, name, recipient_id, routing_order)
}

pub fn build_in_person_signer(
    host_email: &str,
    host_name: &str,
    signer_name: &str,
    recipient_id: &str,
    routing_order: Option<&str>,
    tabs: Option<Tabs>,
) -> InPersonSigner {
    InPersonSigner {
        host_email: host_email.to_owned(),
        host_name: host_name.to_owned(),
        signer_name: signer_name.to_owned(),
        recipient_id: recipient_id.to_owned(),
        routing_order: routing_order_or_default(routing_order),
        tabs: tabs.and_then(Tabs::non_empty),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipients {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signers: Vec<Signer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub carbon_copies: Vec<CarbonCopy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certified_deliveries: Vec<CarbonCopy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_person_signers: Vec<InPersonSigner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRole {
    pub email: String,
    pub name: String,
    pub role_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Tabs>,
}

pub fn build_template_role(email: &str, name: &str, role_name: &str, tabs: Option<Tabs>) -> TemplateRole {
    TemplateRole {
        email: email.to_owned(),
        name: name.to_owned(),
        role_name: role_name.to_owned(),
        routing_order: None,
        client_user_id: None,
        tabs: tabs.and_then(Tabs::non_empty),
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_base64: String,
    pub document_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
}

impl Document {
    /// Fail when no extension was given and none could be derived from the name.
    pub fn require_extension(self) -> Result<Self> {
        if self.file_extension.is_none() {
            return Err(DocuSignError::validation(format!(
                "fileExtension is required (could not derive one from '{}')",
                self.name
            )));
        }
        Ok(self)
    }
}

/// `fileExtension` falls back to the suffix of `name`.
pub fn build_document(
    base64_content: &str,
    document_id: &str,
    name: &str,
    file_extension: Option<&str>,
) -> Document {
    let file_extension = non_blank(file_extension)
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .or_else(|| get_file_extension(name));
    Document {
        document_base64: base64_content.to_owned(),
        document_id: document_id.to_owned(),
        name: name.to_owned(),
        file_extension,
    }
}

/// Lower-cased suffix after the last `.` of a file name, if it has one.
pub fn get_file_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn mime_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "rtf" => "application/rtf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Resolve a document field to base64 content.
///
/// The value is first tried as the name of a binary property on the item;
/// if one exists its bytes are encoded.  A value shaped like a property name
/// (word characters only, no padding) that names nothing on the item is an
/// error rather than a payload.  Otherwise the value itself must decode as
/// base64 and is passed through with line breaks removed.
pub fn resolve_document_base64(
    value: &str,
    binary: &dyn BinaryHelper,
    item_index: usize,
    field: &str,
) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DocuSignError::validation(format!("{field} is required")));
    }

    if let Some(bytes) = binary.binary_data(item_index, value) {
        if bytes.is_empty() {
            return Err(DocuSignError::validation(format!(
                "{field} refers to an empty binary property '{value}'"
            )));
        }
        return Ok(general_purpose::STANDARD.encode(bytes));
    }

    if looks_like_property_name(value) {
        return Err(DocuSignError::validation(format!(
            "{field} refers to a missing binary property '{value}'"
        )));
    }

    let compact: String = value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if is_valid_base64(&compact) && general_purpose::STANDARD.decode(&compact).is_ok() {
        return Ok(compact);
    }

    Err(DocuSignError::validation(format!(
        "{field} must be valid base64 or the name of a binary property"
    )))
}

fn looks_like_property_name(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Envelope options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub reminder_enabled: String,
    pub reminder_delay: String,
    pub reminder_frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expirations {
    pub expire_enabled: String,
    pub expire_after: String,
    pub expire_warn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub use_account_defaults: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expirations: Option<Expirations>,
}

/// Reminder settings as `(delay_days, frequency_days)`, expiration as
/// `(expire_after_days, warn_days)`.  Both absent means account defaults.
pub fn build_notification(
    reminders: Option<(u32, u32)>,
    expirations: Option<(u32, u32)>,
) -> Notification {
    Notification {
        use_account_defaults: (reminders.is_none() && expirations.is_none()).to_string(),
        reminders: reminders.map(|(delay, frequency)| Reminders {
            reminder_enabled: "true".to_owned(),
            reminder_delay: delay.to_string(),
            reminder_frequency: frequency.to_string(),
        }),
        expirations: expirations.map(|(after, warn)| Expirations {
            expire_enabled: "true".to_owned(),
            expire_after: after.to_string(),
            expire_warn: warn.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeEvent {
    pub envelope_event_status_code: String,
}

/// Per-envelope Connect webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNotification {
    pub url: String,
    pub logging_enabled: String,
    pub require_acknowledgment: String,
    pub envelope_events: Vec<EnvelopeEvent>,
}

pub const WEBHOOK_URL_FIELD: &str = "webhookUrl";

/// Fails as `SsrfRejected` only for denied hosts; anything that is not an
/// http(s) URL at all is an ordinary validation error.
pub fn build_event_notification(url: &str, events: &[&str]) -> Result<EventNotification> {
    validate_field(Some(&Value::String(url.to_owned())), FieldKind::Url, WEBHOOK_URL_FIELD)?;
    let events = if events.is_empty() {
        &["completed"][..]
    } else {
        events
    };
    Ok(EventNotification {
        url: url.to_owned(),
        logging_enabled: "true".to_owned(),
        require_acknowledgment: "true".to_owned(),
        envelope_events: events
            .iter()
            .map(|e| EnvelopeEvent {
                envelope_event_status_code: (*e).to_owned(),
            })
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLineItem {
    pub name: String,
    pub amount_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub gateway_account_id: String,
    pub currency_code: String,
    pub line_items: Vec<PaymentLineItem>,
}

pub const PAYMENT_TAB_LABEL: &str = "payment";

/// Payment details for one collected amount.
///
/// `amount` must be a positive number and is referenced, not copied: the
/// decimal string itself travels in the formula tab built by
/// [`build_payment_tab`].
pub fn build_payment_details(
    amount: &str,
    currency_code: &str,
    gateway_account_id: &str,
    description: Option<&str>,
) -> Result<PaymentDetails> {
    validate_field(Some(&Value::String(amount.to_owned())), FieldKind::PositiveNumber, "amount")?;
    let currency = currency_code.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DocuSignError::validation(
            "currencyCode must be a three-letter currency code",
        ));
    }
    let gateway = gateway_account_id.trim();
    if gateway.is_empty() {
        return Err(DocuSignError::validation("gatewayAccountId is required"));
    }

    Ok(PaymentDetails {
        gateway_account_id: gateway.to_owned(),
        currency_code: currency.to_ascii_uppercase(),
        line_items: vec![PaymentLineItem {
            name: "Payment".to_owned(),
            amount_reference: PAYMENT_TAB_LABEL.to_owned(),
            description: non_blank(description),
        }],
    })
}

/// A hidden formula tab that collects `amount` (a validated decimal string,
/// sent unchanged) through `details`.
pub fn build_payment_tab(document_id: &str, amount: &str, details: PaymentDetails) -> Tab {
    Tab {
        document_id: document_id.to_owned(),
        page_number: DEFAULT_PAGE_NUMBER.to_owned(),
        x_position: Some("0".to_owned()),
        y_position: Some("0".to_owned()),
        tab_label: Some(PAYMENT_TAB_LABEL.to_owned()),
        formula: Some(amount.trim().to_owned()),
        hidden: Some("true".to_owned()),
        required: Some("true".to_owned()),
        payment_details: Some(details),
        ..Default::default()
    }
}
