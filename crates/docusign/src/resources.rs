//! The closed set of resources and operations the node exposes.
//!
//! Both sets are known at build time, so they are enums rather than
//! strings; [`Resource::supports`] is the routing table and every
//! (resource, operation) pair it accepts has a handler in the dispatcher.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $wire:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, ()> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

named_enum! {
    /// A DocuSign entity the node can act on.
    pub enum Resource {
        Envelope => "envelope",
        Template => "template",
        Document => "document",
        Recipient => "recipient",
        Tab => "tab",
        EnvelopeCustomField => "envelopeCustomField",
        AccountCustomField => "accountCustomField",
        EnvelopeLock => "envelopeLock",
        EnvelopeAttachment => "envelopeAttachment",
        EnvelopeNotification => "envelopeNotification",
        EnvelopeEmailSetting => "envelopeEmailSetting",
        EnvelopeTransferRule => "envelopeTransferRule",
        BulkSend => "bulkSend",
        Brand => "brand",
        User => "user",
        Group => "group",
        SigningGroup => "signingGroup",
        Folder => "folder",
        PowerForm => "powerForm",
        ConnectConfig => "connectConfig",
        ChunkedUpload => "chunkedUpload",
        PermissionProfile => "permissionProfile",
        Contact => "contact",
        CustomTab => "customTab",
        Workspace => "workspace",
        Payment => "payment",
        Account => "account",
        Billing => "billing",
    }
}

named_enum! {
    /// Something to do to a resource.
    pub enum Operation {
        Create => "create",
        CreateFromTemplate => "createFromTemplate",
        Get => "get",
        GetAll => "getAll",
        Update => "update",
        Delete => "delete",
        Send => "send",
        Resend => "resend",
        Void => "void",
        GetAuditEvents => "getAuditEvents",
        CreateRecipientView => "createRecipientView",
        Add => "add",
        Download => "download",
        AddUsers => "addUsers",
        GetItems => "getItems",
        MoveEnvelope => "moveEnvelope",
        Initiate => "initiate",
        UploadPart => "uploadPart",
        Commit => "commit",
        CreateRequest => "createRequest",
        GetGatewayAccounts => "getGatewayAccounts",
        GetSettings => "getSettings",
        UpdateSettings => "updateSettings",
        GetPlan => "getPlan",
        GetInvoices => "getInvoices",
    }
}

impl Resource {
    /// Path segment under the account base URL.  Envelope-scoped resources
    /// contain `{envelopeId}` (and tabs `{recipientId}`) placeholders.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Resource::Envelope => "envelopes",
            Resource::Template => "templates",
            Resource::Document => "envelopes/{envelopeId}/documents",
            Resource::Recipient => "envelopes/{envelopeId}/recipients",
            Resource::Tab => "envelopes/{envelopeId}/recipients/{recipientId}/tabs",
            Resource::EnvelopeCustomField => "envelopes/{envelopeId}/custom_fields",
            Resource::AccountCustomField => "custom_fields",
            Resource::EnvelopeLock => "envelopes/{envelopeId}/lock",
            Resource::EnvelopeAttachment => "envelopes/{envelopeId}/attachments",
            Resource::EnvelopeNotification => "envelopes/{envelopeId}/notification",
            Resource::EnvelopeEmailSetting => "envelopes/{envelopeId}/email_settings",
            Resource::EnvelopeTransferRule => "envelopes/transfer_rules",
            Resource::BulkSend => "bulk_send_lists",
            Resource::Brand => "brands",
            Resource::User => "users",
            Resource::Group => "groups",
            Resource::SigningGroup => "signing_groups",
            Resource::Folder => "folders",
            Resource::PowerForm => "powerforms",
            Resource::ConnectConfig => "connect",
            Resource::ChunkedUpload => "chunked_uploads",
            Resource::PermissionProfile => "permission_profiles",
            Resource::Contact => "contacts",
            Resource::CustomTab => "tab_definitions",
            Resource::Workspace => "workspaces",
            Resource::Payment => "payment_gateway_accounts",
            Resource::Account => "",
            Resource::Billing => "billing_plan",
        }
    }

    /// Parameter naming the individual entity, for resources addressed by id.
    pub fn id_param(&self) -> Option<&'static str> {
        match self {
            Resource::Envelope => Some("envelopeId"),
            Resource::Template => Some("templateId"),
            Resource::Document => Some("documentId"),
            Resource::Recipient => Some("recipientId"),
            Resource::Tab => Some("tabId"),
            Resource::EnvelopeCustomField | Resource::AccountCustomField => Some("fieldId"),
            Resource::EnvelopeAttachment => Some("attachmentId"),
            Resource::EnvelopeTransferRule => Some("envelopeTransferRuleId"),
            Resource::BulkSend => Some("bulkSendListId"),
            Resource::Brand => Some("brandId"),
            Resource::User => Some("userId"),
            Resource::Group => Some("groupId"),
            Resource::SigningGroup => Some("signingGroupId"),
            Resource::Folder => Some("folderId"),
            Resource::PowerForm => Some("powerFormId"),
            Resource::ConnectConfig => Some("connectId"),
            Resource::ChunkedUpload => Some("chunkedUploadId"),
            Resource::PermissionProfile => Some("permissionProfileId"),
            Resource::Contact => Some("contactId"),
            Resource::CustomTab => Some("customTabId"),
            Resource::Workspace => Some("workspaceId"),
            Resource::EnvelopeLock
            | Resource::EnvelopeNotification
            | Resource::EnvelopeEmailSetting
            | Resource::Payment
            | Resource::Account
            | Resource::Billing => None,
        }
    }

    /// The operations offered for this resource.
    pub fn operations(&self) -> &'static [Operation] {
        use Operation::*;
        match self {
            Resource::Envelope => &[
                Create,
                CreateFromTemplate,
                Get,
                GetAll,
                Update,
                Send,
                Resend,
                Void,
                GetAuditEvents,
                CreateRecipientView,
            ],
            Resource::Template => &[Create, Get, GetAll, Update, Delete],
            Resource::Document => &[Add, GetAll, Download, Delete],
            Resource::Recipient => &[Add, GetAll, Update, Delete],
            Resource::Tab => &[Add, GetAll, Update, Delete],
            Resource::EnvelopeCustomField => &[Create, GetAll, Update, Delete],
            Resource::AccountCustomField => &[Create, GetAll, Update, Delete],
            Resource::EnvelopeLock => &[Create, Get, Update, Delete],
            Resource::EnvelopeAttachment => &[Add, GetAll, Delete],
            Resource::EnvelopeNotification => &[Get, Update],
            Resource::EnvelopeEmailSetting => &[Get, Update],
            Resource::EnvelopeTransferRule => &[Create, GetAll, Update, Delete],
            Resource::BulkSend => &[Create, Get, GetAll, Update, Delete, Send],
            Resource::Brand => &[Create, Get, GetAll, Delete],
            Resource::User => &[Create, Get, GetAll, Update, Delete],
            Resource::Group => &[Create, Get, GetAll, Update, Delete, AddUsers],
            Resource::SigningGroup => &[Create, Get, GetAll, Update, Delete],
            Resource::Folder => &[GetAll, GetItems, MoveEnvelope],
            Resource::PowerForm => &[Create, Get, GetAll, Delete],
            Resource::ConnectConfig => &[Create, Get, GetAll, Update, Delete],
            Resource::ChunkedUpload => &[Initiate, UploadPart, Commit, Get, Delete],
            Resource::PermissionProfile => &[Create, Get, GetAll, Update, Delete],
            Resource::Contact => &[Create, Get, GetAll, Delete],
            Resource::CustomTab => &[Create, Get, GetAll, Update, Delete],
            Resource::Workspace => &[Create, Get, GetAll, Delete],
            Resource::Payment => &[CreateRequest, GetGatewayAccounts],
            Resource::Account => &[Get, GetSettings, UpdateSettings],
            Resource::Billing => &[GetPlan, GetInvoices],
        }
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.operations().contains(&operation)
    }

    /// Keys under which list responses for this resource nest their rows.
    /// More than one key means the rows are typed sub-collections that get
    /// flattened into one sequence.
    pub fn list_keys(&self) -> &'static [&'static str] {
        match self {
            Resource::Envelope => &["envelopes"],
            Resource::Template => &["envelopeTemplates"],
            Resource::Document => &["envelopeDocuments"],
            Resource::Recipient => RECIPIENT_KEYS,
            Resource::Tab => TAB_KEYS,
            Resource::EnvelopeCustomField | Resource::AccountCustomField => CUSTOM_FIELD_KEYS,
            Resource::EnvelopeAttachment => &["attachments"],
            Resource::EnvelopeTransferRule => &["envelopeTransferRules"],
            Resource::BulkSend => &["bulkListSummaries"],
            Resource::Brand => &["brands"],
            Resource::User => &["users"],
            Resource::Group => &["groups"],
            Resource::SigningGroup => &["groups", "signingGroups"],
            Resource::Folder => &["folders"],
            Resource::PowerForm => &["powerForms"],
            Resource::ConnectConfig => &["configurations"],
            Resource::PermissionProfile => &["permissionProfiles"],
            Resource::Contact => &["contacts"],
            Resource::CustomTab => &["tabs"],
            Resource::Workspace => &["workspaces"],
            Resource::Payment => &["paymentGatewayAccounts"],
            Resource::Billing => &["billingInvoices"],
            Resource::ChunkedUpload
            | Resource::EnvelopeLock
            | Resource::EnvelopeNotification
            | Resource::EnvelopeEmailSetting
            | Resource::Account => &[],
        }
    }
}

pub const RECIPIENT_KEYS: &[&str] = &[
    "signers",
    "carbonCopies",
    "certifiedDeliveries",
    "inPersonSigners",
    "agents",
    "editors",
    "intermediaries",
];

pub const TAB_KEYS: &[&str] = &[
    "signHereTabs",
    "initialHereTabs",
    "dateSignedTabs",
    "textTabs",
    "checkboxTabs",
    "fullNameTabs",
    "emailAddressTabs",
    "companyTabs",
    "titleTabs",
    "dateTabs",
    "numberTabs",
    "listTabs",
    "radioGroupTabs",
    "formulaTabs",
    "approveTabs",
    "declineTabs",
];

pub const CUSTOM_FIELD_KEYS: &[&str] = &["textCustomFields", "listCustomFields"];

/// Record field naming which sub-collection a flattened row came from.
pub fn collection_tag(key: &str) -> Option<(&'static str, String)> {
    if RECIPIENT_KEYS.contains(&key) {
        return Some(("recipientType", singular(key)));
    }
    if TAB_KEYS.contains(&key) {
        return Some(("tabType", key.trim_end_matches("Tabs").to_owned()));
    }
    if CUSTOM_FIELD_KEYS.contains(&key) {
        return Some(("fieldType", key.trim_end_matches("CustomFields").to_owned()));
    }
    None
}

fn singular(key: &str) -> String {
    match key {
        "carbonCopies" => "carbonCopy".to_owned(),
        "certifiedDeliveries" => "certifiedDelivery".to_owned(),
        other => other.trim_end_matches('s').to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for r in Resource::ALL {
            assert_eq!(r.as_str().parse::<Resource>(), Ok(*r));
        }
        for o in Operation::ALL {
            assert_eq!(o.as_str().parse::<Operation>(), Ok(*o));
        }
        assert!("Envelope".parse::<Resource>().is_err());
    }

    #[test]
    fn endpoint_table() {
        assert_eq!(Resource::Envelope.endpoint(), "envelopes");
        assert_eq!(Resource::BulkSend.endpoint(), "bulk_send_lists");
        assert_eq!(Resource::ConnectConfig.endpoint(), "connect");
        assert_eq!(Resource::Envelope.id_param(), Some("envelopeId"));
        assert_eq!(Resource::BulkSend.id_param(), Some("bulkSendListId"));
        assert_eq!(Resource::Account.id_param(), None);
    }

    #[test]
    fn every_resource_has_operations() {
        assert_eq!(Resource::ALL.len(), 28);
        for r in Resource::ALL {
            assert!(!r.operations().is_empty(), "{r} has no operations");
        }
        assert!(Resource::Envelope.supports(Operation::Void));
        assert!(!Resource::Brand.supports(Operation::Update));
    }

    #[test]
    fn collection_tags() {
        assert_eq!(
            collection_tag("carbonCopies"),
            Some(("recipientType", "carbonCopy".to_owned()))
        );
        assert_eq!(collection_tag("signers"), Some(("recipientType", "signer".to_owned())));
        assert_eq!(collection_tag("signHereTabs"), Some(("tabType", "signHere".to_owned())));
        assert_eq!(collection_tag("listCustomFields"), Some(("fieldType", "list".to_owned())));
        assert_eq!(collection_tag("envelopes"), None);
    }
}
