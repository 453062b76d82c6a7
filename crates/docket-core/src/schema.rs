//! The fixed tax-notice field schema.
//!
//! Each slot names a source key in the analysis result and the metadata key its
//! extracted value is stored under. Adding a slot is a data change here, not a
//! structural change anywhere else.

/// Typed sub-value a field slot reads from the analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Boolean,
}

impl FieldKind {
    /// JSON key of the typed sub-value carrying this kind.
    #[must_use]
    pub const fn value_key(self) -> &'static str {
        match self {
            Self::Text => "valueString",
            Self::Number => "valueNumber",
            Self::Date => "valueDate",
            Self::Boolean => "valueBoolean",
        }
    }
}

/// One named slot in the fixed extraction schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Key under `result.contents[0].fields` in the analysis result.
    pub source: &'static str,
    /// Metadata key the extracted value is written under.
    pub metadata_key: &'static str,
    pub kind: FieldKind,
}

const fn field(source: &'static str, metadata_key: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        source,
        metadata_key,
        kind,
    }
}

/// The tax-notice schema, closed per deployment.
pub const NOTICE_FIELDS: &[FieldSpec] = &[
    field("taxpayer_name", "TaxpayerName", FieldKind::Text),
    field("tax_jurisdiction", "TaxJurisdiction", FieldKind::Text),
    field("notice_type", "NoticeType", FieldKind::Text),
    field("ein_tax_id", "EinTaxId", FieldKind::Text),
    field("total_amount_due", "TotalAmountDue", FieldKind::Number),
    field("filing_deadline", "FilingDeadline", FieldKind::Date),
    field("notice_number", "NoticeNumber", FieldKind::Text),
    field("notice_date", "NoticeDate", FieldKind::Date),
    field("taxpayer_address", "TaxpayerAddress", FieldKind::Text),
    field("tax_authority_address", "TaxAuthorityAddress", FieldKind::Text),
    field("tax_period", "TaxPeriod", FieldKind::Text),
    field("action_needed", "ActionNeeded", FieldKind::Text),
    field("payment_instructions", "PaymentInstructions", FieldKind::Text),
    field(
        "payment_interest_breakdown",
        "PaymentInterestBreakdown",
        FieldKind::Text,
    ),
    field(
        "assessment_code_or_form_number",
        "AssessmentCodeOrFormNumber",
        FieldKind::Text,
    ),
    field("tax_authority", "TaxAuthority", FieldKind::Text),
    field(
        "dispute_or_appeal_deadline",
        "DisputeOrAppealDeadline",
        FieldKind::Date,
    ),
    field(
        "payment_coupon_remittance_slip",
        "PaymentCouponRemittanceSlip",
        FieldKind::Boolean,
    ),
    field("description", "Description", FieldKind::Text),
    field("ein_tax_id_notes", "EinTaxIdNotes", FieldKind::Text),
    field("employee_id_number", "EmployeeIdNumber", FieldKind::Number),
    field("contact_phone_number", "ContactPhoneNumber", FieldKind::Text),
    field("contact_fax_number", "ContactFaxNumber", FieldKind::Text),
    field("contact_email_address", "ContactEmailAddress", FieldKind::Text),
];

/// Metadata keys written outside the field schema.
pub mod meta {
    pub const MESSAGE_ID: &str = "MessageId";
    pub const EMAIL_ID: &str = "EmailId";
    pub const STATUS: &str = "Status";

    /// Status value recorded on a fully processed document.
    pub const STATUS_PROCESSED: &str = "Processed";
}
