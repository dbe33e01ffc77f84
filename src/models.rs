// letter-rendering-service/src/models.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Submitted field values keyed by the name the resident's form used.
pub type SubmittedFields = BTreeMap<String, FieldValue>;

/// A single submitted value. Stored requests carry strings, numbers or booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Empty text, zero and `false` count as "no value" for binding purposes.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Flag(flag) => *flag,
            FieldValue::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
            FieldValue::Text(text) => !text.is_empty(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(flag) => write!(f, "{}", flag),
            FieldValue::Number(number) => write!(f, "{}", number),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Number,
    Date,
    Select,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "default_true")]
    pub show_in_document: bool,
}

fn default_true() -> bool {
    true
}

impl FieldDefinition {
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// Official whose signature block can appear on a letter.
///
/// Stored records use either the English role names or the Indonesian ones
/// the portal's forms emit (`kepala_desa`, `ketua_rt_3`, ...). Numbered roles
/// may carry their number as a suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignerRole {
    VillageHead,
    VillageSecretary,
    SubDistrictHead,
    PoliceChief,
    MilitaryCommander,
    NeighborhoodHead(Option<u32>),
    BlockHead(Option<u32>),
    Other(String),
}

const NEIGHBORHOOD_PREFIXES: [&str; 3] = ["neighborhood_head", "ketua_rt", "rt"];
const BLOCK_PREFIXES: [&str; 3] = ["block_head", "ketua_rw", "rw"];

fn numbered_suffix(role: &str, prefixes: &[&str]) -> Option<Option<u32>> {
    prefixes.iter().find_map(|prefix| {
        let rest = role.strip_prefix(prefix)?;
        let rest = rest.trim_start_matches('_');
        if rest.is_empty() {
            Some(None)
        } else {
            rest.parse::<u32>().ok().map(Some)
        }
    })
}

impl From<String> for SignerRole {
    fn from(raw: String) -> Self {
        let role = raw.trim().to_lowercase().replace(['-', ' '], "_");
        match role.as_str() {
            "village_head" | "kepala_desa" | "kades" => SignerRole::VillageHead,
            "village_secretary" | "sekretaris_desa" | "sekdes" => SignerRole::VillageSecretary,
            "sub_district_head" | "subdistrict_head" | "camat" => SignerRole::SubDistrictHead,
            "police_chief" | "kapolsek" => SignerRole::PoliceChief,
            "military_commander" | "danramil" => SignerRole::MilitaryCommander,
            _ => {
                if let Some(number) = numbered_suffix(&role, &NEIGHBORHOOD_PREFIXES) {
                    SignerRole::NeighborhoodHead(number)
                } else if let Some(number) = numbered_suffix(&role, &BLOCK_PREFIXES) {
                    SignerRole::BlockHead(number)
                } else {
                    SignerRole::Other(raw)
                }
            }
        }
    }
}

impl From<SignerRole> for String {
    fn from(role: SignerRole) -> Self {
        role.to_string()
    }
}

impl fmt::Display for SignerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerRole::VillageHead => f.write_str("village_head"),
            SignerRole::VillageSecretary => f.write_str("village_secretary"),
            SignerRole::SubDistrictHead => f.write_str("sub_district_head"),
            SignerRole::PoliceChief => f.write_str("police_chief"),
            SignerRole::MilitaryCommander => f.write_str("military_commander"),
            SignerRole::NeighborhoodHead(None) => f.write_str("neighborhood_head"),
            SignerRole::NeighborhoodHead(Some(n)) => write!(f, "neighborhood_head_{}", n),
            SignerRole::BlockHead(None) => f.write_str("block_head"),
            SignerRole::BlockHead(Some(n)) => write!(f, "block_head_{}", n),
            SignerRole::Other(role) => f.write_str(role),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignerPosition {
    #[serde(alias = "top_left")]
    TopLeft,
    #[serde(alias = "top_right")]
    TopRight,
    #[serde(alias = "bottom_left")]
    BottomLeft,
    #[serde(alias = "bottom_right")]
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerSpec {
    pub role: SignerRole,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub position: Option<SignerPosition>,
    #[serde(default)]
    pub number: Option<u32>,
}

impl SignerSpec {
    pub fn new(role: SignerRole, label: impl Into<String>) -> Self {
        Self {
            role,
            label: label.into(),
            position: None,
            number: None,
        }
    }

    pub fn at(mut self, position: SignerPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// RT/RW number, from the role suffix or the explicit `number` field.
    pub fn unit_number(&self) -> Option<u32> {
        match &self.role {
            SignerRole::NeighborhoodHead(Some(n)) | SignerRole::BlockHead(Some(n)) => Some(*n),
            _ => self.number,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureLayout {
    #[default]
    #[serde(alias = "single_right")]
    SingleRight,
    #[serde(alias = "two_horizontal")]
    TwoHorizontal,
    #[serde(alias = "three_horizontal")]
    ThreeHorizontal,
    #[serde(alias = "two_vertical")]
    TwoVertical,
    #[serde(rename = "grid-2x2", alias = "grid_2x2")]
    Grid2x2,
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    #[serde(alias = "a4")]
    A4,
    #[serde(alias = "legal", alias = "LEGAL")]
    Legal,
}

impl PaperSize {
    /// Page width and height in millimetres.
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            PaperSize::A4 => (210, 297),
            PaperSize::Legal => (216, 356),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterType {
    pub id: String,
    pub name: String,
    pub code: String,
    pub number_format_pattern: String,
    pub opening_sentence: String,
    pub body_template: String,
    pub fields: Vec<FieldDefinition>,
    pub signers: Vec<SignerSpec>,
    pub signature_layout: SignatureLayout,
    pub show_seal: bool,
    pub paper_size: PaperSize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Draft,
    PendingVerification,
    Verified,
    Approved,
    Rejected,
    RevisionRequested,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Draft => "draft",
            RequestStatus::PendingVerification => "pending_verification",
            RequestStatus::Verified => "verified",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::RevisionRequested => "revision_requested",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub letter_type_id: String,
    pub submitted_fields: SubmittedFields,
    pub status: RequestStatus,
    pub letter_date: Option<NaiveDate>,
    pub assigned_number: Option<String>,
    pub purpose: String,
    pub review_note: Option<String>,
}

/// Identity data of the issuing village office.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfficeConfig {
    pub village_name: String,
    pub district_name: String,
    pub regency_name: String,
    pub office_address: String,
    pub phone: String,
    pub email: String,
    pub postal_code: String,
    pub village_head_name: String,
    pub village_head_nip: String,
    pub village_secretary_name: String,
    pub village_secretary_nip: String,
    /// The secretary signs "a.n." (on behalf of) the village head.
    pub secretary_signs_on_behalf: bool,
    pub sub_district_head_name: String,
    pub police_chief_name: String,
    pub military_commander_name: String,
    pub neighborhood_heads: BTreeMap<u32, String>,
    pub block_heads: BTreeMap<u32, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_truthiness() {
        assert!(FieldValue::from("Bogor").is_truthy());
        assert!(!FieldValue::from("").is_truthy());
        assert!(!FieldValue::from(0i64).is_truthy());
        assert!(FieldValue::from(7i64).is_truthy());
        assert!(!FieldValue::from(false).is_truthy());
    }

    #[test]
    fn test_field_value_deserializes_untagged() {
        let fields: SubmittedFields =
            serde_json::from_str(r#"{"nama":"Siti","umur":31,"menikah":true}"#).unwrap();
        assert_eq!(fields["nama"], FieldValue::from("Siti"));
        assert_eq!(fields["umur"].to_string(), "31");
        assert_eq!(fields["menikah"], FieldValue::Flag(true));
    }

    #[test]
    fn test_signer_role_parsing() {
        assert_eq!(SignerRole::from("village_head".to_string()), SignerRole::VillageHead);
        assert_eq!(SignerRole::from("kepala_desa".to_string()), SignerRole::VillageHead);
        assert_eq!(SignerRole::from("sub-district_head".to_string()), SignerRole::SubDistrictHead);
        assert_eq!(
            SignerRole::from("neighborhood_head_3".to_string()),
            SignerRole::NeighborhoodHead(Some(3))
        );
        assert_eq!(SignerRole::from("ketua_rw".to_string()), SignerRole::BlockHead(None));
        assert_eq!(
            SignerRole::from("bendahara".to_string()),
            SignerRole::Other("bendahara".to_string())
        );
    }

    #[test]
    fn test_signer_unit_number_prefers_role_suffix() {
        let mut spec = SignerSpec::new(SignerRole::NeighborhoodHead(Some(4)), "Ketua RT");
        spec.number = Some(9);
        assert_eq!(spec.unit_number(), Some(4));

        let spec = SignerSpec {
            role: SignerRole::BlockHead(None),
            label: String::new(),
            position: None,
            number: Some(2),
        };
        assert_eq!(spec.unit_number(), Some(2));
    }

    #[test]
    fn test_layout_parsing_with_unknown_kind() {
        let layout: SignatureLayout = serde_json::from_str(r#""grid-2x2""#).unwrap();
        assert_eq!(layout, SignatureLayout::Grid2x2);
        let layout: SignatureLayout = serde_json::from_str(r#""two_vertical""#).unwrap();
        assert_eq!(layout, SignatureLayout::TwoVertical);
        let layout: SignatureLayout = serde_json::from_str(r#""diagonal""#).unwrap();
        assert_eq!(layout, SignatureLayout::Unrecognized);
    }

    #[test]
    fn test_status_display_matches_wire_name() {
        let status: RequestStatus = serde_json::from_str(r#""revision_requested""#).unwrap();
        assert_eq!(status.to_string(), "revision_requested");
    }
}
