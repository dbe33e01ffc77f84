// letter-rendering-service/src/signature/layout.rs

use crate::models::{SignatureLayout, SignerPosition, SignerRole, SignerSpec};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Printed in place of a name nobody configured.
pub const BLANK_SIGNER_NAME: &str = "------------------------------";

/// Name and ID number of the official behind a signer slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerIdentity {
    pub name: String,
    pub id_number: Option<String>,
    /// "a.n." line printed above the label when signing for someone else.
    pub on_behalf_of: Option<String>,
    /// Replaces the letter type's label, e.g. for an unconfigured RT head.
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockPosition {
    Left,
    Center,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<SignerPosition> for BlockPosition {
    fn from(position: SignerPosition) -> Self {
        match position {
            SignerPosition::TopLeft => BlockPosition::TopLeft,
            SignerPosition::TopRight => BlockPosition::TopRight,
            SignerPosition::BottomLeft => BlockPosition::BottomLeft,
            SignerPosition::BottomRight => BlockPosition::BottomRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Signer,
    Seal,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub kind: BlockKind,
    pub role: Option<SignerRole>,
    pub label: String,
    pub name: String,
    pub id_number: Option<String>,
    pub on_behalf_of: Option<String>,
    pub position: BlockPosition,
    /// The date line is printed directly above this block.
    pub show_date: bool,
}

impl SignatureBlock {
    fn placeholder(kind: BlockKind, position: BlockPosition) -> Self {
        Self {
            kind,
            role: None,
            label: String::new(),
            name: String::new(),
            id_number: None,
            on_behalf_of: None,
            position,
            show_date: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePlacement {
    /// The block flagged `show_date` carries its own date line.
    WithFirstBlock,
    /// One date line centered above the whole section.
    Centered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSection {
    /// Layout actually used after fallbacks.
    pub layout: SignatureLayout,
    pub date_placement: DatePlacement,
    pub blocks: Vec<SignatureBlock>,
}

/// Title printed for a role when the letter type leaves the label empty.
pub fn default_role_label(spec: &SignerSpec) -> String {
    match &spec.role {
        SignerRole::VillageHead => "Kepala Desa".to_string(),
        SignerRole::VillageSecretary => "Sekretaris Desa".to_string(),
        SignerRole::SubDistrictHead => "Camat".to_string(),
        SignerRole::PoliceChief => "Kapolsek".to_string(),
        SignerRole::MilitaryCommander => "Danramil".to_string(),
        SignerRole::NeighborhoodHead(_) => numbered_label("Ketua RT", spec.unit_number()),
        SignerRole::BlockHead(_) => numbered_label("Ketua RW", spec.unit_number()),
        SignerRole::Other(role) => role.clone(),
    }
}

pub(crate) fn numbered_label(title: &str, number: Option<u32>) -> String {
    match number {
        Some(n) => format!("{} {:03}", title, n),
        None => title.to_string(),
    }
}

fn signer_block<F>(spec: &SignerSpec, position: BlockPosition, show_date: bool, resolve: &F) -> SignatureBlock
where
    F: Fn(&SignerSpec) -> SignerIdentity,
{
    let identity = resolve(spec);
    let label = match identity.label.filter(|label| !label.trim().is_empty()) {
        Some(label) => label,
        None if spec.label.trim().is_empty() => default_role_label(spec),
        None => spec.label.clone(),
    };
    let name = if identity.name.trim().is_empty() {
        BLANK_SIGNER_NAME.to_string()
    } else {
        identity.name
    };

    SignatureBlock {
        kind: BlockKind::Signer,
        role: Some(spec.role.clone()),
        label,
        name,
        id_number: identity.id_number.filter(|id| !id.trim().is_empty()),
        on_behalf_of: identity.on_behalf_of.filter(|line| !line.trim().is_empty()),
        position,
        show_date,
    }
}

/// Arranges the signer blocks of a letter.
///
/// A single signer always gets `single-right`, whatever layout was configured.
/// Layouts that are unrecognized fall back to `single-right` too. An empty
/// signer list is treated as a lone village head.
pub fn compose_signatures<F>(
    signers: &[SignerSpec],
    layout: SignatureLayout,
    show_seal: bool,
    resolve: F,
) -> SignatureSection
where
    F: Fn(&SignerSpec) -> SignerIdentity,
{
    let fallback;
    let signers = if signers.is_empty() {
        fallback = [SignerSpec::new(SignerRole::VillageHead, "")];
        &fallback[..]
    } else {
        signers
    };

    let layout = match layout {
        _ if signers.len() == 1 => SignatureLayout::SingleRight,
        SignatureLayout::Unrecognized => {
            warn!("Unknown signature layout, using single-right");
            SignatureLayout::SingleRight
        }
        other => other,
    };

    match layout {
        SignatureLayout::TwoHorizontal => SignatureSection {
            layout,
            date_placement: DatePlacement::Centered,
            blocks: vec![
                signer_block(&signers[0], BlockPosition::Left, false, &resolve),
                signer_block(&signers[1], BlockPosition::Right, false, &resolve),
            ],
        },
        SignatureLayout::ThreeHorizontal => {
            let middle = if show_seal {
                SignatureBlock::placeholder(BlockKind::Seal, BlockPosition::Center)
            } else {
                SignatureBlock::placeholder(BlockKind::Empty, BlockPosition::Center)
            };
            let right = signers.get(1).unwrap_or(&signers[0]);
            SignatureSection {
                layout,
                date_placement: DatePlacement::Centered,
                blocks: vec![
                    signer_block(&signers[0], BlockPosition::Left, false, &resolve),
                    middle,
                    signer_block(right, BlockPosition::Right, false, &resolve),
                ],
            }
        }
        SignatureLayout::TwoVertical => SignatureSection {
            layout,
            date_placement: DatePlacement::WithFirstBlock,
            blocks: vec![
                signer_block(&signers[0], BlockPosition::TopLeft, true, &resolve),
                signer_block(&signers[1], BlockPosition::BottomRight, false, &resolve),
            ],
        },
        SignatureLayout::Grid2x2 => {
            let blocks = [
                SignerPosition::TopLeft,
                SignerPosition::TopRight,
                SignerPosition::BottomLeft,
                SignerPosition::BottomRight,
            ]
            .into_iter()
            .map(|cell| {
                match signers.iter().find(|spec| spec.position == Some(cell)) {
                    Some(spec) => signer_block(spec, cell.into(), false, &resolve),
                    None => SignatureBlock::placeholder(BlockKind::Empty, cell.into()),
                }
            })
            .collect();
            SignatureSection {
                layout,
                date_placement: DatePlacement::Centered,
                blocks,
            }
        }
        SignatureLayout::SingleRight | SignatureLayout::Unrecognized => SignatureSection {
            layout: SignatureLayout::SingleRight,
            date_placement: DatePlacement::WithFirstBlock,
            blocks: vec![signer_block(&signers[0], BlockPosition::Right, true, &resolve)],
        },
    }
}
