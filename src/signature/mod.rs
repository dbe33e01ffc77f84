// letter-rendering-service/src/signature/mod.rs

mod directory;
mod layout;

pub use directory::OfficeSignerDirectory;
pub use layout::{
    compose_signatures, default_role_label, BlockKind, BlockPosition, DatePlacement,
    SignatureBlock, SignatureSection, SignerIdentity, BLANK_SIGNER_NAME,
};
