// letter-rendering-service/src/signature/directory.rs

use crate::models::{OfficeConfig, SignerRole, SignerSpec};
use crate::signature::layout::{numbered_label, SignerIdentity};
use std::collections::BTreeMap;

/// Looks up signer names and NIPs in the office configuration.
pub struct OfficeSignerDirectory<'a> {
    office: &'a OfficeConfig,
}

impl<'a> OfficeSignerDirectory<'a> {
    pub fn new(office: &'a OfficeConfig) -> Self {
        Self { office }
    }

    pub fn resolve(&self, spec: &SignerSpec) -> SignerIdentity {
        let office = self.office;
        match &spec.role {
            SignerRole::VillageHead => with_nip(&office.village_head_name, &office.village_head_nip),
            SignerRole::VillageSecretary => {
                let mut identity =
                    with_nip(&office.village_secretary_name, &office.village_secretary_nip);
                if office.secretary_signs_on_behalf {
                    identity.on_behalf_of = Some(
                        format!("a.n. Kepala Desa {}", office.village_name)
                            .trim_end()
                            .to_string(),
                    );
                }
                identity
            }
            SignerRole::SubDistrictHead => name_only(&office.sub_district_head_name),
            SignerRole::PoliceChief => name_only(&office.police_chief_name),
            SignerRole::MilitaryCommander => name_only(&office.military_commander_name),
            SignerRole::NeighborhoodHead(_) => numbered(&office.neighborhood_heads, "Ketua RT", spec),
            SignerRole::BlockHead(_) => numbered(&office.block_heads, "Ketua RW", spec),
            SignerRole::Other(_) => SignerIdentity::default(),
        }
    }
}

fn with_nip(name: &str, nip: &str) -> SignerIdentity {
    SignerIdentity {
        name: name.trim().to_string(),
        id_number: Some(nip.trim().to_string()).filter(|nip| !nip.is_empty()),
        ..SignerIdentity::default()
    }
}

fn name_only(name: &str) -> SignerIdentity {
    SignerIdentity {
        name: name.trim().to_string(),
        ..SignerIdentity::default()
    }
}

/// RT/RW head by unit number. Unconfigured heads keep a blank name but get
/// the generic numbered title in place of the letter type's label.
fn numbered(heads: &BTreeMap<u32, String>, title: &str, spec: &SignerSpec) -> SignerIdentity {
    let number = spec.unit_number();
    match number.and_then(|n| heads.get(&n)).filter(|name| !name.trim().is_empty()) {
        Some(name) => name_only(name),
        None => SignerIdentity {
            label: Some(numbered_label(title, number)),
            ..SignerIdentity::default()
        },
    }
}
