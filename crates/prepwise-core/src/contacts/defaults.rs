// National emergency numbers (India) offered as seed contacts.

use crate::model::{ContactKind, ContactPatch};

struct Seed {
    name: &'static str,
    kind: ContactKind,
    phone: &'static str,
    address: &'static str,
    website: &'static str,
    notes: &'static str,
    favorite: bool,
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "Emergency Services",
        kind: ContactKind::Police,
        phone: "112",
        address: "",
        website: "112.gov.in",
        notes: "Single emergency number",
        favorite: true,
    },
    Seed {
        name: "Police Control Room",
        kind: ContactKind::Police,
        phone: "100",
        address: "Local Police Station",
        website: "incredibleindia.org",
        notes: "Dial emergency number for immediate assistance",
        favorite: true,
    },
    Seed {
        name: "Fire & Rescue",
        kind: ContactKind::Fire,
        phone: "101",
        address: "Nearest Fire Station",
        website: "incredibleindia.org",
        notes: "",
        favorite: true,
    },
    Seed {
        name: "Ambulance",
        kind: ContactKind::Ambulance,
        phone: "102",
        address: "Nearest Hospital",
        website: "incredibleindia.org",
        notes: "Provide location clearly when calling",
        favorite: true,
    },
    Seed {
        name: "Emergency Ambulance",
        kind: ContactKind::Ambulance,
        phone: "108",
        address: "",
        website: "incredibleindia.org",
        notes: "",
        favorite: false,
    },
    Seed {
        name: "Women Helpline",
        kind: ContactKind::Police,
        phone: "1091",
        address: "",
        website: "en.wikipedia.org",
        notes: "",
        favorite: false,
    },
    Seed {
        name: "Disaster Management Helpline",
        kind: ContactKind::DisasterManagement,
        phone: "1077",
        address: "",
        website: "",
        notes: "",
        favorite: false,
    },
    Seed {
        name: "Child Helpline",
        kind: ContactKind::Ngo,
        phone: "1098",
        address: "",
        website: "indianhelpline.com",
        notes: "",
        favorite: false,
    },
];

/// The seed list as full patches, in display order.
pub fn default_contacts() -> Vec<ContactPatch> {
    SEEDS
        .iter()
        .map(|s| ContactPatch {
            name: Some(s.name.to_owned()),
            kind: Some(s.kind),
            phone: Some(s.phone.to_owned()),
            email: Some(String::new()),
            address: Some(s.address.to_owned()),
            hours: Some("24x7".to_owned()),
            website: Some(s.website.to_owned()),
            notes: Some(s.notes.to_owned()),
            favorite: Some(s.favorite),
        })
        .collect()
}
