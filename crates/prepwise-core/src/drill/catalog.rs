// Stock drills shipped with the client.

use crate::model::{Difficulty, Drill, HazardKind};

fn drill(
    id: u32,
    title: &str,
    description: &str,
    kind: HazardKind,
    difficulty: Difficulty,
    duration_label: &str,
    steps: [&str; 5],
) -> Drill {
    Drill {
        id,
        title: title.to_owned(),
        description: description.to_owned(),
        kind,
        difficulty,
        duration_label: duration_label.to_owned(),
        steps: steps.iter().map(|s| (*s).to_owned()).collect(),
        completed: false,
        score: None,
    }
}

pub fn stock_drills() -> Vec<Drill> {
    let mut earthquake = drill(
        1,
        "Earthquake Evacuation Drill",
        "Simulate an earthquake scenario and practice evacuation procedures",
        HazardKind::Earthquake,
        Difficulty::Beginner,
        "10 min",
        [
            "Drop down onto your hands and knees",
            "Cover your head and neck under a sturdy table",
            "Hold on until shaking stops",
            "Evacuate to designated safe zone",
            "Account for all personnel",
        ],
    );
    earthquake.completed = true;
    earthquake.score = Some(95);

    vec![
        earthquake,
        drill(
            2,
            "Fire Emergency Drill",
            "Practice fire evacuation and use of fire extinguishers",
            HazardKind::Fire,
            Difficulty::Intermediate,
            "15 min",
            [
                "Activate nearest fire alarm",
                "Evacuate using nearest exit",
                "Meet at assembly point",
                "Practice fire extinguisher use",
                "Conduct head count",
            ],
        ),
        drill(
            3,
            "Flood Response Drill",
            "Learn flood response procedures and safe evacuation routes",
            HazardKind::Flood,
            Difficulty::Advanced,
            "20 min",
            [
                "Monitor water levels",
                "Move to higher ground",
                "Avoid walking through floodwaters",
                "Use designated evacuation routes",
                "Account for all individuals",
            ],
        ),
    ]
}

/// Look up a stock drill by id or case-insensitive title.
pub fn find_drill(query: &str) -> Option<Drill> {
    let query = query.trim();
    let by_id = query.parse::<u32>().ok();
    stock_drills()
        .into_iter()
        .find(|d| Some(d.id) == by_id || d.title.eq_ignore_ascii_case(query))
}
