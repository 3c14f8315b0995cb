// Stock learning-module catalogue.

use crate::model::{HazardKind, LearningModule, Lesson, LessonKind, ModuleTab};

fn lesson(id: u32, title: &str, kind: LessonKind, duration: &str, completed: bool) -> Lesson {
    Lesson {
        id,
        title: title.to_owned(),
        kind,
        duration_label: duration.to_owned(),
        completed,
    }
}

#[allow(clippy::too_many_lines)]
pub fn stock_modules() -> Vec<LearningModule> {
    vec![
        LearningModule {
            id: 1,
            title: "Earthquake Safety".into(),
            description: "Learn how to stay safe during earthquakes, including Drop, Cover, and Hold On techniques.".into(),
            kind: HazardKind::Earthquake,
            duration_label: "45 min".into(),
            progress: 100,
            completed: true,
            locked: false,
            lessons: vec![
                lesson(1, "Introduction to Earthquakes", LessonKind::Video, "10 min", true),
                lesson(2, "Safety Protocols", LessonKind::Reading, "15 min", true),
                lesson(3, "Practice Quiz", LessonKind::Quiz, "20 min", true),
            ],
        },
        LearningModule {
            id: 2,
            title: "Fire Emergency Response".into(),
            description: "Essential knowledge for fire prevention and emergency evacuation procedures.".into(),
            kind: HazardKind::Fire,
            duration_label: "60 min".into(),
            progress: 75,
            completed: false,
            locked: false,
            lessons: vec![
                lesson(1, "Fire Prevention", LessonKind::Reading, "20 min", true),
                lesson(2, "Evacuation Procedures", LessonKind::Video, "25 min", true),
                lesson(3, "Fire Extinguisher Usage", LessonKind::Quiz, "15 min", false),
            ],
        },
        LearningModule {
            id: 3,
            title: "Flood Preparedness".into(),
            description: "How to prepare for, respond to, and recover from flood emergencies.".into(),
            kind: HazardKind::Flood,
            duration_label: "50 min".into(),
            progress: 30,
            completed: false,
            locked: false,
            lessons: vec![
                lesson(1, "Flood Risk Assessment", LessonKind::Video, "15 min", true),
                lesson(2, "Safety Measures", LessonKind::Reading, "20 min", false),
                lesson(3, "Emergency Kit Preparation", LessonKind::Quiz, "15 min", false),
            ],
        },
        LearningModule {
            id: 4,
            title: "First Aid Basics".into(),
            description: "Essential first aid skills for common injuries during disasters.".into(),
            kind: HazardKind::from("first-aid"),
            duration_label: "75 min".into(),
            progress: 0,
            completed: false,
            locked: true,
            lessons: Vec::new(),
        },
    ]
}

/// Modules shown under `tab`, in catalogue order.
pub fn modules_in(tab: ModuleTab) -> Vec<LearningModule> {
    stock_modules()
        .into_iter()
        .filter(|m| m.in_tab(tab))
        .collect()
}

pub fn find_module(query: &str) -> Option<LearningModule> {
    let query = query.trim();
    let by_id = query.parse::<u32>().ok();
    stock_modules()
        .into_iter()
        .find(|m| Some(m.id) == by_id || m.title.eq_ignore_ascii_case(query))
}
