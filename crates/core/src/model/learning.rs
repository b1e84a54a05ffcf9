use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LearningError {
    #[error("unknown learning section: {0}")]
    UnknownSection(String),
}

/// One block of static reading material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningSection {
    pub id: &'static str,
    pub title: &'static str,
    pub points: &'static [&'static str],
}

/// Tracks which sections a learner has opened.
///
/// `all_acknowledged` is the ready signal consumed by the module orchestrator.
#[derive(Debug, Clone)]
pub struct LearningChecklist {
    sections: &'static [LearningSection],
    acknowledged: BTreeSet<&'static str>,
}

impl LearningChecklist {
    #[must_use]
    pub fn new(sections: &'static [LearningSection]) -> Self {
        Self {
            sections,
            acknowledged: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn earthquake() -> Self {
        Self::new(EARTHQUAKE_SECTIONS)
    }

    #[must_use]
    pub fn sections(&self) -> &'static [LearningSection] {
        self.sections
    }

    /// Mark a section as read. Returns `true` the first time a section is marked.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::UnknownSection` for ids not in this checklist.
    pub fn acknowledge(&mut self, section_id: &str) -> Result<bool, LearningError> {
        let section = self
            .sections
            .iter()
            .find(|s| s.id == section_id)
            .ok_or_else(|| LearningError::UnknownSection(section_id.to_owned()))?;
        Ok(self.acknowledged.insert(section.id))
    }

    #[must_use]
    pub fn is_acknowledged(&self, section_id: &str) -> bool {
        self.acknowledged.contains(section_id)
    }

    #[must_use]
    pub fn acknowledged_count(&self) -> usize {
        self.acknowledged.len()
    }

    #[must_use]
    pub fn all_acknowledged(&self) -> bool {
        self.acknowledged.len() == self.sections.len()
    }
}

pub const EARTHQUAKE_SECTIONS: &[LearningSection] = &[
    LearningSection {
        id: "causes",
        title: "What Causes Earthquakes?",
        points: &[
            "Earthquakes are caused by the sudden release of energy in Earth's crust, creating seismic waves.",
            "The Earth's crust is made up of tectonic plates that slowly move and sometimes collide or slide past each other.",
            "When stress along fault lines exceeds the strength of rocks, it causes them to break and shift suddenly.",
            "Most earthquakes occur at plate boundaries, but they can also happen within plates at fault zones.",
            "The point inside the Earth where the earthquake starts is called the 'focus' or 'hypocenter'.",
            "The point directly above it on the surface is called the 'epicenter'.",
        ],
    },
    LearningSection {
        id: "measurement",
        title: "How We Measure Earthquakes",
        points: &[
            "Earthquakes are measured using seismographs, which detect and record ground motion.",
            "The Richter Scale measures the magnitude (energy released) from 1 to 10, with each number being 10 times stronger.",
            "The Moment Magnitude Scale (Mw) is more accurate for large earthquakes and measures the total energy released.",
            "Minor earthquakes: Magnitude 3.0-3.9 (often felt, rarely causes damage)",
            "Moderate earthquakes: Magnitude 4.0-4.9 (noticeable shaking, some damage)",
            "Strong earthquakes: Magnitude 5.0-5.9 (can cause damage to buildings)",
            "Major earthquakes: Magnitude 6.0-6.9 (serious damage in populated areas)",
            "Great earthquakes: Magnitude 7.0+ (widespread heavy damage and casualties)",
        ],
    },
    LearningSection {
        id: "before",
        title: "Safety Tips: Before an Earthquake",
        points: &[
            "Identify safe spots in each room: under sturdy tables, desks, or against interior walls.",
            "Practice 'Drop, Cover, and Hold On' drills with your family regularly.",
            "Secure heavy items like bookshelves, water heaters, and mirrors to walls.",
            "Keep emergency supplies ready: water (1 gallon per person per day for 3 days), food, first aid kit.",
            "Learn how to turn off gas, water, and electricity in case lines are damaged.",
            "Keep important documents in a waterproof, fireproof container.",
            "Develop a family communication plan with an out-of-state contact person.",
            "Consider earthquake insurance if you live in a high-risk area.",
        ],
    },
    LearningSection {
        id: "during",
        title: "Safety Tips: During an Earthquake",
        points: &[
            "DROP to your hands and knees before the earthquake knocks you down.",
            "COVER your head and neck under a sturdy table or desk. If no shelter, cover your head with your arms.",
            "HOLD ON to your shelter and be prepared to move with it until shaking stops.",
            "If indoors, stay inside! Don't run outside during shaking; most injuries occur when entering or leaving buildings.",
            "If in bed, stay there and cover your head with a pillow.",
            "If outdoors, move away from buildings, streetlights, and utility wires.",
            "If in a moving vehicle, stop as quickly and safely as possible and stay inside.",
            "If trapped under debris, don't light a match or move about, tap on a pipe or wall to alert rescuers.",
        ],
    },
    LearningSection {
        id: "after",
        title: "Safety Tips: After an Earthquake",
        points: &[
            "Expect aftershocks; they can occur for weeks or even months after the main quake.",
            "Check yourself and others for injuries. Provide first aid if needed.",
            "Inspect your home for damage. If it's unsafe, evacuate immediately.",
            "Check for gas leaks. If you smell gas, open windows and leave. Turn off gas at the meter if safe to do so.",
            "Check water, gas, and electrical lines. Turn off damaged utilities.",
            "Open cabinets cautiously as contents may have shifted and could fall out.",
            "Clean up spilled medicines, bleach, gasoline, or other flammable liquids immediately.",
            "Use your phone only for emergencies to keep lines clear for emergency calls.",
            "Stay out of damaged buildings and away from beaches; tsunamis may follow earthquakes.",
            "Listen to emergency broadcasts for updates and instructions.",
        ],
    },
];
