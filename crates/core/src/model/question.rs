use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,
    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },
    #[error("correct index {index} is out of range (0..{OPTION_COUNT})")]
    CorrectIndexOutOfRange { index: usize },
    #[error("question explanation cannot be empty")]
    EmptyExplanation,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("a question catalog needs at least one question")]
    Empty,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question. Immutable once built.
///
/// Deserializing goes through `Question::new`, so a decoded question is
/// always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord")]
pub struct Question {
    prompt: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
    explanation: String,
}

#[derive(Deserialize)]
struct QuestionRecord {
    prompt: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
    explanation: String,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        Question::new(
            record.prompt,
            record.options,
            record.correct_index,
            record.explanation,
        )
    }
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if any text is blank or `correct_index` is not
    /// a valid option position.
    pub fn new(
        prompt: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct_index: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let explanation = explanation.into();

        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        if correct_index >= OPTION_COUNT {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
            });
        }
        if explanation.trim().is_empty() {
            return Err(QuestionError::EmptyExplanation);
        }

        Ok(Self {
            prompt,
            options,
            correct_index,
            explanation,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Fixed, ordered set of questions for one module. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogRecord")]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct CatalogRecord {
    questions: Vec<Question>,
}

impl TryFrom<CatalogRecord> for QuestionCatalog {
    type Error = CatalogError;

    fn try_from(record: CatalogRecord) -> Result<Self, Self::Error> {
        QuestionCatalog::new(record.questions)
    }
}

impl QuestionCatalog {
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` when no questions are given.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { questions })
    }

    /// The ten-question earthquake safety quiz, in its canonical order.
    #[must_use]
    pub fn earthquake() -> Self {
        let questions = EARTHQUAKE_QUESTIONS
            .iter()
            .map(|seed| Question {
                prompt: seed.prompt.to_owned(),
                options: seed.options.map(str::to_owned),
                correct_index: seed.correct_index,
                explanation: seed.explanation.to_owned(),
            })
            .collect();
        Self { questions }
    }

    /// A reordered copy of this catalog. The original order is untouched.
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut questions = self.questions.clone();
        questions.shuffle(rng);
        Self { questions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed catalog; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

struct QuestionSeed {
    prompt: &'static str,
    options: [&'static str; OPTION_COUNT],
    correct_index: usize,
    explanation: &'static str,
}

const EARTHQUAKE_QUESTIONS: [QuestionSeed; 10] = [
    QuestionSeed {
        prompt: "What causes most earthquakes?",
        options: [
            "Volcanic eruptions",
            "Movement of tectonic plates",
            "Underground water pressure",
            "Human mining activities",
        ],
        correct_index: 1,
        explanation: "Most earthquakes are caused by the sudden movement of tectonic plates along fault lines, releasing built-up stress and energy.",
    },
    QuestionSeed {
        prompt: "What does the Richter Scale measure?",
        options: [
            "The duration of the earthquake",
            "The depth of the earthquake",
            "The magnitude (energy released) of the earthquake",
            "The number of aftershocks",
        ],
        correct_index: 2,
        explanation: "The Richter Scale measures the magnitude or amount of energy released by an earthquake, with each whole number increase representing 10 times more amplitude.",
    },
    QuestionSeed {
        prompt: "What is the 'epicenter' of an earthquake?",
        options: [
            "The deepest point underground where the earthquake starts",
            "The point on Earth's surface directly above where the earthquake starts",
            "The area with the most damage",
            "The location of the strongest aftershock",
        ],
        correct_index: 1,
        explanation: "The epicenter is the point on Earth's surface directly above the focus (hypocenter), which is where the earthquake actually begins underground.",
    },
    QuestionSeed {
        prompt: "During an earthquake, what should you do if you're indoors?",
        options: [
            "Run outside immediately",
            "Stand in a doorway",
            "Drop, Cover, and Hold On",
            "Open all windows and doors",
        ],
        correct_index: 2,
        explanation: "'Drop, Cover, and Hold On' is the safest action: drop to your hands and knees, take cover under sturdy furniture, and hold on until shaking stops.",
    },
    QuestionSeed {
        prompt: "What magnitude earthquake is considered 'major'?",
        options: ["3.0-3.9", "4.0-4.9", "5.0-5.9", "6.0-6.9"],
        correct_index: 3,
        explanation: "Earthquakes with magnitude 6.0-6.9 are classified as major and can cause serious damage in populated areas.",
    },
    QuestionSeed {
        prompt: "What should you check for first after an earthquake?",
        options: [
            "Broken windows",
            "Gas leaks",
            "Cracked walls",
            "Damaged furniture",
        ],
        correct_index: 1,
        explanation: "Gas leaks are the most dangerous immediate threat after an earthquake as they can cause fires and explosions. Check for gas smell and turn off gas if safe to do so.",
    },
    QuestionSeed {
        prompt: "What are aftershocks?",
        options: [
            "Smaller earthquakes that happen before the main quake",
            "Earthquakes that occur in different locations",
            "Smaller earthquakes that follow the main earthquake",
            "The psychological effects after an earthquake",
        ],
        correct_index: 2,
        explanation: "Aftershocks are smaller earthquakes that occur after the main earthquake in the same general area and can continue for weeks or months.",
    },
    QuestionSeed {
        prompt: "How much emergency water should you store per person?",
        options: [
            "1 liter per day for 1 day",
            "1 gallon per day for 3 days",
            "5 gallons per week",
            "Half a gallon per day for 1 week",
        ],
        correct_index: 1,
        explanation: "Emergency preparedness guidelines recommend storing at least 1 gallon of water per person per day for a minimum of 3 days.",
    },
    QuestionSeed {
        prompt: "If trapped under debris after an earthquake, what should you avoid?",
        options: [
            "Staying calm",
            "Tapping on pipes to signal rescuers",
            "Lighting a match",
            "Covering your mouth to reduce dust",
        ],
        correct_index: 2,
        explanation: "Never light a match when trapped as there may be gas leaks that could cause an explosion. Use tapping or your voice to signal rescuers instead.",
    },
    QuestionSeed {
        prompt: "What is the point inside Earth where an earthquake begins called?",
        options: [
            "Epicenter",
            "Focus or Hypocenter",
            "Fault line",
            "Tectonic point",
        ],
        correct_index: 1,
        explanation: "The focus (also called hypocenter) is the point inside Earth where the earthquake actually begins. The epicenter is directly above it on the surface.",
    },
];

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
