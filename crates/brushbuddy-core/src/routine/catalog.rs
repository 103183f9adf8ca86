use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One timed segment of the routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Duration in seconds. Always greater than zero inside a catalog.
    pub duration_secs: u32,
    /// Opaque tag the presentation layer maps to an avatar image.
    pub visual_stage: u8,
}

impl StepDefinition {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        duration_secs: u32,
        visual_stage: u8,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            duration_secs,
            visual_stage,
        }
    }
}

/// Immutable, ordered list of steps. Order is execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StepCatalog {
    steps: Vec<StepDefinition>,
}

impl StepCatalog {
    /// Build a catalog, rejecting an empty list or any zero-length step.
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self, ValidationError> {
        if steps.is_empty() {
            return Err(ValidationError::EmptyCollection("step catalog".into()));
        }
        if let Some((index, _)) = steps.iter().enumerate().find(|(_, s)| s.duration_secs == 0) {
            return Err(ValidationError::InvalidValue {
                field: format!("steps[{index}].duration_secs"),
                message: "must be greater than zero".into(),
            });
        }
        Ok(Self { steps })
    }

    /// The hair-brushing routine: ends, middle, roots, then a final shine.
    pub fn brushing() -> Self {
        Self {
            steps: vec![
                StepDefinition::new(
                    "Start at the Ends",
                    "Gently brush the very bottom tips of your hair",
                    30,
                    1,
                ),
                StepDefinition::new(
                    "Move to the Middle",
                    "Brush starting from the middle down to the ends.",
                    30,
                    2,
                ),
                StepDefinition::new(
                    "From the Top",
                    "Now brush from the roots all the way down.",
                    30,
                    3,
                ),
                StepDefinition::new(
                    "Magic Shine",
                    "Smooth everything out to make it super shiny!",
                    20,
                    4,
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a constructed catalog; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.duration_secs)).sum()
    }
}

impl Default for StepCatalog {
    fn default() -> Self {
        Self::brushing()
    }
}

impl<'de> Deserialize<'de> for StepCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let steps = Vec::<StepDefinition>::deserialize(deserializer)?;
        StepCatalog::new(steps).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brushing_catalog_has_four_steps() {
        let c = StepCatalog::brushing();
        assert_eq!(c.len(), 4);
        let stages: Vec<u8> = c.iter().map(|s| s.visual_stage).collect();
        assert_eq!(stages, vec![1, 2, 3, 4]);
    }

    #[test]
    fn total_duration() {
        assert_eq!(StepCatalog::default().total_duration_secs(), 30 + 30 + 30 + 20);
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(
            StepCatalog::new(vec![]),
            Err(ValidationError::EmptyCollection(_))
        ));
    }

    #[test]
    fn rejects_zero_duration() {
        let err = StepCatalog::new(vec![
            StepDefinition::new("a", "", 10, 1),
            StepDefinition::new("b", "", 0, 2),
        ])
        .unwrap_err();
        match err {
            ValidationError::InvalidValue { field, .. } => {
                assert_eq!(field, "steps[1].duration_secs")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn deserialize_validates() {
        let bad = r#"[{"title":"x","duration_secs":0,"visual_stage":1}]"#;
        assert!(serde_json::from_str::<StepCatalog>(bad).is_err());

        let good = r#"[{"title":"x","duration_secs":5,"visual_stage":1}]"#;
        let c: StepCatalog = serde_json::from_str(good).unwrap();
        assert_eq!(c.get(0).map(|s| s.description.as_str()), Some(""));
    }
}
