// Telenode — Dice Orientation Classifier
//
// Maps a 3-axis gravity vector to the cube face pointing up.  A face change
// needs a clearly dominant axis: strong enough in absolute terms and leading
// the runner-up axis by a margin.  Anything less keeps the previous face, so
// readings near a 45° edge cannot flap between neighbours.

use crate::config::ClassifierConfig;
use crate::events::{Face, Vector3};

pub struct OrientationClassifier {
    config: ClassifierConfig,
    face: Face,
}

impl OrientationClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            face: Face::Unknown,
        }
    }

    pub fn face(&self) -> Face {
        self.face
    }

    /// Update with a new reading and return the current face code.
    pub fn feed_vector(&mut self, x: f32, y: f32, z: f32) -> u8 {
        if let Some(face) = self.classify(Vector3::new(x, y, z)) {
            if face != self.face {
                log::debug!("Orientation {:?} -> {:?}", self.face, face);
                self.face = face;
            }
        }

        self.face.code()
    }

    fn classify(&self, v: Vector3) -> Option<Face> {
        if !v.is_finite() {
            return None;
        }

        let mut axes = [
            (v.x, Face::XPositive, Face::XNegative),
            (v.y, Face::YPositive, Face::YNegative),
            (v.z, Face::ZPositive, Face::ZNegative),
        ];
        axes.sort_unstable_by(|a, b| b.0.abs().total_cmp(&a.0.abs()));

        let (value, positive, negative) = axes[0];
        let dominant = value.abs();
        let runner_up = axes[1].0.abs();

        if dominant < self.config.threshold || dominant - runner_up < self.config.hysteresis {
            return None;
        }

        Some(if value >= 0.0 { positive } else { negative })
    }
}

impl Default for OrientationClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown_and_stays_unknown_on_weak_input() {
        let mut dice = OrientationClassifier::default();
        assert_eq!(dice.face(), Face::Unknown);
        assert_eq!(dice.feed_vector(0.01, -0.02, 0.03), Face::Unknown.code());
    }

    #[test]
    fn dominant_axis_selects_face() {
        let mut dice = OrientationClassifier::default();
        let cases = [
            ((0.0, 0.0, 1.0), Face::ZPositive),
            ((0.0, 0.0, -1.0), Face::ZNegative),
            ((0.98, 0.1, 0.05), Face::XPositive),
            ((-0.98, 0.1, 0.05), Face::XNegative),
            ((0.1, 1.02, -0.1), Face::YPositive),
            ((0.1, -1.02, -0.1), Face::YNegative),
        ];
        for ((x, y, z), expected) in cases {
            assert_eq!(dice.feed_vector(x, y, z), expected.code());
            assert_eq!(dice.face(), expected);
        }
    }

    #[test]
    fn near_zero_vector_keeps_established_face() {
        let mut dice = OrientationClassifier::default();
        dice.feed_vector(0.0, 0.0, 1.0);
        // free fall
        assert_eq!(dice.feed_vector(0.0, 0.0, 0.0), Face::ZPositive.code());
        assert_eq!(dice.feed_vector(0.05, -0.03, 0.02), Face::ZPositive.code());
    }

    #[test]
    fn balanced_vector_does_not_flap() {
        let mut dice = OrientationClassifier::default();
        dice.feed_vector(1.0, 0.0, 0.0);

        // Tilted through the X/Y edge: stays on X until Y clearly leads.
        for (x, y) in [(0.75, 0.66), (0.70, 0.71), (0.66, 0.75), (0.70, 0.71)] {
            assert_eq!(dice.feed_vector(x, y, 0.0), Face::XPositive.code());
        }
        assert_eq!(dice.feed_vector(0.5, 0.86, 0.0), Face::YPositive.code());
        assert_eq!(dice.feed_vector(0.70, 0.71, 0.0), Face::YPositive.code());
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut dice = OrientationClassifier::default();
        dice.feed_vector(0.0, -1.0, 0.0);
        assert_eq!(dice.feed_vector(f32::NAN, 0.0, 1.0), Face::YNegative.code());
    }

    #[test]
    fn repeated_input_is_deterministic() {
        let mut a = OrientationClassifier::default();
        let mut b = OrientationClassifier::default();
        let samples = [(0.2, 0.1, 0.9), (0.6, 0.6, 0.1), (0.0, 0.0, 0.0), (-0.9, 0.3, 0.0)];
        for _ in 0..3 {
            for (x, y, z) in samples {
                assert_eq!(a.feed_vector(x, y, z), b.feed_vector(x, y, z));
            }
        }
    }

    #[test]
    fn custom_thresholds() {
        let mut dice = OrientationClassifier::new(ClassifierConfig {
            threshold: 0.9,
            hysteresis: 0.0,
        });
        assert_eq!(dice.feed_vector(0.0, 0.0, 0.8), Face::Unknown.code());
        assert_eq!(dice.feed_vector(0.0, 0.0, 0.95), Face::ZPositive.code());
    }
}
