//! Hand-landmark snapshots and the stateless gesture classifier.
//!
//! A [`GestureSnapshot`] is one detector frame: up to two hands, each with
//! 21 landmarks in the detector's normalized image space (`x`, `y` in
//! `0.0..=1.0` with `y` growing downward, `z` smaller = nearer the camera).
//!
//! [`classify`] maps a snapshot to at most one technique.  It keeps no
//! memory between frames; combo tracking and the cooldown latch live in the
//! controller.
//!
//! ## Decision table (first match wins)
//!
//! | Hands | Condition | Technique |
//! |---|---|---|
//! | 2 | middle-finger bases closer than 0.15 | purple |
//! | 2 | both wrists above y = 0.4 | infinity |
//! | 2 | wrists farther than 0.7 apart, both above y = 0.5 | domain |
//! | 1 | index tip more than 0.1 nearer than wrist, Left hand | blue |
//! | 1 | same, Right hand | red |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::technique::TechniqueId;

/// Landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:       usize = 0;
pub const INDEX_TIP:   usize = 8;
pub const MIDDLE_BASE: usize = 9;

// Calibrated against the detector's normalized coordinates.
const HANDS_TOGETHER_DIST: f32 = 0.15;
const BOTH_RAISED_Y:       f32 = 0.4;
const WIDE_APART_DIST:     f32 = 0.7;
const WIDE_RAISED_Y:       f32 = 0.5;
const POINT_FORWARD_DEPTH: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// Snapshot types
// ════════════════════════════════════════════════════════════════════════════

/// One normalized landmark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// Distance in the image plane, ignoring depth.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Handedness label reported by the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// A detected hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub handedness: Handedness,
    pub landmarks:  [Landmark; LANDMARK_COUNT],
}

impl Hand {
    pub fn new(handedness: Handedness, landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Hand { handedness, landmarks }
    }

    /// Hand with every landmark at the same point.  Mostly useful as a base
    /// for [`Hand::with_landmark`].
    pub fn uniform(handedness: Handedness, at: Landmark) -> Self {
        Hand { handedness, landmarks: [at; LANDMARK_COUNT] }
    }

    /// Replace landmark `index`, builder style.  Out-of-range indices are
    /// ignored.
    pub fn with_landmark(mut self, index: usize, at: Landmark) -> Self {
        if let Some(slot) = self.landmarks.get_mut(index) {
            *slot = at;
        }
        self
    }

    pub fn wrist(&self) -> &Landmark { &self.landmarks[WRIST] }
    pub fn index_tip(&self) -> &Landmark { &self.landmarks[INDEX_TIP] }
    pub fn middle_base(&self) -> &Landmark { &self.landmarks[MIDDLE_BASE] }
}

/// One detector frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureSnapshot {
    #[serde(default)]
    pub hands: Vec<Hand>,
}

impl GestureSnapshot {
    pub fn empty() -> Self { Self::default() }

    pub fn one(hand: Hand) -> Self {
        GestureSnapshot { hands: vec![hand] }
    }

    pub fn two(first: Hand, second: Hand) -> Self {
        GestureSnapshot { hands: vec![first, second] }
    }

    pub fn is_empty(&self) -> bool { self.hands.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier
// ════════════════════════════════════════════════════════════════════════════

/// Classify one frame.  Deterministic and side-effect free apart from a
/// debug trace.
pub fn classify(snapshot: &GestureSnapshot) -> Option<TechniqueId> {
    let detected = match snapshot.hands.as_slice() {
        [a, b] => classify_two_hands(a, b),
        [hand] => classify_one_hand(hand),
        _ => None,
    };
    debug!(hands = snapshot.hands.len(), ?detected, "classified frame");
    detected
}

// Every two-hand rule is symmetric, so detection order does not matter.
fn classify_two_hands(a: &Hand, b: &Hand) -> Option<TechniqueId> {
    if a.middle_base().planar_distance(b.middle_base()) < HANDS_TOGETHER_DIST {
        return Some(TechniqueId::Purple);
    }

    let (wa, wb) = (a.wrist(), b.wrist());
    if wa.y < BOTH_RAISED_Y && wb.y < BOTH_RAISED_Y {
        return Some(TechniqueId::Infinity);
    }

    if wa.planar_distance(wb) > WIDE_APART_DIST && wa.y < WIDE_RAISED_Y && wb.y < WIDE_RAISED_Y {
        return Some(TechniqueId::Domain);
    }

    None
}

fn classify_one_hand(hand: &Hand) -> Option<TechniqueId> {
    if hand.index_tip().z < hand.wrist().z - POINT_FORWARD_DEPTH {
        return Some(match hand.handedness {
            Handedness::Left  => TechniqueId::Blue,
            Handedness::Right => TechniqueId::Red,
        });
    }
    None
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn resting(handedness: Handedness, x: f32) -> Hand {
        Hand::uniform(handedness, Landmark::new(x, 0.8, 0.0))
    }

    #[test]
    fn empty_frame_is_nothing() {
        assert_eq!(classify(&GestureSnapshot::empty()), None);
    }

    #[test]
    fn hands_together_is_purple_regardless_of_wrists() {
        // Wrists raised high and far apart would also satisfy infinity and
        // domain; purple must still win.
        let left = resting(Handedness::Left, 0.1)
            .with_landmark(WRIST, Landmark::new(0.0, 0.1, 0.0))
            .with_landmark(MIDDLE_BASE, Landmark::new(0.45, 0.5, 0.0));
        let right = resting(Handedness::Right, 0.9)
            .with_landmark(WRIST, Landmark::new(1.0, 0.1, 0.0))
            .with_landmark(MIDDLE_BASE, Landmark::new(0.55, 0.5, 0.0));
        assert_eq!(classify(&GestureSnapshot::two(left, right)), Some(TechniqueId::Purple));
    }

    #[test]
    fn both_raised_is_infinity() {
        let left = resting(Handedness::Left, 0.3)
            .with_landmark(WRIST, Landmark::new(0.3, 0.35, 0.0));
        let right = resting(Handedness::Right, 0.7)
            .with_landmark(WRIST, Landmark::new(0.7, 0.2, 0.0));
        assert_eq!(classify(&GestureSnapshot::two(left, right)), Some(TechniqueId::Infinity));
    }

    #[test]
    fn wide_and_raised_is_domain() {
        let left = resting(Handedness::Left, 0.05)
            .with_landmark(WRIST, Landmark::new(0.05, 0.45, 0.0));
        let right = resting(Handedness::Right, 0.95)
            .with_landmark(WRIST, Landmark::new(0.95, 0.45, 0.0));
        assert_eq!(classify(&GestureSnapshot::two(left, right)), Some(TechniqueId::Domain));
    }

    #[test]
    fn wide_but_low_is_nothing() {
        let left = resting(Handedness::Left, 0.05);
        let right = resting(Handedness::Right, 0.95);
        assert_eq!(classify(&GestureSnapshot::two(left, right)), None);
    }

    #[test]
    fn two_hand_rules_ignore_order() {
        let left = resting(Handedness::Left, 0.3)
            .with_landmark(WRIST, Landmark::new(0.3, 0.3, 0.0));
        let right = resting(Handedness::Right, 0.7)
            .with_landmark(WRIST, Landmark::new(0.7, 0.3, 0.0));
        assert_eq!(
            classify(&GestureSnapshot::two(left.clone(), right.clone())),
            classify(&GestureSnapshot::two(right, left)),
        );
    }

    #[test]
    fn right_hand_pointing_is_red() {
        let hand = resting(Handedness::Right, 0.5)
            .with_landmark(WRIST, Landmark::new(0.5, 0.6, 0.0))
            .with_landmark(INDEX_TIP, Landmark::new(0.5, 0.4, -0.2));
        assert_eq!(classify(&GestureSnapshot::one(hand)), Some(TechniqueId::Red));
    }

    #[test]
    fn left_hand_pointing_is_blue() {
        let hand = resting(Handedness::Left, 0.5)
            .with_landmark(INDEX_TIP, Landmark::new(0.5, 0.4, -0.25));
        assert_eq!(classify(&GestureSnapshot::one(hand)), Some(TechniqueId::Blue));
    }

    #[test]
    fn shallow_point_is_nothing() {
        let hand = resting(Handedness::Left, 0.5)
            .with_landmark(INDEX_TIP, Landmark::new(0.5, 0.4, -0.05));
        assert_eq!(classify(&GestureSnapshot::one(hand)), None);
    }

    #[test]
    fn three_hands_is_nothing() {
        let h = resting(Handedness::Left, 0.5);
        let snap = GestureSnapshot { hands: vec![h.clone(), h.clone(), h] };
        assert_eq!(classify(&snap), None);
    }

    #[test]
    fn classify_is_repeatable() {
        let hand = resting(Handedness::Right, 0.5)
            .with_landmark(INDEX_TIP, Landmark::new(0.5, 0.4, -0.3));
        let snap = GestureSnapshot::one(hand);
        for _ in 0..5 {
            assert_eq!(classify(&snap), Some(TechniqueId::Red));
        }
    }

    #[test]
    fn snapshot_from_detector_json() {
        let point = r#"{"x":0.5,"y":0.6}"#;
        let landmarks = vec![point; LANDMARK_COUNT].join(",");
        let json = format!(r#"{{"hands":[{{"handedness":"Left","landmarks":[{landmarks}]}}]}}"#);
        let snap: GestureSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap.hands.len(), 1);
        assert_eq!(snap.hands[0].wrist().z, 0.0);
        assert!(serde_json::from_str::<GestureSnapshot>(r#"{"hands":[{"handedness":"Left","landmarks":[]}]}"#).is_err());
        assert!(serde_json::from_str::<GestureSnapshot>("{}").unwrap().is_empty());
    }

    #[test]
    fn with_landmark_ignores_out_of_range() {
        let h = resting(Handedness::Left, 0.5).with_landmark(99, Landmark::new(0.0, 0.0, 0.0));
        assert_eq!(h, resting(Handedness::Left, 0.5));
    }
}
