use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction hand sizes move across a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    Up,
    Down,
    Both,
}

impl FromStr for Movement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Movement::Up),
            "down" => Ok(Movement::Down),
            "both" => Ok(Movement::Both),
            other => Err(format!("unknown movement '{other}'")),
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Movement::Up => "up",
            Movement::Down => "down",
            Movement::Both => "both",
        };
        f.write_str(label)
    }
}

/// Ordered hand sizes for every round of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSchedule {
    sizes: Vec<usize>,
}

impl RoundSchedule {
    pub fn new(movement: Movement, min_hand: usize, max_hand: usize) -> Self {
        let (low, high) = if min_hand <= max_hand {
            (min_hand, max_hand)
        } else {
            (max_hand, min_hand)
        };
        let mut sizes: Vec<usize> = (low..=high).collect();
        match movement {
            Movement::Up => {}
            Movement::Down => sizes.reverse(),
            Movement::Both => {
                let descent: Vec<usize> = sizes.iter().rev().skip(1).copied().collect();
                sizes.extend(descent);
            }
        }
        Self { sizes }
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn hand_size(&self, round_index: usize) -> Option<usize> {
        self.sizes.get(round_index).copied()
    }
}
