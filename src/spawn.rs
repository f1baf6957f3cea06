//! Word choice for new blocks.

use crate::config::WORDS;
use rand::Rng;

/// After this many non-target spawns in a row with no target on screen, the next
/// spawn is the target.
const MAX_DROUGHT: u32 = 3;

/// Decides which word the next block carries.
#[derive(Debug, Clone)]
pub struct WordPicker {
    target: &'static str,
    target_chance: f64,
    /// Consecutive non-target spawns while no target block was active.
    drought: u32,
}

impl WordPicker {
    pub fn new(target: &'static str, target_chance: f64) -> Self {
        Self {
            target,
            target_chance,
            drought: 0,
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Probability of picking the target for the next spawn.
    pub fn effective_chance(&self, target_on_screen: bool) -> f64 {
        if target_on_screen {
            self.target_chance
        } else if self.drought >= MAX_DROUGHT {
            1.0
        } else {
            (self.target_chance * 2.0).min(1.0)
        }
    }

    /// Weighted coin flip between the target and a distractor.
    pub fn pick(&mut self, target_on_screen: bool, rng: &mut impl Rng) -> &'static str {
        let chance = self.effective_chance(target_on_screen);
        if rng.random_bool(chance) {
            self.drought = 0;
            return self.target;
        }
        if !target_on_screen {
            self.drought += 1;
        }
        self.distractor(rng)
    }

    /// Uniform over the word list minus the target.
    pub fn distractor(&self, rng: &mut impl Rng) -> &'static str {
        let pool: Vec<&'static str> = WORDS.iter().copied().filter(|w| *w != self.target).collect();
        pool[rng.random_range(0..pool.len())]
    }
}

/// Uniformly random round target.
pub fn random_target(rng: &mut impl Rng) -> &'static str {
    WORDS[rng.random_range(0..WORDS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn distractor_never_equals_target() {
        let mut rng = StdRng::seed_from_u64(11);
        let picker = WordPicker::new("der", 0.3);
        for _ in 0..500 {
            assert_ne!(picker.distractor(&mut rng), "der");
        }
    }

    #[test]
    fn zero_chance_with_target_on_screen_never_picks_target() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut picker = WordPicker::new("und", 0.0);
        for _ in 0..200 {
            assert_ne!(picker.pick(true, &mut rng), "und");
        }
    }

    #[test]
    fn chance_is_boosted_without_target_on_screen() {
        let picker = WordPicker::new("und", 0.2);
        assert!((picker.effective_chance(true) - 0.2).abs() < 1e-9);
        assert!((picker.effective_chance(false) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn drought_forces_target() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut picker = WordPicker::new("und", 0.0);
        for _ in 0..MAX_DROUGHT {
            assert_ne!(picker.pick(false, &mut rng), "und");
        }
        assert_eq!(picker.pick(false, &mut rng), "und");
        // Streak resets after the target appears.
        assert_ne!(picker.pick(false, &mut rng), "und");
    }
}
