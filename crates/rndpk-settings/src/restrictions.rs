//! Generation restrictions
//!
//! Typed view over the `limit_pokemon` settings group: which entity
//! generations the randomizer may draw from, and whether evolutionary
//! relatives of allowed entities are pulled in as well.

use crate::derived::HIGHEST_GENERATION;

const GENERATIONS: usize = HIGHEST_GENERATION as usize;

/// Entity generations a run may use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenRestrictions {
    allowed: [bool; GENERATIONS],
    relatives: bool,
}

impl GenRestrictions {
    /// Create restrictions allowing nothing
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow one generation; out-of-range generations are ignored
    #[must_use]
    pub fn with_generation(mut self, generation: u8) -> Self {
        if let Some(slot) = Self::slot(generation) {
            self.allowed[slot] = true;
        }
        self
    }

    /// Pull in evolutionary relatives of allowed entities
    #[must_use]
    pub fn with_relatives(mut self, relatives: bool) -> Self {
        self.relatives = relatives;
        self
    }

    fn slot(generation: u8) -> Option<usize> {
        usize::from(generation)
            .checked_sub(1)
            .filter(|slot| *slot < GENERATIONS)
    }

    /// Check if `generation` is allowed
    #[inline]
    #[must_use]
    pub fn allows(&self, generation: u8) -> bool {
        Self::slot(generation).is_some_and(|slot| self.allowed[slot])
    }

    /// Check if relatives are pulled in
    #[inline]
    #[must_use]
    pub fn allows_relatives(&self) -> bool {
        self.relatives
    }

    /// Allowed generations, ascending
    pub fn generations(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=HIGHEST_GENERATION).filter(|generation| self.allows(*generation))
    }

    /// Check if no generation is allowed
    #[must_use]
    pub fn nothing_selected(&self) -> bool {
        !self.allowed.contains(&true)
    }

    /// Drop generations newer than an artifact of `generation` contains
    #[must_use]
    pub fn limit_to_gen(mut self, generation: u8) -> Self {
        for (slot, allowed) in self.allowed.iter_mut().enumerate() {
            if slot >= usize::from(generation) {
                *allowed = false;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_restrictions_select_nothing() {
        let r = GenRestrictions::new();
        assert!(r.nothing_selected());
        assert_eq!(r.generations().count(), 0);
    }

    #[test]
    fn generations_are_ascending() {
        let r = GenRestrictions::new().with_generation(3).with_generation(1);
        assert_eq!(r.generations().collect::<Vec<_>>(), vec![1, 3]);
        assert!(!r.allows(2));
    }

    #[test]
    fn out_of_range_generations_are_ignored() {
        let r = GenRestrictions::new().with_generation(0).with_generation(HIGHEST_GENERATION + 1);
        assert!(r.nothing_selected());
    }

    #[test]
    fn limit_drops_newer_generations() {
        let r = GenRestrictions::new()
            .with_generation(1)
            .with_generation(4)
            .with_relatives(true)
            .limit_to_gen(2);

        assert_eq!(r.generations().collect::<Vec<_>>(), vec![1]);
        assert!(r.allows_relatives());
        assert!(GenRestrictions::new().with_generation(3).limit_to_gen(2).nothing_selected());
    }
}
