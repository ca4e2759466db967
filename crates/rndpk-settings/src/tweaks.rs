//! Miscellaneous tweaks
//!
//! Small one-off patches stored together as a bitmask in the
//! [`ids::MISC_TWEAKS`](crate::schema::ids::MISC_TWEAKS) setting. Which of
//! them apply depends on the loaded artifact.

/// A single patch and its bit in the tweak mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MiscTweak {
    /// Stable name
    pub name: &'static str,
    /// Bit in the tweak mask
    pub value: i32,
    /// One-line description
    pub description: &'static str,
}

impl MiscTweak {
    const fn new(bit: u32, name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            value: 1 << bit,
            description,
        }
    }

    /// Check whether the tweak bit is set in a mask
    #[inline]
    #[must_use]
    pub const fn is_set(&self, mask: i32) -> bool {
        mask & self.value == self.value
    }

    /// Look up a tweak by name
    #[must_use]
    pub fn by_name(name: &str) -> Option<&'static MiscTweak> {
        ALL_TWEAKS.iter().find(|t| t.name == name)
    }

    /// Tweaks whose bit is set in an availability mask
    pub fn available_in(mask: i32) -> impl Iterator<Item = &'static MiscTweak> {
        ALL_TWEAKS.iter().filter(move |t| mask & t.value != 0)
    }
}

/// Every known tweak, in bit order
pub static ALL_TWEAKS: &[MiscTweak] = &[
    MiscTweak::new(0, "bw_exp_patch", "Use the scaled experience formula of later generations"),
    MiscTweak::new(1, "nerf_x_accuracy", "X Accuracy no longer guarantees hits against OHKO moves"),
    MiscTweak::new(2, "fix_crit_rate", "Critical hit rate no longer depends on base speed"),
    MiscTweak::new(3, "give_national_dex", "Start the game with the National Dex"),
    MiscTweak::new(4, "update_type_effectiveness", "Use the type chart of later generations"),
    MiscTweak::new(5, "lower_case_names", "Display species names in mixed case"),
    MiscTweak::new(6, "randomize_catching_tutorial", "Randomize the species in the catching tutorial"),
    MiscTweak::new(7, "ban_lucky_egg", "Remove the Lucky Egg from wild held items"),
    MiscTweak::new(8, "no_free_lucky_egg", "Remove the Lucky Egg given away in the story"),
    MiscTweak::new(9, "ban_big_money_items", "Replace items that only sell for money"),
    MiscTweak::new(10, "run_without_running_shoes", "Allow running before getting the Running Shoes"),
    MiscTweak::new(11, "fastest_text", "Default text speed is instant"),
    MiscTweak::new(12, "balance_static_levels", "Scale static encounter levels to the story"),
    MiscTweak::new(13, "retain_alt_formes", "Keep alternate formes when randomizing"),
];

/// Mask with every known tweak bit set
pub const ALL_TWEAKS_MASK: i32 = (1 << 14) - 1;
