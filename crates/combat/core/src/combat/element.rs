//! Elemental attack/defense interaction.

/// Attack and defense element of a combatant or skill.
///
/// The advantage cycle runs Fire → Wind → Earth → Water → Fire; an
/// advantaged attack deals 130%, an opposed one 70%, anything else 100%.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    #[default]
    Neutral,
    Fire,
    Water,
    Earth,
    Wind,
}

impl Element {
    /// True when `self` sits directly before `other` in the advantage cycle.
    pub fn prevails_over(self, other: Element) -> bool {
        matches!(
            (self, other),
            (Element::Fire, Element::Wind)
                | (Element::Wind, Element::Earth)
                | (Element::Earth, Element::Water)
                | (Element::Water, Element::Fire)
        )
    }

    /// Integer percent modifier applied to the magnitude roll.
    pub fn attack_percent(self, defender: Element) -> u32 {
        if self.prevails_over(defender) {
            130
        } else if defender.prevails_over(self) {
            70
        } else {
            100
        }
    }
}
