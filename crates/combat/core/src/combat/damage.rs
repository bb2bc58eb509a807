//! Resource deltas produced by one resolution.

/// HP/SP/MP deltas from a single skill resolution.
///
/// Components are always non-negative; whether they are applied as a
/// decrease (hits) or an increase (heals) is decided by the effect kind.
/// The zero value represents "no effect", e.g. a miss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Damage {
    pub hp: u32,
    pub sp: u32,
    pub mp: u32,
}

impl Damage {
    pub const NONE: Self = Self {
        hp: 0,
        sp: 0,
        mp: 0,
    };

    pub fn new(hp: u32, sp: u32, mp: u32) -> Self {
        Self { hp, sp, mp }
    }

    /// Pure HP damage.
    pub fn hp(amount: u32) -> Self {
        Self {
            hp: amount,
            ..Self::NONE
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}
