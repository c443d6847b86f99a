//! Value objects - immutable types defined by their attributes

pub mod dice;

pub use dice::{
    roll_damage, ActionRoll, ActionRollResult, DamageDie, DamageModifier, DamageRoll, DiceError,
    DiceFormula, DiceRollResult,
};
