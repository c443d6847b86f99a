//! Tabletop dice: damage dice, action rolls and free-form formulas.
//!
//! Supports formulas like "1d20+5", "2d6-1", "d100". Every roll goes through
//! [`RandomSource`] so results can be scripted in tests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::random::RandomSource;

/// Most dice a single roll may throw.
pub const MAX_DICE: u32 = 100;
/// Largest die a formula may name.
pub const MAX_SIDES: u32 = 100;
/// Largest flat modifier, either sign.
pub const MAX_MODIFIER: i32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Empty dice formula")]
    Empty,
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    #[error("You can roll between 1 and {MAX_DICE} dice.")]
    InvalidDiceCount,
    #[error("Dice must have between 2 and {MAX_SIDES} sides.")]
    InvalidDieSize,
    #[error("Modifiers must be between -{MAX_MODIFIER} and +{MAX_MODIFIER}.")]
    InvalidModifier,
    #[error("Choose from: d4, d6, d8, d10, d12.")]
    InvalidDamageDie,
    #[error("Choose from: normal (default), res (resistance), vul (vulnerable).")]
    InvalidDamageModifier,
    #[error("Choose from: norm (Normal), adv (Advantage), dadv (Disadvantage), perc (Percentile).")]
    InvalidActionRoll,
}

// =============================================================================
// Formula rolls
// =============================================================================

/// A parsed dice formula like "2d6+3"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceFormula {
    /// Number of dice to roll (X in XdY)
    pub dice_count: u32,
    /// Size of each die (Y in XdY)
    pub die_size: u32,
    /// Added after rolling (+Z or -Z)
    pub modifier: i32,
}

impl DiceFormula {
    pub fn new(dice_count: u32, die_size: u32, modifier: i32) -> Result<Self, DiceError> {
        if !(1..=MAX_DICE).contains(&dice_count) {
            return Err(DiceError::InvalidDiceCount);
        }
        if !(2..=MAX_SIDES).contains(&die_size) {
            return Err(DiceError::InvalidDieSize);
        }
        if !(-MAX_MODIFIER..=MAX_MODIFIER).contains(&modifier) {
            return Err(DiceError::InvalidModifier);
        }
        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// Parse "XdY", "XdY+Z", "XdY-Z" or the "dY" shorthand.
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(DiceError::Empty);
        }

        let d_pos = input.find('d').ok_or_else(|| {
            DiceError::InvalidFormat(format!("Missing 'd' separator in '{}'", input))
        })?;

        let count_str = &input[..d_pos];
        let dice_count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str.parse().map_err(|_| {
                DiceError::InvalidFormat(format!("Invalid dice count: '{}'", count_str))
            })?
        };

        let after_d = &input[d_pos + 1..];
        let (size_str, modifier) = if let Some(plus_pos) = after_d.find('+') {
            let mod_str = &after_d[plus_pos + 1..];
            (&after_d[..plus_pos], parse_modifier(mod_str, '+')?)
        } else if let Some(minus_pos) = after_d.rfind('-') {
            if minus_pos == 0 {
                return Err(DiceError::InvalidFormat(format!(
                    "Invalid die size: '{}'",
                    after_d
                )));
            }
            let mod_str = &after_d[minus_pos + 1..];
            (&after_d[..minus_pos], -parse_modifier(mod_str, '-')?)
        } else {
            (after_d, 0)
        };

        let die_size: u32 = size_str
            .trim()
            .parse()
            .map_err(|_| DiceError::InvalidFormat(format!("Invalid die size: '{}'", size_str)))?;

        Self::new(dice_count, die_size, modifier)
    }

    pub fn roll(&self, rng: &dyn RandomSource) -> DiceRollResult {
        let rolls = roll_dice(self.dice_count, self.die_size, rng);
        let dice_total: i32 = rolls.iter().sum();
        DiceRollResult {
            formula: *self,
            // deserialized formulas bypass the range check in `new`
            total: dice_total.saturating_add(self.modifier),
            individual_rolls: rolls,
            dice_total,
        }
    }

    pub fn min_roll(&self) -> i32 {
        (self.dice_count as i32).saturating_add(self.modifier)
    }

    pub fn max_roll(&self) -> i32 {
        (self.dice_count.saturating_mul(self.die_size) as i32).saturating_add(self.modifier)
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            0 => write!(f, "{}d{}", self.dice_count, self.die_size),
            m if m > 0 => write!(f, "{}d{}+{}", self.dice_count, self.die_size, m),
            m => write!(f, "{}d{}{}", self.dice_count, self.die_size, m),
        }
    }
}

impl FromStr for DiceFormula {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unsigned digits after a `+`/`-` sign. Values too large for `i32` saturate
/// so [`DiceFormula::new`] rejects them as out of range.
fn parse_modifier(digits: &str, sign: char) -> Result<i32, DiceError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DiceError::InvalidFormat(format!(
            "Invalid modifier: '{sign}{digits}'"
        )));
    }
    Ok(digits.parse::<i32>().unwrap_or(i32::MAX))
}

fn roll_dice(count: u32, sides: u32, rng: &dyn RandomSource) -> Vec<i32> {
    let sides = i32::try_from(sides).unwrap_or(i32::MAX);
    (0..count).map(|_| rng.gen_range(1, sides)).collect()
}

/// Result of rolling a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRollResult {
    pub formula: DiceFormula,
    pub individual_rolls: Vec<i32>,
    /// Sum of dice before modifier
    pub dice_total: i32,
    pub total: i32,
}

impl DiceRollResult {
    /// Format as a breakdown string (e.g., "2d6[4, 5] + 3 = 12")
    pub fn breakdown(&self) -> String {
        let rolls: Vec<String> = self.individual_rolls.iter().map(i32::to_string).collect();
        let dice = format!(
            "{}d{}[{}]",
            self.formula.dice_count,
            self.formula.die_size,
            rolls.join(", ")
        );
        match self.formula.modifier {
            0 => format!("{} = {}", dice, self.total),
            m if m > 0 => format!("{} + {} = {}", dice, m, self.total),
            m => format!("{} - {} = {}", dice, -m, self.total),
        }
    }
}

// =============================================================================
// Damage rolls
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageDie {
    D4,
    D6,
    D8,
    D10,
    D12,
}

impl DamageDie {
    pub fn sides(self) -> u32 {
        match self {
            DamageDie::D4 => 4,
            DamageDie::D6 => 6,
            DamageDie::D8 => 8,
            DamageDie::D10 => 10,
            DamageDie::D12 => 12,
        }
    }
}

impl FromStr for DamageDie {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d4" => Ok(DamageDie::D4),
            "d6" => Ok(DamageDie::D6),
            "d8" => Ok(DamageDie::D8),
            "d10" => Ok(DamageDie::D10),
            "d12" => Ok(DamageDie::D12),
            _ => Err(DiceError::InvalidDamageDie),
        }
    }
}

impl fmt::Display for DamageDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Resistance halves (rounding down), vulnerability doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageModifier {
    #[default]
    Normal,
    Res,
    Vul,
}

impl DamageModifier {
    pub fn apply(self, total: i32) -> i32 {
        match self {
            DamageModifier::Normal => total,
            DamageModifier::Res => total / 2,
            DamageModifier::Vul => total * 2,
        }
    }
}

impl FromStr for DamageModifier {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "normal" => Ok(DamageModifier::Normal),
            "res" => Ok(DamageModifier::Res),
            "vul" => Ok(DamageModifier::Vul),
            _ => Err(DiceError::InvalidDamageModifier),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageRoll {
    pub die: DamageDie,
    pub modifier: DamageModifier,
    pub rolls: Vec<i32>,
    pub base_total: i32,
    pub total: i32,
}

/// Rolls `amount` damage dice and applies `modifier`.
pub fn roll_damage(
    die: DamageDie,
    amount: u32,
    modifier: DamageModifier,
    rng: &dyn RandomSource,
) -> Result<DamageRoll, DiceError> {
    if !(1..=MAX_DICE).contains(&amount) {
        return Err(DiceError::InvalidDiceCount);
    }
    let rolls = roll_dice(amount, die.sides(), rng);
    let base_total: i32 = rolls.iter().sum();
    Ok(DamageRoll {
        die,
        modifier,
        total: modifier.apply(base_total),
        rolls,
        base_total,
    })
}

// =============================================================================
// Action rolls
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionRoll {
    /// One d20.
    Norm,
    /// Best of two d20.
    Adv,
    /// Worst of two d20.
    Dadv,
    /// One d100.
    Perc,
}

impl FromStr for ActionRoll {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "norm" => Ok(ActionRoll::Norm),
            "adv" => Ok(ActionRoll::Adv),
            "dadv" => Ok(ActionRoll::Dadv),
            "perc" => Ok(ActionRoll::Perc),
            _ => Err(DiceError::InvalidActionRoll),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRollResult {
    pub kind: ActionRoll,
    pub rolls: Vec<i32>,
    pub result: i32,
}

impl ActionRoll {
    pub fn roll(self, rng: &dyn RandomSource) -> ActionRollResult {
        let (rolls, result) = match self {
            ActionRoll::Norm => {
                let roll = rng.gen_range(1, 20);
                (vec![roll], roll)
            }
            ActionRoll::Adv | ActionRoll::Dadv => {
                let (a, b) = (rng.gen_range(1, 20), rng.gen_range(1, 20));
                let pick = if self == ActionRoll::Adv { a.max(b) } else { a.min(b) };
                (vec![a, b], pick)
            }
            ActionRoll::Perc => {
                let roll = rng.gen_range(1, 100);
                (vec![roll], roll)
            }
        };
        ActionRollResult {
            kind: self,
            rolls,
            result,
        }
    }
}
