//! Tabletop dice use cases.
//!
//! Stateless: nothing here touches records or fights.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::value_objects::{
    roll_damage, ActionRoll, ActionRollResult, DamageDie, DamageModifier, DamageRoll,
    DiceFormula, DiceRollResult,
};
use tabletop_domain::DiceError;

use crate::infrastructure::ports::RandomPort;

/// A formula roll plus its printable breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaRoll {
    #[serde(flatten)]
    pub result: DiceRollResult,
    pub breakdown: String,
}

pub struct DiceRoller {
    random: Arc<dyn RandomPort>,
}

impl DiceRoller {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }

    /// `amount` dice of `die`, then resistance or vulnerability.
    pub fn damage(
        &self,
        die: &str,
        amount: u32,
        modifier: Option<&str>,
    ) -> Result<DamageRoll, DiceError> {
        let die: DamageDie = die.parse()?;
        let modifier: DamageModifier = modifier.unwrap_or_default().parse()?;
        roll_damage(die, amount, modifier, self.random.as_ref())
    }

    pub fn action(&self, kind: Option<&str>) -> Result<ActionRollResult, DiceError> {
        let kind: ActionRoll = kind.unwrap_or("norm").parse()?;
        Ok(kind.roll(self.random.as_ref()))
    }

    pub fn roll(&self, formula: &str) -> Result<FormulaRoll, DiceError> {
        let result = DiceFormula::parse(formula)?.roll(self.random.as_ref());
        tracing::debug!(formula, total = result.total, "Dice rolled");
        Ok(FormulaRoll {
            breakdown: result.breakdown(),
            result,
        })
    }
}
