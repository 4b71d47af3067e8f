//! Distribution of a liability between the other parent and non-parent
//! carers.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Parent;

use super::{CareShare, ChildCare, RECEIVING_CARE_THRESHOLD, round_to_dollar, split_evenly};

/// Someone who can receive child support for a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    /// The other parent.
    Parent(Parent),
    /// The first non-parent carer.
    FirstCarer,
    /// The second non-parent carer.
    SecondCarer,
}

impl Recipient {
    /// Whether the recipient is a non-parent carer.
    pub fn is_carer(self) -> bool {
        !matches!(self, Recipient::Parent(_))
    }

    fn share(self, care: &ChildCare) -> Option<&CareShare> {
        match self {
            Recipient::Parent(parent) => Some(care.parent(parent)),
            Recipient::FirstCarer => care.npc.as_ref(),
            Recipient::SecondCarer => care.npc2.as_ref(),
        }
    }
}

/// One recipient's part of a liability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecipientShare {
    /// Who receives it.
    pub recipient: Recipient,
    /// Annual amount.
    pub amount: Decimal,
}

/// Parent-to-parent part of a set of shares.
pub fn parent_portion(shares: &[RecipientShare]) -> Decimal {
    shares
        .iter()
        .filter(|s| !s.recipient.is_carer())
        .map(|s| s.amount)
        .sum()
}

/// Parent-to-carer part of a set of shares.
pub fn carer_portion(shares: &[RecipientShare]) -> Decimal {
    shares
        .iter()
        .filter(|s| s.recipient.is_carer())
        .map(|s| s.amount)
        .sum()
}

/// Lists who may receive a payment from `payer` for a child.
///
/// Carers qualify with at least 35% care. The other parent is added last
/// when `include_other_parent` is set, leaving the caller to decide whether
/// the parent qualifies.
pub fn eligible_recipients(care: &ChildCare, payer: Parent, include_other_parent: bool) -> Vec<Recipient> {
    let mut recipients: Vec<Recipient> = [Recipient::FirstCarer, Recipient::SecondCarer]
        .into_iter()
        .filter(|r| {
            r.share(care)
                .is_some_and(|share| share.rounded >= RECEIVING_CARE_THRESHOLD)
        })
        .collect();
    if include_other_parent {
        recipients.push(Recipient::Parent(payer.other()));
    }
    recipients
}

/// Splits `amount` across `recipients` by their cost percentages.
///
/// Every share but the last is rounded to the dollar; the last takes the
/// remainder, so the shares always sum to `amount`. Recipients from
/// [`eligible_recipients`] list the other parent last.
pub fn distribute_by_cost(amount: Decimal, recipients: &[Recipient], care: &ChildCare) -> Vec<RecipientShare> {
    let weights: Vec<Decimal> = recipients
        .iter()
        .map(|r| {
            r.share(care)
                .map(|s| Decimal::from(s.cost_percentage))
                .unwrap_or(Decimal::ZERO)
        })
        .collect();
    let total_weight: Decimal = weights.iter().sum();
    if total_weight.is_zero() {
        return split_evenly(amount, recipients.len())
            .into_iter()
            .zip(recipients)
            .map(|(amount, &recipient)| RecipientShare { recipient, amount })
            .collect();
    }

    let mut remaining = amount;
    recipients
        .iter()
        .zip(weights)
        .enumerate()
        .map(|(i, (&recipient, weight))| {
            let share = if i + 1 == recipients.len() {
                remaining
            } else {
                round_to_dollar(amount * weight / total_weight)
            };
            remaining -= share;
            RecipientShare {
                recipient,
                amount: share,
            }
        })
        .collect()
}

/// Gives `amount` to the recipient with the most care; ties share it evenly.
pub fn distribute_to_highest_care(
    amount: Decimal,
    recipients: &[Recipient],
    care: &ChildCare,
) -> Vec<RecipientShare> {
    let rounded = |r: &Recipient| r.share(care).map(|s| s.rounded).unwrap_or(0);
    let Some(highest) = recipients.iter().map(rounded).max() else {
        return Vec::new();
    };
    let top: Vec<Recipient> = recipients
        .iter()
        .filter(|r| rounded(r) == highest)
        .copied()
        .collect();

    split_evenly(amount, top.len())
        .into_iter()
        .zip(top)
        .map(|(amount, recipient)| RecipientShare { recipient, amount })
        .collect()
}

/// Carer payments split between the first and second carer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarerSplit {
    /// First carer's amount.
    pub npc1: Decimal,
    /// Second carer's amount, when there is a second carer.
    pub npc2: Option<Decimal>,
}

/// Splits total carer payments between the carers by their summed cost
/// percentages over the children they qualify for.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::split_between_carers;
/// use rust_decimal::Decimal;
///
/// let split = split_between_carers(Decimal::from(1000), Decimal::from(76), Some(Decimal::from(24)));
/// assert_eq!(split.npc1, Decimal::from(760));
/// assert_eq!(split.npc2, Some(Decimal::from(240)));
/// ```
pub fn split_between_carers(total: Decimal, first_weight: Decimal, second_weight: Option<Decimal>) -> CarerSplit {
    let Some(second_weight) = second_weight else {
        return CarerSplit {
            npc1: total,
            npc2: None,
        };
    };
    let combined = first_weight + second_weight;
    let npc1 = if combined.is_zero() {
        total
    } else {
        round_to_dollar(total * first_weight / combined)
    };
    CarerSplit {
        npc1,
        npc2: Some(total - npc1),
    }
}
