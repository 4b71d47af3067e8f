//! Payment resolution.
//!
//! Nets the per-child lines into the case outcome: who pays, who receives
//! the parent-to-parent payment, and why nothing is payable when that is the
//! result.

use rust_decimal::Decimal;

use crate::models::{ChildResult, Parent, Payer, PayerRole, ZeroPaymentReason};

use super::RECEIVING_CARE_THRESHOLD;

/// Aggregate payment positions of the two parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentResolution {
    /// Parent with the larger aggregate liability.
    pub payer: Payer,
    /// Recipient of the net parent-to-parent payment.
    pub receiver: Payer,
    /// Parent A's role.
    pub payer_role: PayerRole,
    /// Net parent-to-parent payment.
    pub final_payment_amount: Decimal,
}

/// Resolves the payer from each parent's payments.
///
/// # Arguments
///
/// * `to_parent_a` - Parent A's payments to Parent B
/// * `to_parent_b` - Parent B's payments to Parent A
/// * `to_carers_a` - Parent A's payments to carers
/// * `to_carers_b` - Parent B's payments to carers
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::resolve_payment;
/// use child_support_engine::models::{Payer, PayerRole};
/// use rust_decimal::Decimal;
///
/// let resolution = resolve_payment(Decimal::from(7200), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
/// assert_eq!(resolution.payer, Payer::ParentA);
/// assert_eq!(resolution.receiver, Payer::ParentB);
/// assert_eq!(resolution.payer_role, PayerRole::PayingParent);
/// ```
pub fn resolve_payment(
    to_parent_a: Decimal,
    to_parent_b: Decimal,
    to_carers_a: Decimal,
    to_carers_b: Decimal,
) -> PaymentResolution {
    let aggregate_a = to_parent_a + to_carers_a;
    let aggregate_b = to_parent_b + to_carers_b;

    let payer = match aggregate_a.cmp(&aggregate_b) {
        std::cmp::Ordering::Greater => Payer::ParentA,
        std::cmp::Ordering::Less => Payer::ParentB,
        std::cmp::Ordering::Equal => Payer::Neither,
    };
    let receiver = match to_parent_a.cmp(&to_parent_b) {
        std::cmp::Ordering::Greater => Payer::ParentB,
        std::cmp::Ordering::Less => Payer::ParentA,
        std::cmp::Ordering::Equal => Payer::Neither,
    };
    let payer_role = if to_carers_a > Decimal::ZERO && to_carers_b > Decimal::ZERO {
        PayerRole::BothPaying
    } else {
        match payer {
            Payer::ParentA => PayerRole::PayingParent,
            Payer::ParentB => PayerRole::ReceivingParent,
            Payer::Neither => PayerRole::Neither,
        }
    };

    PaymentResolution {
        payer,
        receiver,
        payer_role,
        final_payment_amount: (to_parent_a - to_parent_b).abs(),
    }
}

/// Classifies why an assessment with no payments came out that way.
///
/// # Arguments
///
/// * `combined_income` - Income the children were costed at
/// * `mar_prevented` - A parent who would pay MAR but for their care
/// * `children` - Per-child results; adult children are skipped
pub fn detect_zero_payment(
    combined_income: Decimal,
    mar_prevented: Option<Parent>,
    children: &[ChildResult],
) -> ZeroPaymentReason {
    let assessable: Vec<&ChildResult> = children.iter().filter(|c| !c.is_adult_child).collect();
    if assessable.is_empty() {
        return ZeroPaymentReason::Unexplained;
    }
    if combined_income.is_zero() {
        return ZeroPaymentReason::ZeroIncome;
    }
    if let Some(parent) = mar_prevented {
        return ZeroPaymentReason::MarPreventedByCare { parent };
    }
    if assessable.iter().all(|c| {
        c.rounded_care_a < RECEIVING_CARE_THRESHOLD && c.rounded_care_b < RECEIVING_CARE_THRESHOLD
    }) {
        return ZeroPaymentReason::BothLowCare;
    }
    if assessable
        .iter()
        .all(|c| c.child_support_perc_a < Decimal::ONE && c.child_support_perc_b < Decimal::ONE)
    {
        return ZeroPaymentReason::BalancedPercentages;
    }
    if assessable.iter().any(|c| {
        (c.child_support_perc_a > Decimal::ZERO && c.rounded_care_b < RECEIVING_CARE_THRESHOLD)
            || (c.child_support_perc_b > Decimal::ZERO && c.rounded_care_a < RECEIVING_CARE_THRESHOLD)
    }) {
        return ZeroPaymentReason::CareThreshold;
    }
    ZeroPaymentReason::Unexplained
}
