use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewWithdrawal, Withdrawal},
    traits::{MarketplaceDatabase, MarketplaceError, ValidationError},
};

/// `WithdrawalApi` lets a business move money out of its marketplace balance.
pub struct WithdrawalApi<B> {
    db: B,
}

impl<B: Debug> Debug for WithdrawalApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WithdrawalApi ({:?})", self.db)
    }
}

impl<B> WithdrawalApi<B>
where B: MarketplaceDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Debits the business balance and records a pending withdrawal. Only the business itself may withdraw, and
    /// never more than its balance.
    pub async fn request_withdrawal(
        &self,
        caller_id: i64,
        withdrawal: NewWithdrawal,
    ) -> Result<Withdrawal, MarketplaceError> {
        if !withdrawal.amount.is_positive() {
            return Err(ValidationError::InvalidAmount.into());
        }
        if withdrawal.destination.trim().is_empty() {
            return Err(ValidationError::MissingDestination.into());
        }
        if withdrawal.business_id != caller_id {
            warn!("🏦️ User {caller_id} tried to withdraw from business {}", withdrawal.business_id);
            return Err(MarketplaceError::Authorization(format!(
                "You cannot withdraw from business {}",
                withdrawal.business_id
            )));
        }
        let record = self.db.request_withdrawal(withdrawal).await?;
        info!(
            "🏦️ Withdrawal #{} of {} to {} requested by business {}",
            record.id, record.amount, record.payment_method, record.business_id
        );
        Ok(record)
    }
}
