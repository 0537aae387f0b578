use sea_orm::{ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    Actor, EngineError, Money, NewPosting, ResultEngine, Role, Transaction, TransactionKind,
    transactions,
    util::{normalize_optional_text, require_positive_amount},
};

use super::{Engine, access::require_admin, with_tx};

impl Engine {
    async fn post(
        &self,
        actor: &Actor,
        posting: NewPosting,
        kind: TransactionKind,
    ) -> ResultEngine<Transaction> {
        require_positive_amount(posting.amount)?;
        let posting = NewPosting {
            note: normalize_optional_text(posting.note.as_deref()),
            ..posting
        };

        with_tx!(self, |db_tx| {
            self.require_customer_read(&db_tx, actor, posting.customer_id)
                .await?;
            let model = transactions::ActiveModel::for_insert(posting, kind, actor.user_id())
                .insert(&db_tx)
                .await?;
            tracing::info!(
                transaction_id = model.id,
                customer_id = model.customer_id,
                amount_minor = model.amount_minor,
                kind = kind.as_str(),
                by = actor.user_id(),
                "transaction posted"
            );
            Ok(Transaction::from(model))
        })
    }

    /// Records a cash collection (credit) on a customer.
    ///
    /// Agents may only collect from customers assigned to them.
    pub async fn record_collection(
        &self,
        actor: &Actor,
        posting: NewPosting,
    ) -> ResultEngine<Transaction> {
        self.post(actor, posting, TransactionKind::Collection).await
    }

    /// Records a debit (adjustment) on a customer. Administrators only.
    pub async fn record_debit(
        &self,
        actor: &Actor,
        posting: NewPosting,
    ) -> ResultEngine<Transaction> {
        require_admin(actor, "record debits")?;
        self.post(actor, posting, TransactionKind::Debit).await
    }

    /// Replaces the amount (and note) of a transaction.
    ///
    /// `amount` is a magnitude; the stored sign is preserved, so a debit
    /// stays a debit.
    pub async fn update_transaction(
        &self,
        actor: &Actor,
        transaction_id: i64,
        amount: Money,
        note: Option<&str>,
    ) -> ResultEngine<Transaction> {
        require_positive_amount(amount)?;
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_write(&db_tx, actor, transaction_id)
                .await?;
            let kind = Transaction::from(model.clone()).kind();

            let mut active: transactions::ActiveModel = model.into();
            active.amount_minor = ActiveValue::Set(kind.signed(amount).minor());
            active.note = ActiveValue::Set(normalize_optional_text(note));
            let model = active.update(&db_tx).await?;
            tracing::info!(transaction_id, by = actor.user_id(), "transaction updated");
            Ok(Transaction::from(model))
        })
    }

    /// Permanently removes a transaction.
    pub async fn delete_transaction(&self, actor: &Actor, transaction_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_transaction_write(&db_tx, actor, transaction_id)
                .await?;
            transactions::Entity::delete_by_id(transaction_id)
                .exec(&db_tx)
                .await?;
            tracing::info!(transaction_id, by = actor.user_id(), "transaction deleted");
            Ok(())
        })
    }

    /// Lists the transactions of a customer, oldest first.
    ///
    /// Ties on `created_at` are broken by id, so the order is stable across
    /// calls.
    pub async fn list_customer_transactions(
        &self,
        actor: &Actor,
        customer_id: i64,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_customer_read(&db_tx, actor, customer_id)
                .await?;
            let models = transactions::Entity::find()
                .filter(transactions::Column::CustomerId.eq(customer_id))
                .order_by_asc(transactions::Column::CreatedAt)
                .order_by_asc(transactions::Column::Id)
                .all(&db_tx)
                .await?;
            Ok::<_, EngineError>(models.into_iter().map(Transaction::from).collect())
        })
    }

    /// Latest postings, newest first.
    ///
    /// Administrators see every posting; agents only their own.
    pub async fn recent_transactions(
        &self,
        actor: &Actor,
        limit: u64,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .limit(limit);
        if actor.role() == Role::Agent {
            query = query.filter(transactions::Column::RecordedBy.eq(actor.user_id()));
        }
        let models = query.all(&self.database).await?;
        Ok(models.into_iter().map(Transaction::from).collect())
    }
}
