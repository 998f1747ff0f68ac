//! Transaction, classifier, and budget workflows
//!
//! Every write goes through the cache-backed list so the in-memory view and
//! the persisted record never diverge. Writes re-persist in whatever mode
//! the store is currently in; encrypted writes require the session key the
//! cache retained at unlock time.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::analysis;
use crate::cache::LedgerCache;
use crate::classifier::{ClassifierTable, Suggestion};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Anomaly, BudgetBook, BudgetPeriod, BudgetReport, Money, Transaction, TransactionId,
};
use crate::session::Signer;
use crate::storage::Storage;

/// Partial update for an existing transaction; None leaves a field alone
#[derive(Debug, Default, Clone)]
pub struct TransactionPatch {
    pub amount: Option<Money>,
    pub category: Option<String>,
    pub note: Option<Option<String>>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Core ledger workflows over the shared cache and storage
pub struct LedgerService {
    storage: Arc<Storage>,
    cache: Arc<LedgerCache>,
}

impl LedgerService {
    pub fn new(storage: Arc<Storage>, cache: Arc<LedgerCache>) -> Self {
        Self { storage, cache }
    }

    /// The full transaction list, newest first
    pub async fn list(&self, signer: Option<&dyn Signer>) -> LedgerResult<Vec<Transaction>> {
        let mut transactions = self.cache.require_loaded(signer).await?;
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(transactions)
    }

    /// Record a new transaction.
    ///
    /// When no category is given the classifier picks one from the note and
    /// amount. The classifier is then trained on the note/category pair, so
    /// accepted suggestions and manual corrections both feed back in.
    pub async fn add(
        &self,
        amount: Money,
        category: Option<String>,
        note: Option<String>,
        timestamp: Option<DateTime<Utc>>,
        signer: Option<&dyn Signer>,
    ) -> LedgerResult<Transaction> {
        let category = match category {
            Some(category) => category,
            None => {
                let note_text = note.as_deref().unwrap_or("");
                self.load_classifier(signer)?
                    .suggest(note_text, amount)
                    .category
            }
        };

        let mut txn = Transaction::new(amount, category, timestamp.unwrap_or_else(Utc::now));
        txn.note = note;
        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let mut transactions = self.cache.require_loaded(signer).await?;
        transactions.push(txn.clone());
        self.save_transactions(&transactions, signer)?;
        self.cache.store_loaded(transactions);

        if let Some(note) = &txn.note {
            self.train(note, &txn.category, signer)?;
        }

        Ok(txn)
    }

    /// Apply a partial update to an existing transaction
    pub async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
        signer: Option<&dyn Signer>,
    ) -> LedgerResult<Transaction> {
        let mut transactions = self.cache.require_loaded(signer).await?;
        let txn = transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;

        if let Some(amount) = patch.amount {
            txn.amount = amount;
            // Keep the discriminator in sync with the new sign
            txn.kind = if amount.is_positive() {
                crate::models::TransactionKind::Income
            } else {
                crate::models::TransactionKind::Expense
            };
        }
        if let Some(category) = patch.category {
            txn.category = category;
        }
        if let Some(note) = patch.note {
            txn.note = note;
        }
        if let Some(timestamp) = patch.timestamp {
            txn.timestamp = timestamp;
        }

        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;
        let updated = txn.clone();

        self.save_transactions(&transactions, signer)?;
        self.cache.store_loaded(transactions);
        Ok(updated)
    }

    /// Remove a transaction, returning the removed entry
    pub async fn delete(
        &self,
        id: TransactionId,
        signer: Option<&dyn Signer>,
    ) -> LedgerResult<Transaction> {
        let mut transactions = self.cache.require_loaded(signer).await?;
        let index = transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;

        let removed = transactions.remove(index);
        self.save_transactions(&transactions, signer)?;
        self.cache.store_loaded(transactions);
        Ok(removed)
    }

    /// Suggest a category for a prospective transaction
    pub fn suggest(
        &self,
        note: &str,
        amount: Money,
        signer: Option<&dyn Signer>,
    ) -> LedgerResult<Suggestion> {
        Ok(self.load_classifier(signer)?.suggest(note, amount))
    }

    /// Train the classifier on a note/category pair and persist it
    pub fn train(
        &self,
        note: &str,
        category: &str,
        signer: Option<&dyn Signer>,
    ) -> LedgerResult<()> {
        let trained = self.load_classifier(signer)?.train(note, category);
        self.save_classifier(&trained, signer)
    }

    /// Run the anomaly detector over the current history
    pub async fn detect_anomalies(&self, signer: Option<&dyn Signer>) -> LedgerResult<Vec<Anomaly>> {
        let transactions = self.cache.require_loaded(signer).await?;
        Ok(analysis::detect(&transactions))
    }

    /// The configured budget book
    pub fn budgets(&self) -> LedgerResult<BudgetBook> {
        self.storage.load_budgets()
    }

    /// Set or replace one category limit
    pub fn set_budget(&self, category: &str, limit: Money) -> LedgerResult<BudgetBook> {
        let mut book = self.storage.load_budgets()?;
        book.set_limit(category, limit);
        self.storage.save_budgets(&book)?;
        Ok(book)
    }

    /// Remove one category limit
    pub fn remove_budget(&self, category: &str) -> LedgerResult<Money> {
        let mut book = self.storage.load_budgets()?;
        let removed = book
            .remove_limit(category)
            .ok_or(LedgerError::NotFound {
                entity_type: "Budget",
                identifier: category.to_string(),
            })?;
        self.storage.save_budgets(&book)?;
        Ok(removed)
    }

    /// Change the period every limit applies to
    pub fn set_budget_period(&self, period: BudgetPeriod) -> LedgerResult<BudgetBook> {
        let mut book = self.storage.load_budgets()?;
        book.period = period;
        self.storage.save_budgets(&book)?;
        Ok(book)
    }

    /// Evaluate every budget against the current period's spending
    pub async fn evaluate_budgets(
        &self,
        signer: Option<&dyn Signer>,
        now: DateTime<Utc>,
    ) -> LedgerResult<Vec<BudgetReport>> {
        let book = self.storage.load_budgets()?;
        let transactions = self.cache.require_loaded(signer).await?;
        Ok(analysis::evaluate(&book, &transactions, now))
    }

    /// Persist the transaction list.
    ///
    /// An owner record means encryption is on for the store as a whole, even
    /// when this particular record file does not exist yet; a new write must
    /// not introduce a plaintext record into an owned store.
    fn save_transactions(
        &self,
        transactions: &[Transaction],
        signer: Option<&dyn Signer>,
    ) -> LedgerResult<()> {
        let list = transactions.to_vec();
        if self.encryption_required()? {
            let key = self
                .cache
                .unlock_key(signer)?
                .ok_or_else(no_session_key)?;
            self.storage.transactions.save_encrypted(&list, &key)
        } else {
            self.storage.transactions.save_plain(&list)
        }
    }

    /// Load the classifier table, unlocking through the signer when the
    /// record is encrypted and the session owns the store
    fn load_classifier(&self, signer: Option<&dyn Signer>) -> LedgerResult<ClassifierTable> {
        let key = self.cache.unlock_key(signer)?;
        self.storage.classifier.load_auto(key.as_deref())
    }

    fn save_classifier(
        &self,
        table: &ClassifierTable,
        signer: Option<&dyn Signer>,
    ) -> LedgerResult<()> {
        if self.encryption_required()? {
            let key = self
                .cache
                .unlock_key(signer)?
                .ok_or_else(no_session_key)?;
            self.storage.classifier.save_encrypted(table, &key)
        } else {
            self.storage.classifier.save_plain(table)
        }
    }

    fn encryption_required(&self) -> LedgerResult<bool> {
        Ok(self.storage.encryption_owner()?.is_some()
            || self.storage.transactions.is_encrypted()?
            || self.storage.classifier.is_encrypted()?)
    }
}

fn no_session_key() -> LedgerError {
    LedgerError::Encryption(
        "store is encrypted and no session key is held; unlock first".to_string(),
    )
}
