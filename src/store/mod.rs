//! Durable store contract.
//!
//! A [`Transaction`] stages every write against a private copy of the
//! committed [`Tables`]; nothing reaches the backing [`DurableStore`] until
//! [`Transaction::commit`] succeeds, and dropping the transaction discards
//! the staged writes.

pub mod file;
pub mod memory;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::loans::Loan;
use crate::members::{Member, Savings};
use crate::payments::Payment;

pub use file::FileStore;
pub use memory::MemoryStore;

/// backing storage for committed ledger state
pub trait DurableStore: Send + Sync {
    /// read the latest committed state
    fn load(&self) -> Result<Tables, StoreError>;

    /// atomically replace the committed state
    fn persist(&self, tables: &Tables) -> Result<(), StoreError>;
}

/// every table of the ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    pub members: BTreeMap<Uuid, Member>,
    pub savings: BTreeMap<Uuid, Savings>,
    pub loans: BTreeMap<Uuid, Loan>,
    pub payments: BTreeMap<Uuid, Payment>,
}

impl Tables {
    /// constraints checked at commit time
    pub fn check_constraints(&self) -> Result<(), StoreError> {
        let mut phones = HashSet::new();
        for member in self.members.values() {
            if !phones.insert(member.phone_number.as_str()) {
                return Err(StoreError::UniqueViolation {
                    constraint: "member.phone_number".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// a row type stored in [`Tables`]
pub trait Record: Clone {
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;

    /// natural ordering used by queries
    fn sort_key(&self) -> DateTime<Utc>;

    fn table(tables: &Tables) -> &BTreeMap<Uuid, Self>;

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self>;

    /// remove dependent rows when a row of this type is deleted
    fn cascade(_tables: &mut Tables, _id: Uuid) {}
}

impl Record for Member {
    const ENTITY: &'static str = "member";

    fn id(&self) -> Uuid {
        self.id
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn table(tables: &Tables) -> &BTreeMap<Uuid, Self> {
        &tables.members
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self> {
        &mut tables.members
    }

    fn cascade(tables: &mut Tables, id: Uuid) {
        tables.savings.retain(|_, s| s.member_id != id);
        let loans: Vec<Uuid> = tables
            .loans
            .values()
            .filter(|l| l.member_id == id)
            .map(|l| l.id)
            .collect();
        for loan_id in loans {
            tables.loans.remove(&loan_id);
            Loan::cascade(tables, loan_id);
        }
    }
}

impl Record for Savings {
    const ENTITY: &'static str = "savings";

    fn id(&self) -> Uuid {
        self.id
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn table(tables: &Tables) -> &BTreeMap<Uuid, Self> {
        &tables.savings
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self> {
        &mut tables.savings
    }
}

impl Record for Loan {
    const ENTITY: &'static str = "loan";

    fn id(&self) -> Uuid {
        self.id
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.approved_at
    }

    fn table(tables: &Tables) -> &BTreeMap<Uuid, Self> {
        &tables.loans
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self> {
        &mut tables.loans
    }

    fn cascade(tables: &mut Tables, id: Uuid) {
        tables.payments.retain(|_, p| p.loan_id != id);
    }
}

impl Record for Payment {
    const ENTITY: &'static str = "payment";

    fn id(&self) -> Uuid {
        self.id
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.paid_at
    }

    fn table(tables: &Tables) -> &BTreeMap<Uuid, Self> {
        &tables.payments
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self> {
        &mut tables.payments
    }
}

/// offset/limit window for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Page {
    pub fn all() -> Self {
        Self { offset: 0, limit: None }
    }

    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: Some(limit),
        }
    }
}

/// scoped unit of work over a durable store
pub struct Transaction<'s> {
    store: &'s dyn DurableStore,
    staged: Tables,
}

impl<'s> Transaction<'s> {
    pub fn begin(store: &'s dyn DurableStore) -> Result<Self, StoreError> {
        Ok(Self {
            store,
            staged: store.load()?,
        })
    }

    pub fn get<R: Record>(&self, id: Uuid) -> Option<&R> {
        R::table(&self.staged).get(&id)
    }

    /// rows matching `predicate` in natural order, windowed by `page`
    pub fn query<R, F>(&self, predicate: F, page: Page) -> Vec<R>
    where
        R: Record,
        F: Fn(&R) -> bool,
    {
        let mut rows: Vec<&R> = R::table(&self.staged).values().filter(|r| predicate(r)).collect();
        rows.sort_by_key(|r| (r.sort_key(), r.id()));
        rows.into_iter()
            .skip(page.offset)
            .take(page.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// insert or replace a row
    pub fn add<R: Record>(&mut self, record: R) {
        R::table_mut(&mut self.staged).insert(record.id(), record);
    }

    /// delete a row and its dependents
    pub fn delete<R: Record>(&mut self, id: Uuid) -> Option<R> {
        let removed = R::table_mut(&mut self.staged).remove(&id);
        if removed.is_some() {
            R::cascade(&mut self.staged, id);
        }
        removed
    }

    pub fn commit(self) -> Result<(), StoreError> {
        self.staged.check_constraints()?;
        self.store.persist(&self.staged)
    }

    /// discard every staged write
    pub fn rollback(self) {}
}
