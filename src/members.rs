use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{MemberId, SavingsId};

/// a cooperative member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn register(details: NewMember, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: details.first_name,
            last_name: details.last_name,
            date_of_birth: details.date_of_birth,
            gender: details.gender,
            phone_number: details.phone_number,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// apply the fields present in `update`
    pub fn apply(&mut self, update: MemberUpdate, now: DateTime<Utc>) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(phone_number) = update.phone_number {
            self.phone_number = phone_number;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
}

/// a single savings deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    pub id: SavingsId,
    pub member_id: MemberId,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Savings {
    pub fn deposit(member_id: MemberId, amount: Money, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            amount,
            created_at: now,
            updated_at: now,
        }
    }
}

/// summary returned after a savings deposit is deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsDeleted {
    pub member: String,
    pub amount: Money,
}

/// summary returned after a member is deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDeleted {
    pub first_name: String,
    pub last_name: String,
}

/// sum of all deposits
pub fn total_savings<'a>(savings: impl IntoIterator<Item = &'a Savings>) -> Money {
    savings.into_iter().map(|s| s.amount).sum()
}
