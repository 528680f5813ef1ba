use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::StoreError;
use crate::store::{DurableStore, Tables};

/// json snapshot on disk; each commit rewrites the whole file through a
/// temporary sibling and a rename
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl DurableStore for FileStore {
    fn load(&self) -> Result<Tables, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Tables::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        let staging = self.staging_path();
        fs::write(&staging, serde_json::to_vec_pretty(tables)?)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use crate::decimal::Money;
    use crate::members::{Member, NewMember, Savings};
    use crate::store::Transaction;

    fn temp_store() -> FileStore {
        FileStore::new(std::env::temp_dir().join(format!("ikimina-ledger-{}.json", Uuid::new_v4())))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let store = temp_store();
        assert_eq!(store.load().unwrap(), Tables::default());
    }

    #[test]
    fn test_commit_survives_reopen() {
        let store = temp_store();
        let now = Utc::now();
        let member = Member::register(
            NewMember {
                first_name: "Grace".to_string(),
                last_name: "Ingabire".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1992, 3, 4).unwrap(),
                gender: "Female".to_string(),
                phone_number: "0789000000".to_string(),
            },
            now,
        );
        let deposit = Savings::deposit(member.id, Money::from_str_exact("1250.75").unwrap(), now);

        let mut tx = Transaction::begin(&store).unwrap();
        tx.add(member.clone());
        tx.add(deposit.clone());
        tx.commit().unwrap();

        let reopened = FileStore::new(store.path());
        let tables = reopened.load().unwrap();
        assert_eq!(tables.members.get(&member.id), Some(&member));
        assert_eq!(tables.savings.get(&deposit.id).map(|s| s.amount), Some(deposit.amount));

        fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let store = temp_store();
        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Serialization(_))));
        fs::remove_file(store.path()).unwrap();
    }
}
