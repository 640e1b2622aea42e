use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::UnknownVariant;
use crate::auth::domain::User;

/// Direction of money for an entry. Serialized with the API's spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "RECEITA")]
    Income,
    #[serde(rename = "DESPESA")]
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "RECEITA",
            Self::Expense => "DESPESA",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for EntryKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RECEITA" => Ok(Self::Income),
            "DESPESA" => Ok(Self::Expense),
            other => Err(UnknownVariant::new("entry kind", other)),
        }
    }
}

/// Settlement state of an entry. New entries start as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntryStatus {
    #[default]
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "EFETIVADO")]
    Settled,
    #[serde(rename = "CANCELADO")]
    Canceled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDENTE",
            Self::Settled => "EFETIVADO",
            Self::Canceled => "CANCELADO",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for EntryStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDENTE" => Ok(Self::Pending),
            "EFETIVADO" => Ok(Self::Settled),
            "CANCELADO" => Ok(Self::Canceled),
            other => Err(UnknownVariant::new("entry status", other)),
        }
    }
}

/// An income or expense record.
///
/// Every field is optional so an entry can be assembled piecemeal by a caller
/// and then checked by [`super::validation::validate`]. `id == None` means the
/// entry was never saved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    pub id: Option<i64>,
    pub description: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub user: Option<User>,
    pub value: Option<Decimal>,
    pub kind: Option<EntryKind>,
    pub status: Option<EntryStatus>,
    pub registered_at: Option<NaiveDate>,
}

impl Entry {
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().and_then(|u| u.id)
    }
}

/// Search predicates for entries. Each `Some` field is an equality test,
/// except `description` which matches case-insensitively anywhere in the
/// text. `None` fields match everything, so the default filter returns all
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryFilter {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub status: Option<EntryStatus>,
    pub kind: Option<EntryKind>,
    pub description: Option<String>,
}

impl EntryFilter {
    pub fn for_user(user_id: i64) -> Self {
        Self { user_id: Some(user_id), ..Default::default() }
    }

    /// Blank descriptions are treated as absent.
    pub fn description_needle(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        fn eq<T: PartialEq>(want: &Option<T>, got: &Option<T>) -> bool {
            want.as_ref().map_or(true, |w| got.as_ref() == Some(w))
        }
        let description_ok = match self.description_needle() {
            Some(needle) => entry
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false),
            None => true,
        };
        eq(&self.id, &entry.id)
            && eq(&self.user_id, &entry.user_id())
            && eq(&self.month, &entry.month)
            && eq(&self.year, &entry.year)
            && eq(&self.status, &entry.status)
            && eq(&self.kind, &entry.kind)
            && description_ok
    }
}

/// Filter built from the set fields of a template entry.
impl From<&Entry> for EntryFilter {
    fn from(template: &Entry) -> Self {
        Self {
            id: template.id,
            user_id: template.user_id(),
            month: template.month,
            year: template.year,
            status: template.status,
            kind: template.kind,
            description: template.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(description: &str, status: EntryStatus) -> Entry {
        Entry {
            id: Some(1),
            description: Some(description.into()),
            month: Some(2),
            year: Some(2022),
            user: Some(User::default().with_id(7)),
            value: Some(Decimal::TEN),
            kind: Some(EntryKind::Income),
            status: Some(status),
            registered_at: None,
        }
    }

    #[test]
    fn enum_wire_names() {
        assert_eq!("EFETIVADO".parse::<EntryStatus>().unwrap(), EntryStatus::Settled);
        assert_eq!(EntryKind::Expense.to_string(), "DESPESA");
        assert_eq!(serde_json::to_string(&EntryStatus::Canceled).unwrap(), "\"CANCELADO\"");
        assert!("settled".parse::<EntryStatus>().is_err());
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(EntryFilter::default().matches(&entry("Salario", EntryStatus::Pending)));
        assert!(EntryFilter::default().matches(&Entry::default()));
    }

    #[test]
    fn description_matches_case_insensitive_substring() {
        let f = EntryFilter { description: Some("sal".into()), ..Default::default() };
        assert!(f.matches(&entry("Salario", EntryStatus::Pending)));
        assert!(!f.matches(&entry("Aluguel", EntryStatus::Pending)));
        let blank = EntryFilter { description: Some("  ".into()), ..Default::default() };
        assert!(blank.matches(&entry("Aluguel", EntryStatus::Pending)));
    }

    #[test]
    fn template_fields_become_predicates() {
        let template = Entry { status: Some(EntryStatus::Pending), user: Some(User::default().with_id(7)), ..Default::default() };
        let f = EntryFilter::from(&template);
        assert_eq!(f.user_id, Some(7));
        assert_eq!(f.status, Some(EntryStatus::Pending));
        assert!(f.month.is_none() && f.id.is_none());
        assert!(f.matches(&entry("Salario", EntryStatus::Pending)));
        assert!(!f.matches(&entry("Salario", EntryStatus::Settled)));
    }
}
