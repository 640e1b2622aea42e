//! Business rules an entry must satisfy before it is stored.
//!
//! Checks run in a fixed order and stop at the first failure.

use rust_decimal::Decimal;

use super::domain::Entry;
use super::errors::ValidationError;

pub const INVALID_DESCRIPTION: &str = "Informe uma descrição válida.";
pub const INVALID_MONTH: &str = "Informe um mês válido.";
pub const INVALID_YEAR: &str = "Informe um Ano válido.";
pub const MISSING_USER: &str = "Informe um Usuário.";
pub const INVALID_VALUE: &str = "Informe um valor válido.";
pub const MISSING_KIND: &str = "Informe um tipo de lançamento.";

pub fn validate(entry: &Entry) -> Result<(), ValidationError> {
    let has_description = entry.description.as_deref().is_some_and(|d| !d.trim().is_empty());
    if !has_description {
        return Err(ValidationError::new(INVALID_DESCRIPTION));
    }
    if !matches!(entry.month, Some(1..=12)) {
        return Err(ValidationError::new(INVALID_MONTH));
    }
    // four digits
    if !matches!(entry.year, Some(1000..=9999)) {
        return Err(ValidationError::new(INVALID_YEAR));
    }
    if entry.user_id().is_none() {
        return Err(ValidationError::new(MISSING_USER));
    }
    if !entry.value.is_some_and(|v| v > Decimal::ZERO) {
        return Err(ValidationError::new(INVALID_VALUE));
    }
    if entry.kind.is_none() {
        return Err(ValidationError::new(MISSING_KIND));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::User;
    use crate::entry::domain::EntryKind;

    fn salary() -> Entry {
        Entry {
            description: Some("Salario".into()),
            month: Some(2),
            year: Some(2022),
            value: Some(Decimal::TEN),
            kind: Some(EntryKind::Income),
            user: Some(User::default().with_id(1)),
            ..Default::default()
        }
    }

    fn message(entry: &Entry) -> String {
        validate(entry).unwrap_err().message().to_string()
    }

    #[test]
    fn complete_entry_passes() {
        assert!(validate(&salary()).is_ok());
    }

    #[test]
    fn zero_value_fails() {
        let e = Entry { value: Some(Decimal::ZERO), ..salary() };
        assert_eq!(message(&e), INVALID_VALUE);
    }

    #[test]
    fn description_checked_before_month() {
        let e = Entry { description: None, month: None, ..salary() };
        assert_eq!(message(&e), INVALID_DESCRIPTION);
    }

    #[test]
    fn blank_descriptions_fail() {
        for d in ["", " ", "\t\n"] {
            let e = Entry { description: Some(d.into()), ..salary() };
            assert_eq!(message(&e), INVALID_DESCRIPTION, "description {d:?}");
        }
    }

    /// Fill an empty entry field by field; each step surfaces the next rule.
    #[test]
    fn walks_rules_in_order() {
        let mut e = Entry::default();
        assert_eq!(message(&e), INVALID_DESCRIPTION);

        e.description = Some(String::new());
        assert_eq!(message(&e), INVALID_DESCRIPTION);

        e.description = Some("Salario.".into());
        assert_eq!(message(&e), INVALID_MONTH);
        e.month = Some(0);
        assert_eq!(message(&e), INVALID_MONTH);
        e.month = Some(13);
        assert_eq!(message(&e), INVALID_MONTH);

        e.month = Some(2);
        assert_eq!(message(&e), INVALID_YEAR);
        e.year = Some(203);
        assert_eq!(message(&e), INVALID_YEAR);
        e.year = Some(20221);
        assert_eq!(message(&e), INVALID_YEAR);

        e.year = Some(2022);
        assert_eq!(message(&e), MISSING_USER);
        e.user = Some(User::new("", "email@email.com", "senha"));
        assert_eq!(message(&e), MISSING_USER);

        e.user = Some(User::new("", "email@email.com", "senha").with_id(1));
        assert_eq!(message(&e), INVALID_VALUE);
        e.value = Some(Decimal::ZERO);
        assert_eq!(message(&e), INVALID_VALUE);
        e.value = Some(Decimal::NEGATIVE_ONE);
        assert_eq!(message(&e), INVALID_VALUE);

        e.value = Some(Decimal::TEN);
        assert_eq!(message(&e), MISSING_KIND);

        e.kind = Some(EntryKind::Expense);
        assert!(validate(&e).is_ok());
    }

    #[test]
    fn status_is_not_required() {
        let e = Entry { status: None, ..salary() };
        assert!(validate(&e).is_ok());
    }
}
