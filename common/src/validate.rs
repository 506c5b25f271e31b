//! 入力チェック
//!
//! どれも状態を変更しない。エラーは画面側で該当項目の横に表示する。

use crate::types::HeaderField;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const REQUIRED_MESSAGE: &str = "This field is required";

/// ヘッダー必須項目のエラー（ラベル → メッセージ）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 入力し直した項目のエラーを消す
    pub fn remove(&mut self, label: &str) {
        self.0.remove(label);
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

/// イニシャルのエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitialsError {
    #[error("Please enter your initials")]
    Empty,

    #[error("Initials should be between 2 and 5 characters")]
    Length,

    #[error("Initials should only contain letters")]
    NotLetters,
}

/// 不合格メモのエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("Please enter a note describing the issue")]
    Empty,
}

/// 必須項目が空でないか確認
pub fn validate_header(fields: &[HeaderField]) -> Result<(), FieldErrors> {
    let mut errors = BTreeMap::new();
    for field in fields {
        if field.is_required && field.value.trim().is_empty() {
            errors.insert(field.label.clone(), REQUIRED_MESSAGE.to_string());
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FieldErrors(errors))
    }
}

/// イニシャルを正規化（前後空白除去・大文字化）して検証
pub fn normalize_initials(input: &str) -> Result<String, InitialsError> {
    lazy_static::lazy_static! {
        static ref LETTERS_RE: Regex = Regex::new(r"^[A-Z]+$").unwrap();
    }

    let initials = input.trim().to_uppercase();
    if initials.is_empty() {
        return Err(InitialsError::Empty);
    }
    let len = initials.chars().count();
    if !(2..=5).contains(&len) {
        return Err(InitialsError::Length);
    }
    if !LETTERS_RE.is_match(&initials) {
        return Err(InitialsError::NotLetters);
    }
    Ok(initials)
}

/// 不合格メモを検証（前後空白除去）
pub fn validate_failure_note(note: &str) -> Result<String, NoteError> {
    let trimmed = note.trim();
    if trimmed.is_empty() {
        return Err(NoteError::Empty);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(label: &str, value: &str, is_required: bool) -> HeaderField {
        HeaderField {
            label: label.to_string(),
            value: value.to_string(),
            cell_address: "A1".parse().unwrap(),
            is_required,
        }
    }

    #[test]
    fn test_validate_header_ok() {
        let fields = vec![field("Customer Name", "ACME", true), field("Box Number", "", false)];
        assert!(validate_header(&fields).is_ok());
    }

    #[test]
    fn test_validate_header_reports_each_blank_required_field() {
        let fields = vec![
            field("Customer Name", "   ", true),
            field("Serial Number", "", true),
            field("Model", "IRB", true),
            field("Box Number", "", false),
        ];
        let errors = validate_header(&fields).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("Customer Name"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("Serial Number"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("Model"), None);
        assert!(errors.to_string().contains("Customer Name: This field is required"));

        let mut errors = errors;
        errors.remove("Customer Name");
        assert_eq!(errors.labels().collect::<Vec<_>>(), vec!["Serial Number"]);
    }

    #[test]
    fn test_initials_rejected() {
        assert_eq!(normalize_initials(""), Err(InitialsError::Empty));
        assert_eq!(normalize_initials("   "), Err(InitialsError::Empty));
        assert_eq!(normalize_initials("A"), Err(InitialsError::Length));
        assert_eq!(normalize_initials("ABCDEF"), Err(InitialsError::Length));
        assert_eq!(normalize_initials("A1"), Err(InitialsError::NotLetters));
        assert_eq!(normalize_initials("J D"), Err(InitialsError::NotLetters));
        assert_eq!(normalize_initials("JÖ"), Err(InitialsError::NotLetters));
    }

    #[test]
    fn test_initials_normalized() {
        assert_eq!(normalize_initials("jd"), Ok("JD".to_string()));
        assert_eq!(normalize_initials("  abcde "), Ok("ABCDE".to_string()));
    }

    #[test]
    fn test_failure_note() {
        assert_eq!(validate_failure_note("  bracket loose \n"), Ok("bracket loose".to_string()));
        assert_eq!(validate_failure_note(" \t "), Err(NoteError::Empty));
    }
}
