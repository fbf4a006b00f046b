//! SharePoint field kinds (`SP.FieldType`)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SharePointError;

/// Value of `FieldTypeKind` when creating or describing a list field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum FieldType {
    Invalid = 0,
    Integer = 1,
    Text = 2,
    Note = 3,
    DateTime = 4,
    Counter = 5,
    Choice = 6,
    Lookup = 7,
    Boolean = 8,
    Number = 9,
    Currency = 10,
    Url = 11,
    Computed = 12,
    Threading = 13,
    Guid = 14,
    MultiChoice = 15,
    GridChoice = 16,
    Calculated = 17,
    File = 18,
    Attachments = 19,
    User = 20,
    Recurrence = 21,
    CrossProjectLink = 22,
    ModStat = 23,
    Error = 24,
    ContentTypeId = 25,
    PageSeparator = 26,
    ThreadIndex = 27,
    WorkflowStatus = 28,
    AllDayEvent = 29,
    WorkflowEventType = 30,
    Geolocation = 31,
    OutcomeChoice = 32,
}

impl FieldType {
    pub const ALL: [FieldType; 33] = [
        FieldType::Invalid,
        FieldType::Integer,
        FieldType::Text,
        FieldType::Note,
        FieldType::DateTime,
        FieldType::Counter,
        FieldType::Choice,
        FieldType::Lookup,
        FieldType::Boolean,
        FieldType::Number,
        FieldType::Currency,
        FieldType::Url,
        FieldType::Computed,
        FieldType::Threading,
        FieldType::Guid,
        FieldType::MultiChoice,
        FieldType::GridChoice,
        FieldType::Calculated,
        FieldType::File,
        FieldType::Attachments,
        FieldType::User,
        FieldType::Recurrence,
        FieldType::CrossProjectLink,
        FieldType::ModStat,
        FieldType::Error,
        FieldType::ContentTypeId,
        FieldType::PageSeparator,
        FieldType::ThreadIndex,
        FieldType::WorkflowStatus,
        FieldType::AllDayEvent,
        FieldType::WorkflowEventType,
        FieldType::Geolocation,
        FieldType::OutcomeChoice,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for FieldType {
    type Error = SharePointError;

    fn try_from(code: i32) -> Result<Self, SharePointError> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| {
                SharePointError::invalid_value(format!(
                    "field type {} is not a value in FieldType",
                    code
                ))
            })
    }
}

impl From<FieldType> for i32 {
    fn from(kind: FieldType) -> Self {
        kind.code()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
