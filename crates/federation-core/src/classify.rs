//! Category membership of resolved values.
//!
//! Each conversion hands the value back unchanged on a miss so callers can
//! report what they actually got.

use crate::vocab::{Accountable, Activity, Category, Poll, Statusable, VocabType};

pub fn to_activity(vocab: VocabType) -> Result<Activity, VocabType> {
    match vocab {
        VocabType::Activity(activity) => Ok(*activity),
        other => Err(other),
    }
}

pub fn to_statusable(vocab: VocabType) -> Result<Statusable, VocabType> {
    match vocab {
        VocabType::Statusable(status) => Ok(*status),
        other => Err(other),
    }
}

pub fn to_accountable(vocab: VocabType) -> Result<Accountable, VocabType> {
    match vocab {
        VocabType::Accountable(account) => Ok(*account),
        other => Err(other),
    }
}

/// The poll view of a statusable, if it has one.
pub fn as_pollable(status: &Statusable) -> Option<&Poll> {
    status.as_pollable()
}

pub fn as_pollable_mut(status: &mut Statusable) -> Option<&mut Poll> {
    status.as_pollable_mut()
}

/// Every category `vocab` belongs to.
pub fn categories(vocab: &VocabType) -> &'static [Category] {
    match vocab {
        VocabType::Activity(_) => &[Category::Activity],
        VocabType::Statusable(status) if status.is_pollable() => {
            &[Category::Statusable, Category::Pollable]
        }
        VocabType::Statusable(_) => &[Category::Statusable],
        VocabType::Accountable(_) => &[Category::Accountable],
        VocabType::Other(_) => &[],
    }
}

pub fn is(vocab: &VocabType, category: Category) -> bool {
    categories(vocab).contains(&category)
}
