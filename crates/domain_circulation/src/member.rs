//! Library members
//!
//! Loans refer to members by id only; deleting a member does not touch loans.

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::MemberId;

use crate::error::CirculationError;

/// A registered borrower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl Member {
    /// Creates a member record from a validated request
    pub fn create(new: NewMember) -> Result<Self, CirculationError> {
        new.validate()?;

        Ok(Self {
            id: MemberId::new_v7(),
            name: new.name,
            email: new.email,
            phone: new.phone,
        })
    }

    /// Applies a patch in place, returning true if anything changed
    pub fn apply(&mut self, patch: &MemberPatch) -> bool {
        let mut changed = false;

        if let Some(name) = &patch.name {
            if *name != self.name {
                self.name = name.clone();
                changed = true;
            }
        }
        if let Some(email) = &patch.email {
            if *email != self.email {
                self.email = email.clone();
                changed = true;
            }
        }
        if let Some(phone) = &patch.phone {
            if *phone != self.phone {
                self.phone = phone.clone();
                changed = true;
            }
        }

        changed
    }
}

/// Request to register a member
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewMember {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: String,
    pub phone: Option<String>,
}

impl NewMember {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Partial update of a member
///
/// `phone` is tri-state: `None` leaves it, `Some(None)` clears it,
/// `Some(Some(..))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct MemberPatch {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
}

impl MemberPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}
