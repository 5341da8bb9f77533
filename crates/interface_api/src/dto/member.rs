//! Member DTOs

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use core_kernel::MemberId;
use domain_circulation::{Member, MemberPatch, NewMember};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: String,
    pub phone: Option<String>,
}

impl From<CreateMemberRequest> for NewMember {
    fn from(request: CreateMemberRequest) -> Self {
        let new = NewMember::new(request.name, request.email);
        match request.phone {
            Some(phone) => new.with_phone(phone),
            None => new,
        }
    }
}

/// Partial update
///
/// `"phone": null` clears the phone number; omitting `phone` keeps it.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
}

/// Marks a field as present even when its value is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateMemberRequest> for MemberPatch {
    fn from(request: UpdateMemberRequest) -> Self {
        MemberPatch {
            name: request.name,
            email: request.email,
            phone: request.phone,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            name: member.name,
            email: member.email,
            phone: member.phone,
        }
    }
}
