use serde::{Deserialize, Serialize};

/// Candidate submitted to `POST /sign-up`. Carries persisted fields only;
/// transient editing state (current skill text, the terms checkbox, skill
/// rendering ids) never reaches the wire. Unknown JSON fields are ignored,
/// so legacy payloads that still include them are accepted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub email: String,
    pub website: Option<String>,
    pub age: Option<u32>,
    pub skills: Vec<String>,
}

/// A registered user as held by the registry. The password is kept only as
/// an argon2 hash and is never serialized into a response.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: u32,
    pub name: String,
    pub password_hash: String,
    pub email: String,
    pub website: Option<String>,
    pub age: Option<u32>,
    pub skills: Vec<String>,
}

/// Response view of a registered user: everything except credentials.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct PublicUser {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub website: Option<String>,
    pub age: Option<u32>,
    pub skills: Vec<String>,
}

impl From<&UserRecord> for PublicUser {
    fn from(record: &UserRecord) -> PublicUser {
        PublicUser {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            website: record.website.clone(),
            age: record.age,
            skills: record.skills.clone(),
        }
    }
}

/// Body of every 400 response: names the offending field so the client can
/// attach the message to it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
