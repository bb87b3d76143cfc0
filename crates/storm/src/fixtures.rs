//! Hand-registered record types shared by unit tests.

use crate::schema::{Record, RecordSchema};
use std::sync::OnceLock;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl Record for User {
    fn schema() -> &'static RecordSchema<Self> {
        static SCHEMA: OnceLock<RecordSchema<User>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::<User>::builder("User")
                .field("ID", Some("pk"), |u| &u.id, |u| &mut u.id)
                .field("Name", Some("column:name_user"), |u| &u.name, |u| &mut u.name)
                .field("Email", Some("column:email_user"), |u| &u.email, |u| &mut u.email)
                .build()
        })
    }
}

/// Primary key declared after other fields, custom table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Account {
    pub owner: String,
    pub balance: f64,
    pub id: i32,
    pub active: bool,
}

impl Record for Account {
    fn schema() -> &'static RecordSchema<Self> {
        static SCHEMA: OnceLock<RecordSchema<Account>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::<Account>::builder("Account")
                .table("ledger_accounts")
                .field("owner", None, |a| &a.owner, |a| &mut a.owner)
                .field("balance", None, |a| &a.balance, |a| &mut a.balance)
                .field("id", Some("pk,column:account_id"), |a| &a.id, |a| &mut a.id)
                .field("active", None, |a| &a.active, |a| &mut a.active)
                .build()
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub nickname: Option<String>,
    pub score: u32,
    pub ratio: f32,
    pub avatar: Vec<u8>,
}

impl Record for Profile {
    fn schema() -> &'static RecordSchema<Self> {
        static SCHEMA: OnceLock<RecordSchema<Profile>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::<Profile>::builder("Profile")
                .field("id", Some("pk"), |p| &p.id, |p| &mut p.id)
                .field("nickname", None, |p| &p.nickname, |p| &mut p.nickname)
                .field("score", None, |p| &p.score, |p| &mut p.score)
                .field("ratio", None, |p| &p.ratio, |p| &mut p.ratio)
                .field("avatar", None, |p| &p.avatar, |p| &mut p.avatar)
                .build()
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Keyless {
    pub name: String,
}

impl Record for Keyless {
    fn schema() -> &'static RecordSchema<Self> {
        static SCHEMA: OnceLock<RecordSchema<Keyless>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::<Keyless>::builder("Keyless")
                .field("name", None, |k| &k.name, |k| &mut k.name)
                .build()
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TwoKeys {
    pub a: i64,
    pub b: i64,
}

impl Record for TwoKeys {
    fn schema() -> &'static RecordSchema<Self> {
        static SCHEMA: OnceLock<RecordSchema<TwoKeys>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::<TwoKeys>::builder("TwoKeys")
                .field("a", Some("pk"), |t| &t.a, |t| &mut t.a)
                .field("b", Some("pk"), |t| &t.b, |t| &mut t.b)
                .build()
        })
    }
}

/// Only a primary key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Counter {
    pub id: i64,
}

impl Record for Counter {
    fn schema() -> &'static RecordSchema<Self> {
        static SCHEMA: OnceLock<RecordSchema<Counter>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::<Counter>::builder("Counter")
                .field("id", Some("pk"), |c| &c.id, |c| &mut c.id)
                .build()
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub serial: u64,
}

impl Record for Ticket {
    fn schema() -> &'static RecordSchema<Self> {
        static SCHEMA: OnceLock<RecordSchema<Ticket>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::<Ticket>::builder("Ticket")
                .field("id", Some("pk"), |t| &t.id, |t| &mut t.id)
                .field("serial", None, |t| &t.serial, |t| &mut t.serial)
                .build()
        })
    }
}
