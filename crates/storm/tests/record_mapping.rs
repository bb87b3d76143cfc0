//! End-to-end mapping through `#[derive(Record)]` against in-process connections.

use storm::testing::MemoryConnection;
use storm::{Connection, DbValue, FieldKind, OrmError, OrmResult, Record, RowSet, Storm};

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct User {
    #[storm(pk)]
    id: i64,
    #[storm(column = "name_user")]
    name: String,
    #[storm(column = "email_user")]
    email: String,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
#[storm(table = "device_readings")]
struct Reading {
    #[storm(pk, column = "reading_id")]
    id: i32,
    sensor: String,
    celsius: f32,
    count: u16,
    online: bool,
    payload: Vec<u8>,
    note: Option<String>,
    #[storm(skip)]
    cached: Option<i64>,
}

#[derive(Debug, Default, Record)]
struct Tagless {
    #[storm(tag = "pk,column:tagless_id")]
    id: i64,
    #[storm(tag = "column:label")]
    name: String,
}

#[derive(Debug, Default, Record)]
struct Serial {
    #[storm(pk)]
    id: i64,
    value: u64,
}

/// A fixed table of users that serves `COUNT(*)` and paged selects.
struct TableConnection {
    users: Vec<User>,
}

impl TableConnection {
    fn with_users(n: i64) -> Self {
        let users = (1..=n)
            .map(|id| User {
                id,
                name: format!("user{id}"),
                email: format!("user{id}@example.com"),
            })
            .collect();
        Self { users }
    }
}

impl Connection for TableConnection {
    async fn execute(&self, _sql: &str, _args: &[DbValue]) -> OrmResult<u64> {
        Ok(0)
    }

    async fn query_rows(&self, sql: &str, args: &[DbValue]) -> OrmResult<RowSet> {
        if sql.starts_with("SELECT COUNT(*)") {
            return Ok(RowSet::new(["count"]).row([DbValue::Int64(self.users.len() as i64)]));
        }

        let (limit, offset) = match args {
            [.., DbValue::Int64(limit), DbValue::Int64(offset)] => (*limit as usize, *offset as usize),
            _ => (self.users.len(), 0),
        };
        let mut rows = RowSet::new(["id", "name_user", "email_user"]);
        for user in self.users.iter().skip(offset).take(limit) {
            rows = rows.row([
                DbValue::Int64(user.id),
                DbValue::Text(user.name.clone()),
                DbValue::Text(user.email.clone()),
            ]);
        }
        Ok(rows)
    }
}

#[test]
fn derive_builds_schema() {
    let schema = User::schema();
    assert_eq!(schema.table(), "users");
    assert_eq!(schema.record_name(), "User");
    let columns: Vec<_> = schema.fields().iter().map(|f| f.column()).collect();
    assert_eq!(columns, ["id", "name_user", "email_user"]);
    assert_eq!(schema.primary_key().unwrap().name(), "id");
}

#[test]
fn derive_honours_table_pk_column_and_skip() {
    let schema = Reading::schema();
    assert_eq!(schema.table(), "device_readings");
    assert_eq!(schema.fields().len(), 7);
    assert!(schema.field_by_name("cached").is_none());

    let pk = schema.primary_key().unwrap();
    assert_eq!(pk.column(), "reading_id");
    assert_eq!(pk.kind(), FieldKind::I32);
    assert_eq!(schema.field_by_name("count").unwrap().kind(), FieldKind::U16);
}

#[test]
fn derive_accepts_raw_tags() {
    let schema = Tagless::schema();
    assert_eq!(schema.primary_key().unwrap().column(), "tagless_id");
    assert_eq!(schema.field_by_name("name").unwrap().column(), "label");
}

#[tokio::test]
async fn insert_binds_every_non_key_field_in_order() {
    let db = Storm::new(MemoryConnection::new());
    let reading = Reading {
        id: 99,
        sensor: "north".into(),
        celsius: 21.5,
        count: 3,
        online: true,
        payload: vec![1, 2],
        note: None,
        cached: Some(1),
    };
    db.insert(&reading).await.unwrap();

    let stmt = &db.connection().executed()[0];
    assert_eq!(
        stmt.sql,
        "INSERT INTO device_readings (sensor, celsius, count, online, payload, note) \
         VALUES ($1, $2, $3, $4, $5, $6)"
    );
    assert_eq!(
        stmt.args,
        vec![
            DbValue::Text("north".into()),
            DbValue::Float32(21.5),
            DbValue::Int32(3),
            DbValue::Bool(true),
            DbValue::Bytes(vec![1, 2]),
            DbValue::Null,
        ]
    );
}

#[tokio::test]
async fn update_and_delete_target_primary_key() {
    let db = Storm::new(MemoryConnection::new());
    let user = User {
        id: 5,
        name: "ammar".into(),
        email: "dikha@pepeg.com".into(),
    };
    db.update(&user).await.unwrap();
    db.delete(&user).await.unwrap();
    db.update_columns(&user, &["email_user"]).await.unwrap();

    let executed = db.connection().executed();
    assert_eq!(
        executed[0].sql,
        "UPDATE users SET name_user = $1, email_user = $2 WHERE id = $3"
    );
    assert_eq!(executed[0].args.last(), Some(&DbValue::Int64(5)));
    assert_eq!(executed[1].sql, "DELETE FROM users WHERE id = $1");
    assert_eq!(executed[1].args, vec![DbValue::Int64(5)]);
    assert_eq!(executed[2].sql, "UPDATE users SET email_user = $1 WHERE id = $2");
}

#[tokio::test]
async fn zero_valued_update_is_rejected_without_sql() {
    let db = Storm::new(MemoryConnection::new());
    let err = db
        .update(&User {
            id: 3,
            ..User::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
    assert!(db.connection().executed().is_empty());
}

#[tokio::test]
async fn unsigned_values_beyond_int8_are_never_written() {
    let db = Storm::new(MemoryConnection::new());
    let err = db
        .insert(&Serial {
            id: 0,
            value: u64::MAX,
        })
        .await
        .unwrap_err();
    assert!(err.is_statement_error());
    assert_eq!(
        err.to_string(),
        "Encode error on column 'value': value 18446744073709551615 is out of range for int8"
    );
    assert!(db.connection().executed().is_empty());

    db.insert(&Serial {
        id: 0,
        value: i64::MAX as u64,
    })
    .await
    .unwrap();
    db.connection()
        .push_rows(RowSet::new(["id", "value"]).row([DbValue::Int64(1), DbValue::Int64(i64::MAX)]));
    let rows = db.from::<Serial>().select(&[]).await.unwrap();
    assert_eq!(rows[0].value, i64::MAX as u64);
}

#[tokio::test]
async fn mapped_rows_round_trip_through_coercion() {
    let db = Storm::new(MemoryConnection::new());
    db.connection().push_rows(
        RowSet::new([
            "reading_id",
            "sensor",
            "celsius",
            "count",
            "online",
            "payload",
            "note",
        ])
        .row([
            DbValue::Int64(7),
            DbValue::Bytes(b"south".to_vec()),
            DbValue::Float64(0.1),
            DbValue::Int64(12),
            DbValue::Int64(1),
            DbValue::Bytes(vec![9]),
            DbValue::Null,
        ]),
    );

    let readings = db.from::<Reading>().select(&[]).await.unwrap();
    assert_eq!(
        readings,
        vec![Reading {
            id: 7,
            sensor: "south".into(),
            celsius: 0.1,
            count: 12,
            online: true,
            payload: vec![9],
            note: None,
            cached: None,
        }]
    );
}

#[tokio::test]
async fn decode_errors_name_the_column() {
    let db = Storm::new(MemoryConnection::new());
    db.connection()
        .push_rows(RowSet::new(["id", "name_user"]).row([DbValue::Int64(1), DbValue::Bool(true)]));

    let err = db.from::<User>().select(&[]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Decode error on column 'name_user': cannot convert bool to String"
    );
}

#[tokio::test]
async fn first_on_empty_result_is_not_an_error() {
    let db = Storm::new(MemoryConnection::new());
    let mut user = User {
        id: 1,
        name: "untouched".into(),
        email: String::new(),
    };
    let found = db
        .from::<User>()
        .filter("id = $1")
        .bind(14i64)
        .first(&mut user, &[])
        .await
        .unwrap();
    assert!(!found);
    assert_eq!(user.name, "untouched");
}

#[tokio::test]
async fn paginate_seven_rows_by_three() {
    let db = Storm::new(TableConnection::with_users(7));

    let first = db.from::<User>().paginate(1, 3, &[]).await.unwrap();
    assert_eq!(first.total, 7);
    assert_eq!(first.total_pages, 3);
    let ids: Vec<_> = first.items.iter().map(|u| u.id).collect();
    assert_eq!(ids, [1, 2, 3]);

    let last = db.from::<User>().paginate(3, 3, &[]).await.unwrap();
    let ids: Vec<_> = last.items.iter().map(|u| u.id).collect();
    assert_eq!(ids, [7]);
    assert_eq!(last.items[0].email, "user7@example.com");
}

#[tokio::test]
async fn paginate_clamps_page_and_size() {
    let db = Storm::new(TableConnection::with_users(7));

    let clamped = db.from::<User>().paginate(0, 3, &[]).await.unwrap();
    assert_eq!(clamped.page, 1);
    assert_eq!(clamped.items.len(), 3);
    assert_eq!(clamped.items[0].id, 1);

    let tiny = db.from::<User>().paginate(2, 0, &[]).await.unwrap();
    assert_eq!(tiny.page_size, 1);
    assert_eq!(tiny.total_pages, 7);
    assert_eq!(tiny.items.len(), 1);
    assert_eq!(tiny.items[0].id, 2);
}

#[tokio::test]
async fn query_is_reusable_across_terminals() {
    let db = Storm::new(TableConnection::with_users(7));
    let query = db.from::<User>().limit(2);

    let a = query.select(&[]).await.unwrap();
    let b = query.select(&[]).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(
        query.to_select_sql(&[]).unwrap().sql,
        "SELECT * FROM users LIMIT 2"
    );
}
