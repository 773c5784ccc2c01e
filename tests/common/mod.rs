#![allow(dead_code)]

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use rowwise::{
    Column, DataType, Db, Error, MemStore, Resource, ResourceDescriptor, Result, Row, Rw, Value,
    WriteOp,
};
use uuid::Uuid;

lazy_static! {
    static ref USER_DESC: ResourceDescriptor = ResourceDescriptor::new(
        "db_test_user",
        vec![
            Column::new("public_id", DataType::Text).primary_key(),
            Column::new("name", DataType::Text),
            Column::new("phone_number", DataType::Text),
            Column::new("email", DataType::Text),
            Column::new("version", DataType::Integer).version(),
            Column::new("create_time", DataType::Timestamp).create_time(),
            Column::new("update_time", DataType::Timestamp).update_time(),
        ],
    );
    static ref ACCOUNT_DESC: ResourceDescriptor = ResourceDescriptor::new(
        "db_test_accounts",
        vec![
            Column::new("account_id", DataType::Integer).primary_key(),
            Column::new("scope_id", DataType::Text).primary_key(),
            Column::new("name", DataType::Text),
            Column::new("create_time", DataType::Timestamp).create_time(),
        ],
    );
    static ref CAR_DESC: ResourceDescriptor = ResourceDescriptor::new(
        "db_test_car",
        vec![
            Column::new("private_id", DataType::Text).primary_key(),
            Column::new("model", DataType::Text),
            Column::new("mpg", DataType::Integer),
            Column::new("version", DataType::Integer).version(),
            Column::new("create_time", DataType::Timestamp).create_time(),
            Column::new("update_time", DataType::Timestamp).update_time(),
        ],
    );
}

/// Test resource with a public-id capability and the full set of
/// server-managed columns.
#[derive(Debug, Clone, Default)]
pub struct TestUser {
    pub public_id: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub version: u32,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl Resource for TestUser {
    fn descriptor() -> &'static ResourceDescriptor {
        &USER_DESC
    }

    fn to_row(&self) -> Row {
        vec![
            Value::Text(self.public_id.clone()),
            Value::Text(self.name.clone()),
            self.phone_number.clone().into(),
            self.email.clone().into(),
            Value::Integer(i64::from(self.version)),
            self.create_time.into(),
            self.update_time.into(),
        ]
    }

    fn apply_row(&mut self, row: &Row) -> Result<()> {
        self.public_id = row[0].as_str().unwrap_or_default().to_string();
        self.name = row[1].as_str().unwrap_or_default().to_string();
        self.phone_number = row[2].as_str().map(str::to_string);
        self.email = row[3].as_str().map(str::to_string);
        self.version = row[4].as_i64().unwrap_or_default() as u32;
        self.create_time = row[5].as_timestamp();
        self.update_time = row[6].as_timestamp();
        Ok(())
    }

    fn public_id(&self) -> Option<&str> {
        Some(&self.public_id)
    }
}

/// Test resource with a schema-derived composite primary key and no version
/// column.
#[derive(Debug, Clone, Default)]
pub struct TestAccount {
    pub account_id: i64,
    pub scope_id: String,
    pub name: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
}

impl Resource for TestAccount {
    fn descriptor() -> &'static ResourceDescriptor {
        &ACCOUNT_DESC
    }

    fn to_row(&self) -> Row {
        vec![
            Value::Integer(self.account_id),
            Value::Text(self.scope_id.clone()),
            self.name.clone().into(),
            self.create_time.into(),
        ]
    }

    fn apply_row(&mut self, row: &Row) -> Result<()> {
        self.account_id = row[0].as_i64().unwrap_or_default();
        self.scope_id = row[1].as_str().unwrap_or_default().to_string();
        self.name = row[2].as_str().map(str::to_string);
        self.create_time = row[3].as_timestamp();
        Ok(())
    }
}

/// Test resource with a private-id capability and a self-validation hook
/// that rejects an empty model.
#[derive(Debug, Clone, Default)]
pub struct TestCar {
    pub private_id: String,
    pub model: String,
    pub mpg: i64,
    pub version: u32,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl Resource for TestCar {
    fn descriptor() -> &'static ResourceDescriptor {
        &CAR_DESC
    }

    fn to_row(&self) -> Row {
        vec![
            Value::Text(self.private_id.clone()),
            Value::Text(self.model.clone()),
            Value::Integer(self.mpg),
            Value::Integer(i64::from(self.version)),
            self.create_time.into(),
            self.update_time.into(),
        ]
    }

    fn apply_row(&mut self, row: &Row) -> Result<()> {
        self.private_id = row[0].as_str().unwrap_or_default().to_string();
        self.model = row[1].as_str().unwrap_or_default().to_string();
        self.mpg = row[2].as_i64().unwrap_or_default();
        self.version = row[3].as_i64().unwrap_or_default() as u32;
        self.create_time = row[4].as_timestamp();
        self.update_time = row[5].as_timestamp();
        Ok(())
    }

    fn private_id(&self) -> Option<&str> {
        Some(&self.private_id)
    }

    fn vet_for_write(&self, op: WriteOp<'_>) -> Result<()> {
        match op {
            WriteOp::Create | WriteOp::Update { .. } => {
                if self.model.is_empty() {
                    return Err(Error::invalid_parameter(
                        "dbtest.car.vet_for_write",
                        "missing model",
                    ));
                }
                Ok(())
            }
            WriteOp::Delete => Ok(()),
        }
    }
}

/// Creates a fresh store with every test table registered and an engine
/// over it. The returned store shares tables with the engine's handle.
pub async fn test_setup() -> (MemStore, Rw) {
    let store = MemStore::new();
    store.create_table(TestUser::descriptor()).await.unwrap();
    store.create_table(TestAccount::descriptor()).await.unwrap();
    store.create_table(TestCar::descriptor()).await.unwrap();
    let rw = Rw::new(Db::new(store.clone()));
    (store, rw)
}

pub fn test_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

pub fn test_user(name: &str) -> TestUser {
    TestUser {
        public_id: test_id("u"),
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn test_car(model: &str) -> TestCar {
    TestCar {
        private_id: test_id("c"),
        model: model.to_string(),
        mpg: 28,
        ..Default::default()
    }
}
