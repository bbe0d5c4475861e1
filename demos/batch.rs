//! Batch example: a `Vec` of records inserted in one transaction
//!
//! Run with: cargo run --example batch

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx_dao::{Dao, Error, Record, Sql};

#[derive(Debug, Clone, Default, Record)]
struct Account {
    id: i64,
    name: String,
    balance: i64,
}

#[derive(Default, Dao)]
struct AccountDao {
    #[sql = "CREATE TABLE accounts (id INTEGER PRIMARY KEY, name TEXT NOT NULL, balance INTEGER NOT NULL)"]
    create_table: Sql<fn() -> Result<(), Error>>,

    #[sql = "INSERT INTO accounts (id, name, balance) VALUES (:id, :name, :balance)"]
    open_all: Sql<fn(Vec<Account>) -> Result<(), Error>>,

    #[sql = "SELECT id, name, balance FROM accounts ORDER BY id"]
    list: Sql<fn() -> Vec<Account>>,

    #[sql = "SELECT SUM(balance) FROM accounts"]
    total: Sql<fn() -> i64>,
}

fn account(id: i64, name: &str, balance: i64) -> Account {
    Account {
        id,
        name: name.to_owned(),
        balance,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    let mut dao = AccountDao::default();
    sqlx_dao::register("sqlite", &pool, &mut dao)?;
    dao.create_table.call().await?;

    println!("--- Opening accounts in one transaction ---");
    dao.open_all
        .call(vec![account(1, "Alice", 1000), account(2, "Bob", 500)])
        .await?;
    println!("Total balance: ${}", dao.total.call().await);

    println!("\n--- A batch with a duplicate id is rejected as a whole ---");
    let result = dao
        .open_all
        .call(vec![account(3, "Charlie", 300), account(1, "Mallory", 1)])
        .await;
    if let Err(err) = result {
        println!("  ✗ Batch failed: {err}");
    }

    for account in dao.list.call().await {
        println!("  - {} (id={}): ${}", account.name, account.id, account.balance);
    }
    println!("Total balance: ${}", dao.total.call().await);

    Ok(())
}
