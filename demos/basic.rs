//! Basic example demonstrating a registered DAO struct
//!
//! Run with: cargo run --example basic
//!
//! Uses an in-memory SQLite database unless DATABASE_URL is set:
//! export DATABASE_URL="sqlite::memory:"
//! RUST_LOG=sqlx_dao=debug shows every statement as it runs.

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx_dao::{Dao, Error, ErrorSlot, Record, Sql};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct User {
    id: i64,
    name: String,
    #[column(name = "email_address")]
    email: String,
}

#[derive(Default, Dao)]
struct UserDao {
    #[sql = "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email_address VARCHAR(100) NOT NULL UNIQUE
    )"]
    create_table: Sql<fn()>,

    #[sql = "INSERT INTO users (id, name, email_address) VALUES (:id, :name, :email_address)"]
    insert: Sql<fn(User) -> Result<(), Error>>,

    #[sql = "SELECT id, name, email_address FROM users ORDER BY id"]
    list_all: Sql<fn() -> Vec<User>>,

    #[sql = "SELECT id, name, email_address FROM users WHERE email_address = :1"]
    find_by_email: Sql<fn(String) -> Option<User>>,

    #[sql = "UPDATE users SET name = :2 WHERE email_address = :1"]
    rename: Sql<fn(String, String) -> u64>,

    #[sql = "DELETE FROM users WHERE email_address = :"]
    delete: Sql<fn(String) -> u64>,

    err: ErrorSlot,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let driver_name = database_url.split(':').next().unwrap_or_default().to_owned();

    println!("Connecting to {database_url}...");
    install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    let mut dao = UserDao::default();
    sqlx_dao::register(&driver_name, &pool, &mut dao)?;

    dao.create_table.call().await;

    println!("\n--- Example 1: Inserting users ---");
    for (id, name, email) in [
        (1, "Alice", "alice@example.com"),
        (2, "Bob", "bob@example.com"),
        (3, "Charlie", "charlie@example.com"),
    ] {
        dao.insert
            .call(User {
                id,
                name: name.to_owned(),
                email: email.to_owned(),
            })
            .await?;
        println!("Inserted user '{name}'");
    }

    println!("\n--- Example 2: Fetching all users ---");
    let users = dao.list_all.call().await;
    println!("Found {} users:", users.len());
    for user in &users {
        println!("  - {} (id={}, email={})", user.name, user.id, user.email);
    }

    println!("\n--- Example 3: Finding user by email ---");
    match dao.find_by_email.call("alice@example.com".to_owned()).await {
        Some(user) => println!("Found user: {} ({})", user.name, user.email),
        None => println!("User not found"),
    }

    println!("\n--- Example 4: Updating user ---");
    let updated = dao
        .rename
        .call("bob@example.com".to_owned(), "Robert".to_owned())
        .await;
    println!("Updated {updated} row(s)");

    println!("\n--- Example 5: Deleting user ---");
    let deleted = dao.delete.call("charlie@example.com".to_owned()).await;
    println!("Deleted {deleted} row(s)");

    println!("\n--- Example 6: Reading the shared error slot ---");
    let duplicate = User {
        id: 4,
        name: "Alice again".to_owned(),
        email: "alice@example.com".to_owned(),
    };
    if dao.insert.call(duplicate).await.is_err() {
        if let Some(err) = dao.err.get() {
            println!("Insert rejected: {err}");
        }
    }

    println!("\n--- Final state ---");
    for user in dao.list_all.call().await {
        println!("  - {} (id={}, email={})", user.name, user.id, user.email);
    }

    println!("\nExample completed successfully!");
    Ok(())
}
