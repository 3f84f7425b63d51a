use crate::config::Config;
use crate::db;
use crate::domain::models::Role;
use anyhow::Result;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use sqlx::PgPool;

pub async fn seed_all(pool: &PgPool, config: &Config) -> Result<()> {
    seed_manager(pool, config).await?;
    seed_menu(pool).await?;
    Ok(())
}

/// The default manager account, created once.
async fn seed_manager(pool: &PgPool, config: &Config) -> Result<()> {
    if db::find_account_by_username(pool, "manager").await?.is_some() {
        return Ok(());
    }

    let salt = SaltString::generate(rand_core::OsRng);
    let hash = Argon2::default()
        .hash_password(config.seed_manager_password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash manager password: {e}"))?
        .to_string();

    db::insert_account(pool, "manager", "manager@restaurant.com", &hash, Role::Manager).await?;
    tracing::info!("default manager account created");
    Ok(())
}

struct SeedDish<'a> {
    name: &'a str,
    description: &'a str,
    price: f64,
    category: &'a str,
}

async fn seed_menu(pool: &PgPool) -> Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let dishes = [
        SeedDish {
            name: "Margherita Pizza",
            description: "Tomato, mozzarella and fresh basil",
            price: 12.50,
            category: "Mains",
        },
        SeedDish {
            name: "Spaghetti Carbonara",
            description: "Guanciale, pecorino and egg yolk",
            price: 14.00,
            category: "Mains",
        },
        SeedDish {
            name: "Caesar Salad",
            description: "Romaine, parmesan, croutons",
            price: 9.00,
            category: "Starters",
        },
        SeedDish {
            name: "Tiramisu",
            description: "Espresso-soaked ladyfingers and mascarpone",
            price: 7.50,
            category: "Desserts",
        },
    ];

    for dish in dishes {
        db::insert_menu_item(
            pool,
            dish.name,
            Some(dish.description),
            dish.price,
            Some(dish.category),
            None,
        )
        .await?;
    }

    tracing::info!("starter menu seeded");
    Ok(())
}
