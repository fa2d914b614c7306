use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use furniture_rental_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_id = ensure_user(&pool, "demo@example.com", "demo123").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Demo user ID: {user_id}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email}");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = [
        ("Sofas", "sofas", "/images/categories/sofas.jpg"),
        ("Beds", "beds", "/images/categories/beds.jpg"),
        ("Tables", "tables", "/images/categories/tables.jpg"),
        ("Chairs", "chairs", "/images/categories/chairs.jpg"),
        ("Wardrobes", "wardrobes", "/images/categories/wardrobes.jpg"),
    ];

    for (name, slug, image) in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(image)
        .execute(pool)
        .await?;
    }
    println!("Seeded categories");

    // (name, description, monthly price in minor units, category slug,
    //  material, dimensions, color, trending, new arrival)
    let products = [
        (
            "Oslo 3-Seater Sofa",
            "Deep-cushioned fabric sofa for living rooms",
            249900,
            "sofas",
            "Linen / oak",
            "210x90x85 cm",
            "Stone grey",
            true,
            false,
        ),
        (
            "Luna Queen Bed",
            "Upholstered queen bed frame with slatted base",
            199900,
            "beds",
            "Velvet / pine",
            "160x200 cm",
            "Navy",
            true,
            true,
        ),
        (
            "Arden Dining Table",
            "Solid-wood table that seats six",
            179900,
            "tables",
            "Mango wood",
            "180x90x75 cm",
            "Walnut",
            false,
            true,
        ),
        (
            "Piet Accent Chair",
            "Mid-century lounge chair",
            89900,
            "chairs",
            "Boucle / beech",
            "72x80x78 cm",
            "Cream",
            false,
            false,
        ),
        (
            "Haven 2-Door Wardrobe",
            "Two-door wardrobe with internal shelving",
            159900,
            "wardrobes",
            "Engineered wood",
            "100x58x200 cm",
            "White oak",
            false,
            true,
        ),
    ];

    for (name, desc, price, slug, material, dimensions, color, trending, is_new) in products {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price, category_id,
                 material, dimensions, color, image_url, trending, is_new_arrival)
            SELECT $1, $2, $3, $4, c.id, $6, $7, $8, $9, $10, $11
            FROM categories c WHERE c.slug = $5
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(slug)
        .bind(material)
        .bind(dimensions)
        .bind(color)
        .bind(format!("/images/products/{}.jpg", name.to_lowercase().replace(' ', "-")))
        .bind(trending)
        .bind(is_new)
        .execute(pool)
        .await?;
    }
    println!("Seeded products");

    Ok(())
}
