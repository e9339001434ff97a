use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates the PostgreSQL pool and applies the idempotent schema DDL.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    init_schema(&pool).await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Runs every schema statement once per startup. All statements are
/// idempotent (`IF NOT EXISTS` / duplicate_object guards), so repeated
/// boots against the same database are safe.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Enum types first, then tables in foreign-key order. Satellite tables
/// share the base record's primary key and cascade with it.
const SCHEMA: &[&str] = &[
    r#"DO $$ BEGIN
        CREATE TYPE gender AS ENUM ('male', 'female');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE record_type AS ENUM ('meal', 'sleep', 'health', 'growth', 'stool');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE meal_type AS ENUM ('breast_milk', 'formula', 'baby_food', 'snack');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE sleep_quality AS ENUM ('good', 'normal', 'bad');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE symptom AS ENUM
            ('fever', 'cough', 'runny_nose', 'vomiting', 'diarrhea', 'rash', 'other');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE stool_amount AS ENUM ('small', 'medium', 'large');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE stool_condition AS ENUM ('hard', 'normal', 'soft', 'watery');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE stool_color AS ENUM ('yellow', 'brown', 'green', 'black', 'red', 'white');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE sender_type AS ENUM ('user', 'assistant');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE persona AS ENUM ('doctor', 'mom', 'nutritionist');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username VARCHAR(50) NOT NULL UNIQUE,
        nickname VARCHAR(50),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS kids (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name VARCHAR(50) NOT NULL,
        birth_date DATE NOT NULL,
        gender gender NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS records (
        id BIGSERIAL PRIMARY KEY,
        kid_id BIGINT NOT NULL REFERENCES kids(id) ON DELETE CASCADE,
        record_type record_type NOT NULL,
        title VARCHAR(200),
        memo TEXT,
        image_url TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS meal_records (
        id BIGINT PRIMARY KEY REFERENCES records(id) ON DELETE CASCADE,
        meal_type meal_type NOT NULL,
        meal_detail TEXT,
        burp BOOLEAN
    )"#,
    r#"CREATE TABLE IF NOT EXISTS sleep_records (
        id BIGINT PRIMARY KEY REFERENCES records(id) ON DELETE CASCADE,
        start_at TIMESTAMPTZ NOT NULL,
        end_at TIMESTAMPTZ NOT NULL,
        sleep_quality sleep_quality NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS health_records (
        id BIGINT PRIMARY KEY REFERENCES records(id) ON DELETE CASCADE,
        temperature DOUBLE PRECISION,
        symptom symptom NOT NULL,
        symptom_other TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS growth_records (
        id BIGINT PRIMARY KEY REFERENCES records(id) ON DELETE CASCADE,
        height_cm DOUBLE PRECISION,
        weight_kg DOUBLE PRECISION
    )"#,
    r#"CREATE TABLE IF NOT EXISTS stool_records (
        id BIGINT PRIMARY KEY REFERENCES records(id) ON DELETE CASCADE,
        amount stool_amount NOT NULL,
        condition stool_condition NOT NULL,
        color stool_color NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS chat_sessions (
        id BIGSERIAL PRIMARY KEY,
        kid_id BIGINT NOT NULL REFERENCES kids(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS chat_messages (
        id BIGSERIAL PRIMARY KEY,
        session_id BIGINT NOT NULL REFERENCES chat_sessions(id) ON DELETE CASCADE,
        sender sender_type NOT NULL,
        persona persona,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS community_posts (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title VARCHAR(200) NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS community_comments (
        id BIGSERIAL PRIMARY KEY,
        post_id BIGINT NOT NULL REFERENCES community_posts(id) ON DELETE CASCADE,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS community_likes (
        id BIGSERIAL PRIMARY KEY,
        post_id BIGINT NOT NULL REFERENCES community_posts(id) ON DELETE CASCADE,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (post_id, user_id)
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_records_kid_created
        ON records (kid_id, created_at DESC)"#,
    r#"CREATE INDEX IF NOT EXISTS idx_chat_messages_session
        ON chat_messages (session_id, created_at)"#,
];
