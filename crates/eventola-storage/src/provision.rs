// Administrative provisioning steps
//
// Mirrors the run-once setup a human performs against a fresh database:
// create every table, index, and bucket row the application expects. Steps
// run strictly sequentially; a failed step is logged and the remaining steps
// still run, so re-provisioning an existing database completes with a report
// instead of aborting.

use sqlx::PgPool;

use eventola_core::buckets::ALL_BUCKETS;

/// Outcome of one provisioning run
#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl ProvisionReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

const SCHEMA_STEPS: &[(&str, &str)] = &[
    (
        "create users table",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "create auth_sessions table",
        r#"
        CREATE TABLE IF NOT EXISTS auth_sessions (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token TEXT NOT NULL UNIQUE,
            expires_at TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "create events table",
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_user_id UUID NOT NULL REFERENCES users(id),
            title VARCHAR(255) NOT NULL,
            slug VARCHAR(255) NOT NULL,
            description VARCHAR(10000) NOT NULL,
            location VARCHAR(500) NOT NULL,
            start_at TIMESTAMPTZ NOT NULL,
            end_at TIMESTAMPTZ NOT NULL,
            cover_file_id UUID,
            logo_file_id UUID,
            status VARCHAR(50) NOT NULL,
            theme VARCHAR(50) NOT NULL,
            is_public BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "create unique slug index",
        "CREATE UNIQUE INDEX IF NOT EXISTS events_slug_key ON events (slug)",
    ),
    (
        "create discover index",
        "CREATE INDEX IF NOT EXISTS events_public_start_idx ON events (start_at) WHERE is_public",
    ),
    (
        "create rsvps table",
        r#"
        CREATE TABLE IF NOT EXISTS rsvps (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            event_id UUID NOT NULL REFERENCES events(id),
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            ticket_id VARCHAR(255) NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "create rsvp_events table",
        r#"
        CREATE TABLE IF NOT EXISTS rsvp_events (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            event_id UUID NOT NULL REFERENCES events(id),
            sequence INTEGER NOT NULL,
            event_type TEXT NOT NULL,
            data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (event_id, sequence)
        )
        "#,
    ),
    (
        "create buckets table",
        r#"
        CREATE TABLE IF NOT EXISTS buckets (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            max_size_bytes BIGINT NOT NULL,
            allowed_extensions TEXT[] NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "create files table",
        r#"
        CREATE TABLE IF NOT EXISTS files (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            bucket_id TEXT NOT NULL REFERENCES buckets(id),
            filename TEXT NOT NULL,
            content_type TEXT NOT NULL,
            size_bytes BIGINT NOT NULL,
            data BYTEA NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
];

/// Run every provisioning step against the given pool, catching and logging
/// per-step failures
pub async fn run_provisioning(pool: &PgPool) -> ProvisionReport {
    let mut report = ProvisionReport::default();

    for (name, sql) in SCHEMA_STEPS {
        match sqlx::query(sql).execute(pool).await {
            Ok(_) => {
                tracing::info!(step = name, "provisioning step ok");
                report.succeeded.push(name.to_string());
            }
            Err(e) => {
                tracing::warn!(step = name, error = %e, "provisioning step failed, continuing");
                report.failed.push((name.to_string(), e.to_string()));
            }
        }
    }

    for bucket in ALL_BUCKETS {
        let step = format!("seed bucket {}", bucket.id);
        let extensions: Vec<String> = bucket
            .allowed_extensions
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = sqlx::query(
            r#"
            INSERT INTO buckets (id, name, max_size_bytes, allowed_extensions)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                max_size_bytes = EXCLUDED.max_size_bytes,
                allowed_extensions = EXCLUDED.allowed_extensions
            "#,
        )
        .bind(bucket.id)
        .bind(bucket.name)
        .bind(bucket.max_size_bytes)
        .bind(&extensions)
        .execute(pool)
        .await;

        match result {
            Ok(_) => {
                tracing::info!(step = %step, "provisioning step ok");
                report.succeeded.push(step);
            }
            Err(e) => {
                tracing::warn!(step = %step, error = %e, "provisioning step failed, continuing");
                report.failed.push((step, e.to_string()));
            }
        }
    }

    report
}
