//! Command implementations. Each database command opens and migrates the
//! database, does its work and prints a one-line summary to stdout.

use labelhub_core::auth::{self, TokenAuthenticator};
use labelhub_core::datasets::{self, permissions};
use labelhub_core::models::auth::Role;
use labelhub_core::models::dataset::DatasetType;
use labelhub_core::models::sample::{NewSample, SampleStatus};
use serde_json::json;
use sqlx::SqlitePool;

use crate::cli::{Cli, Commands, CreateUserArgs, SampleDataArgs};
use crate::{Error, Result};

const MAX_CONNECTIONS: u32 = 2;

pub async fn dispatch(args: Cli) -> Result<()> {
    let Cli {
        database_url,
        command,
    } = args;

    match command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Migrate => {
            open_database(database_url).await?.close().await;
            println!("migrations applied");
            Ok(())
        }
        Commands::CreateUser(create) => {
            let pool = open_database(database_url).await?;
            let outcome = create_user(&pool, create).await;
            pool.close().await;
            outcome
        }
        Commands::CreateSampleData(sample) => {
            let pool = open_database(database_url).await?;
            let outcome = create_sample_data(&pool, sample).await;
            pool.close().await;
            outcome
        }
        Commands::PurgeTokens => {
            let pool = open_database(database_url).await?;
            let outcome = purge_tokens(&pool).await;
            pool.close().await;
            outcome
        }
    }
}

/// Open the database and apply pending migrations.
async fn open_database(database_url: Option<String>) -> Result<SqlitePool> {
    let database_url = match database_url {
        Some(url) => url,
        None => labelhub_core::db::default_database_url()?,
    };
    log::debug!("database: {database_url}");

    let pool = labelhub_core::db::connect(&database_url, MAX_CONNECTIONS).await?;
    labelhub_core::migrate::migrate(&pool).await?;
    Ok(pool)
}

async fn create_user(pool: &SqlitePool, args: CreateUserArgs) -> Result<()> {
    let role = if args.admin { Role::Admin } else { Role::Annotator };
    let user = auth::create_account(pool, &args.email, &args.password, role).await?;
    log::info!("created user {} ({})", user.email, user.role);
    println!("{}\t{}\t{}", user.id, user.email, user.role);
    Ok(())
}

async fn purge_tokens(pool: &SqlitePool) -> Result<()> {
    let purged = TokenAuthenticator::new(pool.clone()).purge_expired().await?;
    println!("purged {purged} expired token pair(s)");
    Ok(())
}

async fn create_sample_data(pool: &SqlitePool, args: SampleDataArgs) -> Result<()> {
    let mut grantees = Vec::with_capacity(args.grant.len());
    for email in &args.grant {
        let Some(record) = auth::queries::find_user_by_email(pool, email).await? else {
            return Err(Error::Custom(format!("no user with email {email}")));
        };
        grantees.push(record.user);
    }

    let dataset = datasets::create_dataset(
        pool,
        &args.name,
        DatasetType::Entity,
        Some(json!({
            "entityTags": ["PERSON", "ORG", "LOCATION"],
            "relationshipTags": ["WORKS_FOR", "LOCATED_IN"],
        })),
    )
    .await?;

    let labeled = [
        (
            "Acme hired Jane Doe in Berlin.",
            SampleStatus::Accepted,
            json!({
                "entities": [[0, 4, "ORG"], [11, 19, "PERSON"], [23, 29, "LOCATION"]],
                "relationships": [[1, 0, "WORKS_FOR"]],
            }),
        ),
        (
            "It rained all week.",
            SampleStatus::Rejected,
            json!({"entities": [], "relationships": []}),
        ),
        (
            "Globex may open an office near Springfield.",
            SampleStatus::Uncertain,
            json!({"entities": [[0, 6, "ORG"], [31, 42, "LOCATION"]], "relationships": []}),
        ),
    ];
    let total = labeled.len() + args.unlabeled;
    for (text, status, annotations) in labeled {
        datasets::add_sample(
            pool,
            dataset.id,
            NewSample {
                data: text.to_string(),
                status: Some(status),
                annotations: Some(annotations),
                metadata: Some(json!({"source": "demo"})),
                ..NewSample::default()
            },
        )
        .await?;
    }

    for n in 1..=args.unlabeled {
        datasets::add_sample(
            pool,
            dataset.id,
            NewSample {
                data: format!("Unlabeled sentence number {n} about Initech in Austin."),
                annotations: Some(json!({"entities": [], "relationships": []})),
                metadata: Some(json!({"source": "demo", "index": n})),
                ..NewSample::default()
            },
        )
        .await?;
    }

    for user in &grantees {
        permissions::grant_access(pool, user.id, dataset.id).await?;
        log::info!("granted {} access to dataset {}", user.email, dataset.id);
    }

    println!(
        "dataset {} '{}' with {} samples",
        dataset.id,
        dataset.name,
        total
    );
    Ok(())
}
