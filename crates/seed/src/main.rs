use clap::Parser;
use coeus_core::{build_http_client, Config, ResourceClient};
use fhir::FhirResource;
use serde_json::Value;
use synthesis::{LookupConfig, LookupDb};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod resources;
mod synthesis;

#[derive(Parser)]
#[command(name = "coeus-seed")]
#[command(about = "Seed the FHIR server with demo clinics, practitioners and patients")]
struct Cli {
    /// Number of random practitioners to create
    #[arg(long, default_value_t = 5)]
    practitioners: usize,
    /// Number of random patients to create in addition to the demo patient
    #[arg(long, default_value_t = 0)]
    patients: usize,
    /// Print the generated resources instead of posting them
    #[arg(long)]
    dry_run: bool,
}

/// Where generated resources go.
enum Target {
    DryRun,
    Server(ResourceClient),
}

impl Target {
    async fn submit<R>(&self, resource: &R) -> anyhow::Result<()>
    where
        R: FhirResource + serde::Serialize,
    {
        match self {
            Target::DryRun => {
                println!("{}", serde_json::to_string_pretty(resource)?);
            }
            Target::Server(client) => {
                let created: Value = client.create(R::RESOURCE_TYPE, resource).await?;
                let id = created.get("id").and_then(Value::as_str).unwrap_or("?");
                tracing::debug!(resource_type = R::RESOURCE_TYPE, %id, "created");
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coeus_seed=info".parse()?)
                .add_directive("coeus_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let target = if cli.dry_run {
        Target::DryRun
    } else {
        let config = Config::from_env()?;
        let http = build_http_client(config.http_timeout)?;
        let client = ResourceClient::new(http, &config.fhir);
        tracing::info!(
            "Seeding the FHIR server at {}. This may take a while...",
            client.base_url()
        );
        Target::Server(client)
    };

    tracing::info!("Creating patient");
    target.submit(&resources::demo_patient()).await?;

    tracing::info!("Creating locations");
    for location in resources::clinic_locations() {
        target.submit(&location).await?;
    }

    if cli.practitioners > 0 || cli.patients > 0 {
        let lookup = LookupDb::connect(&LookupConfig::from_env()?).await?;

        tracing::info!("Creating {} practitioners", cli.practitioners);
        for index in 0..cli.practitioners {
            let person = lookup.random_person().await?;
            target.submit(&resources::practitioner(index, &person)).await?;
        }

        if cli.patients > 0 {
            tracing::info!("Creating {} random patients", cli.patients);
        }
        for _ in 0..cli.patients {
            let person = lookup.random_person().await?;
            target.submit(&resources::random_patient(&person)).await?;
        }
    }

    tracing::info!("Done seeding");
    Ok(())
}
