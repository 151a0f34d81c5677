use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "labelhub", about = "Labelhub operator CLI", version)]
pub struct Cli {
    /// SQLite connection URL. Defaults to a file in the user data directory.
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending database migrations.
    Migrate,

    /// Create a user account.
    CreateUser(CreateUserArgs),

    /// Create a demo dataset with a mix of labeled and unlabeled samples.
    CreateSampleData(SampleDataArgs),

    /// Delete token pairs whose refresh token has expired.
    PurgeTokens,

    /// Print the version.
    Version,
}

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    /// Email address used to log in.
    #[arg(short = 'u', long)]
    pub email: String,

    /// Password (at least 8 characters).
    #[arg(short = 'p', long)]
    pub password: String,

    /// Create the user as an admin.
    #[arg(long)]
    pub admin: bool,
}

#[derive(Args, Debug)]
pub struct SampleDataArgs {
    /// Name of the dataset to create.
    #[arg(long, default_value = "Demo dataset")]
    pub name: String,

    /// Number of unlabeled samples to add next to the labeled ones.
    #[arg(long, default_value_t = 5)]
    pub unlabeled: usize,

    /// Grant access to the new dataset to these users (by email).
    #[arg(long = "grant", value_name = "EMAIL")]
    pub grant: Vec<String>,
}
