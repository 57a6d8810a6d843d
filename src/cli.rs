use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use truevault_client::{BlobUpload, VaultClient};

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Debug, Parser)]
#[command(name = "truevault")]
#[command(about = "Command line access to the TrueVault API")]
#[command(version)]
pub struct Cli {
    /// API key, sent as the Basic auth username.
    #[arg(long, env = "TV_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "TV_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// API version prefix (default: v1).
    #[arg(long, env = "TV_API_VERSION")]
    pub api_version: Option<String>,

    /// Override the service root, e.g. for a proxy.
    #[arg(long, env = "TV_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the API is reachable.
    Health,

    /// List vaults of the account.
    Vaults,

    /// Manage documents.
    #[command(subcommand)]
    Document(DocumentCommand),

    /// Manage blobs.
    #[command(subcommand)]
    Blob(BlobCommand),

    /// Manage vault schemas.
    #[command(subcommand)]
    Schema(SchemaCommand),

    /// Manage users.
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Debug, Args)]
pub struct VaultArg {
    #[arg(short, long)]
    pub vault: String,
}

#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    Create {
        #[command(flatten)]
        vault: VaultArg,
        /// Document as inline JSON.
        #[arg(value_parser = parse_json)]
        fields: Value,
    },
    Get {
        #[command(flatten)]
        vault: VaultArg,
        id: String,
    },
    Update {
        #[command(flatten)]
        vault: VaultArg,
        id: String,
        #[arg(value_parser = parse_json)]
        fields: Value,
    },
    Delete {
        #[command(flatten)]
        vault: VaultArg,
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum BlobCommand {
    Create {
        #[command(flatten)]
        vault: VaultArg,
        file: PathBuf,
    },
    Get {
        #[command(flatten)]
        vault: VaultArg,
        id: String,
        /// Write the blob here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    Replace {
        #[command(flatten)]
        vault: VaultArg,
        id: String,
        file: PathBuf,
    },
    Delete {
        #[command(flatten)]
        vault: VaultArg,
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    List {
        #[command(flatten)]
        vault: VaultArg,
    },
    Create {
        #[command(flatten)]
        vault: VaultArg,
        #[arg(value_parser = parse_json)]
        schema: Value,
    },
    Get {
        #[command(flatten)]
        vault: VaultArg,
        id: String,
    },
    Update {
        #[command(flatten)]
        vault: VaultArg,
        id: String,
        #[arg(value_parser = parse_json)]
        schema: Value,
    },
    Delete {
        #[command(flatten)]
        vault: VaultArg,
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    List,
    Create {
        #[arg(value_parser = parse_json)]
        fields: Value,
    },
    Get {
        id: String,
    },
    Update {
        id: String,
        #[arg(value_parser = parse_json)]
        fields: Value,
    },
    Delete {
        id: String,
    },
}

/// What a command produced
#[derive(Debug)]
pub enum Output {
    Json(Value),
    Bytes(Vec<u8>),
    Written(PathBuf),
}

fn parse_json(raw: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))
}

impl Cli {
    pub fn client(&self) -> Result<VaultClient> {
        let mut builder = VaultClient::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(ref api_key) = self.api_key {
            builder = builder.api_key(api_key);
        }
        if let Some(ref account_id) = self.account_id {
            builder = builder.account_id(account_id);
        }
        if let Some(ref api_version) = self.api_version {
            builder = builder.api_version(api_version);
        }
        if let Some(ref base_url) = self.base_url {
            builder = builder.base_url(base_url);
        }
        Ok(builder.build()?)
    }
}

pub async fn run(cli: Cli) -> Result<Output> {
    let client = cli.client()?;

    let response = match cli.command {
        Command::Health => client.health_check().await?,
        Command::Vaults => client.list_vaults().await?,
        Command::Document(cmd) => match cmd {
            DocumentCommand::Create { vault, fields } => {
                client.create_document(&vault.vault, &fields).await?
            }
            DocumentCommand::Get { vault, id } => client.get_document(&vault.vault, &id).await?,
            DocumentCommand::Update { vault, id, fields } => {
                client.update_document(&vault.vault, &id, &fields).await?
            }
            DocumentCommand::Delete { vault, id } => {
                client.delete_document(&vault.vault, &id).await?
            }
        },
        Command::Blob(cmd) => match cmd {
            BlobCommand::Create { vault, file } => client.create_blob(&vault.vault, file).await?,
            BlobCommand::Get { vault, id, output } => {
                let bytes = client.get_blob(&vault.vault, &id).await?;
                return match output {
                    Some(path) => {
                        tokio::fs::write(&path, &bytes).await?;
                        tracing::info!(path = %path.display(), size = bytes.len(), "Blob saved");
                        Ok(Output::Written(path))
                    }
                    None => Ok(Output::Bytes(bytes)),
                };
            }
            BlobCommand::Replace { vault, id, file } => {
                let upload = BlobUpload::from_path(file).await?;
                client.replace_blob(&vault.vault, &id, upload).await?
            }
            BlobCommand::Delete { vault, id } => client.delete_blob(&vault.vault, &id).await?,
        },
        Command::Schema(cmd) => match cmd {
            SchemaCommand::List { vault } => client.list_schemas(&vault.vault).await?,
            SchemaCommand::Create { vault, schema } => {
                client.create_schema(&vault.vault, &schema).await?
            }
            SchemaCommand::Get { vault, id } => client.get_schema(&vault.vault, &id).await?,
            SchemaCommand::Update { vault, id, schema } => {
                client.update_schema(&vault.vault, &id, &schema).await?
            }
            SchemaCommand::Delete { vault, id } => client.delete_schema(&vault.vault, &id).await?,
        },
        Command::User(cmd) => match cmd {
            UserCommand::List => client.list_users().await?,
            UserCommand::Create { fields } => client.create_user(&fields).await?,
            UserCommand::Get { id } => client.get_user(&id).await?,
            UserCommand::Update { id, fields } => client.update_user(&id, &fields).await?,
            UserCommand::Delete { id } => client.delete_user(&id).await?,
        },
    };

    if !response.is_success() {
        tracing::warn!(
            result = response.result().unwrap_or("<missing>"),
            transaction_id = response.transaction_id().unwrap_or("<missing>"),
            "TrueVault did not report success"
        );
    }

    Ok(Output::Json(response.into()))
}
