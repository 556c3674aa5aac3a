//! CLI command definitions and argument parsing.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use customs_domain::{CustomerId, CustomerSort, FolderId, FolderSort, FolderStatus, SortDirection};
use std::path::PathBuf;

/// Customs clearance - track customers, folders and declaration milestones.
#[derive(Debug, Parser)]
#[command(name = "customs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CUSTOMS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configuration
    #[arg(long, global = true, env = "CUSTOMS_DB")]
    pub database: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },

    /// Manage clearance folders
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },

    /// Record declaration milestones
    Declaration {
        #[command(subcommand)]
        action: DeclarationAction,
    },
}

/// Customer actions.
#[derive(Debug, Subcommand)]
pub enum CustomerAction {
    /// Onboard a new customer
    Create(CreateCustomerArgs),

    /// Edit a customer
    Update(UpdateCustomerArgs),

    /// Show a customer and its granted capabilities
    Show {
        /// Customer id
        id: CustomerId,
    },

    /// List customers
    List(ListCustomersArgs),

    /// Reactivate a customer
    Activate {
        /// Customer id
        id: CustomerId,
    },

    /// Deactivate a customer
    Deactivate {
        /// Customer id
        id: CustomerId,
    },

    /// Check a credential against the stored one
    Verify {
        /// Customer id
        id: CustomerId,

        /// Credential to check
        #[arg(long, env = "CUSTOMS_CREDENTIAL", hide_env_values = true)]
        credential: String,
    },
}

/// Arguments for `customer create`.
#[derive(Debug, Args)]
pub struct CreateCustomerArgs {
    /// Regulatory identifier (NIF)
    pub regulatory_id: String,

    /// Given name
    #[arg(long)]
    pub first_name: String,

    /// Family name
    #[arg(long)]
    pub last_name: String,

    /// Phone number
    #[arg(long)]
    pub phone: String,

    /// E-mail address
    #[arg(long)]
    pub email: String,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Initial credential
    #[arg(long, env = "CUSTOMS_CREDENTIAL", hide_env_values = true)]
    pub credential: String,
}

/// Arguments for `customer update`.
#[derive(Debug, Args)]
pub struct UpdateCustomerArgs {
    /// Customer id
    pub id: CustomerId,

    /// New regulatory identifier
    #[arg(long = "nif")]
    pub regulatory_id: Option<String>,

    /// New given name
    #[arg(long)]
    pub first_name: Option<String>,

    /// New family name
    #[arg(long)]
    pub last_name: Option<String>,

    /// New phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// New e-mail address
    #[arg(long)]
    pub email: Option<String>,

    /// New postal address
    #[arg(long, conflicts_with = "clear_address")]
    pub address: Option<String>,

    /// Remove the postal address
    #[arg(long)]
    pub clear_address: bool,

    /// Replacement credential
    #[arg(long)]
    pub credential: Option<String>,
}

/// Arguments for `customer list`.
#[derive(Debug, Args)]
pub struct ListCustomersArgs {
    /// Case-insensitive search over NIF, names, phone and e-mail
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only active customers
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    /// Only deactivated customers
    #[arg(long)]
    pub inactive: bool,

    /// Sort column
    #[arg(long, value_enum, default_value = "created")]
    pub sort: CustomerSortArg,

    #[command(flatten)]
    pub page: PageArgs,
}

/// Folder actions.
#[derive(Debug, Subcommand)]
pub enum FolderAction {
    /// Open a folder for a customer
    Create(CreateFolderArgs),

    /// Show a folder with its customer and milestones
    Show {
        /// Folder id
        id: FolderId,
    },

    /// Show the derived status of a folder
    Status {
        /// Folder id
        id: FolderId,
    },

    /// List folders
    List(ListFoldersArgs),

    /// Book and list folder expenses
    Expense {
        #[command(subcommand)]
        action: ExpenseAction,
    },
}

/// Expense actions.
#[derive(Debug, Subcommand)]
pub enum ExpenseAction {
    /// Book an expense against a folder
    Add(AddExpenseArgs),

    /// List the expenses of a folder
    List {
        /// Folder id
        folder: FolderId,
    },
}

/// Arguments for `folder expense add`.
#[derive(Debug, Args)]
pub struct AddExpenseArgs {
    /// Folder id
    pub folder: FolderId,

    /// Kind of expense
    #[arg(long = "type")]
    pub kind: String,

    /// Amount
    #[arg(long)]
    pub amount: Option<f64>,

    /// What was paid for
    #[arg(long)]
    pub description: String,
}

/// Arguments for `folder create`.
#[derive(Debug, Args)]
pub struct CreateFolderArgs {
    /// Folder number
    pub number: String,

    /// Owning customer id
    #[arg(long)]
    pub customer: CustomerId,

    /// Total weight in kilograms
    #[arg(long)]
    pub weight: f64,

    /// Harbor of arrival
    #[arg(long)]
    pub harbor: String,

    /// Container number
    #[arg(long)]
    pub container: Option<String>,
}

/// Arguments for `folder list`.
#[derive(Debug, Args)]
pub struct ListFoldersArgs {
    /// Only folders in this status
    #[arg(long)]
    pub status: Option<FolderStatus>,

    /// Only folders of this customer
    #[arg(long)]
    pub customer: Option<CustomerId>,

    /// Case-insensitive search over folder number, harbor, container and NIF
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort column
    #[arg(long, value_enum, default_value = "created")]
    pub sort: FolderSortArg,

    #[command(flatten)]
    pub page: PageArgs,
}

/// Paging and direction shared by listings.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,

    /// 1-based page number
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    pub per_page: Option<u32>,
}

impl PageArgs {
    /// Requested sort direction
    pub fn direction(&self) -> SortDirection {
        if self.asc {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }
}

/// Declaration actions.
#[derive(Debug, Subcommand)]
pub enum DeclarationAction {
    /// File the customs declaration of a folder
    File(FileDeclarationArgs),

    /// Record the duty liquidation
    Liquidate(StageArgs),

    /// Record the payment receipt
    Receipt(StageArgs),

    /// Record the release order
    Release(StageArgs),

    /// Show the milestone record of a folder
    Show {
        /// Folder id
        folder: FolderId,
    },
}

/// Arguments for `declaration file`.
#[derive(Debug, Args)]
pub struct FileDeclarationArgs {
    /// Folder id
    pub folder: FolderId,

    /// Declaration number
    pub number: String,

    /// Customs office of destination
    #[arg(long)]
    pub office: String,

    /// Customs verifier
    #[arg(long)]
    pub verifier: String,

    /// Filing date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Scanned document to attach
    #[arg(long)]
    pub document: Option<PathBuf>,
}

/// Arguments for the liquidation, receipt and release stages.
#[derive(Debug, Args)]
pub struct StageArgs {
    /// Folder id
    pub folder: FolderId,

    /// Bulletin, receipt or release order number
    pub reference: String,

    /// Stage date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Scanned document to attach
    #[arg(long)]
    pub document: Option<PathBuf>,
}

/// Folder sort columns.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FolderSortArg {
    /// Folder number
    Number,
    /// Container number
    Container,
    /// Weight
    Weight,
    /// Harbor
    Harbor,
    /// Lifecycle status
    Status,
    /// Opening date
    Created,
    /// Customer NIF
    Customer,
}

/// Customer sort columns.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CustomerSortArg {
    /// Regulatory id
    Nif,
    /// Last then first name
    Name,
    /// Phone
    Phone,
    /// E-mail
    Email,
    /// Active flag
    Active,
    /// Onboarding date
    Created,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<FolderSortArg> for FolderSort {
    fn from(sort: FolderSortArg) -> Self {
        match sort {
            FolderSortArg::Number => FolderSort::Number,
            FolderSortArg::Container => FolderSort::ContainerNumber,
            FolderSortArg::Weight => FolderSort::Weight,
            FolderSortArg::Harbor => FolderSort::Harbor,
            FolderSortArg::Status => FolderSort::Status,
            FolderSortArg::Created => FolderSort::CreatedAt,
            FolderSortArg::Customer => FolderSort::Customer,
        }
    }
}

impl From<CustomerSortArg> for CustomerSort {
    fn from(sort: CustomerSortArg) -> Self {
        match sort {
            CustomerSortArg::Nif => CustomerSort::RegulatoryId,
            CustomerSortArg::Name => CustomerSort::Name,
            CustomerSortArg::Phone => CustomerSort::Phone,
            CustomerSortArg::Email => CustomerSort::Email,
            CustomerSortArg::Active => CustomerSort::Active,
            CustomerSortArg::Created => CustomerSort::CreatedAt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_create_command() {
        let cli = Cli::parse_from([
            "customs",
            "customer",
            "create",
            "C-001",
            "--first-name",
            "Awa",
            "--last-name",
            "Diop",
            "--phone",
            "+221770000001",
            "--email",
            "awa@example.com",
            "--credential",
            "correct-horse",
        ]);
        match cli.command {
            Command::Customer {
                action: CustomerAction::Create(args),
            } => {
                assert_eq!(args.regulatory_id, "C-001");
                assert!(args.address.is_none());
            }
            _ => panic!("Expected customer create command"),
        }
    }

    #[test]
    fn test_stage_command_parses_ids_and_dates() {
        let folder = FolderId::new();
        let id = folder.to_string();
        let cli = Cli::parse_from([
            "customs", "declaration", "receipt", id.as_str(), "R-1", "--date", "2024-03-05",
        ]);
        match cli.command {
            Command::Declaration {
                action: DeclarationAction::Receipt(args),
            } => {
                assert_eq!(args.folder, folder);
                assert_eq!(args.reference, "R-1");
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 3, 5));
            }
            _ => panic!("Expected declaration receipt command"),
        }
    }

    #[test]
    fn test_folder_list_filters() {
        let cli = Cli::parse_from([
            "customs", "folder", "list", "--status", "released", "--sort", "status", "--asc",
        ]);
        match cli.command {
            Command::Folder {
                action: FolderAction::List(args),
            } => {
                assert_eq!(args.status, Some(FolderStatus::Released));
                assert!(matches!(FolderSort::from(args.sort), FolderSort::Status));
                assert_eq!(args.page.direction(), SortDirection::Ascending);
                assert_eq!(args.page.page, 1);
            }
            _ => panic!("Expected folder list command"),
        }
    }

    #[test]
    fn test_expense_add_command() {
        let folder = FolderId::new();
        let id = folder.to_string();
        let cli = Cli::parse_from([
            "customs", "folder", "expense", "add", id.as_str(), "--type", "Magasinage",
            "--amount", "150000", "--description", "Port storage",
        ]);
        match cli.command {
            Command::Folder {
                action: FolderAction::Expense {
                    action: ExpenseAction::Add(args),
                },
            } => {
                assert_eq!(args.folder, folder);
                assert_eq!(args.kind, "Magasinage");
                assert_eq!(args.amount, Some(150_000.0));
            }
            _ => panic!("Expected folder expense add command"),
        }
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let result = Cli::try_parse_from(["customs", "folder", "show", "not-a-uuid"]);
        assert!(result.is_err());
    }
}
