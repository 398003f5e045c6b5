use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Paging and sorting shared by the list commands.
#[derive(ClapArgs, Clone, Debug, Default)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: i64,

    /// Items per page (default from config)
    #[arg(short, long)]
    pub limit: Option<i64>,

    /// Field to sort by
    #[arg(long, default_value = "")]
    pub order_by: String,

    /// Sort direction: asc or desc
    #[arg(long, default_value = "")]
    pub sort: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the configuration file to stdout
    Config {
        /// Write a default configuration file instead
        #[arg(long)]
        init: bool,
    },

    /// Manage products
    #[command(arg_required_else_help = true)]
    #[clap(visible_alias = "p")]
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// Manage orders
    #[command(arg_required_else_help = true)]
    #[clap(visible_alias = "o")]
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },

    /// Manage categories
    #[command(arg_required_else_help = true)]
    #[clap(visible_alias = "c")]
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Inspect users
    #[command(arg_required_else_help = true)]
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products
    #[clap(visible_alias = "ls")]
    List {
        /// Match against title and description
        #[arg(short, long)]
        search: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one product
    Get {
        #[arg(required = true)]
        id: String,
    },

    /// Create a product from a JSON file
    Create {
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: String,
    },

    /// Update a product from a JSON file
    Update {
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: String,
    },

    /// Delete a product with its images and category link
    #[clap(visible_alias = "rm")]
    Delete {
        #[arg(required = true)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// List orders
    #[clap(visible_alias = "ls")]
    List {
        /// Match against user id, address and contact
        #[arg(short, long)]
        search: Option<String>,

        /// Only orders in this status
        #[arg(long)]
        status: Option<String>,

        /// Start of the creation date range (YYYY-MM-DD)
        #[arg(long, requires = "end_date")]
        start_date: Option<String>,

        /// End of the creation date range (YYYY-MM-DD)
        #[arg(long, requires = "start_date")]
        end_date: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one order
    Get {
        #[arg(required = true)]
        id: String,
    },

    /// Place an order from a JSON file
    Create {
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: String,
    },

    /// Change the status of an order
    Status {
        #[arg(required = true)]
        id: String,

        /// waiting, shipping, completed or canceled
        #[arg(required = true)]
        status: String,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories
    #[clap(visible_alias = "ls")]
    List {
        /// Match against the title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Add one or more categories
    Add {
        #[arg(required = true, num_args = 1..)]
        titles: Vec<String>,
    },

    /// Delete a category
    #[clap(visible_alias = "rm")]
    Delete {
        #[arg(required = true)]
        id: i32,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Show one user with its role
    Get {
        #[arg(required = true)]
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_product_list() {
        let args = Args::parse_from([
            "shop", "products", "list", "-s", "tea", "--limit", "20", "--order-by", "price",
        ]);
        match args.command {
            Commands::Products {
                action: ProductAction::List { search, list },
            } => {
                assert_eq!(search.as_deref(), Some("tea"));
                assert_eq!(list.limit, Some(20));
                assert_eq!(list.page, 1);
                assert_eq!(list.order_by, "price");
            }
            _ => panic!("expected products list"),
        }
    }

    #[test]
    fn test_order_date_range_needs_both_ends() {
        let result = Args::try_parse_from(["shop", "orders", "list", "--start-date", "2024-01-01"]);
        assert!(result.is_err());
    }
}
