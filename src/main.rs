use clap::{Args, Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use tabql::MatchMode;
use tabql::cli::{self, CheckResult, CliError, QueryOptions};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(ClapParser)]
#[command(name = "tabql")]
#[command(about = "tabql - filter, group and order rows of JSON with a small expression language")]
#[command(version)]
struct Cli {
    /// Log filter directives, e.g. `tabql=debug`
    #[arg(long, global = true, env = "TABQL_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a filter / group / order pipeline over a JSON array of objects
    Query(QueryArgs),

    /// Validate a filter expression and print how it groups
    Check {
        /// The filter expression
        expr: String,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Exact-match filter, e.g. "name='CN' and (code='BJS' or id=3)"
    #[arg(long = "where", value_name = "EXPR")]
    where_expr: Option<String>,

    /// Wildcard filter, `%` matches any run of characters
    #[arg(long, value_name = "EXPR")]
    like: Option<String>,

    /// Regular expression filter
    #[arg(long, value_name = "EXPR")]
    find: Option<String>,

    /// Columns to group by, e.g. "name, code"
    #[arg(long, value_name = "COLUMNS")]
    group_by: Option<String>,

    /// Columns to order by, e.g. "id desc, name"
    #[arg(long, value_name = "COLUMNS")]
    order_by: Option<String>,

    /// JSON input (reads from stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,

    /// Remove $GroupKey$ / $GroupCount$ from grouped rows
    #[arg(long)]
    strip_annotations: bool,

    /// Fail on a malformed filter instead of returning all rows
    #[arg(long)]
    strict: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let result = match cli.command {
        Commands::Query(args) => run_query(args),
        Commands::Check { expr } => run_check(&expr),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(directives: &str) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .parse_lossy(directives);
    let subscriber = FmtSubscriber::builder()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .finish();
    // Only fails if a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run_query(args: QueryArgs) -> Result<(), CliError> {
    let filters = [
        (args.where_expr, MatchMode::Exact),
        (args.like, MatchMode::Wildcard),
        (args.find, MatchMode::Regex),
    ];
    let mut given = filters
        .into_iter()
        .filter_map(|(expr, mode)| expr.map(|e| (e, mode)));
    let filter = given.next();
    if given.next().is_some() {
        return Err(CliError::ConflictingFilters);
    }

    let input = match args.input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = QueryOptions {
        input,
        filter,
        group_by: args.group_by,
        order_by: args.order_by,
        strip_annotations: args.strip_annotations,
        pretty: args.pretty,
        strict: args.strict,
    };

    println!("{}", cli::execute_query(&options)?);
    Ok(())
}

fn run_check(expr: &str) -> Result<(), CliError> {
    match cli::execute_check(expr)? {
        CheckResult::Empty => println!("Expression is empty; tables pass through unchanged"),
        CheckResult::Valid(tree) => println!("{}", tree),
    }
    Ok(())
}
