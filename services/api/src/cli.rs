use crate::demo::run_demo;
use crate::infra::{build_service, print_json};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mortgage_qualify::config::AppConfig;
use mortgage_qualify::error::AppError;
use mortgage_qualify::qualification::{
    AnalysisModeInput, BorrowingPowerQuery, CompensatingFactorSelection, FinancialProfile,
    LoanTermsInput, QualificationQuery,
};

#[derive(Parser, Debug)]
#[command(
    name = "Mortgage Qualify",
    about = "Resolve DTI limits, payments and borrowing power for FHA and Conventional loans",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Solve the maximum PITI for one program, or evaluate a proposed payment
    Solve(SolveArgs),
    /// Compare FHA and Conventional borrowing power side by side
    Compare(CompareArgs),
    /// Walk sample borrowers through both programs
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct BorrowerArgs {
    /// Gross annual income in dollars
    #[arg(long)]
    pub(crate) income: f64,
    /// Monthly non-housing debt payments in dollars
    #[arg(long, default_value_t = 0.0)]
    pub(crate) debts: f64,
    /// Credit score (300-850)
    #[arg(long)]
    pub(crate) fico: u16,
    /// Compensating factor selection, e.g. `--factor cashReserves="6+ months"`
    #[arg(long = "factor", value_parser = parse_factor)]
    pub(crate) factors: Vec<(String, String)>,
}

impl BorrowerArgs {
    fn selection(&self) -> CompensatingFactorSelection {
        self.factors.iter().cloned().collect()
    }

    fn profile(&self, ltv: f64) -> FinancialProfile {
        FinancialProfile {
            annual_income: self.income,
            monthly_debts: self.debts,
            fico: self.fico,
            ltv,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct SolveArgs {
    #[command(flatten)]
    pub(crate) borrower: BorrowerArgs,
    /// Loan-to-value percentage
    #[arg(long)]
    pub(crate) ltv: f64,
    /// Loan program (fha or conventional)
    #[arg(long)]
    pub(crate) program: String,
    /// Evaluate this monthly payment instead of solving for the maximum
    #[arg(long)]
    pub(crate) proposed_piti: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    #[command(flatten)]
    pub(crate) borrower: BorrowerArgs,
}

pub(crate) fn parse_factor(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, found '{raw}'"))?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return Err(format!("factor key and value must be non-empty in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Solve(args) => run_solve(args),
        Command::Compare(args) => run_compare(args),
        Command::Demo => run_demo(),
    }
}

fn run_solve(args: SolveArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let (service, _) = build_service(config.loan_terms);

    let result = service.solve(QualificationQuery {
        profile_id: None,
        profile: args.borrower.profile(args.ltv),
        factors: args.borrower.selection(),
        program: args.program,
        terms: LoanTermsInput::default(),
        proposed_piti: args.proposed_piti,
    })?;
    print_json(&result)
}

fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let (service, _) = build_service(config.loan_terms);

    // Each program substitutes its own preset LTV during comparison.
    let outcome = service.borrowing_power(BorrowingPowerQuery {
        profile_id: None,
        profile: args.borrower.profile(95.0),
        factors: args.borrower.selection(),
        terms: LoanTermsInput::default(),
        mode: AnalysisModeInput::Compare,
        program: None,
    })?;
    print_json(&outcome)
}
