use std::error::Error;

use clap::{Args, Parser, Subcommand};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use ledger::{Account, AccountKind, Ledger, LineSpec, MoneyCents, PostEntryCmd};
use migration::MigratorTrait;

#[derive(Parser, Debug)]
#[command(name = "veritas_admin")]
#[command(about = "Admin utilities for the Veritas demo bank (bootstrap users/accounts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./veritas.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Account(AccountCmd),
    /// Load the demo fixtures: alice, bob and the bank reserve, with
    /// opening balances posted through the ledger.
    Seed,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    full_name: Option<String>,
}

#[derive(Args, Debug)]
struct AccountCmd {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    List(AccountListArgs),
    Freeze(AccountIdArgs),
    Unfreeze(AccountIdArgs),
    SetLimit(SetLimitArgs),
}

#[derive(Args, Debug)]
struct AccountListArgs {
    #[arg(long)]
    owner: String,
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long, default_value = "checking")]
    kind: String,
    /// Daily spending limit, in dollars (e.g. "5000" or "5000.00").
    #[arg(long, default_value = "5000")]
    daily_limit: String,
}

#[derive(Args, Debug)]
struct AccountIdArgs {
    #[arg(long)]
    account_id: Uuid,
}

#[derive(Args, Debug)]
struct SetLimitArgs {
    #[arg(long)]
    account_id: Uuid,
    /// Daily spending limit, in dollars (e.g. "5000" or "5000.00").
    #[arg(long)]
    daily_limit: String,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    full_name: Option<String>,
) -> Result<bool, Box<dyn Error + Send + Sync>> {
    if ledger::users::Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    let user = ledger::users::ActiveModel {
        username: Set(username.to_string()),
        full_name: Set(full_name),
        role: Set("USER".to_string()),
    };
    ledger::users::Entity::insert(user).exec(db).await?;
    Ok(true)
}

async fn create_account(
    db: &DatabaseConnection,
    owner: &str,
    kind: AccountKind,
    daily_limit_cents: i64,
) -> Result<Account, Box<dyn Error + Send + Sync>> {
    if ledger::users::Entity::find_by_id(owner.to_string())
        .one(db)
        .await?
        .is_none()
    {
        eprintln!("user not found: {owner}");
        std::process::exit(1);
    }

    let account = Account::new(owner.to_string(), kind, daily_limit_cents);
    ledger::accounts::ActiveModel::from(&account).insert(db).await?;
    Ok(account)
}

async fn set_frozen(
    db: &DatabaseConnection,
    account_id: Uuid,
    frozen: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(account) = ledger::accounts::Entity::find_by_id(account_id.to_string())
        .one(db)
        .await?
    else {
        eprintln!("account not found: {account_id}");
        std::process::exit(1);
    };

    let mut account: ledger::accounts::ActiveModel = account.into();
    account.frozen = Set(frozen);
    account.update(db).await?;
    Ok(())
}

/// Post an opening balance from the reserve account, with a deterministic
/// token so re-running the seed never double-funds.
async fn fund(
    ledger: &Ledger,
    reserve: &Account,
    account: &Account,
    amount_cents: i64,
    token: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    ledger
        .post(
            PostEntryCmd::new(
                token,
                vec![
                    LineSpec::new(reserve.id, -amount_cents),
                    LineSpec::new(account.id, amount_cents),
                ],
            )
            .description("opening balance")
            .initiated_by("veritas_reserve"),
        )
        .await?;
    Ok(())
}

async fn seed(db: &DatabaseConnection) -> Result<(), Box<dyn Error + Send + Sync>> {
    for (username, full_name) in [
        ("veritas_reserve", None),
        ("alice", Some("Alice Johnson".to_string())),
        ("bob", Some("Bob Smith".to_string())),
    ] {
        if !create_user(db, username, full_name).await? {
            eprintln!("seed: user already exists, aborting: {username}");
            std::process::exit(1);
        }
    }

    let reserve = create_account(db, "veritas_reserve", AccountKind::Checking, i64::MAX).await?;
    let alice_checking = create_account(db, "alice", AccountKind::Checking, 500_000).await?;
    let alice_savings = create_account(db, "alice", AccountKind::Savings, 500_000).await?;
    let bob_checking = create_account(db, "bob", AccountKind::Checking, 500_000).await?;

    let ledger = Ledger::builder().database(db.clone()).build().await?;
    fund(&ledger, &reserve, &alice_checking, 150_000, "seed-alice-checking").await?;
    fund(&ledger, &reserve, &alice_savings, 250_000, "seed-alice-savings").await?;
    fund(&ledger, &reserve, &bob_checking, 80_000, "seed-bob-checking").await?;

    println!("seeded demo data:");
    println!("  alice checking {} ({})", alice_checking.id, MoneyCents::new(150_000));
    println!("  alice savings  {} ({})", alice_savings.id, MoneyCents::new(250_000));
    println!("  bob   checking {} ({})", bob_checking.id, MoneyCents::new(80_000));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            if !create_user(&db, &args.username, args.full_name).await? {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }
            println!("created user: {}", args.username);
        }
        Command::Account(AccountCmd {
            command: AccountCommand::Create(args),
        }) => {
            let kind = match AccountKind::try_from(args.kind.as_str()) {
                Ok(kind) => kind,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let limit = match args.daily_limit.parse::<MoneyCents>() {
                Ok(limit) => limit,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let account = create_account(&db, &args.owner, kind, limit.cents()).await?;
            println!(
                "created account {} for {} (daily limit {})",
                account.id, account.user_id, limit
            );
        }
        Command::Account(AccountCmd {
            command: AccountCommand::List(args),
        }) => {
            let ledger = Ledger::builder().database(db.clone()).build().await?;
            for account in ledger.accounts_for_user(&args.owner).await? {
                let balance = ledger.balance(account.id).await?;
                println!(
                    "{} {} {} balance {} limit {}{}",
                    account.id,
                    account.kind.as_str(),
                    account.currency,
                    MoneyCents::new(balance),
                    MoneyCents::new(account.daily_limit_cents),
                    if account.frozen { " [frozen]" } else { "" },
                );
            }
        }
        Command::Account(AccountCmd {
            command: AccountCommand::Freeze(args),
        }) => {
            set_frozen(&db, args.account_id, true).await?;
            println!("froze account {}", args.account_id);
        }
        Command::Account(AccountCmd {
            command: AccountCommand::Unfreeze(args),
        }) => {
            set_frozen(&db, args.account_id, false).await?;
            println!("unfroze account {}", args.account_id);
        }
        Command::Account(AccountCmd {
            command: AccountCommand::SetLimit(args),
        }) => {
            let limit = match args.daily_limit.parse::<MoneyCents>() {
                Ok(limit) => limit,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let Some(account) = ledger::accounts::Entity::find_by_id(args.account_id.to_string())
                .one(&db)
                .await?
            else {
                eprintln!("account not found: {}", args.account_id);
                std::process::exit(1);
            };
            let mut account: ledger::accounts::ActiveModel = account.into();
            account.daily_limit_cents = Set(limit.cents());
            account.update(&db).await?;

            println!("set daily limit of {} to {}", args.account_id, limit);
        }
        Command::Seed => seed(&db).await?,
    }

    Ok(())
}
