use std::{error::Error, io::Write};

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Actor, Engine, EngineError, Money, NewCustomer, NewUser, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

/// Identity recorded in logs for changes made from this tool.
const ADMIN_ACTOR: &str = "collecta_admin";

#[derive(Parser, Debug)]
#[command(name = "collecta_admin")]
#[command(about = "Admin utilities for Collecta (bootstrap users/customers)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./collecta.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Customer(Customer),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    Deactivate(UserDeactivateArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Admin,
    Agent,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Role::Admin,
            RoleArg::Agent => Role::Agent,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// Name shown on statements; defaults to the username.
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long, value_enum, default_value_t = RoleArg::Agent)]
    role: RoleArg,
}

#[derive(Args, Debug)]
struct UserDeactivateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Customer {
    #[command(subcommand)]
    command: CustomerCommand,
}

#[derive(Subcommand, Debug)]
enum CustomerCommand {
    Create(CustomerCreateArgs),
}

#[derive(Args, Debug)]
struct CustomerCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: Option<String>,
    /// Opening balance in rupees, e.g. `-250.50`.
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    opening: Money,
    /// Username of the agent collecting from this customer.
    #[arg(long)]
    agent: Option<String>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;
    let admin = Actor::admin(ADMIN_ACTOR);

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let display_name = args
                .display_name
                .unwrap_or_else(|| args.username.clone());

            let user = match engine
                .create_user(
                    NewUser {
                        username: args.username,
                        password,
                        display_name,
                    },
                    args.role.into(),
                    Utc::now(),
                )
                .await
            {
                Ok(user) => user,
                Err(EngineError::ExistingKey(username)) => {
                    eprintln!("user already exists: {username}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            };

            println!("created {}: {}", user.role.as_str(), user.username);
        }
        Command::User(User {
            command: UserCommand::Deactivate(args),
        }) => {
            engine.deactivate_agent(&admin, &args.username).await?;
            println!("deactivated agent: {}", args.username);
        }
        Command::Customer(Customer {
            command: CustomerCommand::Create(args),
        }) => {
            let customer = engine
                .create_customer(
                    &admin,
                    NewCustomer {
                        name: args.name,
                        phone: args.phone,
                        opening_balance: args.opening,
                        agent_id: args.agent,
                    },
                    Utc::now(),
                )
                .await?;
            println!(
                "created customer: {} (#{}, opening {})",
                customer.name,
                customer.id,
                customer.opening_balance.format(engine::Currency::default())
            );
        }
    }

    Ok(())
}
