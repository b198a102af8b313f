use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use eventboard::{
    db,
    models::User,
    policy::{ApprovalState, ListScope},
    repositories::{EventRepository, SqliteEventRepository, SqliteUserRepository},
    services::{CreateUserRequest, UserService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "eventboard-cli")]
#[command(about = "CLI tool for administering the event board", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Event moderation commands
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Username
        #[arg(short, long)]
        username: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,

        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Grant admin rights
    Promote {
        #[arg(short, long)]
        email: String,
    },

    /// Revoke admin rights
    Demote {
        #[arg(short, long)]
        email: String,
    },

    /// Re-enable a disabled account
    Activate {
        #[arg(short, long)]
        email: String,
    },

    /// Disable an account; its tokens stop working immediately
    Deactivate {
        #[arg(short, long)]
        email: String,
    },

    /// Delete a user along with their events and saves
    Delete {
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum EventCommands {
    /// List events, newest first
    List {
        /// Only show events awaiting approval
        #[arg(long)]
        pending: bool,
    },

    /// Approve an event
    Approve {
        #[arg(long)]
        id: i64,
    },

    /// Move an event back to pending
    Reject {
        #[arg(long)]
        id: i64,
    },
}

fn get_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

async fn find_user(user_service: &UserService, email: &str) -> anyhow::Result<User> {
    match user_service.find_user_by_email(&email.to_lowercase()).await? {
        Some(user) => Ok(user),
        None => bail!("User '{}' not found", email),
    }
}

async fn run_user_command(user_service: &UserService, command: UserCommands) -> anyhow::Result<()> {
    match command {
        UserCommands::Create {
            email,
            username,
            password,
            admin,
        } => {
            let (password, password_confirm) = match password {
                Some(pw) => (pw.clone(), pw),
                None => (get_password("Password")?, get_password("Confirm password")?),
            };

            let user = user_service
                .create_user(CreateUserRequest {
                    email,
                    username,
                    password,
                    password_confirm: Some(password_confirm),
                    is_admin: admin,
                })
                .await
                .context("Failed to create user")?;

            println!("✅ User created successfully!");
            println!("  ID: {}", user.id);
            println!("  Email: {}", user.email);
            println!("  Username: {}", user.username);
            println!("  Admin: {}", user.is_admin);
        }

        UserCommands::List { limit, offset } => {
            let users = user_service.list_users(Some(limit), Some(offset)).await?;
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }

            println!(
                "{:<5} {:<32} {:<20} {:<6} {:<7} {:<20}",
                "ID", "Email", "Username", "Admin", "Active", "Created"
            );
            println!("{}", "-".repeat(95));
            for user in users {
                println!(
                    "{:<5} {:<32} {:<20} {:<6} {:<7} {:<20}",
                    user.id,
                    user.email,
                    user.username,
                    if user.is_admin { "Yes" } else { "No" },
                    if user.is_active { "Yes" } else { "No" },
                    user.created_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }

        UserCommands::Promote { email } => {
            let user = find_user(user_service, &email).await?;
            user_service.set_admin(user.id, true).await?;
            println!("✅ User '{}' is now an admin", email);
        }

        UserCommands::Demote { email } => {
            let user = find_user(user_service, &email).await?;
            user_service.set_admin(user.id, false).await?;
            println!("✅ User '{}' is no longer an admin", email);
        }

        UserCommands::Activate { email } => {
            let user = find_user(user_service, &email).await?;
            user_service.set_active(user.id, true).await?;
            println!("✅ User '{}' activated", email);
        }

        UserCommands::Deactivate { email } => {
            let user = find_user(user_service, &email).await?;
            user_service.set_active(user.id, false).await?;
            println!("✅ User '{}' deactivated", email);
        }

        UserCommands::Delete { email } => {
            let user = find_user(user_service, &email).await?;
            user_service.delete_user(user.id).await?;
            println!("✅ User '{}' deleted successfully!", email);
        }
    }

    Ok(())
}

async fn run_event_command(events: &dyn EventRepository, command: EventCommands) -> anyhow::Result<()> {
    match command {
        EventCommands::List { pending } => {
            let records = events.list(ListScope::All).await?;
            let records: Vec<_> = records
                .into_iter()
                .filter(|r| !pending || !r.event.is_approved)
                .collect();

            if records.is_empty() {
                println!("No events found.");
                return Ok(());
            }

            println!(
                "{:<5} {:<40} {:<20} {:<20} {:<9}",
                "ID", "Title", "Date", "Creator", "State"
            );
            println!("{}", "-".repeat(98));
            for record in records {
                println!(
                    "{:<5} {:<40} {:<20} {:<20} {:<9}",
                    record.event.id,
                    record.event.title.chars().take(40).collect::<String>(),
                    record.event.date.format("%Y-%m-%d %H:%M"),
                    record.creator_name,
                    ApprovalState::of(&record.event).as_str()
                );
            }
        }

        EventCommands::Approve { id } => {
            let event = events
                .set_approved(id, true)
                .await
                .with_context(|| format!("Failed to approve event {}", id))?;
            println!("✅ Event '{}' approved", event.title);
        }

        EventCommands::Reject { id } => {
            let event = events
                .set_approved(id, false)
                .await
                .with_context(|| format!("Failed to reject event {}", id))?;
            println!("✅ Event '{}' moved back to pending", event.title);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("❌ {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    // Connect to database
    let pool = db::create_pool(&database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    match cli.command {
        Commands::User { command } => {
            let user_repository = Arc::new(SqliteUserRepository::new(pool));
            let user_service = UserService::new(user_repository);
            run_user_command(&user_service, command).await
        }
        Commands::Event { command } => {
            let events = SqliteEventRepository::new(pool);
            run_event_command(&events, command).await
        }
    }
}
