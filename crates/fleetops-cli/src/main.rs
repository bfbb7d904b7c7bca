use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use fleetops_cli::matrix::{MatrixEdit, apply_edits, load_matrix, save_matrix};
use fleetops_auth::{GuardDecision, SessionPermissions};
use fleetops_cli::render_matrix;
use fleetops_cli::users::{create_user_in_groups, session_for};
use fleetops_config::ServerConfig;
use fleetops_core::RightCatalog;
use fleetops_core::tiers::default_rules;
use fleetops_db::{PgPermissionStore, init_db_pool, run_migrations, run_seed};

#[derive(Parser)]
#[command(name = "fleetops-cli")]
#[command(about = "FleetOps CLI - Permission administration tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migrations, then ensure rights, tier groups and their rights
    Seed,
    /// Create a user account and optionally add it to groups
    CreateUser {
        /// Full name of the user
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Group name to add the user to (repeatable)
        #[arg(short = 'g', long = "group")]
        groups: Vec<String>,
    },
    /// Print a group's module × action rights matrix, optionally editing it first
    ///
    /// Edits are applied in the order: grants, revokes, toggles, then the
    /// module-wide variants. The result replaces the group's rights exactly.
    Matrix {
        /// Group name, e.g. LEVEL2
        group: String,

        /// Grant a right, e.g. TRUCK_ADD (repeatable)
        #[arg(long = "grant")]
        grant: Vec<String>,

        /// Revoke a right (repeatable)
        #[arg(long = "revoke")]
        revoke: Vec<String>,

        /// Flip a right (repeatable)
        #[arg(long = "toggle")]
        toggle: Vec<String>,

        /// Grant every action of a module, e.g. FUEL (repeatable)
        #[arg(long = "grant-module")]
        grant_module: Vec<String>,

        /// Revoke every action of a module (repeatable)
        #[arg(long = "revoke-module")]
        revoke_module: Vec<String>,

        /// Grant a module fully, or revoke it if already fully granted (repeatable)
        #[arg(long = "toggle-module")]
        toggle_module: Vec<String>,
    },
    /// Show the permissions a user would receive at login
    Permissions {
        /// Email address of the user
        email: String,

        /// Right code to check, e.g. TRUCK_ADD (repeatable)
        #[arg(short = 'c', long = "check")]
        check: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("❌ DATABASE_URL must be set");
            std::process::exit(1);
        }
    };

    let pool = match init_db_pool(&database_url, &ServerConfig::from_env()).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let store = PgPermissionStore::new(pool);

    match cli.command {
        Commands::Seed => handle_seed(&store).await,
        Commands::CreateUser {
            full_name,
            email,
            password,
            groups,
        } => handle_create_user(&store, full_name, email, password, groups).await,
        Commands::Matrix {
            group,
            grant,
            revoke,
            toggle,
            grant_module,
            revoke_module,
            toggle_module,
        } => {
            let edits: Vec<MatrixEdit> = grant
                .into_iter()
                .map(MatrixEdit::Grant)
                .chain(revoke.into_iter().map(MatrixEdit::Revoke))
                .chain(toggle.into_iter().map(MatrixEdit::Toggle))
                .chain(grant_module.into_iter().map(MatrixEdit::GrantModule))
                .chain(revoke_module.into_iter().map(MatrixEdit::RevokeModule))
                .chain(toggle_module.into_iter().map(MatrixEdit::ToggleModule))
                .collect();
            handle_matrix(&store, &group, &edits).await
        }
        Commands::Permissions { email, check } => handle_permissions(&store, &email, &check).await,
    }
}

fn load_catalog() -> RightCatalog {
    match RightCatalog::standard() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("❌ Invalid right catalog: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed(store: &PgPermissionStore) {
    if let Err(e) = run_migrations(store.pool()).await {
        eprintln!("\n❌ Error running migrations: {}", e);
        std::process::exit(1);
    }

    let catalog = load_catalog();

    match run_seed(store, &catalog, &default_rules()).await {
        Ok(report) => {
            println!("\n✅ Seeding complete");
            println!("   Rights created:      {}", report.rights_created);
            println!("   Groups created:      {}", report.groups_created);
            println!(
                "   Assignments created: {} (of {} required)",
                report.assignments_created, report.assignments_desired
            );
        }
        Err(e) => {
            eprintln!("\n❌ Error seeding permissions: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_create_user(
    store: &PgPermissionStore,
    full_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    groups: Vec<String>,
) {
    let full_name = full_name.unwrap_or_else(|| prompt_text("Full name"));
    let email = email.unwrap_or_else(|| prompt_text("Email address"));
    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| {
                eprintln!("❌ Failed to read password: {}", e);
                std::process::exit(1);
            })
    });

    match create_user_in_groups(store, &full_name, &email, &password, &groups).await {
        Ok(user) => {
            println!("\n✅ User created successfully!");
            println!("   Id: {}", user.id);
            println!("   Email: {}", user.email);
            if !groups.is_empty() {
                println!("   Groups: {}", groups.join(", "));
            }
        }
        Err(e) => {
            eprintln!("\n❌ Error creating user: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_matrix(store: &PgPermissionStore, group_name: &str, edits: &[MatrixEdit]) {
    let catalog = load_catalog();

    let mut matrix = match load_matrix(store, &catalog, group_name).await {
        Ok(matrix) => matrix,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    if !edits.is_empty() {
        if let Err(e) = apply_edits(&mut matrix, edits) {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }

        match save_matrix(store, &matrix).await {
            Ok(outcome) => {
                println!("✅ Saved {} right(s) for {}\n", outcome.right_count, matrix.group_name);
            }
            Err(e) => {
                eprintln!("\n❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }

    print!("{}", render_matrix(&matrix));
}

async fn handle_permissions(store: &PgPermissionStore, email: &str, checks: &[String]) {
    let session = match session_for(store, email).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let mut codes: Vec<&String> = match &session {
        SessionPermissions::Loaded(codes) => codes.iter().collect(),
        SessionPermissions::Unloaded => Vec::new(),
    };
    codes.sort();

    println!("Permissions for {} ({}):", email, codes.len());
    for code in codes {
        println!("   {}", code);
    }

    for code in checks {
        let mark = match session.guard(code) {
            GuardDecision::Allow => "✅ allow",
            GuardDecision::Deny => "❌ deny",
        };
        println!("{:<24}{}", code, mark);
    }
}

fn prompt_text(prompt: &str) -> String {
    Input::new()
        .with_prompt(prompt)
        .interact_text()
        .unwrap_or_else(|e| {
            eprintln!("❌ Failed to read {}: {}", prompt.to_lowercase(), e);
            std::process::exit(1);
        })
}
