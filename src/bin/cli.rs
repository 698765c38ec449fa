//! custdb CLI Client
//!
//! Interactive menu (default) or one-shot subcommands for a custdb server.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use custdb::network::Client;
use custdb::{Customer, DbError};
use tracing_subscriber::{fmt, EnvFilter};

const MENU: &str = "\
=== Menu ===
1. Find customer
2. Add customer
3. Delete customer
4. Update customer age
5. Update customer address
6. Update customer phone
7. Print report
8. Exit

Select: ";

/// custdb CLI
#[derive(Parser, Debug)]
#[command(name = "custdb-cli")]
#[command(about = "CLI for the custdb customer record server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9999")]
    server: String,

    /// Run a single command instead of the interactive menu
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up a customer
    Find { name: String },

    /// Add a customer
    Add {
        name: String,
        age: u32,
        address: String,
        phone: String,
    },

    /// Delete a customer
    Delete { name: String },

    /// Change a customer's age
    UpdateAge { name: String, age: u32 },

    /// Change a customer's address
    UpdateAddress { name: String, address: String },

    /// Change a customer's phone number
    UpdatePhone { name: String, phone: String },

    /// Print every customer, sorted by name
    Report,

    /// Print the server's process id
    Pid,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();
    let client = Client::new(&args.server);

    match args.command {
        Some(command) => run_once(&client, command),
        None => {
            println!("Welcome to the Client interface\n");
            run_menu(&client)
        }
    }
}

// =============================================================================
// One-shot mode
// =============================================================================

fn run_once(client: &Client, command: Commands) -> ExitCode {
    let result = match command {
        Commands::Find { name } => client.find_customer(&name),
        Commands::Add {
            name,
            age,
            address,
            phone,
        } => client.add_customer(&Customer::new(name, age, address, phone)),
        Commands::Delete { name } => client.delete_customer(&name),
        Commands::UpdateAge { name, age } => client.update_age(&name, age),
        Commands::UpdateAddress { name, address } => client.update_address(&name, &address),
        Commands::UpdatePhone { name, phone } => client.update_phone(&name, &phone),
        Commands::Report => client.print_report(),
        Commands::Pid => client.get_pid().map(|pid| pid.to_string()),
    };

    match result {
        Ok(response) => {
            println!("{}", response);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Interactive mode
// =============================================================================

/// What the menu loop should do after an action
enum Flow {
    Continue,
    Exit,
}

fn run_menu(client: &Client) -> ExitCode {
    let stdin = io::stdin();
    let mut prompt = Prompt {
        input: stdin.lock(),
    };

    loop {
        let flow = match prompt.choice(MENU, 1..=8) {
            Some(choice) => menu_action(client, &mut prompt, choice),
            None => return ExitCode::SUCCESS,
        };

        match flow {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return ExitCode::SUCCESS,
            Err(DbError::Network(e)) => {
                tracing::debug!("{}", e);
                println!("Connection failed\n");
                return ExitCode::FAILURE;
            }
            Err(e) => println!("Error: {}\n", e),
        }
    }
}

fn menu_action(client: &Client, prompt: &mut Prompt<impl BufRead>, choice: u32) -> custdb::Result<Flow> {
    // End of input while collecting fields quits quietly
    macro_rules! ask {
        ($expr:expr) => {
            match $expr {
                Some(value) => value,
                None => return Ok(Flow::Exit),
            }
        };
    }

    let response = match choice {
        1 => {
            let name = ask!(prompt.field("Enter customer name: "));
            client.find_customer(&name)?
        }
        2 => {
            let name = ask!(prompt.field("Enter customer name: "));
            let age = ask!(prompt.number("Enter customer age: "));
            let address = ask!(prompt.field("Enter customer address: "));
            let phone = ask!(prompt.field("Enter customer phone: "));
            client.add_customer(&Customer::new(name, age, address, phone))?
        }
        3 => {
            let name = ask!(prompt.field("Enter customer name: "));
            client.delete_customer(&name)?
        }
        4 => {
            let name = ask!(prompt.field("Enter customer name: "));
            let age = ask!(prompt.number("Enter customer age: "));
            client.update_age(&name, age)?
        }
        5 => {
            let name = ask!(prompt.field("Enter customer name: "));
            let address = ask!(prompt.field("Enter customer address: "));
            client.update_address(&name, &address)?
        }
        6 => {
            let name = ask!(prompt.field("Enter customer name: "));
            let phone = ask!(prompt.field("Enter customer phone: "));
            client.update_phone(&name, &phone)?
        }
        7 => {
            let report = client.print_report()?;
            println!("\n=== Data Records ===\n\n{}\n", report);
            return Ok(Flow::Continue);
        }
        _ => {
            if ask!(prompt.yes_no("Also shut down the server? (y/n) ")) {
                shutdown_server(client)?;
            }
            return Ok(Flow::Exit);
        }
    };

    println!("Server: {}\n", response);
    Ok(Flow::Continue)
}

/// Ask the server for its pid and terminate it
fn shutdown_server(client: &Client) -> custdb::Result<()> {
    let pid = client.get_pid()?;

    let status = if cfg!(windows) {
        std::process::Command::new("taskkill")
            .args(["/F", "/PID", &pid.to_string()])
            .status()
    } else {
        std::process::Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .status()
    };

    match status {
        Ok(status) if status.success() => println!("Server {} terminated\n", pid),
        _ => println!(
            "Could not kill server, manual termination required. PID: {}\n",
            pid
        ),
    }
    Ok(())
}

/// Line-based prompts; every method returns `None` once input is exhausted
struct Prompt<R> {
    input: R,
}

impl<R: BufRead> Prompt<R> {
    fn line(&mut self, message: &str) -> Option<String> {
        print!("{}", message);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    /// Non-empty text that can be stored in the line format
    fn field(&mut self, message: &str) -> Option<String> {
        loop {
            let value = self.line(message)?;
            if value.is_empty() {
                println!("Invalid string");
                continue;
            }
            match Customer::validate_field(&value) {
                Ok(()) => return Some(value),
                Err(e) => println!("{}", e),
            }
        }
    }

    fn number(&mut self, message: &str) -> Option<u32> {
        loop {
            match self.line(message)?.parse() {
                Ok(value) => return Some(value),
                Err(_) => println!("Invalid integer"),
            }
        }
    }

    fn choice(&mut self, message: &str, range: std::ops::RangeInclusive<u32>) -> Option<u32> {
        loop {
            match self.line(message)?.parse() {
                Ok(value) if range.contains(&value) => return Some(value),
                _ => println!("Invalid query"),
            }
        }
    }

    fn yes_no(&mut self, message: &str) -> Option<bool> {
        loop {
            match self.line(message)?.to_lowercase().as_str() {
                "y" | "yes" => return Some(true),
                "n" | "no" => return Some(false),
                _ => println!("Invalid answer"),
            }
        }
    }
}
