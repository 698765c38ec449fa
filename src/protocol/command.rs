//! Command definitions
//!
//! Represents requests from clients.

/// Operation names understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    FindCustomer,
    AddCustomer,
    DeleteCustomer,
    UpdateAge,
    UpdateAddress,
    UpdatePhone,
    PrintReport,
    GetPid,
}

impl CommandType {
    /// Every operation, in menu order
    pub const ALL: [CommandType; 8] = [
        CommandType::FindCustomer,
        CommandType::AddCustomer,
        CommandType::DeleteCustomer,
        CommandType::UpdateAge,
        CommandType::UpdateAddress,
        CommandType::UpdatePhone,
        CommandType::PrintReport,
        CommandType::GetPid,
    ];

    /// The operation name as sent on the wire
    pub fn name(self) -> &'static str {
        match self {
            CommandType::FindCustomer => "find_customer",
            CommandType::AddCustomer => "add_customer",
            CommandType::DeleteCustomer => "delete_customer",
            CommandType::UpdateAge => "update_age",
            CommandType::UpdateAddress => "update_address",
            CommandType::UpdatePhone => "update_phone",
            CommandType::PrintReport => "print_report",
            CommandType::GetPid => "get_pid",
        }
    }

    /// Look up an operation by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }

    /// Number of argument lines following the operation name
    pub fn arg_count(self) -> usize {
        match self {
            CommandType::FindCustomer | CommandType::AddCustomer | CommandType::DeleteCustomer => 1,
            CommandType::UpdateAge | CommandType::UpdateAddress | CommandType::UpdatePhone => 2,
            CommandType::PrintReport | CommandType::GetPid => 0,
        }
    }
}

/// A parsed command
///
/// Arguments are kept as received; validation (customer line, age) is the
/// dispatcher's job so that each failure maps to its own response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look up a customer by name
    FindCustomer { name: String },

    /// Add a customer from a `name|age|address|phone` line
    AddCustomer { line: String },

    /// Remove a customer by name
    DeleteCustomer { name: String },

    /// Change a customer's age (not yet validated as an integer)
    UpdateAge { name: String, age: String },

    UpdateAddress { name: String, address: String },

    UpdatePhone { name: String, phone: String },

    /// Dump every customer, sorted by name
    PrintReport,

    /// Ask for the server's process id
    GetPid,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::FindCustomer { .. } => CommandType::FindCustomer,
            Command::AddCustomer { .. } => CommandType::AddCustomer,
            Command::DeleteCustomer { .. } => CommandType::DeleteCustomer,
            Command::UpdateAge { .. } => CommandType::UpdateAge,
            Command::UpdateAddress { .. } => CommandType::UpdateAddress,
            Command::UpdatePhone { .. } => CommandType::UpdatePhone,
            Command::PrintReport => CommandType::PrintReport,
            Command::GetPid => CommandType::GetPid,
        }
    }

    /// Argument lines in wire order
    pub fn args(&self) -> Vec<&str> {
        match self {
            Command::FindCustomer { name } | Command::DeleteCustomer { name } => vec![name.as_str()],
            Command::AddCustomer { line } => vec![line.as_str()],
            Command::UpdateAge { name, age } => vec![name.as_str(), age.as_str()],
            Command::UpdateAddress { name, address } => vec![name.as_str(), address.as_str()],
            Command::UpdatePhone { name, phone } => vec![name.as_str(), phone.as_str()],
            Command::PrintReport | Command::GetPid => Vec::new(),
        }
    }

    /// Build a command from its type and argument lines
    ///
    /// Missing arguments are treated as empty strings.
    pub fn from_parts(command_type: CommandType, args: Vec<String>) -> Self {
        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or_default();

        match command_type {
            CommandType::FindCustomer => Command::FindCustomer { name: next() },
            CommandType::AddCustomer => Command::AddCustomer { line: next() },
            CommandType::DeleteCustomer => Command::DeleteCustomer { name: next() },
            CommandType::UpdateAge => {
                let name = next();
                Command::UpdateAge { name, age: next() }
            }
            CommandType::UpdateAddress => {
                let name = next();
                Command::UpdateAddress { name, address: next() }
            }
            CommandType::UpdatePhone => {
                let name = next();
                Command::UpdatePhone { name, phone: next() }
            }
            CommandType::PrintReport => Command::PrintReport,
            CommandType::GetPid => Command::GetPid,
        }
    }
}
