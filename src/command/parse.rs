#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Info,
    // Targets come from the message's mentions, not from the argument text.
    Join,
    Edit(String),
    Claim(String),
}

pub fn parse_command(argument: &str) -> Command {
    let argument = argument.trim();
    match argument {
        "" | "help" => return Command::Help,
        "info" | "owner" => return Command::Info,
        _ => {}
    }
    if argument.split_whitespace().next() == Some("join") {
        return Command::Join;
    }
    if let Some(label) = argument.strip_prefix("edit ") {
        return Command::Edit(label.to_string());
    }
    Command::Claim(argument.to_string())
}
