use super::Parser;
use clap::Subcommand;

/// One operation per invocation. The `memory` backend lives only as long as
/// the process, so state carried between invocations needs `mysql`.
#[derive(Parser, Debug)]
#[command(name = "kinship", about = "Friendship relationship engine")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a friend request from ACTING to TARGET.
    Send { acting: String, target: String },
    /// Accept the request TARGET sent to ACTING.
    Accept { acting: String, target: String },
    /// Reject the request TARGET sent to ACTING.
    Reject { acting: String, target: String },
    /// Withdraw the invitation ACTING sent to TARGET.
    Cancel { acting: String, target: String },
    Unfriend { acting: String, target: String },
    /// Relationship status of TARGET as seen by VIEWER.
    Status { viewer: String, target: String },
    Friends { account: String },
    NonFriends { account: String },
    /// Pending requests received and sent.
    Requests { account: String },
    Search { account: String, partial_name: String },
    /// Run the sample scenario against a fresh in-memory store.
    Demo,
}

impl Command {
    /// Whether the command changes stored relationships.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::Send { .. }
                | Command::Accept { .. }
                | Command::Reject { .. }
                | Command::Cancel { .. }
                | Command::Unfriend { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_account_commands() {
        let cli = Cli::try_parse_from(["kinship", "send", "U1", "U2"]).unwrap();
        assert!(cli.command.is_mutation());
        assert!(matches!(
            cli.command,
            Command::Send { ref acting, ref target } if acting == "U1" && target == "U2"
        ));
    }

    #[test]
    fn queries_are_not_mutations() {
        let cli =
            Cli::try_parse_from(["kinship", "--settings", "s.toml", "status", "U1", "U2"]).unwrap();
        assert_eq!(cli.settings.as_deref(), Some("s.toml"));
        assert!(!cli.command.is_mutation());
        assert!(!Command::Demo.is_mutation());
    }
}
