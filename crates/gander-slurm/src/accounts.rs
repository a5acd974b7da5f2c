//! Authorized account discovery via sacctmgr.

use gander_parsers::{run_command, CommandError, COMMAND_TIMEOUT};
use tokio::process::Command;

/// Query the accounts the user is associated with.
///
/// Returns a deduplicated, sorted list. An empty result is not an error;
/// the catalog builder substitutes its fallback account.
pub async fn query_user_accounts(user: &str) -> Result<Vec<String>, CommandError> {
    let mut cmd = Command::new("sacctmgr");
    cmd.args([
        "show",
        "associations",
        &format!("user={user}"),
        "--noheader",
        "format=account",
    ]);

    let stdout = run_command(&mut cmd, "sacctmgr", COMMAND_TIMEOUT).await?;
    Ok(parse_account_list(&stdout))
}

fn parse_account_list(stdout: &str) -> Vec<String> {
    let mut accounts: Vec<String> = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    accounts.sort();
    accounts.dedup();
    accounts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_list() {
        let out = "  genomics\n  staff\n  genomics\n\n  imaging\n";
        assert_eq!(
            parse_account_list(out),
            vec!["genomics", "imaging", "staff"]
        );
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_account_list("").is_empty());
        assert!(parse_account_list("\n  \n").is_empty());
    }
}
