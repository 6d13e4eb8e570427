//! Line-oriented interactive shell over a [`WalletSession`].

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use wallet_core::{
    format_balance, NetworkConfig, SessionState, TokenBalance, WalletSession, WalletState,
    DEFAULT_DISPLAY_PRECISION,
};

pub const HELP: &str = "\
commands:
  networks                 list available networks
  connect <chain-id>       connect to a network
  refresh                  reload the wallet state
  balance                  show balances on the connected network
  estimate <to> <amount>   quote the fee for a transfer
  send <to> <amount>       transfer after confirmation
  disconnect               close the connection
  clear-error              dismiss the last error
  purge                    delete the stored wallet (asks first)
  status                   show the session state
  help                     show this text
  quit                     leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Networks,
    Connect(String),
    Refresh,
    Balance,
    Estimate { to: String, amount: String },
    Send { to: String, amount: String },
    Disconnect,
    ClearError,
    Purge,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("networks", []) => Command::Networks,
            ("connect", [chain_id]) => Command::Connect(chain_id.to_string()),
            ("refresh", []) => Command::Refresh,
            ("balance", []) => Command::Balance,
            ("estimate", [to, amount]) => Command::Estimate {
                to: to.to_string(),
                amount: amount.to_string(),
            },
            ("send", [to, amount]) => Command::Send {
                to: to.to_string(),
                amount: amount.to_string(),
            },
            ("disconnect", []) => Command::Disconnect,
            ("clear-error", []) => Command::ClearError,
            ("purge", []) => Command::Purge,
            ("status", []) => Command::Status,
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            ("connect" | "estimate" | "send", _) => {
                return Err(format!("wrong arguments for '{name}', try 'help'"))
            }
            _ => return Err(format!("unknown command '{name}', try 'help'")),
        };
        Ok(Some(command))
    }
}

/// One line per network, the connected one marked with `*`.
pub fn render_networks(networks: &[NetworkConfig], current: Option<&NetworkConfig>) -> String {
    networks
        .iter()
        .map(|n| {
            let marker = if current.is_some_and(|c| c.chain_id == n.chain_id) {
                '*'
            } else {
                ' '
            };
            format!(
                "{marker} {:<10} {:<18} {:<5} {}",
                n.chain_id, n.name, n.native_currency.symbol, n.family
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_balances(wallet: &WalletState) -> String {
    let currency = &wallet.network.native_currency;
    let mut lines = vec![
        format!("address: {}", wallet.address),
        format!(
            "{} {}",
            format_balance(
                &wallet.balances.native,
                currency.decimals,
                DEFAULT_DISPLAY_PRECISION
            ),
            currency.symbol
        ),
    ];
    lines.extend(wallet.balances.tokens.iter().map(render_token));
    lines.join("\n")
}

/// Tokens without known decimals are shown as the raw integer.
fn render_token(token: &TokenBalance) -> String {
    let amount = match token.token.decimals {
        Some(decimals) => format_balance(&token.balance, decimals, DEFAULT_DISPLAY_PRECISION),
        None => token.balance.clone(),
    };
    format!("{amount} {}", token.token.symbol)
}

pub fn render_status(state: &SessionState) -> String {
    let mut lines = vec![format!("phase: {:?}", state.phase)];
    match &state.current_network {
        Some(network) => lines.push(format!("network: {} ({})", network.name, network.chain_id)),
        None => lines.push("network: none".to_string()),
    }
    if let Some(error) = &state.error {
        lines.push(format!("error: {error}"));
    }
    lines.join("\n")
}

/// Runs the shell until `quit` or end of input.
pub async fn run<R, W>(session: &WalletSession, input: R, mut out: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        out.write_all(b"> ").await?;
        out.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln(&mut out, &message).await?;
                continue;
            }
        };
        tracing::debug!(?command, "executing command");

        let output = match command {
            Command::Quit => break,
            Command::Help => HELP.to_string(),
            Command::Networks => {
                let state = session.state();
                render_networks(&session.networks(), state.current_network.as_ref())
            }
            Command::Connect(chain_id) => match session.connect_to_network(&chain_id).await {
                Ok(()) => connected_summary(&session.state()),
                Err(e) => format!("error: {e}"),
            },
            Command::Refresh => match session.refresh_wallet_state().await {
                Ok(()) => balances_or_hint(&session.state()),
                Err(e) => format!("error: {e}"),
            },
            Command::Balance => balances_or_hint(&session.state()),
            Command::Estimate { to, amount } => match session.estimate_fee(&to, &amount).await {
                Ok(fee) => format!("fee: {} {}", fee.formatted, fee.currency),
                Err(e) => format!("error: {e}"),
            },
            Command::Send { to, amount } => {
                let fee = match session.estimate_fee(&to, &amount).await {
                    Ok(fee) => fee,
                    Err(e) => {
                        writeln(&mut out, &format!("error: {e}")).await?;
                        continue;
                    }
                };
                let question = format!(
                    "send {amount} to {to}? fee {} {} [y/N] ",
                    fee.formatted, fee.currency
                );
                if !confirm(&mut lines, &mut out, &question).await? {
                    writeln(&mut out, "cancelled").await?;
                    continue;
                }
                match session.send_transaction(&to, &amount).await {
                    Ok(receipt) => {
                        let mut text = format!("sent: {}", receipt.tx_hash);
                        if let Some(warning) = session.state().error {
                            text.push_str(&format!("\nwarning: {warning}"));
                        }
                        text
                    }
                    Err(e) => format!("error: {e}"),
                }
            }
            Command::Disconnect => match session.disconnect().await {
                Ok(()) => "disconnected".to_string(),
                Err(e) => format!("error: {e}"),
            },
            Command::ClearError => {
                session.clear_error();
                "ok".to_string()
            }
            Command::Purge => {
                let question = "delete the stored wallet? this cannot be undone [y/N] ";
                if !confirm(&mut lines, &mut out, question).await? {
                    writeln(&mut out, "cancelled").await?;
                    continue;
                }
                match session.purge().await {
                    Ok(()) => "wallet purged".to_string(),
                    Err(e) => format!("error: {e}"),
                }
            }
            Command::Status => render_status(&session.state()),
        };
        writeln(&mut out, &output).await?;
    }
    Ok(())
}

fn connected_summary(state: &SessionState) -> String {
    let mut text = balances_or_hint(state);
    if let Some(warning) = &state.error {
        text.push_str(&format!("\nwarning: {warning}"));
    }
    text
}

fn balances_or_hint(state: &SessionState) -> String {
    match &state.wallet_state {
        Some(wallet) => render_balances(wallet),
        None => "not connected, use 'connect <chain-id>'".to_string(),
    }
}

async fn confirm<R, W>(
    lines: &mut tokio::io::Lines<R>,
    out: &mut W,
    question: &str,
) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    out.write_all(question.as_bytes()).await?;
    out.flush().await?;
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn writeln<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await
}
