//! Commands typed at the browser prompt.

use stock_common::history::TimeRange;
use stock_common::route::Route;
use stock_common::{MarketError, Result, Symbol};

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  go <path>          open a route: /, /stock/AAPL, /watchlist, /search?q=apple, /auth
  search <text>      search symbols and company names
  stock <symbol>     open the detail view for a symbol
  home | watchlist   open the home page or the watchlist
  page <n> | next | prev
                     move between search result pages
  add <symbol>       add a symbol to the watchlist
  rm <symbol>        remove a symbol from the watchlist
  toggle             add/remove the symbol of the open detail view
  range <r>          chart range on the detail view: 1D 5D 1M 6M 1Y ALL
  tape               stream the ticker tape until Ctrl+C
  help               show this text
  quit               leave";

/// A parsed prompt command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Navigate(Route),
    Page(usize),
    NextPage,
    PreviousPage,
    Add(String),
    Remove(String),
    Toggle,
    Range(TimeRange),
    Tape,
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

impl Command {
    /// Parses one input line.
    pub fn parse(line: &str) -> Result<Command> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let command = match word.to_lowercase().as_str() {
            "" => Command::Nothing,
            "go" | "open" => Command::Navigate(Route::parse(required(rest, "go <path>")?)?),
            "search" | "s" => Command::Navigate(Route::Search(rest.to_string())),
            "stock" => Command::Navigate(Route::Stock(Symbol::new(required(rest, "stock <symbol>")?)?)),
            "home" => Command::Navigate(Route::Home),
            "watchlist" | "wl" => Command::Navigate(Route::Watchlist),
            "auth" => Command::Navigate(Route::Auth),
            "page" => Command::Page(
                required(rest, "page <n>")?
                    .parse()
                    .map_err(|e| MarketError::Format(format!("page number {rest:?}: {e}")))?,
            ),
            "next" | "n" => Command::NextPage,
            "prev" | "p" => Command::PreviousPage,
            "add" => Command::Add(required(rest, "add <symbol>")?.to_string()),
            "rm" | "remove" => Command::Remove(required(rest, "rm <symbol>")?.to_string()),
            "toggle" => Command::Toggle,
            "range" => Command::Range(TimeRange::parse_label(required(rest, "range <r>")?)?),
            "tape" => Command::Tape,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(MarketError::Format(format!("unknown command {other:?}; try `help`"))),
        };
        Ok(command)
    }
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str> {
    if arg.is_empty() {
        return Err(MarketError::Format(format!("usage: {usage}")));
    }
    Ok(arg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation() {
        assert_eq!(
            Command::parse("search  apple inc ").unwrap(),
            Command::Navigate(Route::Search("apple inc".into()))
        );
        assert_eq!(
            Command::parse("go /stock/tsla").unwrap(),
            Command::Navigate(Route::Stock(Symbol::new("TSLA").unwrap()))
        );
        assert_eq!(Command::parse("WL").unwrap(), Command::Navigate(Route::Watchlist));
        assert_eq!(Command::parse("   ").unwrap(), Command::Nothing);
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(Command::parse("page 3").unwrap(), Command::Page(3));
        assert_eq!(Command::parse("range 6m").unwrap(), Command::Range(TimeRange::SixMonths));
        assert_eq!(Command::parse("add rivn").unwrap(), Command::Add("rivn".into()));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(Command::parse("page two"), Err(MarketError::Format(_))));
        assert!(matches!(Command::parse("range 2W"), Err(MarketError::InvalidTimeRange(_))));
        assert!(matches!(Command::parse("stock"), Err(MarketError::Format(_))));
        assert!(matches!(Command::parse("fly away"), Err(MarketError::Format(_))));
    }
}
