use courtside_http::{FailureKind, FetchClient, FetchError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Game {
    home: String,
    away: String,
    home_score: u32,
    away_score: u32,
    #[serde(default)]
    status: Option<String>,
}

fn render_failure(err: &FetchError) {
    match err.kind() {
        FailureKind::HttpClient => println!("No games found."),
        FailureKind::Timeout | FailureKind::Transport | FailureKind::HttpServer => {
            println!("Scoreboard is unavailable right now, try again shortly.")
        }
        FailureKind::Parse | FailureKind::InvalidRequest => {
            println!("Scoreboard could not be displayed.")
        }
    }
    eprintln!("scoreboard load failed: {err}");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api = FetchClient::from_env().map_err(anyhow::Error::msg)?;

    match api.get_json::<Vec<Game>>("scoreboard").await {
        Ok(games) if games.is_empty() => println!("No games today."),
        Ok(games) => {
            for game in games {
                println!(
                    "{:>4} {:>3} - {:<3} {:<4} {}",
                    game.home,
                    game.home_score,
                    game.away_score,
                    game.away,
                    game.status.as_deref().unwrap_or("")
                );
            }
        }
        Err(err) => render_failure(&err),
    }

    Ok(())
}
