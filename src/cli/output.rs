//! Output formatting utilities for CLI.

use std::fmt::Write as _;

use serde::Serialize;
use skirmish::game::{Coord, Terrain, UnitKind, Visibility};
use skirmish::{GameResult, Outcome, PlayerId, World};

/// Display label for a player seat. Player 1 is always the human.
fn seat(player_id: PlayerId) -> &'static str {
    if player_id == 1 { "human" } else { "AI" }
}

/// Format a game result as human-readable text.
pub(super) fn format_text(result: &GameResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Game Result (seed: {})", result.seed);
    match result.outcome {
        Some(Outcome::Victory(winner)) => {
            let _ = writeln!(output, "  Winner: Player {winner} ({})", seat(winner));
        }
        Some(Outcome::Defeat) => output.push_str("  Result: Defeat (human eliminated)\n"),
        Some(Outcome::Draw) => output.push_str("  Result: Draw\n"),
        None => {
            let leader = result.leader().map_or_else(|| "-".to_string(), |id| id.to_string());
            let _ = writeln!(output, "  Result: Tick limit reached (leader: Player {leader})");
        }
    }
    let _ = writeln!(output, "  Ticks: {}\n", result.ticks_played);

    for stats in &result.player_stats {
        let _ = write!(
            output,
            "  Player {} ({}): {:.0} points, ${}, {} buildings, {} units, {}/{} K/L",
            stats.player_id,
            seat(stats.player_id),
            stats.final_score,
            stats.money,
            stats.buildings,
            stats.units,
            stats.units_killed,
            stats.units_lost
        );
        if let Some(tick) = stats.eliminated_tick {
            let _ = write!(output, " [eliminated tick {tick}]");
        }
        output.push('\n');
    }

    output
}

/// Render the map as one player sees it.
///
/// Legend: blank = unexplored, `.` grass, `~` water, digit = building of
/// that player, `i`/`t`/`h` = units (uppercase for the viewer's own).
pub(super) fn render_fog_map(world: &World, viewer: PlayerId) -> String {
    let grid = world.grid();
    let Some(fog) = world.fog(viewer) else {
        return String::new();
    };
    let width = usize::from(grid.width());
    let mut rows: Vec<Vec<char>> = (0..grid.height())
        .map(|y| {
            (0..grid.width())
                .map(|x| {
                    let coord = Coord::new(x, y);
                    match (fog.visibility(coord), grid.get(coord)) {
                        (Visibility::Unexplored, _) | (_, None) => ' ',
                        (_, Some(tile)) if tile.terrain == Terrain::Water => '~',
                        (Visibility::Visible, Some(_)) => grid
                            .owner_at(coord)
                            .and_then(|owner| char::from_digit(u32::from(owner), 10))
                            .unwrap_or('.'),
                        (Visibility::Explored, Some(_)) => '.',
                    }
                })
                .collect()
        })
        .collect();

    for unit in world.visible_units(viewer).into_iter().filter(|u| u.is_alive()) {
        let tile = grid.tile_at(unit.x, unit.y);
        let glyph = match unit.kind {
            UnitKind::Infantry => 'i',
            UnitKind::Tank => 't',
            UnitKind::Helicopter => 'h',
        };
        let glyph = if unit.owner == viewer {
            glyph.to_ascii_uppercase()
        } else {
            glyph
        };
        if let Some(cell) = rows
            .get_mut(usize::from(tile.y))
            .and_then(|row| row.get_mut(usize::from(tile.x)))
        {
            *cell = glyph;
        }
    }

    let border = format!("+{}+\n", "-".repeat(width));
    let mut output = format!("Map as seen by Player {viewer}\n");
    output.push_str(&border);
    for row in rows {
        output.push('|');
        output.extend(row);
        output.push_str("|\n");
    }
    output.push_str(&border);
    output
}

/// Tournament statistics for aggregated results.
#[derive(Debug, Default)]
pub(super) struct TournamentStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Win count per player.
    pub(super) wins: Vec<u64>,
    /// Games where everyone was eliminated.
    pub(super) draws: u64,
    /// Games ended by the human's elimination.
    pub(super) defeats: u64,
    /// Games that hit the tick limit.
    pub(super) timeouts: u64,
    /// Total score per player.
    total_scores: Vec<f64>,
    /// Score sum of squares for std dev calculation.
    score_sq_sums: Vec<f64>,
    /// Total kills per player.
    total_kills: Vec<u64>,
    /// Total ticks across all games.
    total_ticks: u64,
}

impl TournamentStats {
    /// Create new stats for n players.
    pub(super) fn new(num_players: usize) -> Self {
        Self {
            wins: vec![0; num_players],
            total_scores: vec![0.0; num_players],
            score_sq_sums: vec![0.0; num_players],
            total_kills: vec![0; num_players],
            ..Self::default()
        }
    }

    /// Number of players tracked.
    pub(super) fn num_players(&self) -> usize {
        self.wins.len()
    }

    /// Add a game result to the stats.
    pub(super) fn add_result(&mut self, result: &GameResult) {
        self.games_played += 1;
        self.total_ticks += result.ticks_played;

        match result.outcome {
            Some(Outcome::Victory(winner)) => {
                if let Some(w) = self.wins.get_mut(usize::from(winner) - 1) {
                    *w += 1;
                }
            }
            Some(Outcome::Defeat) => self.defeats += 1,
            Some(Outcome::Draw) => self.draws += 1,
            None => self.timeouts += 1,
        }

        for (i, stats) in result.player_stats.iter().enumerate() {
            if i < self.total_scores.len() {
                self.total_scores[i] += stats.final_score;
                self.score_sq_sums[i] += stats.final_score * stats.final_score;
                self.total_kills[i] += u64::from(stats.units_killed);
            }
        }
    }

    /// Merge another thread's stats into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.draws += other.draws;
        self.defeats += other.defeats;
        self.timeouts += other.timeouts;
        self.total_ticks += other.total_ticks;
        for (a, b) in self.wins.iter_mut().zip(&other.wins) {
            *a += b;
        }
        for (a, b) in self.total_scores.iter_mut().zip(&other.total_scores) {
            *a += b;
        }
        for (a, b) in self.score_sq_sums.iter_mut().zip(&other.score_sq_sums) {
            *a += b;
        }
        for (a, b) in self.total_kills.iter_mut().zip(&other.total_kills) {
            *a += b;
        }
    }

    /// Fraction of games with this count (0.0-1.0).
    #[allow(clippy::cast_precision_loss)]
    fn rate(&self, count: u64) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        count as f64 / self.games_played as f64
    }

    /// Get win rate for a player (0.0-1.0).
    pub(super) fn win_rate(&self, player_idx: usize) -> f64 {
        self.rate(self.wins.get(player_idx).copied().unwrap_or(0))
    }

    /// Get average score for a player.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_score(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_scores.get(player_idx).copied().unwrap_or(0.0) / self.games_played as f64
    }

    /// Get score standard deviation for a player.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn score_std_dev(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let n = self.games_played as f64;
        let mean = self.avg_score(player_idx);
        let sq_sum = self.score_sq_sums.get(player_idx).copied().unwrap_or(0.0);
        let variance = (sq_sum / n) - (mean * mean);
        variance.max(0.0).sqrt()
    }

    /// Get average kills per game for a player.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_kills(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_kills.get(player_idx).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Get average game length.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_ticks(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.games_played as f64
    }
}

/// JSON-serializable tournament result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentResult {
    /// Total games played.
    games_played: u64,
    /// Per-player statistics.
    players: Vec<JsonTournamentPlayer>,
    /// Number of draws.
    draws: u64,
    /// Number of human defeats.
    defeats: u64,
    /// Number of games that hit the tick limit.
    timeouts: u64,
    /// Average game length in ticks.
    avg_ticks: f64,
}

/// JSON-serializable per-player tournament stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentPlayer {
    /// Player ID (1-based).
    player: usize,
    /// Seat label.
    seat: &'static str,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average score.
    avg_score: f64,
    /// Score standard deviation.
    score_std_dev: f64,
    /// Average kills per game.
    avg_kills: f64,
}

impl JsonTournamentResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &TournamentStats) -> Self {
        let players = (0..stats.num_players())
            .map(|i| JsonTournamentPlayer {
                player: i + 1,
                seat: if i == 0 { "human" } else { "AI" },
                wins: stats.wins.get(i).copied().unwrap_or(0),
                win_rate: stats.win_rate(i),
                avg_score: stats.avg_score(i),
                score_std_dev: stats.score_std_dev(i),
                avg_kills: stats.avg_kills(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            players,
            draws: stats.draws,
            defeats: stats.defeats,
            timeouts: stats.timeouts,
            avg_ticks: stats.avg_ticks(),
        }
    }
}

/// Format tournament stats as human-readable text.
pub(super) fn format_tournament_text(stats: &TournamentStats) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Tournament Results ({} games)", stats.games_played);
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for i in 0..stats.num_players() {
        let wins = stats.wins.get(i).copied().unwrap_or(0);
        let _ = writeln!(
            output,
            "  Player {} ({}): {:.1}% ({} wins)",
            i + 1,
            if i == 0 { "human" } else { "AI" },
            stats.win_rate(i) * 100.0,
            wins
        );
    }
    for (label, count) in [
        ("Defeats", stats.defeats),
        ("Draws", stats.draws),
        ("Timeouts", stats.timeouts),
    ] {
        let _ = writeln!(output, "  {label}: {count} ({:.1}%)", stats.rate(count) * 100.0);
    }
    output.push('\n');

    output.push_str("Average Scores:\n");
    for i in 0..stats.num_players() {
        let _ = writeln!(
            output,
            "  Player {}: {:.1} (+/- {:.1}), {:.1} kills",
            i + 1,
            stats.avg_score(i),
            stats.score_std_dev(i),
            stats.avg_kills(i)
        );
    }

    let _ = writeln!(output, "\nAverage Game Length: {:.0} ticks", stats.avg_ticks());

    output
}

/// Format tournament stats as CSV.
pub(super) fn format_tournament_csv(stats: &TournamentStats) -> String {
    let mut output = String::new();

    output.push_str("player,seat,wins,win_rate,avg_score,score_std_dev,avg_kills\n");

    for i in 0..stats.num_players() {
        let _ = writeln!(
            output,
            "{},{},{},{:.4},{:.2},{:.2},{:.2}",
            i + 1,
            if i == 0 { "human" } else { "AI" },
            stats.wins.get(i).copied().unwrap_or(0),
            stats.win_rate(i),
            stats.avg_score(i),
            stats.score_std_dev(i),
            stats.avg_kills(i)
        );
    }

    output
}
