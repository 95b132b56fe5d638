//! Text formatting for room descriptions, status lines, help and the leaderboard.

use explorer_core::{ScoreRecord, SessionPhase, SessionView};

pub fn help_lines() -> Vec<String> {
    [
        "Commands:",
        "  new                 start a new adventure",
        "  menu                return to the main menu",
        "  n, s, e, w          move (or: north, go east, ...)",
        "  take                pick up the item in this room",
        "  name <player>       change your name",
        "  look                describe where you are",
        "  scores [mine]       show the leaderboard",
        "  help                show this list",
        "  quit                leave the game",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

pub fn status_lines(status: &str) -> Vec<String> {
    status.lines().map(str::to_string).collect()
}

pub fn phase_text(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Menu => "Main menu. Type 'new' to begin an adventure.",
        SessionPhase::Playing => "Adventure in progress.",
        SessionPhase::GameOver { won: true } => "Victory! Type 'new' to play again.",
        SessionPhase::GameOver { won: false } => "Defeat. Type 'new' to try again.",
    }
}

pub fn room_lines(view: &SessionView) -> Vec<String> {
    let mut lines = vec![format!("You are in the {}.", view.room)];
    if let Some(item) = &view.room_item {
        lines.push(format!("You see a {item} here."));
    }

    let exits: Vec<String> =
        view.exits.iter().map(|(direction, room)| format!("{direction} ({room})")).collect();
    let exits = if exits.is_empty() { "none".to_string() } else { exits.join(", ") };
    lines.push(format!("Exits: {exits}"));

    let inventory =
        if view.inventory.is_empty() { "empty".to_string() } else { view.inventory.join(", ") };
    lines.push(format!(
        "Inventory: {inventory} ({}/{})",
        view.inventory.len(),
        view.required_items.len()
    ));
    lines.push(format!("Moves: {}  Par: {}  Score: {}", view.moves, view.par, view.score));
    lines
}

pub fn leaderboard_lines(title: &str, records: &[ScoreRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec![format!("{title}: no scores recorded yet.")];
    }

    let mut lines = vec![
        format!("{title}:"),
        format!(
            "{:>4}  {:<16} {:>6} {:>5} {:>4}  {:<6} {:>5}",
            "#", "Player", "Points", "Moves", "Par", "Result", "Items"
        ),
    ];
    for (index, record) in records.iter().enumerate() {
        lines.push(format!(
            "{:>4}  {:<16} {:>6} {:>5} {:>4}  {:<6} {:>5}",
            index + 1,
            record.player_name,
            record.points,
            record.moves,
            record.par,
            if record.won { "won" } else { "lost" },
            record.items_collected
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_core::Direction;

    fn view() -> SessionView {
        SessionView {
            phase: SessionPhase::Playing,
            player_name: "Hero".to_string(),
            room: "East Tower".to_string(),
            room_item: Some("Shield".to_string()),
            exits: vec![
                (Direction::South, "Barracks".to_string()),
                (Direction::West, "Great Hall".to_string()),
            ],
            inventory: vec!["Torch".to_string()],
            required_items: vec!["Torch".to_string(), "Shield".to_string()],
            moves: 3,
            par: 9,
            score: 100,
            game_over: false,
            won: None,
            status: "You move east to the East Tower.".to_string(),
        }
    }

    #[test]
    fn room_lines_describe_items_and_exits() {
        assert_eq!(
            room_lines(&view()),
            vec![
                "You are in the East Tower.",
                "You see a Shield here.",
                "Exits: south (Barracks), west (Great Hall)",
                "Inventory: Torch (1/2)",
                "Moves: 3  Par: 9  Score: 100",
            ]
        );
    }

    #[test]
    fn empty_room_and_inventory() {
        let view = SessionView { room_item: None, inventory: Vec::new(), ..view() };
        let lines = room_lines(&view);
        assert!(!lines.iter().any(|line| line.starts_with("You see")));
        assert!(lines.contains(&"Inventory: empty (0/2)".to_string()));
    }

    #[test]
    fn status_lines_split_multiline_messages() {
        assert_eq!(status_lines("one\ntwo"), vec!["one", "two"]);
    }

    #[test]
    fn leaderboard_ranks_rows() {
        let records = vec![
            ScoreRecord::new("Bilbo", 600, 9, 9, true, 6),
            ScoreRecord::new("Frodo", 200, 3, 9, false, 2),
        ];
        let lines = leaderboard_lines("Top scores", &records);
        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_start().starts_with("1  Bilbo"));
        assert!(lines[2].contains("won"));
        assert!(lines[3].contains("lost"));
    }

    #[test]
    fn empty_leaderboard_says_so() {
        assert_eq!(
            leaderboard_lines("Your scores", &[]),
            vec!["Your scores: no scores recorded yet."]
        );
    }
}
